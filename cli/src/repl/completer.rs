use rustyline::completion::Pair;

pub fn complete_line(line: &str, pos: usize) -> (usize, Vec<Pair>) {
    let safe_pos = pos.min(line.len());
    let prefix = &line[..safe_pos];

    if prefix.trim_start().starts_with('.') && !prefix.contains(' ') {
        let start = prefix.len() - prefix.trim_start().len();
        let needle = &prefix[start..];
        let matches = commands()
            .iter()
            .copied()
            .filter(|cmd| cmd.starts_with(needle))
            .collect::<Vec<_>>();
        return (start, pairs(&matches));
    }

    let start = word_start(prefix);
    let needle = &prefix[start..];
    if needle.is_empty() {
        return (start, Vec::new());
    }
    let words = steps()
        .iter()
        .chain(handler_specs().iter())
        .chain(fields().iter())
        .copied()
        .filter(|word| word.starts_with(needle))
        .collect::<Vec<_>>();

    (start, pairs(&words))
}

fn pairs(values: &[&str]) -> Vec<Pair> {
    values
        .iter()
        .map(|v| Pair {
            display: (*v).to_string(),
            replacement: (*v).to_string(),
        })
        .collect()
}

fn word_start(prefix: &str) -> usize {
    prefix
        .char_indices()
        .rev()
        .find(|(_, ch)| !is_word_char(*ch))
        .map_or(0, |(idx, ch)| idx + ch.len_utf8())
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn commands() -> &'static [&'static str] {
    &[".help", ".state", ".log", ".drain", ".clear", ".load", ".exit"]
}

pub(super) fn steps() -> &'static [&'static str] {
    &[
        "defer",
        "attach",
        "then",
        "otherwise",
        "always",
        "fulfill",
        "reject",
        "resolve",
        "progress",
        "cancel",
        "normalize",
        "all",
        "first",
        "trace",
        "trace_rejected",
        "drain",
    ]
}

pub(super) fn handler_specs() -> &'static [&'static str] {
    &[
        "identity", "ignore", "constant", "multiply", "add", "prefix", "throw", "rethrow",
        "follow", "log",
    ]
}

fn fields() -> &'static [&'static str] {
    &[
        "name",
        "to",
        "handler",
        "canceler",
        "on_fulfilled",
        "on_rejected",
        "on_progress",
        "deferred",
        "promise",
        "value",
        "reason",
        "update",
        "of",
        "args",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replacements(line: &str) -> Vec<String> {
        complete_line(line, line.len())
            .1
            .into_iter()
            .map(|pair| pair.replacement)
            .collect()
    }

    #[test]
    fn completes_commands_and_steps() {
        assert_eq!(replacements(".dr"), vec![".drain"]);
        assert_eq!(replacements("{otherw"), vec!["otherwise"]);
        assert_eq!(replacements("{then: {name: p, to: d, handler: {mul"), vec!["multiply"]);
    }
}
