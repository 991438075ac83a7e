use std::borrow::Cow;

use owo_colors::OwoColorize;

use super::completer::{handler_specs, steps};

pub fn highlight_line(line: &str) -> Cow<'_, str> {
    if line.trim_start().starts_with('.') {
        return Cow::Owned(line.bright_blue().to_string());
    }

    let mut out = String::with_capacity(line.len());
    let mut word = String::new();
    for ch in line.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            word.push(ch);
            continue;
        }
        flush_word(&mut out, &mut word);
        out.push(ch);
    }
    flush_word(&mut out, &mut word);
    Cow::Owned(out)
}

fn flush_word(out: &mut String, word: &mut String) {
    if word.is_empty() {
        return;
    }
    if steps().contains(&word.as_str()) {
        out.push_str(&word.blue().bold().to_string());
    } else if handler_specs().contains(&word.as_str()) {
        out.push_str(&word.cyan().to_string());
    } else {
        out.push_str(word);
    }
    word.clear();
}

pub fn highlight_prompt(prompt: &str) -> Cow<'_, str> {
    if prompt == "> " {
        return Cow::Owned(format!("{} ", ">".bright_green().bold()));
    }
    Cow::Borrowed(prompt)
}

pub fn highlight_hint(hint: &str) -> Cow<'_, str> {
    Cow::Owned(hint.bright_black().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_repl_prompt_is_painted() {
        assert!(matches!(highlight_prompt("> "), Cow::Owned(_)));
        assert!(matches!(highlight_prompt("... "), Cow::Borrowed("... ")));
    }

    #[test]
    fn step_keywords_are_painted_but_names_are_not() {
        let painted = highlight_line("{defer: {name: d}}");
        assert_ne!(painted, "{defer: {name: d}}");
        assert!(painted.contains("name: d}}"));
    }

    #[test]
    fn commands_are_painted_whole() {
        assert_eq!(highlight_line(".state"), ".state".bright_blue().to_string());
    }
}
