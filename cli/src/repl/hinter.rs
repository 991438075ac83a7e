/// Suggests the remaining shape of a step once its keyword is typed.
pub fn hint_for(line: &str, pos: usize) -> Option<String> {
    if pos < line.len() {
        return None;
    }

    let trimmed = line.trim();
    let keyword = trimmed.strip_prefix('{')?.trim();
    if keyword.is_empty() {
        return None;
    }

    let template = match keyword {
        "defer" => ": {name: d}}",
        "attach" => ": {name: c, to: d, on_fulfilled: identity}}",
        "then" => ": {name: c, to: d, handler: identity}}",
        "otherwise" => ": {name: c, to: d, handler: {prefix: 'recovered:'}}}",
        "always" => ": {name: c, to: d, handler: {log: done}}}",
        "fulfill" => ": {deferred: d, value: 1}}",
        "reject" => ": {deferred: d, reason: boom}}",
        "resolve" => ": {deferred: d, promise: other}}",
        "progress" => ": {deferred: d, update: 50}}",
        "cancel" => ": {promise: d, reason: timeout}}",
        "normalize" => ": {name: n, value: 1}}",
        "all" => ": {name: a, of: [x, y]}}",
        "first" => ": {name: f, of: [x, y]}}",
        "trace" => ": {promise: d}}",
        "trace_rejected" => ": {promise: d}}",
        _ => return None,
    };
    Some(template.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_only_at_end_of_a_known_keyword() {
        assert_eq!(hint_for("{defer", 6).as_deref(), Some(": {name: d}}"));
        assert_eq!(hint_for("{defer", 2), None);
        assert_eq!(hint_for("{nope", 5), None);
        assert_eq!(hint_for(".help", 5), None);
    }
}
