//! TypeScript text helpers shared by every generated declaration.

/// Render an object property key, quoting it unless it is a plain identifier.
pub fn property_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        string_literal(key)
    }
}

/// Render a single-quoted string literal.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Render a union of string literals, one member per line.
///
/// An empty set renders as `never`.
pub fn literal_union<S: AsRef<str>>(members: &[S]) -> String {
    if members.is_empty() {
        return "never".to_string();
    }

    members
        .iter()
        .map(|m| string_literal(m.as_ref()))
        .collect::<Vec<_>>()
        .join(" |\n  ")
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
