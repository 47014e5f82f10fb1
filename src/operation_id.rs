//! Name generation for operations and synthesized body schemas.

use crate::route::Route;

/// operationId for a route: its nickname if one was given, otherwise the
/// lower-case verb followed by the manipulated path template.
pub fn build(route: &Route, path: &str) -> String {
    match route.nickname.as_deref() {
        Some(nickname) if !nickname.is_empty() => nickname.to_string(),
        _ => format!("{}{}", route.method.as_lower(), manipulate(path)),
    }
}

/// Naming token for the body schema of a route with this path template.
///
/// A trailing `{param}` segment is dropped first, so `/items` and
/// `/items/{id}` share the token `Items`.
pub fn model_token(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    let model = match parts.last() {
        Some(last) if last.contains('{') => parts[..parts.len() - 1].join("/"),
        _ => path.to_string(),
    };

    manipulate(&model)
}

/// Turns a path template into a CamelCase identifier.
///
/// `/arbitrary/{id}/id_and_hash` becomes `ArbitraryIdIdAndHash`.
pub fn manipulate(path: &str) -> String {
    let mut operation: String = path.split('/').map(capitalize).collect();

    for marker in ['-', '_', '.'] {
        operation = upcase_after(&operation, marker);
    }

    if path.contains('{') {
        operation = upcase_after(&operation, '{').replace('}', "");
    }

    operation
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Removes every `marker` and upper-cases the word character following it
fn upcase_after(input: &str, marker: char) -> String {
    let mut output = String::with_capacity(input.len());
    let mut upcase_next = false;

    for c in input.chars() {
        if c == marker {
            upcase_next = true;
            continue;
        }
        if upcase_next && (c.is_alphanumeric() || c == '_') {
            output.extend(c.to_uppercase());
        } else {
            output.push(c);
        }
        upcase_next = false;
    }

    output
}
