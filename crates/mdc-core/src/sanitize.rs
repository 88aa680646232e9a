//! Input cleaning for text that ends up in other users' consoles.

use serde_json::Value;

const DANGEROUS_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:", "file:", "about:"];

/// Escape HTML metacharacters.
pub fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            c => out.push(c),
        }
    }
    out
}

/// Drop control characters except tab, newline and carriage return.
pub fn sanitize_text(input: &str) -> String {
    input
        .chars()
        .filter(|&c| !c.is_ascii_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

/// Empty for script-capable or local schemes, the URL unchanged otherwise.
pub fn sanitize_url(url: &str) -> String {
    let lowered = url.trim().to_lowercase();
    if DANGEROUS_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return String::new();
    }
    url.to_string()
}

/// Apply [`sanitize_text`] to every string inside a JSON document.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_text(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sanitize_value(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Lowercased address, or empty when it does not look like one.
pub fn sanitize_email(email: &str) -> String {
    let trimmed = email.trim().to_lowercase();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return String::new();
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    let domain_ok = domain
        .rsplit_once('.')
        .is_some_and(|(host, tld)| {
            !host.is_empty()
                && host
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
                && tld.len() >= 2
                && tld.chars().all(|c| c.is_ascii_alphabetic())
        });
    if local_ok && domain_ok {
        trimmed
    } else {
        String::new()
    }
}

/// Keep ASCII letters, digits, `_` and `-`.
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        .collect()
}

/// Keep letters (any script), digits, whitespace, `.` and `-`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '.' | '-'))
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn sanitize_address(address: &str) -> String {
    sanitize_text(address).trim().to_string()
}

/// Keep digits, `+`, `-`, parentheses and spaces.
pub fn sanitize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
        .collect::<String>()
        .trim()
        .to_string()
}
