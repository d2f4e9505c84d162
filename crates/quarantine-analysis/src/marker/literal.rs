//! Static evaluation of Python string literals found in decorator arguments.

/// Evaluate one string token (`"..."`, `f'...'`, `r"""..."""`, ...).
///
/// Escapes are decoded unless the literal is raw. In f-strings, `{{`/`}}`
/// collapse to single braces and a replacement field naming `sentinel`
/// evaluates to the sentinel token itself; any other replacement field is
/// kept verbatim with its braces. Byte strings return `None`.
pub fn string_value(token: &str, sentinel: &str) -> Option<String> {
    let prefix_len = token.find(['"', '\''])?;
    let prefix = token[..prefix_len].to_ascii_lowercase();
    if !prefix.chars().all(|c| matches!(c, 'r' | 'u' | 'f')) {
        return None;
    }
    let is_raw = prefix.contains('r');
    let is_format = prefix.contains('f');

    let rest = &token[prefix_len..];
    let quote = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|q| rest.starts_with(q))?;
    if rest.len() < 2 * quote.len() || !rest.ends_with(quote) {
        return None;
    }
    let body = &rest[quote.len()..rest.len() - quote.len()];

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if !is_raw => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('0') => out.push('\0'),
                Some('\\') => out.push('\\'),
                Some('\'') => out.push('\''),
                Some('"') => out.push('"'),
                // line continuation
                Some('\n') => {}
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '{' if is_format => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut depth = 1usize;
                let mut field = String::new();
                while let Some(inner) = chars.next() {
                    match inner {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    field.push(inner);
                }
                if field.trim() == sentinel {
                    out.push_str(sentinel);
                } else {
                    out.push('{');
                    out.push_str(&field);
                    out.push('}');
                }
            }
            '}' if is_format => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                }
                out.push('}');
            }
            other => out.push(other),
        }
    }
    Some(out)
}

/// Evaluate an implicitly concatenated string (`"a" f"b"`). `None` if any
/// part is not a string we can evaluate, or there are no parts.
pub fn concatenated_value(parts: &[String], sentinel: &str) -> Option<String> {
    if parts.is_empty() {
        return None;
    }
    let mut value = String::new();
    for part in parts {
        value.push_str(&string_value(part, sentinel)?);
    }
    Some(value)
}

/// Escape text for the body of a double-quoted f-string.
pub fn escape_fstring_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '{' => out.push_str("{{"),
            '}' => out.push_str("}}"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
