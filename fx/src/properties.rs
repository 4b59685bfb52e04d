//! Reader for Java-style `.properties` files.
//!
//! Supports `#`/`!` comments, the `=`, `:` and whitespace separators,
//! backslash line continuations and the usual escapes (`\t`, `\n`, `\r`,
//! `\f`, `\uXXXX`). Values are taken literally otherwise; there is no
//! variable expansion.

use std::collections::HashMap;
use std::path::Path;

/// Read and parse a properties file.
pub fn read(path: &Path) -> std::io::Result<HashMap<String, String>> {
    let bytes = std::fs::read(path)?;
    Ok(parse(&String::from_utf8_lossy(&bytes)))
}

/// Parse properties text. A key repeated later in the text wins.
pub fn parse(text: &str) -> HashMap<String, String> {
    logical_lines(text)
        .iter()
        .map(|line| {
            let (key, value) = split_entry(line);
            (unescape(key), unescape(value))
        })
        .collect()
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

/// Odd number of trailing backslashes means the line continues.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Join continued lines and drop blanks and comments.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in text.lines() {
        let trimmed = raw.trim_start_matches(is_blank);

        let mut line = match pending.take() {
            Some(mut head) => {
                head.push_str(trimmed);
                head
            }
            None if trimmed.is_empty() || trimmed.starts_with(['#', '!']) => continue,
            None => trimmed.to_string(),
        };

        if continues(&line) {
            line.pop();
            pending = Some(line);
        } else {
            lines.push(line);
        }
    }

    if let Some(line) = pending.filter(|l| !l.is_empty()) {
        lines.push(line);
    }
    lines
}

/// Split a logical line at the first unescaped separator.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = i;
            break;
        }
    }

    let rest = line[key_end..].trim_start_matches(is_blank);
    let rest = rest.strip_prefix(['=', ':']).unwrap_or(rest);
    (&line[..key_end], rest.trim_start_matches(is_blank))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(text: &str, key: &str) -> Option<String> {
        parse(text).remove(key)
    }

    #[test]
    fn test_separators() {
        assert_eq!(value("api_key=abc123", "api_key").as_deref(), Some("abc123"));
        assert_eq!(value("api_key = abc123", "api_key").as_deref(), Some("abc123"));
        assert_eq!(value("api_key:abc123", "api_key").as_deref(), Some("abc123"));
        assert_eq!(value("  api_key : abc123", "api_key").as_deref(), Some("abc123"));
        assert_eq!(value("api_key abc123", "api_key").as_deref(), Some("abc123"));
        assert_eq!(value("api_key", "api_key").as_deref(), Some(""));
    }

    #[test]
    fn test_values_are_literal() {
        assert_eq!(value("api_key=ab$cd", "api_key").as_deref(), Some("ab$cd"));
        assert_eq!(value("api_key=${HOME}", "api_key").as_deref(), Some("${HOME}"));
        assert_eq!(value("url=http://x:8080/a=b", "url").as_deref(), Some("http://x:8080/a=b"));
        assert_eq!(value("quoted=\"abc\"", "quoted").as_deref(), Some("\"abc\""));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let entries = parse("# comment\n! also a comment\n\n   \nkey=1\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.get("key").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_continuation_lines() {
        let text = "api_key=abc\\\n    123\nnext=x\\\\\n";
        assert_eq!(value(text, "api_key").as_deref(), Some("abc123"));
        assert_eq!(value(text, "next").as_deref(), Some("x\\"));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(value("a\\:b=c", "a:b").as_deref(), Some("c"));
        assert_eq!(value("my\\ key=v", "my key").as_deref(), Some("v"));
        assert_eq!(value("k=\\u0041\\tz", "k").as_deref(), Some("A\tz"));
    }

    #[test]
    fn test_later_key_wins_and_crlf() {
        let entries = parse("api_key=old\r\napi_key=new\r\n");
        assert_eq!(entries.get("api_key").map(String::as_str), Some("new"));
    }
}
