//! Flat `key=value` property text parsing.
//!
//! The format is line oriented: `#` and `!` open full-line comments, `=` or
//! `:` separate a key from its value, a trailing backslash continues the
//! logical line, and the usual backslash escapes are honored in both keys
//! and values. A repeated key overwrites the earlier value within one
//! source. Malformed lines are skipped individually and recorded as
//! [`ParseWarning`]s so one bad line never invalidates the whole bundle.

use encoding_rs::Encoding;
use tracing::debug;

/// A skipped malformed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// One-based physical line number where the logical line started
    pub line: usize,
    /// What made the line unparseable
    pub reason: String,
}

/// Parsed key/value pairs in source order, plus any recorded warnings.
#[derive(Debug, Default, Clone)]
pub struct ParsedProperties {
    /// Key/value pairs in the order they appeared
    pub entries: Vec<(String, String)>,
    /// Lines that were skipped, in source order
    pub warnings: Vec<ParseWarning>,
}

/// Parse property text from raw bytes using the given charset.
pub fn parse(bytes: &[u8], charset: &'static Encoding) -> ParsedProperties {
    let (text, actual, had_errors) = charset.decode(bytes);
    if had_errors {
        debug!(
            "Replaced malformed {} sequences while decoding property text",
            actual.name()
        );
    }
    parse_str(&text)
}

/// Parse property text that has already been decoded.
pub fn parse_str(text: &str) -> ParsedProperties {
    let mut parsed = ParsedProperties::default();
    let mut lines = text.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let start_line = index + 1;
        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        match split_key_value(&logical) {
            Ok((key, value)) => parsed.entries.push((key, value)),
            Err(reason) => parsed.warnings.push(ParseWarning {
                line: start_line,
                reason,
            }),
        }
    }

    parsed
}

/// A logical line continues when it ends with an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(logical: &str) -> Result<(String, String), String> {
    let mut separator = None;
    let mut escaped = false;
    for (position, c) in logical.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                separator = Some(position);
                break;
            }
            _ => {}
        }
    }

    let (raw_key, raw_value) = match separator {
        Some(position) => (
            logical[..position].trim_end(),
            logical[position + 1..].trim_start(),
        ),
        // A line with no separator maps the whole key to the empty string.
        None => (logical.trim_end(), ""),
    };

    let key = unescape(raw_key)?;
    let value = unescape(raw_value)?;
    Ok((key, value))
}

fn unescape(raw: &str) -> Result<String, String> {
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
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() < 4 || !hex.chars().all(|h| h.is_ascii_hexdigit()) {
                    return Err(format!("invalid unicode escape \"\\u{}\"", hex));
                }
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| format!("invalid unicode escape \"\\u{}\"", hex))?;
                match char::from_u32(code) {
                    Some(decoded) => out.push(decoded),
                    None => return Err(format!("unpaired surrogate escape \"\\u{}\"", hex)),
                }
            }
            // `\\`, `\=`, `\:`, `\ `, and unknown escapes all collapse to
            // the escaped character itself.
            Some(other) => out.push(other),
            // A dangling backslash at end of input is dropped.
            None => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{ISO_8859_2, UTF_8};

    fn entries(text: &str) -> Vec<(String, String)> {
        parse_str(text).entries
    }

    #[test]
    fn parses_simple_pairs() {
        assert_eq!(
            entries("greeting=Hello\nfarewell=Bye"),
            vec![
                ("greeting".to_string(), "Hello".to_string()),
                ("farewell".to_string(), "Bye".to_string()),
            ]
        );
    }

    #[test]
    fn supports_colon_separators() {
        assert_eq!(entries("greeting: Hello"), vec![("greeting".to_string(), "Hello".to_string())]);
    }

    #[test]
    fn trims_whitespace_around_the_separator() {
        assert_eq!(
            entries("  greeting   =   Hello  "),
            vec![("greeting".to_string(), "Hello  ".to_string())]
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# a comment\n! another comment\n\n  \ngreeting=Hello";
        assert_eq!(entries(text), vec![("greeting".to_string(), "Hello".to_string())]);
    }

    #[test]
    fn a_key_without_separator_maps_to_the_empty_string() {
        assert_eq!(entries("orphan"), vec![("orphan".to_string(), String::new())]);
    }

    #[test]
    fn last_value_wins_within_one_source() {
        let parsed = parse_str("key=first\nkey=second");
        assert_eq!(
            parsed.entries,
            vec![
                ("key".to_string(), "first".to_string()),
                ("key".to_string(), "second".to_string()),
            ]
        );
    }

    #[test]
    fn continuations_join_logical_lines() {
        let text = "fruits=apple, \\\n    banana, \\\n    cherry";
        assert_eq!(
            entries(text),
            vec![("fruits".to_string(), "apple, banana, cherry".to_string())]
        );
    }

    #[test]
    fn a_doubled_backslash_is_not_a_continuation() {
        let text = "path=C\\\\\nnext=line";
        assert_eq!(
            entries(text),
            vec![
                ("path".to_string(), "C\\".to_string()),
                ("next".to_string(), "line".to_string()),
            ]
        );
    }

    #[test]
    fn unescapes_standard_sequences() {
        assert_eq!(
            entries(r"tabbed=a\tb\nc"),
            vec![("tabbed".to_string(), "a\tb\nc".to_string())]
        );
    }

    #[test]
    fn escaped_separators_stay_in_the_key() {
        assert_eq!(
            entries(r"a\=b=c"),
            vec![("a=b".to_string(), "c".to_string())]
        );
        assert_eq!(
            entries(r"a\:b:c"),
            vec![("a:b".to_string(), "c".to_string())]
        );
    }

    #[test]
    fn decodes_unicode_escapes() {
        assert_eq!(
            entries(r"greeting=Ol\u00e1"),
            vec![("greeting".to_string(), "Olá".to_string())]
        );
    }

    #[test]
    fn malformed_unicode_escapes_are_skipped_with_a_warning() {
        let parsed = parse_str("good=ok\nbad=\\u12zz\nalso_good=ok");
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].line, 2);
        assert!(parsed.warnings[0].reason.contains("unicode escape"));
    }

    #[test]
    fn unknown_escapes_drop_the_backslash() {
        assert_eq!(entries(r"key=a\qb"), vec![("key".to_string(), "aqb".to_string())]);
    }

    #[test]
    fn decodes_with_the_configured_charset() {
        // "żółć=ok" in ISO-8859-2.
        let bytes = ISO_8859_2.encode("\u{17c}\u{f3}\u{142}\u{107}=ok").0;
        let parsed = parse(&bytes, ISO_8859_2);
        assert_eq!(
            parsed.entries,
            vec![("\u{17c}\u{f3}\u{142}\u{107}".to_string(), "ok".to_string())]
        );

        let utf8 = parse("greeting=Olá".as_bytes(), UTF_8);
        assert_eq!(utf8.entries, vec![("greeting".to_string(), "Olá".to_string())]);
    }
}
