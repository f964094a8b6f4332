//! Positional message formatting.

use crate::error::{MessageError, MessageResult};

/// Substitute positional `{0}`, `{1}`, … placeholders into a pattern.
///
/// A literal brace is escaped by doubling (`{{` and `}}`). A placeholder
/// referencing an argument that was not supplied, or a placeholder that is
/// unclosed or non-numeric, is a formatting error surfaced to the caller so
/// corrupted user-facing text is never mistaken for success.
pub fn format(pattern: &str, args: &[&str]) -> MessageResult<String> {
    // Common case: plain text, nothing to substitute.
    if args.is_empty() && !pattern.contains('{') {
        return Ok(pattern.to_string());
    }

    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.char_indices().peekable();
    while let Some((position, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some((_, digit)) if digit.is_ascii_digit() => digits.push(digit),
                        Some((_, '}')) if !digits.is_empty() => break,
                        _ => {
                            return Err(MessageError::InvalidPlaceholder {
                                pattern: pattern.to_string(),
                                position,
                            })
                        }
                    }
                }
                let index: usize =
                    digits
                        .parse()
                        .map_err(|_| MessageError::InvalidPlaceholder {
                            pattern: pattern.to_string(),
                            position,
                        })?;
                let arg = args.get(index).ok_or(MessageError::MissingArgument {
                    index,
                    supplied: args.len(),
                })?;
                out.push_str(arg);
            }
            '}' => {
                // `}}` collapses to one brace; a lone `}` is literal.
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                }
                out.push('}');
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_positional_arguments() {
        let formatted = format("Hello {0}, you have {1} items", &["Ann", "3"]).unwrap();
        assert_eq!(formatted, "Hello Ann, you have 3 items");
    }

    #[test]
    fn arguments_may_repeat_and_appear_out_of_order() {
        let formatted = format("{1} then {0} then {1}", &["a", "b"]).unwrap();
        assert_eq!(formatted, "b then a then b");
    }

    #[test]
    fn plain_patterns_pass_through_verbatim() {
        assert_eq!(format("no placeholders here", &[]).unwrap(), "no placeholders here");
    }

    #[test]
    fn doubled_braces_are_literals() {
        assert_eq!(format("set {{x}} to {0}", &["1"]).unwrap(), "set {x} to 1");
        assert_eq!(format("{{not a placeholder}}", &[]).unwrap(), "{not a placeholder}");
    }

    #[test]
    fn a_lone_closing_brace_is_literal() {
        assert_eq!(format("end}", &[]).unwrap(), "end}");
    }

    #[test]
    fn missing_argument_index_is_an_error() {
        let err = format("Hello {2}", &["a", "b"]).unwrap_err();
        assert!(matches!(
            err,
            MessageError::MissingArgument { index: 2, supplied: 2 }
        ));
    }

    #[test]
    fn unclosed_placeholders_are_errors() {
        assert!(format("broken {0", &["a"]).unwrap_err().is_format_error());
        assert!(format("broken {", &["a"]).unwrap_err().is_format_error());
    }

    #[test]
    fn non_numeric_placeholders_are_errors() {
        assert!(format("hello {name}", &["a"]).unwrap_err().is_format_error());
        assert!(format("empty {}", &["a"]).unwrap_err().is_format_error());
    }
}
