//! Caller-supplied message descriptors.

use std::fmt;

/// An ordered set of candidate codes plus arguments and an optional default
/// message, resolved in one call.
///
/// Codes are tried first to last; the last code is the "default code"
/// reported in diagnostics. When a default message is present it is
/// rendered through the formatter like any resolved pattern, unless
/// [`MessageResolvable::without_default_rendering`] marked it as verbatim
/// text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageResolvable {
    codes: Vec<String>,
    args: Vec<String>,
    default_message: Option<String>,
    render_default: bool,
}

impl MessageResolvable {
    /// A resolvable with a single candidate code.
    pub fn new(code: impl Into<String>) -> Self {
        Self::with_codes(vec![code.into()])
    }

    /// A resolvable trying the given codes in order.
    pub fn with_codes(codes: Vec<String>) -> Self {
        Self {
            codes,
            args: Vec::new(),
            default_message: None,
            render_default: true,
        }
    }

    /// Append one formatting argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Replace the formatting arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the default message used when no code resolves.
    pub fn with_default(mut self, default_message: impl Into<String>) -> Self {
        self.default_message = Some(default_message.into());
        self
    }

    /// Mark the default message as verbatim text: it is returned as-is,
    /// never run through the formatter.
    pub fn without_default_rendering(mut self) -> Self {
        self.render_default = false;
        self
    }

    /// Candidate codes in resolution order.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Formatting arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The default message, if any.
    pub fn default_message(&self) -> Option<&str> {
        self.default_message.as_deref()
    }

    /// Whether the default message may contain placeholders and should be
    /// rendered.
    pub fn should_render_default(&self) -> bool {
        self.render_default
    }

    /// The default code, that is, the last one in the code list.
    pub fn default_code(&self) -> Option<&str> {
        self.codes.last().map(String::as_str)
    }
}

impl fmt::Display for MessageResolvable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "codes [{}]; arguments [{}]; default message [{}]",
            self.codes.join(","),
            self.args.join(","),
            self.default_message.as_deref().unwrap_or("")
        )
    }
}
