//! Error types.

use std::fmt;
use thiserror::Error;

/// Detailed cause of a [`ParseError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected character or end of input.
    ///
    /// The error index points to the first byte of the character or the end of input.
    UnexpectedCharOrEnd,
    /// Invalid IPv6 address.
    ///
    /// The error index points to the first byte of the address.
    InvalidIpv6Addr,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnexpectedCharOrEnd => "unexpected character or end of input",
            Self::InvalidIpv6Addr => "invalid IPv6 address",
        })
    }
}

/// An error occurred when parsing a URI reference.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("{kind} at index {index}")]
pub struct ParseError {
    pub(crate) index: usize,
    pub(crate) kind: ParseErrorKind,
}

impl ParseError {
    /// Returns the index at which the error occurred.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the detailed cause of the error.
    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

/// Detailed cause of a [`TemplateError`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TemplateErrorKind {
    /// A `'{'` was opened but input ended inside the name or pattern.
    #[error("unterminated placeholder at index {index}")]
    UnterminatedPlaceholder {
        /// Character index at which input ended.
        index: usize,
    },
    /// A name contains a character other than letters, digits, `'_'`, `'-'` or `'.'`.
    #[error("illegal character {ch:?} in placeholder name at index {index}")]
    IllegalNameChar {
        /// The offending character.
        ch: char,
        /// Its character index.
        index: usize,
    },
    /// A placeholder has no name.
    #[error("empty placeholder name at index {index}")]
    EmptyName {
        /// Character index of the closing `'}'` or `':'`.
        index: usize,
    },
    /// A name repeats with a different pattern.
    #[error("placeholder {name:?} declared with pattern {first:?} and later with {second:?}")]
    InconsistentPattern {
        /// The repeated name.
        name: String,
        /// Pattern of the first occurrence.
        first: String,
        /// Pattern of the conflicting occurrence.
        second: String,
    },
    /// The assembled regular expression does not compile.
    #[error("invalid regular expression: {message}")]
    InvalidRegex {
        /// The message reported by the regex compiler.
        message: String,
    },
}

/// A malformed URI template.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("invalid template {template:?}: {kind}")]
pub struct TemplateError {
    pub(crate) kind: TemplateErrorKind,
    pub(crate) template: String,
}

impl TemplateError {
    /// Returns the detailed cause of the error.
    #[must_use]
    pub fn kind(&self) -> &TemplateErrorKind {
        &self.kind
    }

    /// Returns the template text that failed to compile.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the character index at which scanning failed, if any.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self.kind {
            TemplateErrorKind::UnterminatedPlaceholder { index }
            | TemplateErrorKind::IllegalNameChar { index, .. }
            | TemplateErrorKind::EmptyName { index } => Some(index),
            TemplateErrorKind::InconsistentPattern { .. } | TemplateErrorKind::InvalidRegex { .. } => {
                None
            }
        }
    }
}

/// A builder method was called with an argument or in a state it does not accept.
///
/// The builder is left unchanged when a method returns this error.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum UsageError {
    /// A hierarchical component was set while the builder holds an opaque part.
    #[error("cannot set a hierarchical component on an opaque URI")]
    Opaque,
    /// The scheme is not `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
    #[error("invalid scheme {0:?}")]
    InvalidScheme(String),
    /// The port is less than `-1`.
    #[error("invalid port {0}")]
    InvalidPort(i32),
    /// The host is empty.
    #[error("host must not be empty")]
    EmptyHost,
    /// A matrix or query parameter has an empty name.
    #[error("parameter name must not be empty")]
    EmptyName,
    /// A component contains a malformed template.
    #[error(transparent)]
    InvalidTemplate(#[from] TemplateError),
}

/// A template variable could not be resolved.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ResolveError {
    /// No value was supplied for the named placeholder.
    #[error("template variable {name:?} has no value")]
    Unresolved {
        /// Name of the placeholder.
        name: String,
    },
}

/// An error occurred when building a URI.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BuildError {
    /// A component holds a malformed template.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// A placeholder has no value.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// The assembled string is not a valid URI reference.
    #[error("built string {input:?} is not a valid URI: {source}")]
    Parse {
        /// The assembled string.
        input: String,
        /// The syntax error.
        source: ParseError,
    },
}
