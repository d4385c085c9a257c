//! Errors.

use sonnet_source::Span;
use std::fmt;

/// An error when lexing.
#[derive(Debug, Clone, Copy)]
pub struct Error {
  pub(crate) span: Span,
  pub(crate) kind: Kind,
}

impl Error {
  /// The span of the error.
  #[must_use]
  pub fn span(&self) -> Span {
    self.span
  }
}

/// A kind of lex error.
#[derive(Debug, Clone, Copy)]
pub enum Kind {
  /// A block comment with no closing `*/`.
  UnclosedComment,
  /// A number with a leading `0`.
  LeadingZero,
  /// A number missing digits after `.` or the exponent.
  NeedDigits,
  /// `@` not followed by a quote.
  InvalidVerbatimDelim,
  /// Bytes that begin no token.
  InvalidBytes,
  /// An invalid string.
  Escape(sonnet_escape::Error),
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      Kind::UnclosedComment => f.write_str("unclosed comment"),
      Kind::LeadingZero => f.write_str("number with leading zero"),
      Kind::NeedDigits => f.write_str("need at least one digit"),
      Kind::InvalidVerbatimDelim => f.write_str("invalid verbatim string delimiter"),
      Kind::InvalidBytes => f.write_str("invalid bytes"),
      Kind::Escape(e) => e.fmt(f),
    }
  }
}
