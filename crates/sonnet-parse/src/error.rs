//! Errors.

use sonnet_lex::TokenKind;
use sonnet_source::Span;
use std::fmt;

/// An error when parsing.
#[derive(Debug, Clone)]
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

/// A kind of parse error.
#[derive(Debug, Clone)]
pub enum Kind {
  Expected(Expected),
  /// Tokens after the top-level expression.
  Trailing,
  DuplicateField(String),
  DuplicateParam(String),
  DuplicateBind(String),
  DuplicateNamedArg(String),
  PositionalArgAfterNamedArg,
  /// A bare `super` not followed by `.`, `[`, nor preceded by `in`.
  SuperNeedsField,
  ObjectCompNotOne,
  ObjectCompAssert,
  ObjectCompLiteralFieldName,
  ObjectCompFieldExtra,
  ObjectCompVisibility,
  CannotRepresentNumber,
  Escape(sonnet_escape::Error),
}

/// What was expected at an error site.
#[derive(Debug, Clone, Copy)]
pub enum Expected {
  Expr,
  Member,
  Visibility,
  String,
  Kind(TokenKind),
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      Kind::Expected(e) => write!(f, "expected {e}"),
      Kind::Trailing => f.write_str("unexpected trailing tokens"),
      Kind::DuplicateField(s) => write!(f, "duplicate field: `{s}`"),
      Kind::DuplicateParam(s) => write!(f, "duplicate parameter: `{s}`"),
      Kind::DuplicateBind(s) => write!(f, "duplicate binding: `{s}`"),
      Kind::DuplicateNamedArg(s) => write!(f, "duplicate named argument: `{s}`"),
      Kind::PositionalArgAfterNamedArg => {
        f.write_str("positional arguments must not appear after named arguments")
      }
      Kind::SuperNeedsField => f.write_str("`super` must be followed by `.` or `[`"),
      Kind::ObjectCompNotOne => {
        f.write_str("object comprehension must contain exactly one field")
      }
      Kind::ObjectCompAssert => f.write_str("object comprehension must not contain asserts"),
      Kind::ObjectCompLiteralFieldName => {
        f.write_str("object comprehension field name must be computed")
      }
      Kind::ObjectCompFieldExtra => {
        f.write_str("object comprehension field must not have `+` or parameters")
      }
      Kind::ObjectCompVisibility => f.write_str("object comprehension field must use `:`"),
      Kind::CannotRepresentNumber => f.write_str("cannot represent number"),
      Kind::Escape(e) => e.fmt(f),
    }
  }
}

impl fmt::Display for Expected {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Expected::Expr => f.write_str("an expression"),
      Expected::Member => f.write_str("an object member"),
      Expected::Visibility => f.write_str("`:`, `::`, or `:::`"),
      Expected::String => f.write_str("a string literal"),
      Expected::Kind(k) => f.write_str(k.describe()),
    }
  }
}
