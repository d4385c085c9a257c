//! Errors.
//!
//! Evaluation is a total function returning a value or one of these; host exceptions are never
//! used for control flow. Every error carries a span and the stack trace at its creation.

use sonnet_source::Span;
use std::fmt;
use std::rc::Rc;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error when evaluating or manifesting.
#[derive(Debug, Clone)]
pub struct Error {
  pub(crate) span: Span,
  pub(crate) kind: Kind,
  pub(crate) trace: Vec<Span>,
}

impl Error {
  /// The span of the error.
  #[must_use]
  pub fn span(&self) -> Span {
    self.span
  }

  /// The active spans (application sites, field forces, imports) at the error, outermost first.
  #[must_use]
  pub fn trace(&self) -> &[Span] {
    &self.trace
  }

  /// The error class.
  #[must_use]
  pub fn class(&self) -> Class {
    match self.kind {
      Kind::IncompatibleTypes { .. }
      | Kind::NotCallable
      | Kind::SelfOutsideObject
      | Kind::DollarOutsideObject
      | Kind::SuperOutsideObject => Class::Type,
      Kind::InfiniteLoop => Class::InfiniteLoop,
      Kind::InfiniteManifest => Class::InfiniteManifest,
      _ => Class::Runtime,
    }
  }
}

/// The error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
  /// An operator/operand mismatch or a bad application.
  Type,
  /// A runtime failure: user `error`, failed assert, arithmetic domain, bad access.
  Runtime,
  /// A thunk was re-entered while being forced.
  InfiniteLoop,
  /// A cycle was detected during manifestation.
  InfiniteManifest,
}

impl fmt::Display for Class {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Class::Type => f.write_str("type error"),
      Class::Runtime => f.write_str("runtime error"),
      Class::InfiniteLoop => f.write_str("infinite loop"),
      Class::InfiniteManifest => f.write_str("infinite manifest"),
    }
  }
}

/// A kind of evaluation error.
#[derive(Debug, Clone)]
pub enum Kind {
  IncompatibleTypes {
    want: &'static str,
    got: &'static str,
  },
  NotCallable,
  SelfOutsideObject,
  DollarOutsideObject,
  SuperOutsideObject,
  UndefinedVariable(Rc<str>),
  User(Rc<str>),
  AssertFailed(Option<Rc<str>>),
  Infinite(sonnet_core::Infinite),
  DivideByZero,
  ArrayIdxNotInteger,
  ArrayIdxOutOfRange,
  StringIdxOutOfRange,
  SliceOutOfDomain,
  NoSuchField(Rc<str>),
  DuplicateField(Rc<str>),
  Host(Rc<str>),
  TooManyArguments,
  DuplicateArgument(Rc<str>),
  NoSuchArgument(Rc<str>),
  MissingArgument(Rc<str>),
  ManifestFunction,
  StackOverflow,
  InfiniteLoop,
  InfiniteManifest,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      Kind::IncompatibleTypes { want, got } => {
        write!(f, "incompatible types: expected {want}, found {got}")
      }
      Kind::NotCallable => f.write_str("not callable"),
      Kind::SelfOutsideObject => f.write_str("`self` used outside an object"),
      Kind::DollarOutsideObject => f.write_str("`$` used outside an object"),
      Kind::SuperOutsideObject => f.write_str("`super` used outside an object"),
      Kind::UndefinedVariable(name) => write!(f, "undefined variable: `{name}`"),
      Kind::User(msg) => write!(f, "explicit `error`: {msg}"),
      Kind::AssertFailed(None) => f.write_str("assertion failed"),
      Kind::AssertFailed(Some(msg)) => write!(f, "assertion failed: {msg}"),
      Kind::Infinite(inf) => write!(f, "number overflow: {inf}"),
      Kind::DivideByZero => f.write_str("division by zero"),
      Kind::ArrayIdxNotInteger => f.write_str("array index not an integer"),
      Kind::ArrayIdxOutOfRange => f.write_str("array index out of range"),
      Kind::StringIdxOutOfRange => f.write_str("string index out of range"),
      Kind::SliceOutOfDomain => f.write_str("slice index out of domain"),
      Kind::NoSuchField(name) => write!(f, "no such field: `{name}`"),
      Kind::DuplicateField(name) => write!(f, "duplicate field: `{name}`"),
      Kind::Host(msg) => write!(f, "host function error: {msg}"),
      Kind::TooManyArguments => f.write_str("too many arguments"),
      Kind::DuplicateArgument(name) => write!(f, "duplicate argument: `{name}`"),
      Kind::NoSuchArgument(name) => write!(f, "no such argument: `{name}`"),
      Kind::MissingArgument(name) => write!(f, "missing argument: `{name}`"),
      Kind::ManifestFunction => f.write_str("cannot manifest a function"),
      Kind::StackOverflow => f.write_str("evaluation too deep"),
      Kind::InfiniteLoop => f.write_str("detected an infinite loop"),
      Kind::InfiniteManifest => f.write_str("detected a cycle during manifestation"),
    }
  }
}
