//! Parsing a sequence of tokens into a surface syntax tree.
//!
//! The grammar is recursive descent with Pratt-style precedence climbing for the infix
//! operators. Errors are fatal: the first one is returned and no partial tree is built.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]

mod error;
mod internal;

use sonnet_lex::Token;
use sonnet_source::FileId;

pub use error::{Error, Expected, Kind as ErrorKind};

/// Parses tokens into an expression.
///
/// # Errors
///
/// On the first syntax error.
pub fn get(file: FileId, src: &str, tokens: &[Token]) -> Result<sonnet_ast::Expr, Error> {
  let mut p = internal::P::new(file, src, tokens);
  let e = internal::expr(&mut p)?;
  match p.peek() {
    None => Ok(e),
    Some(tok) => Err(Error { span: p.span(tok), kind: error::Kind::Trailing }),
  }
}
