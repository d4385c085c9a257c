//! Desugaring the surface tree into the core calculus.
//!
//! This is a single bottom-up traversal and it never fails: everything rejectable was rejected
//! by the parser. The surface tree is consumed and can be discarded afterwards.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]

mod internal;
mod st;

use sonnet_core::{Arenas, ExprMust};

/// The result of desugaring one file.
#[derive(Debug)]
pub struct Desugar {
  /// The single top-level expression.
  pub top: ExprMust,
  /// The arenas holding the allocations.
  pub arenas: Arenas,
}

/// Transforms a surface tree into a core tree.
#[must_use]
pub fn get(root: sonnet_ast::Expr) -> Desugar {
  let mut st = st::St::default();
  let top = internal::expr(&mut st, root);
  Desugar { top, arenas: st.finish() }
}
