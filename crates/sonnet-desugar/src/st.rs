//! The mutable desugaring state.

use sonnet_core::{Arenas, ExprData, ExprMust, Id, Str};
use sonnet_source::Span;

#[derive(Debug, Default)]
pub(crate) struct St {
  arenas: Arenas,
}

impl St {
  pub(crate) fn expr(&mut self, data: ExprData, span: Span) -> ExprMust {
    self.arenas.expr.alloc(data, span)
  }

  pub(crate) fn str(&mut self, s: &str) -> Str {
    self.arenas.str.insert(s.into())
  }

  pub(crate) fn id(&mut self, s: &str) -> Id {
    self.arenas.str.id(s.into())
  }

  pub(crate) fn finish(self) -> Arenas {
    self.arenas
  }
}
