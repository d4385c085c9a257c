//! The core calculus.
//!
//! Desugaring lowers the surface tree into these expressions. There are fewer node kinds and the
//! semantics of each is explicit; all surface sugar is gone. Core trees are arena-allocated and
//! live for the whole evaluation; every node carries a span.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]
#![allow(missing_docs)]

mod float;
mod string;

use sonnet_source::Span;

pub use float::{Float, Infinite};
pub use string::{Id, Str, StrArena};

/// A core expression: an index into an [`ExprArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExprMust(la_arena::Idx<ExprData>);

/// The arena holding core expressions and their spans.
#[derive(Debug, Default)]
pub struct ExprArena {
  exprs: la_arena::Arena<ExprData>,
  spans: la_arena::ArenaMap<la_arena::Idx<ExprData>, Span>,
}

impl ExprArena {
  pub fn alloc(&mut self, data: ExprData, span: Span) -> ExprMust {
    let idx = self.exprs.alloc(data);
    self.spans.insert(idx, span);
    ExprMust(idx)
  }

  #[must_use]
  pub fn span(&self, e: ExprMust) -> Span {
    self.spans[e.0]
  }

  pub fn iter(&self) -> impl Iterator<Item = (ExprMust, &ExprData)> {
    self.exprs.iter().map(|(idx, data)| (ExprMust(idx), data))
  }
}

impl std::ops::Index<ExprMust> for ExprArena {
  type Output = ExprData;

  fn index(&self, index: ExprMust) -> &Self::Output {
    &self.exprs[index.0]
  }
}

/// The arenas for one file.
#[derive(Debug, Default)]
pub struct Arenas {
  pub str: StrArena,
  pub expr: ExprArena,
}

/// A primitive value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prim {
  Null,
  Bool(bool),
  String(Str),
  Number(Float),
}

/// An object field.
#[derive(Debug, Clone)]
pub struct Field {
  pub key: ExprMust,
  /// `f+: v`, merge with the inherited field on lookup.
  pub plus: bool,
  pub vis: Visibility,
  pub val: ExprMust,
}

/// A comprehension clause. The first clause of a comprehension is always `For`.
#[derive(Debug, Clone)]
pub enum CompSpec {
  For { id: Id, seq: ExprMust },
  If { cond: ExprMust },
}

#[derive(Debug, Clone)]
pub enum ExprData {
  Prim(Prim),
  Object {
    asserts: Vec<ExprMust>,
    fields: Vec<Field>,
  },
  ObjectComp {
    key: ExprMust,
    val: ExprMust,
    specs: Vec<CompSpec>,
  },
  Array(Vec<ExprMust>),
  ArrayComp {
    elem: ExprMust,
    specs: Vec<CompSpec>,
  },
  Subscript {
    on: ExprMust,
    idx: ExprMust,
  },
  Slice {
    on: ExprMust,
    lo: Option<ExprMust>,
    hi: Option<ExprMust>,
    step: Option<ExprMust>,
  },
  /// `super[e]`; `super.f` desugars to this.
  SuperSubscript {
    idx: ExprMust,
  },
  /// `e in super`.
  InSuper {
    lhs: ExprMust,
  },
  SelfExpr,
  Id(Id),
  Call {
    func: ExprMust,
    positional: Vec<ExprMust>,
    named: Vec<(Id, ExprMust)>,
  },
  /// A recursive binding group: every name is in scope in every right-hand side.
  Local {
    binds: Vec<(Id, ExprMust)>,
    body: ExprMust,
  },
  If {
    cond: ExprMust,
    yes: ExprMust,
    no: ExprMust,
  },
  BinaryOp {
    lhs: ExprMust,
    op: BinaryOp,
    rhs: ExprMust,
  },
  UnaryOp {
    op: UnaryOp,
    inner: ExprMust,
  },
  Function {
    params: Vec<(Id, Option<ExprMust>)>,
    body: ExprMust,
  },
  Error(ExprMust),
  Assert {
    cond: ExprMust,
    msg: Option<ExprMust>,
    body: ExprMust,
  },
  /// Imports are not spliced into the tree; the file is evaluated once and the result cached.
  Import {
    kind: ImportKind,
    path: Str,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
  Code,
  String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
  /// `:`; inherits the hiddenness of an overridden field.
  Default,
  /// `::`.
  Hidden,
  /// `:::`.
  Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Mul,
  Div,
  Mod,
  Add,
  Sub,
  Shl,
  Shr,
  Lt,
  LtEq,
  Gt,
  GtEq,
  In,
  Eq,
  NotEq,
  BitAnd,
  BitXor,
  BitOr,
  /// short-circuits.
  And,
  /// short-circuits.
  Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
  Neg,
  Pos,
  BitNot,
  LogicalNot,
}
