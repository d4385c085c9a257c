//! The surface syntax tree.
//!
//! Every node carries a span. The tree is as close to what was written as is practical: sugar
//! like methods, `a.b`, and comprehension clauses survive until desugaring. It is discarded
//! after lowering to the core calculus.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]
#![allow(missing_docs)]

use sonnet_source::Span;

/// An expression with its span.
#[derive(Debug)]
pub struct Expr {
  pub kind: ExprKind,
  pub span: Span,
}

impl Expr {
  #[must_use]
  pub fn new(kind: ExprKind, span: Span) -> Self {
    Self { kind, span }
  }
}

#[derive(Debug)]
pub enum ExprKind {
  Null,
  True,
  False,
  SelfExpr,
  /// `$`, the root object.
  Dollar,
  Int(i64),
  Float(f64),
  /// Cooked contents; all four string forms end up here.
  Str(String),
  Id(String),
  Array(Vec<Expr>),
  ArrayComp {
    elem: Box<Expr>,
    specs: Vec<CompSpec>,
  },
  /// An object literal, or an object comprehension when `specs` is non-empty.
  Object {
    members: Vec<Member>,
    specs: Vec<CompSpec>,
  },
  /// `a.b`.
  FieldGet {
    on: Box<Expr>,
    name: Name,
  },
  /// `a[e]`.
  Subscript {
    on: Box<Expr>,
    idx: Box<Expr>,
  },
  /// `a[lo:hi:step]`, each part optional.
  Slice {
    on: Box<Expr>,
    lo: Option<Box<Expr>>,
    hi: Option<Box<Expr>>,
    step: Option<Box<Expr>>,
  },
  /// `super.name`.
  SuperField {
    name: Name,
  },
  /// `super[e]`.
  SuperSubscript {
    idx: Box<Expr>,
  },
  /// `e in super`.
  InSuper {
    lhs: Box<Expr>,
  },
  Call {
    func: Box<Expr>,
    args: Vec<Arg>,
  },
  Function {
    params: Vec<Param>,
    body: Box<Expr>,
  },
  Local {
    binds: Vec<Bind>,
    body: Box<Expr>,
  },
  If {
    cond: Box<Expr>,
    yes: Box<Expr>,
    no: Option<Box<Expr>>,
  },
  Binary {
    op: BinaryOp,
    lhs: Box<Expr>,
    rhs: Box<Expr>,
  },
  Unary {
    op: UnaryOp,
    inner: Box<Expr>,
  },
  Error(Box<Expr>),
  Assert {
    cond: Box<Expr>,
    msg: Option<Box<Expr>>,
    body: Box<Expr>,
  },
  Import {
    kind: ImportKind,
    path: Name,
  },
}

/// A name (identifier text or cooked string) with its span.
#[derive(Debug, Clone)]
pub struct Name {
  pub text: String,
  pub span: Span,
}

/// A `local` binding: `name = e` or `name(params) = e`.
#[derive(Debug)]
pub struct Bind {
  pub name: Name,
  pub params: Option<Vec<Param>>,
  pub val: Expr,
}

/// A function parameter with an optional default.
#[derive(Debug)]
pub struct Param {
  pub name: Name,
  pub default: Option<Expr>,
}

/// A call argument, possibly named.
#[derive(Debug)]
pub struct Arg {
  pub name: Option<Name>,
  pub val: Expr,
}

/// A comprehension clause.
#[derive(Debug)]
pub enum CompSpec {
  /// `for x in e`.
  For { var: Name, seq: Expr },
  /// `if e`.
  If { cond: Expr },
}

/// A member of an object literal.
#[derive(Debug)]
pub enum Member {
  Field(Field),
  Assert(ObjAssert),
  Local(Bind),
}

/// A field: `name: e`, `name+: e`, or a method `name(params): e`.
#[derive(Debug)]
pub struct Field {
  pub name: FieldName,
  /// `f+: v`, merge with the inherited field.
  pub plus: bool,
  pub params: Option<Vec<Param>>,
  pub vis: Visibility,
  pub val: Expr,
}

#[derive(Debug)]
pub enum FieldName {
  Id(Name),
  Str(Name),
  Computed(Expr),
}

impl FieldName {
  /// The literal text, if this is not computed.
  #[must_use]
  pub fn literal(&self) -> Option<&Name> {
    match self {
      FieldName::Id(n) | FieldName::Str(n) => Some(n),
      FieldName::Computed(_) => None,
    }
  }
}

/// An `assert` inside an object.
#[derive(Debug)]
pub struct ObjAssert {
  pub cond: Expr,
  pub msg: Option<Expr>,
}

/// Field visibility: `:`, `::`, or `:::`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
  Default,
  Hidden,
  Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
  /// `import`, the file is Jsonnet code.
  Code,
  /// `importstr`, the file is a string.
  String,
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
  And,
  Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
  Neg,
  Pos,
  LogicalNot,
  BitNot,
}
