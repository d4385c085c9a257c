//! Jsonnet values.
//!
//! Values are lazy: arrays hold thunks, objects hold field tables whose values are forced on
//! demand. Weak-head evaluation only reveals the tag.

use crate::env::Env;
use crate::object::Object;
use crate::std_lib::StdFn;
use crate::thunk::Thunk;
use sonnet_core::{ExprMust, Float, Id};
use std::rc::Rc;

/// A Jsonnet value.
#[derive(Debug, Clone)]
pub(crate) enum Val {
  Null,
  Bool(bool),
  Num(Float),
  Str(Rc<str>),
  Arr(Array),
  Obj(Object),
  Fn(Fn),
}

impl Val {
  /// the name shown in diagnostics and returned by `std.type`.
  pub(crate) fn type_name(&self) -> &'static str {
    match self {
      Val::Null => "null",
      Val::Bool(_) => "boolean",
      Val::Num(_) => "number",
      Val::Str(_) => "string",
      Val::Arr(_) => "array",
      Val::Obj(_) => "object",
      Val::Fn(_) => "function",
    }
  }
}

/// A lazy array: a shared vector of thunks.
///
/// Concatenation copies the thunk handles, not the computations, so elements forced through one
/// array are forced for all arrays sharing them.
#[derive(Debug, Clone, Default)]
pub(crate) struct Array(Rc<Vec<Thunk>>);

impl Array {
  pub(crate) fn new(elems: Vec<Thunk>) -> Self {
    Self(Rc::new(elems))
  }

  pub(crate) fn get(&self, idx: usize) -> Option<&Thunk> {
    self.0.get(idx)
  }

  pub(crate) fn len(&self) -> usize {
    self.0.len()
  }

  pub(crate) fn iter(&self) -> std::slice::Iter<'_, Thunk> {
    self.0.iter()
  }

  pub(crate) fn concat(lhs: &Self, rhs: &Self) -> Self {
    let mut elems = Vec::with_capacity(lhs.len() + rhs.len());
    elems.extend(lhs.iter().cloned());
    elems.extend(rhs.iter().cloned());
    Self::new(elems)
  }

  /// an address identifying the shared storage, for cycle detection.
  pub(crate) fn ptr_id(&self) -> usize {
    Rc::as_ptr(&self.0) as usize
  }
}

/// A function.
#[derive(Debug, Clone)]
pub(crate) enum Fn {
  /// A regular user-written function.
  Regular(RegularFn),
  /// A standard library function.
  Std(StdFn),
  /// A host-injected native function, looked up by name at call time.
  Host(Rc<str>),
}

/// A closure: captured environment, parameters with optional defaults, body.
#[derive(Debug, Clone)]
pub(crate) struct RegularFn {
  pub(crate) env: Env,
  pub(crate) params: Rc<Vec<(Id, Option<ExprMust>)>>,
  pub(crate) body: ExprMust,
}
