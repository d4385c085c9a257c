//! Memoized suspended computations.

use crate::env::Env;
use crate::error::{Error, Result};
use crate::val::{Fn, Val};
use sonnet_core::ExprMust;
use sonnet_source::Span;
use std::cell::RefCell;
use std::rc::Rc;

/// A suspended computation that memoizes its first outcome.
///
/// Exactly-once evaluation is the invariant: repeated forcing yields the cached value or the
/// cached error. Re-entering a thunk that is currently being forced is the infinite-loop error.
#[derive(Debug, Clone)]
pub(crate) struct Thunk {
  pub(crate) state: Rc<RefCell<State>>,
}

#[derive(Debug)]
pub(crate) enum State {
  Delayed(Work),
  Forcing(Span),
  Done(Val),
  Failed(Error),
}

/// What a delayed thunk will do when forced.
#[derive(Debug, Clone)]
pub(crate) enum Work {
  /// Evaluate the expression under the environment.
  Expr(Env, ExprMust),
  /// Apply the function to the arguments. Used by the lazy `std` functions.
  Call { span: Span, func: Fn, args: Vec<Thunk> },
}

impl Thunk {
  pub(crate) fn delayed(env: Env, expr: ExprMust) -> Self {
    Self { state: Rc::new(RefCell::new(State::Delayed(Work::Expr(env, expr)))) }
  }

  pub(crate) fn call(span: Span, func: Fn, args: Vec<Thunk>) -> Self {
    Self { state: Rc::new(RefCell::new(State::Delayed(Work::Call { span, func, args }))) }
  }

  pub(crate) fn done(val: Val) -> Self {
    Self { state: Rc::new(RefCell::new(State::Done(val))) }
  }

  /// a thunk already in the forcing state. used for object fields, whose computation starts as
  /// soon as the thunk exists.
  pub(crate) fn forcing(span: Span) -> Self {
    Self { state: Rc::new(RefCell::new(State::Forcing(span))) }
  }

  pub(crate) fn resolve(&self, res: &Result<Val>) {
    let mut state = self.state.borrow_mut();
    *state = match res {
      Ok(v) => State::Done(v.clone()),
      Err(e) => State::Failed(e.clone()),
    };
  }
}
