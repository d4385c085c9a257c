//! The dynamic semantics: executing core expressions to lazy values, and manifesting lazy
//! values to JSON.
//!
//! The two operations are mutually recursive:
//!
//! - Values are lazy, so they contain unexecuted core expressions, which manifestation forces.
//! - Execution may need to manifest a value, e.g. to coerce it to a string.
//!
//! Evaluation is call-by-need: every suspended computation is a thunk that caches its first
//! outcome. It is single-threaded, synchronous, and deterministic; evaluation order is
//! depth-first and left-to-right.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]

pub mod error;

mod env;
mod exec;
mod manifest;
mod object;
mod std_lib;
mod thunk;
mod val;

use rustc_hash::FxHashMap;
use sonnet_core::{Arenas, ExprMust};
use sonnet_source::FileId;
use std::rc::Rc;

pub use manifest::Json;

/// A native function injected by the host: manifested arguments in, a JSON value or an error
/// message out.
pub type HostFn = dyn Fn(&[Json]) -> Result<Json, String>;

/// Host-injected native functions, bound at the root environment alongside `std`.
///
/// These let a host observe evaluation from outside the language, e.g. counting how many times
/// a thunk is forced.
#[derive(Default)]
pub struct HostFns {
  fns: FxHashMap<Box<str>, Rc<HostFn>>,
}

impl HostFns {
  /// Registers a function under a name.
  pub fn insert<F>(&mut self, name: &str, f: F)
  where
    F: Fn(&[Json]) -> Result<Json, String> + 'static,
  {
    self.fns.insert(name.into(), Rc::new(f));
  }

  pub(crate) fn get(&self, name: &str) -> Option<&Rc<HostFn>> {
    self.fns.get(name)
  }
}

impl std::fmt::Debug for HostFns {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("HostFns").field("names", &self.fns.keys().collect::<Vec<_>>()).finish()
  }
}

/// The evaluation-relevant artifacts of one loaded file.
#[derive(Debug)]
pub struct FileArt {
  /// The arenas.
  pub arenas: Arenas,
  /// The top-level expression.
  pub top: ExprMust,
  /// Resolution of each `import`/`importstr` node in this file.
  pub imports: FxHashMap<ExprMust, FileId>,
}

/// The immutable context for an evaluation: every loaded file, plus host extensions.
#[derive(Debug, Clone, Copy)]
pub struct Cx<'a> {
  /// Jsonnet files, keyed by id.
  pub files: &'a FxHashMap<FileId, FileArt>,
  /// `importstr` file contents, keyed by id.
  pub str_files: &'a FxHashMap<FileId, String>,
  /// Host-injected native functions.
  pub host_fns: &'a HostFns,
}

/// Knobs for an evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Options {
  /// Evaluation recursion limit. Exceeding it is a runtime error, not a host stack overflow.
  pub max_depth: usize,
}

impl Default for Options {
  fn default() -> Self {
    Self { max_depth: 500 }
  }
}

/// Evaluates the file's top-level expression and manifests the result.
///
/// # Errors
///
/// If evaluation or manifestation failed.
///
/// # Panics
///
/// If the file or one of its transitive imports was not loaded into the context.
pub fn get(cx: Cx<'_>, file: FileId, options: Options) -> error::Result<Json> {
  let mut st = exec::St::new(cx, options);
  let art = cx.files.get(&file).expect("entry file should be loaded");
  let env = env::Env::root(file);
  let val = exec::get(&mut st, &env, art.top)?;
  let span = art.arenas.expr.span(art.top);
  manifest::get(&mut st, span, val)
}
