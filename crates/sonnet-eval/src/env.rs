//! Environments: immutable lexical mappings from identifiers to thunks.

use crate::object::Object;
use crate::thunk::Thunk;
use rustc_hash::FxHashMap;
use sonnet_core::{ExprMust, Id};
use sonnet_source::FileId;
use std::cell::RefCell;
use std::rc::Rc;

/// An environment.
///
/// A chain of immutable nodes. Extension makes a new node pointing at the old chain, so
/// environments captured by closures and thunks are never disturbed. Recursive binding groups
/// tie the knot: their thunks close over the very environment node that contains them, which is
/// filled in (via interior mutability) immediately after it is created and never again.
#[derive(Debug, Clone)]
pub(crate) struct Env(Rc<EnvData>);

#[derive(Debug)]
struct EnvData {
  prev: Option<Env>,
  /// the file whose arenas the ids and exprs around here refer to.
  file: FileId,
  kind: EnvKind,
}

#[derive(Debug)]
enum EnvKind {
  Root,
  /// a recursive binding group.
  Binds(RefCell<FxHashMap<Id, Thunk>>),
  /// a single binding, as bound by a comprehension clause.
  Single(Id, Thunk),
  /// what `self` and `super` mean here. `super_skip` is the number of object layers below the
  /// outermost that are above the layer defining the field being forced.
  This { this: Object, super_skip: usize },
  /// what `$` means here.
  Dollar(Object),
}

impl Env {
  pub(crate) fn root(file: FileId) -> Self {
    Self(Rc::new(EnvData { prev: None, file, kind: EnvKind::Root }))
  }

  fn extend(&self, kind: EnvKind) -> Self {
    Self(Rc::new(EnvData { prev: Some(self.clone()), file: self.0.file, kind }))
  }

  pub(crate) fn file(&self) -> FileId {
    self.0.file
  }

  /// extends with a recursive binding group: every bind's thunk closes over the returned env, so
  /// the binds see each other and themselves.
  pub(crate) fn bind_group(&self, binds: &[(Id, ExprMust)]) -> Self {
    if binds.is_empty() {
      return self.clone();
    }
    let ret = self.extend(EnvKind::Binds(RefCell::new(FxHashMap::default())));
    for &(id, expr) in binds {
      let thunk = Thunk::delayed(ret.clone(), expr);
      ret.push_bind(id, thunk);
    }
    ret
  }

  /// an empty binding group, to be filled with [`Env::push_bind`]. used for function calls.
  pub(crate) fn empty_binds(&self) -> Self {
    self.extend(EnvKind::Binds(RefCell::new(FxHashMap::default())))
  }

  /// # Panics
  ///
  /// If this env node is not a binding group.
  pub(crate) fn push_bind(&self, id: Id, thunk: Thunk) {
    let EnvKind::Binds(map) = &self.0.kind else { panic!("push_bind on a non-binds env") };
    map.borrow_mut().insert(id, thunk);
  }

  pub(crate) fn bind_single(&self, id: Id, thunk: Thunk) -> Self {
    self.extend(EnvKind::Single(id, thunk))
  }

  pub(crate) fn with_this(&self, this: Object, super_skip: usize) -> Self {
    self.extend(EnvKind::This { this, super_skip })
  }

  pub(crate) fn with_dollar(&self, obj: Object) -> Self {
    self.extend(EnvKind::Dollar(obj))
  }

  /// looks up a regular identifier. `self`, `super`, and `$` are not regular identifiers.
  pub(crate) fn get(&self, id: Id) -> Option<Thunk> {
    let mut cur = Some(self);
    while let Some(env) = cur {
      match &env.0.kind {
        EnvKind::Binds(map) => {
          if let Some(thunk) = map.borrow().get(&id) {
            return Some(thunk.clone());
          }
        }
        EnvKind::Single(other, thunk) => {
          if *other == id {
            return Some(thunk.clone());
          }
        }
        EnvKind::Root | EnvKind::This { .. } | EnvKind::Dollar(_) => {}
      }
      cur = env.0.prev.as_ref();
    }
    None
  }

  /// what `self` refers to here, with its `super` skip depth.
  pub(crate) fn this(&self) -> Option<(Object, usize)> {
    let mut cur = Some(self);
    while let Some(env) = cur {
      if let EnvKind::This { this, super_skip } = &env.0.kind {
        return Some((this.clone(), *super_skip));
      }
      cur = env.0.prev.as_ref();
    }
    None
  }

  /// what `$` refers to here.
  pub(crate) fn dollar(&self) -> Option<Object> {
    let mut cur = Some(self);
    while let Some(env) = cur {
      if let EnvKind::Dollar(obj) = &env.0.kind {
        return Some(obj.clone());
      }
      cur = env.0.prev.as_ref();
    }
    None
  }
}
