//! Lazy objects: chains of mixin layers.
//!
//! `+` never materializes a merged field table; it stacks the right operand's layers on top of
//! the left's and lookup walks the chain. A field forced through the object receives the
//! outermost object as `self` and the chain below its defining layer as `super`.

use crate::env::Env;
use crate::std_lib::StdFn;
use crate::thunk::Thunk;
use rustc_hash::FxHashMap;
use sonnet_core::{ExprMust, Visibility};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// A lazy object.
///
/// Cloning shares the layers, the per-field thunk cache, and the asserts-checked flag, so a
/// field forced through any clone is forced once.
#[derive(Debug, Clone)]
pub(crate) struct Object {
  /// index 0 is the outermost (most derived) layer.
  layers: Rc<Vec<Layer>>,
  /// identity of this object value, for assert re-entry and manifest cycle detection.
  uid: u64,
  field_cache: Rc<RefCell<FxHashMap<Rc<str>, Thunk>>>,
  asserts_ok: Rc<Cell<bool>>,
}

/// One mixin layer.
#[derive(Debug, Clone)]
pub(crate) enum Layer {
  /// The standard library. All fields hidden.
  Std,
  /// A layer from an object literal or comprehension.
  Expr(Rc<ExprLayer>),
  /// A layer of already-computed values, e.g. from `std.mergePatch`. All fields visible.
  Flat(Rc<BTreeMap<Rc<str>, Thunk>>),
}

#[derive(Debug)]
pub(crate) struct ExprLayer {
  /// the environment the object literal was constructed under; asserts run under it.
  pub(crate) env: Env,
  pub(crate) asserts: Vec<ExprMust>,
  pub(crate) fields: BTreeMap<Rc<str>, LayerField>,
}

#[derive(Debug, Clone)]
pub(crate) struct LayerField {
  pub(crate) vis: Visibility,
  pub(crate) plus: bool,
  /// the environment the field value is forced under (before `self`/`super` are pushed). for
  /// comprehension fields this holds the comprehension bindings.
  pub(crate) env: Env,
  pub(crate) expr: ExprMust,
}

/// A field found on an object.
#[derive(Debug)]
pub(crate) enum FieldHit {
  Std(StdFn),
  Flat(Thunk),
  Expr(LayerField),
}

impl Object {
  fn with_layers(uid: u64, layers: Vec<Layer>) -> Self {
    Self {
      layers: Rc::new(layers),
      uid,
      field_cache: Rc::new(RefCell::new(FxHashMap::default())),
      asserts_ok: Rc::new(Cell::new(false)),
    }
  }

  pub(crate) fn new_expr(uid: u64, layer: ExprLayer) -> Self {
    Self::with_layers(uid, vec![Layer::Expr(Rc::new(layer))])
  }

  pub(crate) fn new_flat(uid: u64, fields: BTreeMap<Rc<str>, Thunk>) -> Self {
    Self::with_layers(uid, vec![Layer::Flat(Rc::new(fields))])
  }

  pub(crate) fn std(uid: u64) -> Self {
    Self::with_layers(uid, vec![Layer::Std])
  }

  /// `below + above`: the result has `above`'s layers overriding `below`'s, and each of
  /// `above`'s fields sees `below` through `super`.
  pub(crate) fn merge(below: &Self, above: &Self, uid: u64) -> Self {
    let mut layers = Vec::with_capacity(above.layers.len() + below.layers.len());
    layers.extend(above.layers.iter().cloned());
    layers.extend(below.layers.iter().cloned());
    Self::with_layers(uid, layers)
  }

  pub(crate) fn uid(&self) -> u64 {
    self.uid
  }

  pub(crate) fn layers(&self) -> &[Layer] {
    &self.layers
  }

  /// finds a field, looking only at layers `start..`. returns the index of the layer the field
  /// was found in.
  pub(crate) fn get_field_from(&self, start: usize, name: &str) -> Option<(usize, FieldHit)> {
    for (idx, layer) in self.layers.iter().enumerate().skip(start) {
      match layer {
        Layer::Std => {
          if let Some(f) = StdFn::from_name(name) {
            return Some((idx, FieldHit::Std(f)));
          }
        }
        Layer::Expr(l) => {
          if let Some(f) = l.fields.get(name) {
            return Some((idx, FieldHit::Expr(f.clone())));
          }
        }
        Layer::Flat(map) => {
          if let Some(t) = map.get(name) {
            return Some((idx, FieldHit::Flat(t.clone())));
          }
        }
      }
    }
    None
  }

  pub(crate) fn has_field_from(&self, start: usize, name: &str) -> bool {
    self.get_field_from(start, name).is_some()
  }

  /// the names of all fields whose effective visibility is not hidden, sorted.
  ///
  /// a `:` field inherits the hiddenness of the field it overrides; `::` and `:::` win over
  /// anything below them.
  pub(crate) fn visible_field_names(&self) -> Vec<Rc<str>> {
    let mut eff = BTreeMap::<Rc<str>, Visibility>::new();
    for layer in self.layers.iter() {
      match layer {
        Layer::Std => {}
        Layer::Expr(l) => {
          for (name, f) in &l.fields {
            match eff.entry(name.clone()) {
              std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(f.vis);
              }
              std::collections::btree_map::Entry::Occupied(mut e) => {
                let vis = e.get_mut();
                if *vis == Visibility::Default && f.vis != Visibility::Default {
                  *vis = f.vis;
                }
              }
            }
          }
        }
        Layer::Flat(map) => {
          for name in map.keys() {
            eff.entry(name.clone()).or_insert(Visibility::Default);
          }
        }
      }
    }
    eff
      .into_iter()
      .filter_map(|(name, vis)| (vis != Visibility::Hidden).then_some(name))
      .collect()
  }

  /// the names of all fields, hidden included, sorted.
  pub(crate) fn all_field_names(&self) -> Vec<Rc<str>> {
    let mut ret = BTreeMap::<Rc<str>, ()>::new();
    for layer in self.layers.iter() {
      match layer {
        Layer::Std => {
          for &(name, _) in StdFn::ALL {
            ret.entry(Rc::from(name)).or_insert(());
          }
        }
        Layer::Expr(l) => {
          for name in l.fields.keys() {
            ret.entry(name.clone()).or_insert(());
          }
        }
        Layer::Flat(map) => {
          for name in map.keys() {
            ret.entry(name.clone()).or_insert(());
          }
        }
      }
    }
    ret.into_keys().collect()
  }

  pub(crate) fn cached_field(&self, name: &str) -> Option<Thunk> {
    self.field_cache.borrow().get(name).cloned()
  }

  pub(crate) fn cache_field(&self, name: Rc<str>, thunk: Thunk) {
    self.field_cache.borrow_mut().insert(name, thunk);
  }

  pub(crate) fn asserts_ok(&self) -> bool {
    self.asserts_ok.get()
  }

  pub(crate) fn set_asserts_ok(&self) {
    self.asserts_ok.set(true);
  }
}
