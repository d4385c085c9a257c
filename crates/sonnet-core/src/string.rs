//! Interned strings and identifiers.

use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

/// An interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Str(u32);

impl Str {
  const SELF: Self = Self(0);
  const SUPER: Self = Self(1);
  const DOLLAR: Self = Self(2);
  const STD: Self = Self(3);

  fn from_usize(u: usize) -> Self {
    Self(u32::try_from(u).expect("str id overflow"))
  }

  fn to_usize(self) -> usize {
    usize::try_from(self.0).expect("str id overflow")
  }
}

/// An identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(Str);

impl Id {
  /// `self`.
  pub const SELF: Self = Self(Str::SELF);
  /// `super`.
  pub const SUPER: Self = Self(Str::SUPER);
  /// `$`.
  pub const DOLLAR: Self = Self(Str::DOLLAR);
  /// `std`.
  pub const STD: Self = Self(Str::STD);

  /// Returns an id for the string.
  #[must_use]
  pub fn new(s: Str) -> Self {
    Self(s)
  }

  /// Returns the underlying string.
  #[must_use]
  pub fn str(self) -> Str {
    self.0
  }
}

/// A string arena.
///
/// The same contents inserted twice yield the same [`Str`], so equality on `Str` is equality on
/// contents. A handful of strings the evaluator needs to name are pre-interned at fixed ids.
#[derive(Debug)]
pub struct StrArena {
  id_to_contents: Vec<Box<str>>,
  contents_to_id: FxHashMap<Box<str>, Str>,
}

impl Default for StrArena {
  fn default() -> Self {
    let mut ret =
      Self { id_to_contents: Vec::new(), contents_to_id: FxHashMap::default() };
    for s in ["self", "super", "$", "std"] {
      ret.insert(s.into());
    }
    ret
  }
}

impl StrArena {
  /// Inserts the contents, returning its id.
  pub fn insert(&mut self, contents: Box<str>) -> Str {
    match self.contents_to_id.entry(contents) {
      Entry::Occupied(entry) => *entry.get(),
      Entry::Vacant(entry) => {
        let ret = Str::from_usize(self.id_to_contents.len());
        self.id_to_contents.push(entry.key().clone());
        entry.insert(ret);
        ret
      }
    }
  }

  /// Inserts the contents as an id.
  pub fn id(&mut self, contents: Box<str>) -> Id {
    Id(self.insert(contents))
  }

  /// Returns the contents.
  #[must_use]
  pub fn get(&self, s: Str) -> &str {
    &self.id_to_contents[s.to_usize()]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn preset() {
    let ar = StrArena::default();
    assert_eq!(ar.get(Id::SELF.str()), "self");
    assert_eq!(ar.get(Id::SUPER.str()), "super");
    assert_eq!(ar.get(Id::DOLLAR.str()), "$");
    assert_eq!(ar.get(Id::STD.str()), "std");
  }

  #[test]
  fn dedupe() {
    let mut ar = StrArena::default();
    let a = ar.insert("hi".into());
    let b = ar.insert("hi".into());
    assert_eq!(a, b);
    assert_eq!(ar.get(a), "hi");
  }
}
