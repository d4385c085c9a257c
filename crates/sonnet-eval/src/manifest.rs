//! Manifesting values into JSON values.
//!
//! Values are lazy, so manifestation is mutually recursive with execution: every field and
//! element is forced. Asserts run before an object's fields; visible fields come out in
//! key-sorted order; functions cannot be manifested. Re-entering a container currently being
//! manifested is the infinite-manifest error.

use crate::error::{Kind, Result};
use crate::exec::{self, ManifestMark, St};
use crate::val::Val;
use sonnet_core::Float;
use sonnet_source::Span;
use std::collections::BTreeMap;
use std::fmt;

/// A JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Json {
  /// `null`.
  Null,
  /// A boolean.
  Bool(bool),
  /// A finite number.
  Num(Float),
  /// A string.
  Str(Box<str>),
  /// An array.
  Arr(Vec<Json>),
  /// An object, in key-sorted order.
  Obj(BTreeMap<Box<str>, Json>),
}

impl Json {
  /// Returns something that displays this as pretty-printed JSON with two-space indentation.
  #[must_use]
  pub fn display(&self) -> impl fmt::Display + '_ {
    DisplayJson { json: self, indent: Some(0) }
  }

  /// Returns something that displays this as JSON on one line.
  #[must_use]
  pub fn display_compact(&self) -> impl fmt::Display + '_ {
    DisplayJson { json: self, indent: None }
  }

  /// Converts to serde.
  #[must_use]
  pub fn to_serde(&self) -> serde_json::Value {
    match self {
      Json::Null => serde_json::Value::Null,
      Json::Bool(b) => serde_json::Value::Bool(*b),
      Json::Num(n) => {
        let n = serde_json::Number::from_f64(n.value()).expect("number is finite");
        serde_json::Value::Number(n)
      }
      Json::Str(s) => serde_json::Value::String(s.to_string()),
      Json::Arr(xs) => serde_json::Value::Array(xs.iter().map(Json::to_serde).collect()),
      Json::Obj(map) => {
        let iter = map.iter().map(|(k, v)| (k.to_string(), v.to_serde()));
        serde_json::Value::Object(iter.collect())
      }
    }
  }

  /// Converts from serde.
  ///
  /// # Panics
  ///
  /// If a number is not representable as a finite double, which serde does not produce.
  #[must_use]
  pub fn from_serde(v: &serde_json::Value) -> Self {
    match v {
      serde_json::Value::Null => Json::Null,
      serde_json::Value::Bool(b) => Json::Bool(*b),
      serde_json::Value::Number(n) => {
        let n = n.as_f64().expect("serde number is a double");
        Json::Num(Float::try_from(n).expect("serde number is finite"))
      }
      serde_json::Value::String(s) => Json::Str(s.as_str().into()),
      serde_json::Value::Array(xs) => Json::Arr(xs.iter().map(Json::from_serde).collect()),
      serde_json::Value::Object(map) => {
        let iter = map.iter().map(|(k, v)| (k.as_str().into(), Json::from_serde(v)));
        Json::Obj(iter.collect())
      }
    }
  }
}

struct DisplayJson<'a> {
  json: &'a Json,
  /// `None` for compact output.
  indent: Option<usize>,
}

impl fmt::Display for DisplayJson<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.json {
      Json::Null => f.write_str("null"),
      Json::Bool(b) => b.fmt(f),
      Json::Num(n) => n.fmt(f),
      Json::Str(s) => fmt_str(f, s),
      Json::Arr(xs) => {
        if xs.is_empty() {
          return f.write_str("[]");
        }
        f.write_str("[")?;
        self.seq(f, xs.iter().map(|x| (None, x)))?;
        f.write_str("]")
      }
      Json::Obj(map) => {
        if map.is_empty() {
          return f.write_str("{}");
        }
        f.write_str("{")?;
        self.seq(f, map.iter().map(|(k, v)| (Some(&**k), v)))?;
        f.write_str("}")
      }
    }
  }
}

impl DisplayJson<'_> {
  fn seq<'j, I>(&self, f: &mut fmt::Formatter<'_>, iter: I) -> fmt::Result
  where
    I: Iterator<Item = (Option<&'j str>, &'j Json)>,
  {
    let mut first = true;
    for (key, val) in iter {
      if !first {
        f.write_str(",")?;
      }
      match self.indent {
        None => {
          if !first {
            f.write_str(" ")?;
          }
        }
        Some(level) => {
          f.write_str("\n")?;
          for _ in 0..=level {
            f.write_str("  ")?;
          }
        }
      }
      first = false;
      if let Some(key) = key {
        fmt_str(f, key)?;
        f.write_str(": ")?;
      }
      fmt::Display::fmt(&DisplayJson { json: val, indent: self.indent.map(|l| l + 1) }, f)?;
    }
    if let Some(level) = self.indent {
      f.write_str("\n")?;
      for _ in 0..level {
        f.write_str("  ")?;
      }
    }
    Ok(())
  }
}

fn fmt_str(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
  f.write_str("\"")?;
  for c in s.chars() {
    match c {
      '"' => f.write_str("\\\"")?,
      '\\' => f.write_str("\\\\")?,
      '\n' => f.write_str("\\n")?,
      '\r' => f.write_str("\\r")?,
      '\t' => f.write_str("\\t")?,
      '\u{8}' => f.write_str("\\b")?,
      '\u{c}' => f.write_str("\\f")?,
      c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
      c => write!(f, "{c}")?,
    }
  }
  f.write_str("\"")
}

/// Manifests the value into a JSON value.
pub(crate) fn get(st: &mut St<'_>, span: Span, val: Val) -> Result<Json> {
  match val {
    Val::Null => Ok(Json::Null),
    Val::Bool(b) => Ok(Json::Bool(b)),
    Val::Num(n) => Ok(Json::Num(n)),
    Val::Str(s) => Ok(Json::Str(s.as_ref().into())),
    Val::Fn(_) => Err(st.err(span, Kind::ManifestFunction)),
    Val::Arr(arr) => {
      let mark = ManifestMark::Arr(arr.ptr_id());
      if !st.manifesting.insert(mark) {
        return Err(st.err(span, Kind::InfiniteManifest));
      }
      let mut ret = Vec::<Json>::with_capacity(arr.len());
      let mut res = Ok(());
      for t in arr.iter() {
        let t = t.clone();
        match exec::force(st, &t).and_then(|v| get(st, span, v)) {
          Ok(j) => ret.push(j),
          Err(e) => {
            res = Err(e);
            break;
          }
        }
      }
      st.manifesting.remove(&mark);
      res.map(|()| Json::Arr(ret))
    }
    Val::Obj(obj) => {
      let mark = ManifestMark::Obj(obj.uid());
      if !st.manifesting.insert(mark) {
        return Err(st.err(span, Kind::InfiniteManifest));
      }
      let res: Result<Json> = (|| {
        exec::run_asserts(st, span, &obj)?;
        let mut map = BTreeMap::<Box<str>, Json>::new();
        for name in obj.visible_field_names() {
          let v = exec::obj_field(st, span, &obj, 0, &name)?;
          let j = get(st, span, v)?;
          map.insert(name.as_ref().into(), j);
        }
        Ok(Json::Obj(map))
      })();
      st.manifesting.remove(&mark);
      res
    }
  }
}
