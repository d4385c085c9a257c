//! The standard library subset, implemented natively.
//!
//! `std` is an object whose fields are all hidden; each resolves to one of these functions.

use crate::error::{Kind, Result};
use crate::exec::{self, St};
use crate::manifest::{self, Json};
use crate::object::Object;
use crate::thunk::Thunk;
use crate::val::{Array, Fn, Val};
use sonnet_core::Float;
use sonnet_source::Span;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A standard library function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub(crate) enum StdFn {
  Abs,
  AssertEqual,
  Char,
  Codepoint,
  Equals,
  Filter,
  Foldl,
  Foldr,
  Join,
  Length,
  MakeArray,
  ManifestJson,
  Map,
  Max,
  MergePatch,
  Min,
  ObjectFields,
  ObjectFieldsAll,
  ObjectHas,
  ObjectHasAll,
  Range,
  ToString,
  Type,
}

impl StdFn {
  pub(crate) const ALL: &'static [(&'static str, StdFn)] = &[
    ("abs", StdFn::Abs),
    ("assertEqual", StdFn::AssertEqual),
    ("char", StdFn::Char),
    ("codepoint", StdFn::Codepoint),
    ("equals", StdFn::Equals),
    ("filter", StdFn::Filter),
    ("foldl", StdFn::Foldl),
    ("foldr", StdFn::Foldr),
    ("join", StdFn::Join),
    ("length", StdFn::Length),
    ("makeArray", StdFn::MakeArray),
    ("manifestJson", StdFn::ManifestJson),
    ("map", StdFn::Map),
    ("max", StdFn::Max),
    ("mergePatch", StdFn::MergePatch),
    ("min", StdFn::Min),
    ("objectFields", StdFn::ObjectFields),
    ("objectFieldsAll", StdFn::ObjectFieldsAll),
    ("objectHas", StdFn::ObjectHas),
    ("objectHasAll", StdFn::ObjectHasAll),
    ("range", StdFn::Range),
    ("toString", StdFn::ToString),
    ("type", StdFn::Type),
  ];

  pub(crate) fn from_name(name: &str) -> Option<Self> {
    Self::ALL.iter().find_map(|&(n, f)| (n == name).then_some(f))
  }

  pub(crate) fn params(self) -> &'static [&'static str] {
    match self {
      StdFn::Length | StdFn::ManifestJson | StdFn::ToString | StdFn::Type => &["x"],
      StdFn::Abs | StdFn::Char => &["n"],
      StdFn::Codepoint => &["str"],
      StdFn::MakeArray => &["sz", "func"],
      StdFn::Filter | StdFn::Map => &["func", "arr"],
      StdFn::Foldl | StdFn::Foldr => &["func", "arr", "init"],
      StdFn::Range => &["from", "to"],
      StdFn::Join => &["sep", "arr"],
      StdFn::Max | StdFn::Min => &["a", "b"],
      StdFn::Equals | StdFn::AssertEqual => &["a", "b"],
      StdFn::ObjectHas | StdFn::ObjectHasAll => &["o", "f"],
      StdFn::ObjectFields | StdFn::ObjectFieldsAll => &["o"],
      StdFn::MergePatch => &["target", "patch"],
    }
  }

  pub(crate) fn required_params_count(self) -> usize {
    self.params().len()
  }
}

/// Calls the function with arguments already arranged in parameter order.
#[allow(clippy::too_many_lines)]
pub(crate) fn call(st: &mut St<'_>, span: Span, f: StdFn, args: Vec<Thunk>) -> Result<Val> {
  match f {
    StdFn::Length => {
      let x = force_arg(st, &args, 0)?;
      let len = match &x {
        Val::Str(s) => s.chars().count(),
        Val::Arr(arr) => arr.len(),
        Val::Obj(obj) => obj.visible_field_names().len(),
        Val::Fn(Fn::Regular(f)) => f.params.iter().filter(|(_, d)| d.is_none()).count(),
        Val::Fn(Fn::Std(f)) => f.required_params_count(),
        other => {
          return Err(st.err(span, exec::incompatible("a string, array, or object", other)))
        }
      };
      Ok(Val::Num(Float::from_usize(len)))
    }
    StdFn::Type => {
      let x = force_arg(st, &args, 0)?;
      Ok(Val::Str(Rc::from(x.type_name())))
    }
    StdFn::MakeArray => {
      let sz = nat_arg(st, span, &args, 0)?;
      let func = fn_arg(st, span, &args, 1)?;
      let thunks = (0..sz)
        .map(|i| {
          let arg = Thunk::done(Val::Num(Float::from_usize(i)));
          Thunk::call(span, func.clone(), vec![arg])
        })
        .collect();
      Ok(Val::Arr(Array::new(thunks)))
    }
    StdFn::Filter => {
      let func = fn_arg(st, span, &args, 0)?;
      let arr = arr_arg(st, span, &args, 1)?;
      let mut kept = Vec::<Thunk>::new();
      for t in arr.iter() {
        let keep = exec::call_value(st, span, &func, vec![t.clone()], Vec::new())?;
        if exec::bool_of(st, span, keep)? {
          kept.push(t.clone());
        }
      }
      Ok(Val::Arr(Array::new(kept)))
    }
    StdFn::Map => {
      let func = fn_arg(st, span, &args, 0)?;
      let arr = arr_arg(st, span, &args, 1)?;
      let thunks =
        arr.iter().map(|t| Thunk::call(span, func.clone(), vec![t.clone()])).collect();
      Ok(Val::Arr(Array::new(thunks)))
    }
    StdFn::Foldl => {
      let func = fn_arg(st, span, &args, 0)?;
      let arr = arr_arg(st, span, &args, 1)?;
      let mut acc = force_arg(st, &args, 2)?;
      for t in arr.iter() {
        let call_args = vec![Thunk::done(acc), t.clone()];
        acc = exec::call_value(st, span, &func, call_args, Vec::new())?;
      }
      Ok(acc)
    }
    StdFn::Foldr => {
      let func = fn_arg(st, span, &args, 0)?;
      let arr = arr_arg(st, span, &args, 1)?;
      let mut acc = force_arg(st, &args, 2)?;
      for t in arr.iter().rev() {
        let call_args = vec![t.clone(), Thunk::done(acc)];
        acc = exec::call_value(st, span, &func, call_args, Vec::new())?;
      }
      Ok(acc)
    }
    StdFn::Range => {
      let lo = int_arg(st, span, &args, 0)?;
      let hi = int_arg(st, span, &args, 1)?;
      let mut thunks = Vec::<Thunk>::new();
      let mut i = lo;
      while i <= hi {
        thunks.push(Thunk::done(exec::num(st, span, int_to_f64(i))?));
        i += 1;
      }
      Ok(Val::Arr(Array::new(thunks)))
    }
    StdFn::Join => {
      let sep = force_arg(st, &args, 0)?;
      let arr = arr_arg(st, span, &args, 1)?;
      match sep {
        Val::Str(sep) => {
          let mut ret = String::new();
          let mut first = true;
          for t in arr.iter() {
            let t = t.clone();
            match exec::force(st, &t)? {
              Val::Null => {}
              Val::Str(elem) => {
                if !first {
                  ret.push_str(&sep);
                }
                first = false;
                ret.push_str(&elem);
              }
              other => return Err(st.err(span, exec::incompatible("a string", &other))),
            }
          }
          Ok(Val::Str(Rc::from(ret.as_str())))
        }
        Val::Arr(sep) => {
          let mut ret = Array::default();
          let mut first = true;
          for t in arr.iter() {
            let t = t.clone();
            match exec::force(st, &t)? {
              Val::Null => {}
              Val::Arr(elem) => {
                if !first {
                  ret = Array::concat(&ret, &sep);
                }
                first = false;
                ret = Array::concat(&ret, &elem);
              }
              other => return Err(st.err(span, exec::incompatible("an array", &other))),
            }
          }
          Ok(Val::Arr(ret))
        }
        other => Err(st.err(span, exec::incompatible("a string or array", &other))),
      }
    }
    StdFn::Abs => {
      let n = num_arg(st, span, &args, 0)?;
      exec::num(st, span, n.abs())
    }
    StdFn::Max => {
      let a = num_arg(st, span, &args, 0)?;
      let b = num_arg(st, span, &args, 1)?;
      exec::num(st, span, a.max(b))
    }
    StdFn::Min => {
      let a = num_arg(st, span, &args, 0)?;
      let b = num_arg(st, span, &args, 1)?;
      exec::num(st, span, a.min(b))
    }
    StdFn::Char => {
      let n = nat_arg(st, span, &args, 0)?;
      let c = u32::try_from(n)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| st.err(span, Kind::IncompatibleTypes {
          want: "a unicode codepoint",
          got: "number",
        }))?;
      Ok(Val::Str(Rc::from(c.to_string().as_str())))
    }
    StdFn::Codepoint => {
      let s = str_arg(st, span, &args, 0)?;
      let mut chars = s.chars();
      match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Val::Num(Float::from_usize(c as usize))),
        _ => Err(st.err(span, Kind::IncompatibleTypes {
          want: "a single-character string",
          got: "string",
        })),
      }
    }
    StdFn::ToString => {
      let x = force_arg(st, &args, 0)?;
      let s = exec::str_conv(st, span, x)?;
      Ok(Val::Str(s))
    }
    StdFn::Equals => {
      let a = force_arg(st, &args, 0)?;
      let b = force_arg(st, &args, 1)?;
      Ok(Val::Bool(exec::eq_val(st, span, &a, &b)?))
    }
    StdFn::AssertEqual => {
      let a = force_arg(st, &args, 0)?;
      let b = force_arg(st, &args, 1)?;
      if exec::eq_val(st, span, &a, &b)? {
        Ok(Val::Bool(true))
      } else {
        let a = manifest::get(st, span, a)?;
        let b = manifest::get(st, span, b)?;
        let msg = format!("{} != {}", a.display_compact(), b.display_compact());
        Err(st.err(span, Kind::AssertFailed(Some(Rc::from(msg.as_str())))))
      }
    }
    StdFn::ObjectHas => {
      let obj = obj_arg(st, span, &args, 0)?;
      let name = str_arg(st, span, &args, 1)?;
      let has = obj.visible_field_names().iter().any(|n| n.as_ref() == name.as_ref());
      Ok(Val::Bool(has))
    }
    StdFn::ObjectHasAll => {
      let obj = obj_arg(st, span, &args, 0)?;
      let name = str_arg(st, span, &args, 1)?;
      Ok(Val::Bool(obj.has_field_from(0, &name)))
    }
    StdFn::ObjectFields => {
      let obj = obj_arg(st, span, &args, 0)?;
      let thunks = obj
        .visible_field_names()
        .into_iter()
        .map(|n| Thunk::done(Val::Str(n)))
        .collect();
      Ok(Val::Arr(Array::new(thunks)))
    }
    StdFn::ObjectFieldsAll => {
      let obj = obj_arg(st, span, &args, 0)?;
      let thunks =
        obj.all_field_names().into_iter().map(|n| Thunk::done(Val::Str(n))).collect();
      Ok(Val::Arr(Array::new(thunks)))
    }
    StdFn::MergePatch => {
      let target = force_arg(st, &args, 0)?;
      let patch = force_arg(st, &args, 1)?;
      let target = manifest::get(st, span, target)?;
      let patch = manifest::get(st, span, patch)?;
      let merged = merge_patch(target, patch);
      Ok(json_to_val(st, merged))
    }
    StdFn::ManifestJson => {
      let x = force_arg(st, &args, 0)?;
      let json = manifest::get(st, span, x)?;
      let s = json.display().to_string();
      Ok(Val::Str(Rc::from(s.as_str())))
    }
  }
}

/// JSON merge patch: objects merge recursively, `null` in the patch removes, anything else
/// replaces.
fn merge_patch(target: Json, patch: Json) -> Json {
  match patch {
    Json::Obj(patch) => {
      let mut base = match target {
        Json::Obj(map) => map,
        _ => BTreeMap::new(),
      };
      for (key, val) in patch {
        match val {
          Json::Null => {
            base.remove(&key);
          }
          val => {
            let old = base.remove(&key).unwrap_or(Json::Null);
            base.insert(key, merge_patch(old, val));
          }
        }
      }
      Json::Obj(base)
    }
    patch => patch,
  }
}

pub(crate) fn json_to_val(st: &mut St<'_>, json: Json) -> Val {
  match json {
    Json::Null => Val::Null,
    Json::Bool(b) => Val::Bool(b),
    Json::Num(n) => Val::Num(n),
    Json::Str(s) => Val::Str(Rc::from(s.as_ref())),
    Json::Arr(xs) => {
      let thunks = xs.into_iter().map(|j| Thunk::done(json_to_val(st, j))).collect();
      Val::Arr(Array::new(thunks))
    }
    Json::Obj(map) => {
      let fields: BTreeMap<Rc<str>, Thunk> = map
        .into_iter()
        .map(|(k, v)| (Rc::from(k.as_ref()), Thunk::done(json_to_val(st, v))))
        .collect();
      let uid = st.next_uid();
      Val::Obj(Object::new_flat(uid, fields))
    }
  }
}

fn force_arg(st: &mut St<'_>, args: &[Thunk], i: usize) -> Result<Val> {
  exec::force(st, &args[i])
}

fn num_arg(st: &mut St<'_>, span: Span, args: &[Thunk], i: usize) -> Result<f64> {
  match force_arg(st, args, i)? {
    Val::Num(n) => Ok(n.value()),
    other => Err(st.err(span, exec::incompatible("a number", &other))),
  }
}

fn int_arg(st: &mut St<'_>, span: Span, args: &[Thunk], i: usize) -> Result<i64> {
  let n = num_arg(st, span, args, i)?;
  if n.fract() != 0.0 {
    return Err(st.err(span, Kind::ArrayIdxNotInteger));
  }
  #[allow(clippy::cast_possible_truncation)]
  Ok(n as i64)
}

fn nat_arg(st: &mut St<'_>, span: Span, args: &[Thunk], i: usize) -> Result<usize> {
  let n = int_arg(st, span, args, i)?;
  usize::try_from(n).map_err(|_| st.err(span, Kind::ArrayIdxOutOfRange))
}

fn str_arg(st: &mut St<'_>, span: Span, args: &[Thunk], i: usize) -> Result<Rc<str>> {
  match force_arg(st, args, i)? {
    Val::Str(s) => Ok(s),
    other => Err(st.err(span, exec::incompatible("a string", &other))),
  }
}

fn arr_arg(st: &mut St<'_>, span: Span, args: &[Thunk], i: usize) -> Result<Array> {
  match force_arg(st, args, i)? {
    Val::Arr(arr) => Ok(arr),
    other => Err(st.err(span, exec::incompatible("an array", &other))),
  }
}

fn obj_arg(st: &mut St<'_>, span: Span, args: &[Thunk], i: usize) -> Result<Object> {
  match force_arg(st, args, i)? {
    Val::Obj(obj) => Ok(obj),
    other => Err(st.err(span, exec::incompatible("an object", &other))),
  }
}

fn fn_arg(st: &mut St<'_>, span: Span, args: &[Thunk], i: usize) -> Result<Fn> {
  match force_arg(st, args, i)? {
    Val::Fn(f) => Ok(f),
    other => Err(st.err(span, exec::incompatible("a function", &other))),
  }
}

#[allow(clippy::cast_precision_loss)]
fn int_to_f64(n: i64) -> f64 {
  n as f64
}
