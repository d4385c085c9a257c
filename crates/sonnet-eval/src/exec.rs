//! Executing core expressions to produce values.

use crate::env::Env;
use crate::error::{Error, Kind, Result};
use crate::manifest;
use crate::object::{ExprLayer, FieldHit, Layer, LayerField, Object};
use crate::std_lib::{self, StdFn};
use crate::thunk::{State, Thunk, Work};
use crate::val::{Array, Fn, RegularFn, Val};
use crate::{Cx, Options};
use rustc_hash::{FxHashMap, FxHashSet};
use sonnet_core::{
  Arenas, BinaryOp, CompSpec, ExprData, ExprMust, Float, Id, ImportKind, Prim, UnaryOp,
};
use sonnet_source::{FileId, Span};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::rc::Rc;

/// The mutable evaluation state: caches, cycle guards, and the stack trace.
#[derive(Debug)]
pub(crate) struct St<'a> {
  cx: Cx<'a>,
  max_depth: usize,
  depth: usize,
  next_uid: u64,
  checking_asserts: FxHashSet<u64>,
  import_cache: FxHashMap<FileId, Thunk>,
  pub(crate) manifesting: FxHashSet<ManifestMark>,
  trace: Vec<Span>,
}

/// Identity of a container currently being manifested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ManifestMark {
  Obj(u64),
  Arr(usize),
}

impl<'a> St<'a> {
  pub(crate) fn new(cx: Cx<'a>, options: Options) -> Self {
    Self {
      cx,
      max_depth: options.max_depth,
      depth: 0,
      next_uid: 0,
      checking_asserts: FxHashSet::default(),
      import_cache: FxHashMap::default(),
      manifesting: FxHashSet::default(),
      trace: Vec::new(),
    }
  }

  /// # Panics
  ///
  /// If the file was not loaded, which the loader must ensure.
  pub(crate) fn arenas(&self, file: FileId) -> &'a Arenas {
    let files = self.cx.files;
    &files[&file].arenas
  }

  fn art(&self, file: FileId) -> &'a crate::FileArt {
    let files = self.cx.files;
    &files[&file]
  }

  pub(crate) fn err(&self, span: Span, kind: Kind) -> Error {
    Error { span, kind, trace: self.trace.clone() }
  }

  pub(crate) fn next_uid(&mut self) -> u64 {
    self.next_uid += 1;
    self.next_uid
  }
}

/// Evaluates the expression under the environment to a weak-head value.
pub(crate) fn get(st: &mut St<'_>, env: &Env, expr: ExprMust) -> Result<Val> {
  let span = st.arenas(env.file()).expr.span(expr);
  if st.depth >= st.max_depth {
    return Err(st.err(span, Kind::StackOverflow));
  }
  st.depth += 1;
  let ret = get_inner(st, env, expr, span);
  st.depth -= 1;
  ret
}

#[allow(clippy::too_many_lines)]
fn get_inner(st: &mut St<'_>, env: &Env, expr: ExprMust, span: Span) -> Result<Val> {
  let ars = st.arenas(env.file());
  match &ars.expr[expr] {
    ExprData::Prim(p) => Ok(prim_val(ars, p)),
    ExprData::Object { asserts, fields } => {
      let mut field_map = BTreeMap::<Rc<str>, LayerField>::new();
      for f in fields {
        match get(st, env, f.key)? {
          Val::Null => {}
          Val::Str(name) => {
            let lf = LayerField { vis: f.vis, plus: f.plus, env: env.clone(), expr: f.val };
            if field_map.insert(name.clone(), lf).is_some() {
              return Err(st.err(span, Kind::DuplicateField(name)));
            }
          }
          other => {
            let key_span = ars.expr.span(f.key);
            return Err(st.err(key_span, incompatible("a string field name", &other)));
          }
        }
      }
      let layer =
        ExprLayer { env: env.clone(), asserts: asserts.clone(), fields: field_map };
      let uid = st.next_uid();
      Ok(Val::Obj(Object::new_expr(uid, layer)))
    }
    ExprData::ObjectComp { key, val, specs } => {
      let envs = comp_envs(st, env, specs)?;
      let mut field_map = BTreeMap::<Rc<str>, LayerField>::new();
      for env_i in envs {
        match get(st, &env_i, *key)? {
          Val::Null => {}
          Val::Str(name) => {
            let lf = LayerField {
              vis: sonnet_core::Visibility::Default,
              plus: false,
              env: env_i.clone(),
              expr: *val,
            };
            if field_map.insert(name.clone(), lf).is_some() {
              return Err(st.err(span, Kind::DuplicateField(name)));
            }
          }
          other => {
            let key_span = ars.expr.span(*key);
            return Err(st.err(key_span, incompatible("a string field name", &other)));
          }
        }
      }
      let layer = ExprLayer { env: env.clone(), asserts: Vec::new(), fields: field_map };
      let uid = st.next_uid();
      Ok(Val::Obj(Object::new_expr(uid, layer)))
    }
    ExprData::Array(elems) => {
      let thunks = elems.iter().map(|&e| Thunk::delayed(env.clone(), e)).collect();
      Ok(Val::Arr(Array::new(thunks)))
    }
    ExprData::ArrayComp { elem, specs } => {
      let envs = comp_envs(st, env, specs)?;
      let thunks = envs.into_iter().map(|env_i| Thunk::delayed(env_i, *elem)).collect();
      Ok(Val::Arr(Array::new(thunks)))
    }
    ExprData::Subscript { on, idx } => {
      let on_v = get(st, env, *on)?;
      let idx_span = ars.expr.span(*idx);
      match on_v {
        Val::Obj(obj) => {
          let name = match get(st, env, *idx)? {
            Val::Str(s) => s,
            other => return Err(st.err(idx_span, incompatible("a string", &other))),
          };
          obj_field(st, span, &obj, 0, &name)
        }
        Val::Arr(arr) => {
          let idx_v = get(st, env, *idx)?;
          let i = index_number(st, idx_span, idx_v)?;
          match arr.get(i) {
            Some(t) => {
              let t = t.clone();
              force(st, &t)
            }
            None => Err(st.err(span, Kind::ArrayIdxOutOfRange)),
          }
        }
        Val::Str(s) => {
          let idx_v = get(st, env, *idx)?;
          let i = index_number(st, idx_span, idx_v)?;
          match s.chars().nth(i) {
            Some(c) => Ok(Val::Str(Rc::from(c.to_string().as_str()))),
            None => Err(st.err(span, Kind::StringIdxOutOfRange)),
          }
        }
        other => Err(st.err(span, incompatible("an object, array, or string", &other))),
      }
    }
    ExprData::Slice { on, lo, hi, step } => {
      let on_v = get(st, env, *on)?;
      let lo = slice_bound(st, env, *lo)?.unwrap_or(0);
      let hi = slice_bound(st, env, *hi)?;
      let step = slice_bound(st, env, *step)?.unwrap_or(1);
      if step == 0 {
        return Err(st.err(span, Kind::SliceOutOfDomain));
      }
      match on_v {
        Val::Arr(arr) => {
          let hi = hi.unwrap_or(arr.len()).min(arr.len());
          let mut thunks = Vec::<Thunk>::new();
          let mut i = lo;
          while i < hi {
            thunks.push(arr.get(i).expect("index in range").clone());
            i += step;
          }
          Ok(Val::Arr(Array::new(thunks)))
        }
        Val::Str(s) => {
          let chars: Vec<char> = s.chars().collect();
          let hi = hi.unwrap_or(chars.len()).min(chars.len());
          let mut ret = String::new();
          let mut i = lo;
          while i < hi {
            ret.push(chars[i]);
            i += step;
          }
          Ok(Val::Str(Rc::from(ret.as_str())))
        }
        other => Err(st.err(span, incompatible("an array or string", &other))),
      }
    }
    ExprData::SuperSubscript { idx } => {
      let Some((this, skip)) = env.this() else {
        return Err(st.err(span, Kind::SuperOutsideObject));
      };
      let idx_span = ars.expr.span(*idx);
      let name = match get(st, env, *idx)? {
        Val::Str(s) => s,
        other => return Err(st.err(idx_span, incompatible("a string", &other))),
      };
      obj_field(st, span, &this, skip, &name)
    }
    ExprData::InSuper { lhs } => {
      let Some((this, skip)) = env.this() else {
        return Err(st.err(span, Kind::SuperOutsideObject));
      };
      let lhs_span = ars.expr.span(*lhs);
      let name = match get(st, env, *lhs)? {
        Val::Str(s) => s,
        other => return Err(st.err(lhs_span, incompatible("a string", &other))),
      };
      Ok(Val::Bool(this.has_field_from(skip, &name)))
    }
    ExprData::SelfExpr => match env.this() {
      Some((this, _)) => Ok(Val::Obj(this)),
      None => Err(st.err(span, Kind::SelfOutsideObject)),
    },
    ExprData::Id(id) => {
      if *id == Id::DOLLAR {
        return match env.dollar() {
          Some(obj) => Ok(Val::Obj(obj)),
          None => Err(st.err(span, Kind::DollarOutsideObject)),
        };
      }
      match env.get(*id) {
        Some(t) => force(st, &t),
        None => {
          if *id == Id::STD {
            let uid = st.next_uid();
            Ok(Val::Obj(Object::std(uid)))
          } else {
            let name = ars.str.get(id.str());
            if st.cx.host_fns.get(name).is_some() {
              Ok(Val::Fn(Fn::Host(Rc::from(name))))
            } else {
              Err(st.err(span, Kind::UndefinedVariable(Rc::from(name))))
            }
          }
        }
      }
    }
    ExprData::Call { func, positional, named } => {
      let func_v = get(st, env, *func)?;
      let Val::Fn(func_val) = func_v else {
        return Err(st.err(span, Kind::NotCallable));
      };
      let pos: Vec<Thunk> =
        positional.iter().map(|&a| Thunk::delayed(env.clone(), a)).collect();
      let named_args: Vec<(Rc<str>, Thunk)> = named
        .iter()
        .map(|&(id, a)| {
          (Rc::from(ars.str.get(id.str())), Thunk::delayed(env.clone(), a))
        })
        .collect();
      call_value(st, span, &func_val, pos, named_args)
    }
    ExprData::Local { binds, body } => {
      let env = env.bind_group(binds);
      get(st, &env, *body)
    }
    ExprData::If { cond, yes, no } => {
      let cond_span = ars.expr.span(*cond);
      let cond_v = get(st, env, *cond)?;
      let c = bool_of(st, cond_span, cond_v)?;
      get(st, env, if c { *yes } else { *no })
    }
    ExprData::BinaryOp { lhs, op, rhs } => bin_op(st, env, span, *lhs, *op, *rhs),
    ExprData::UnaryOp { op, inner } => {
      let inner = get(st, env, *inner)?;
      match op {
        UnaryOp::Neg => match inner {
          Val::Num(n) => Ok(Val::Num(-n)),
          other => Err(st.err(span, incompatible("a number", &other))),
        },
        UnaryOp::Pos => match inner {
          Val::Num(_) => Ok(inner),
          other => Err(st.err(span, incompatible("a number", &other))),
        },
        UnaryOp::LogicalNot => match inner {
          Val::Bool(b) => Ok(Val::Bool(!b)),
          other => Err(st.err(span, incompatible("a boolean", &other))),
        },
        UnaryOp::BitNot => match inner {
          Val::Num(n) => {
            let n = !to_i64(n.value());
            num(st, span, int_to_f64(n))
          }
          other => Err(st.err(span, incompatible("a number", &other))),
        },
      }
    }
    ExprData::Function { params, body } => {
      let f =
        RegularFn { env: env.clone(), params: Rc::new(params.clone()), body: *body };
      Ok(Val::Fn(Fn::Regular(f)))
    }
    ExprData::Error(inner) => {
      let v = get(st, env, *inner)?;
      let msg = str_conv(st, span, v)?;
      Err(st.err(span, Kind::User(msg)))
    }
    ExprData::Assert { cond, msg, body } => {
      let cond_span = ars.expr.span(*cond);
      let cond_v = get(st, env, *cond)?;
      if bool_of(st, cond_span, cond_v)? {
        get(st, env, *body)
      } else {
        let msg = match msg {
          Some(m) => {
            let m_v = get(st, env, *m)?;
            Some(str_conv(st, span, m_v)?)
          }
          None => None,
        };
        Err(st.err(span, Kind::AssertFailed(msg)))
      }
    }
    ExprData::Import { kind, path: _ } => {
      let art = st.art(env.file());
      let target =
        *art.imports.get(&expr).expect("imports should be resolved before evaluation");
      match kind {
        ImportKind::Code => {
          let thunk = match st.import_cache.get(&target) {
            Some(t) => t.clone(),
            None => {
              let top = st.art(target).top;
              let t = Thunk::delayed(Env::root(target), top);
              st.import_cache.insert(target, t.clone());
              t
            }
          };
          st.trace.push(span);
          let ret = force(st, &thunk);
          st.trace.pop();
          ret
        }
        ImportKind::String => {
          let files = st.cx.str_files;
          let s = files.get(&target).expect("importstr contents should be loaded");
          Ok(Val::Str(Rc::from(s.as_str())))
        }
      }
    }
  }
}

fn prim_val(ars: &Arenas, p: &Prim) -> Val {
  match p {
    Prim::Null => Val::Null,
    Prim::Bool(b) => Val::Bool(*b),
    Prim::String(s) => Val::Str(Rc::from(ars.str.get(*s))),
    Prim::Number(n) => Val::Num(*n),
  }
}

/// Forces a thunk, memoizing the outcome.
pub(crate) fn force(st: &mut St<'_>, thunk: &Thunk) -> Result<Val> {
  let work = {
    let state = thunk.state.borrow();
    match &*state {
      State::Done(v) => return Ok(v.clone()),
      State::Failed(e) => return Err(e.clone()),
      State::Forcing(span) => {
        let span = *span;
        drop(state);
        return Err(st.err(span, Kind::InfiniteLoop));
      }
      State::Delayed(w) => w.clone(),
    }
  };
  let span = match &work {
    Work::Expr(env, e) => st.arenas(env.file()).expr.span(*e),
    Work::Call { span, .. } => *span,
  };
  *thunk.state.borrow_mut() = State::Forcing(span);
  let res = match work {
    Work::Expr(env, e) => get(st, &env, e),
    Work::Call { span, func, args } => call_value(st, span, &func, args, Vec::new()),
  };
  thunk.resolve(&res);
  res
}

/// Gets a field off an object, looking only at layers `start..`.
///
/// Runs the object's asserts first. Results are cached per object value (only for full lookups,
/// i.e. `start == 0`); re-entering a field currently being forced is the infinite-loop error.
pub(crate) fn obj_field(
  st: &mut St<'_>,
  span: Span,
  obj: &Object,
  start: usize,
  name: &Rc<str>,
) -> Result<Val> {
  run_asserts(st, span, obj)?;
  if start == 0 {
    if let Some(t) = obj.cached_field(name) {
      return force(st, &t);
    }
  }
  let Some((idx, hit)) = obj.get_field_from(start, name) else {
    return Err(st.err(span, Kind::NoSuchField(name.clone())));
  };
  if start == 0 {
    let placeholder = Thunk::forcing(span);
    obj.cache_field(name.clone(), placeholder.clone());
    st.trace.push(span);
    let res = force_hit(st, span, obj, idx, hit, name);
    st.trace.pop();
    placeholder.resolve(&res);
    res
  } else {
    st.trace.push(span);
    let res = force_hit(st, span, obj, idx, hit, name);
    st.trace.pop();
    res
  }
}

fn force_hit(
  st: &mut St<'_>,
  span: Span,
  obj: &Object,
  idx: usize,
  hit: FieldHit,
  name: &Rc<str>,
) -> Result<Val> {
  match hit {
    FieldHit::Std(f) => Ok(Val::Fn(Fn::Std(f))),
    FieldHit::Flat(t) => force(st, &t),
    FieldHit::Expr(f) => {
      if f.plus && obj.has_field_from(idx + 1, name) {
        let below = obj_field(st, span, obj, idx + 1, name)?;
        let env = field_env(&f.env, obj, idx + 1);
        let above = get(st, &env, f.expr)?;
        add_values(st, span, below, above)
      } else {
        let env = field_env(&f.env, obj, idx + 1);
        get(st, &env, f.expr)
      }
    }
  }
}

/// The environment a field value or assert runs under: the captured env, plus `self` bound to
/// the whole object with `super` starting below the defining layer, plus `$` if not yet bound.
fn field_env(base: &Env, obj: &Object, super_skip: usize) -> Env {
  let with_this = base.with_this(obj.clone(), super_skip);
  if with_this.dollar().is_some() {
    with_this
  } else {
    with_this.with_dollar(obj.clone())
  }
}

/// Runs the object's asserts, once per object value, in layer order (most derived first).
///
/// An assert that reads a field of `self` re-enters this; the guard set makes the inner call a
/// no-op instead of a loop.
pub(crate) fn run_asserts(st: &mut St<'_>, span: Span, obj: &Object) -> Result<()> {
  if obj.asserts_ok() {
    return Ok(());
  }
  if !st.checking_asserts.insert(obj.uid()) {
    return Ok(());
  }
  let res = run_asserts_inner(st, span, obj);
  st.checking_asserts.remove(&obj.uid());
  if res.is_ok() {
    obj.set_asserts_ok();
  }
  res
}

fn run_asserts_inner(st: &mut St<'_>, span: Span, obj: &Object) -> Result<()> {
  let layers: Vec<Layer> = obj.layers().to_vec();
  for (idx, layer) in layers.iter().enumerate() {
    let Layer::Expr(l) = layer else { continue };
    for &a in &l.asserts {
      let env = field_env(&l.env, obj, idx + 1);
      st.trace.push(span);
      let res = get(st, &env, a);
      st.trace.pop();
      res?;
    }
  }
  Ok(())
}

/// Applies a function value to arguments.
pub(crate) fn call_value(
  st: &mut St<'_>,
  span: Span,
  func: &Fn,
  pos: Vec<Thunk>,
  named: Vec<(Rc<str>, Thunk)>,
) -> Result<Val> {
  st.trace.push(span);
  let ret = call_value_inner(st, span, func, pos, named);
  st.trace.pop();
  ret
}

fn call_value_inner(
  st: &mut St<'_>,
  span: Span,
  func: &Fn,
  pos: Vec<Thunk>,
  named: Vec<(Rc<str>, Thunk)>,
) -> Result<Val> {
  match func {
    Fn::Std(f) => {
      let args = bind_std_args(st, span, *f, pos, named)?;
      std_lib::call(st, span, *f, args)
    }
    Fn::Host(name) => {
      if let Some((arg_name, _)) = named.into_iter().next() {
        return Err(st.err(span, Kind::NoSuchArgument(arg_name)));
      }
      let mut args = Vec::<manifest::Json>::with_capacity(pos.len());
      for t in pos {
        let v = force(st, &t)?;
        args.push(manifest::get(st, span, v)?);
      }
      let fns = st.cx.host_fns;
      let f = fns.get(name).expect("host fn should have resolved at lookup").as_ref();
      match f(&args) {
        Ok(json) => Ok(std_lib::json_to_val(st, json)),
        Err(msg) => Err(st.err(span, Kind::Host(Rc::from(msg.as_str())))),
      }
    }
    Fn::Regular(f) => {
      if pos.len() + named.len() > f.params.len() {
        return Err(st.err(span, Kind::TooManyArguments));
      }
      let ars = st.arenas(f.env.file());
      let call_env = f.env.empty_binds();
      let mut bound = vec![false; f.params.len()];
      for (i, t) in pos.into_iter().enumerate() {
        call_env.push_bind(f.params[i].0, t);
        bound[i] = true;
      }
      for (name, t) in named {
        let Some(i) =
          f.params.iter().position(|&(id, _)| ars.str.get(id.str()) == name.as_ref())
        else {
          return Err(st.err(span, Kind::NoSuchArgument(name)));
        };
        if bound[i] {
          return Err(st.err(span, Kind::DuplicateArgument(name)));
        }
        bound[i] = true;
        call_env.push_bind(f.params[i].0, t);
      }
      // defaults are evaluated lazily under the call env, so they see the other parameters.
      for (i, &(id, default)) in f.params.iter().enumerate() {
        if bound[i] {
          continue;
        }
        match default {
          Some(d) => call_env.push_bind(id, Thunk::delayed(call_env.clone(), d)),
          None => {
            let name = Rc::from(ars.str.get(id.str()));
            return Err(st.err(span, Kind::MissingArgument(name)));
          }
        }
      }
      get(st, &call_env, f.body)
    }
  }
}

fn bind_std_args(
  st: &St<'_>,
  span: Span,
  f: StdFn,
  pos: Vec<Thunk>,
  named: Vec<(Rc<str>, Thunk)>,
) -> Result<Vec<Thunk>> {
  let params = f.params();
  if pos.len() + named.len() > params.len() {
    return Err(st.err(span, Kind::TooManyArguments));
  }
  let mut slots: Vec<Option<Thunk>> = params.iter().map(|_| None).collect();
  for (i, t) in pos.into_iter().enumerate() {
    slots[i] = Some(t);
  }
  for (name, t) in named {
    let Some(i) = params.iter().position(|&p| p == name.as_ref()) else {
      return Err(st.err(span, Kind::NoSuchArgument(name)));
    };
    if slots[i].is_some() {
      return Err(st.err(span, Kind::DuplicateArgument(name)));
    }
    slots[i] = Some(t);
  }
  slots
    .into_iter()
    .enumerate()
    .map(|(i, s)| s.ok_or_else(|| st.err(span, Kind::MissingArgument(Rc::from(params[i])))))
    .collect()
}

fn comp_envs(st: &mut St<'_>, env: &Env, specs: &[CompSpec]) -> Result<Vec<Env>> {
  let mut out = Vec::<Env>::new();
  comp_envs_go(st, env, specs, &mut out)?;
  Ok(out)
}

fn comp_envs_go(
  st: &mut St<'_>,
  env: &Env,
  specs: &[CompSpec],
  out: &mut Vec<Env>,
) -> Result<()> {
  let Some((first, rest)) = specs.split_first() else {
    out.push(env.clone());
    return Ok(());
  };
  match first {
    CompSpec::For { id, seq } => {
      let seq_span = st.arenas(env.file()).expr.span(*seq);
      match get(st, env, *seq)? {
        Val::Arr(arr) => {
          for t in arr.iter() {
            let env_i = env.bind_single(*id, t.clone());
            comp_envs_go(st, &env_i, rest, out)?;
          }
          Ok(())
        }
        other => Err(st.err(seq_span, incompatible("an array", &other))),
      }
    }
    CompSpec::If { cond } => {
      let cond_span = st.arenas(env.file()).expr.span(*cond);
      let cond_v = get(st, env, *cond)?;
      if bool_of(st, cond_span, cond_v)? {
        comp_envs_go(st, env, rest, out)
      } else {
        Ok(())
      }
    }
  }
}

fn bin_op(
  st: &mut St<'_>,
  env: &Env,
  span: Span,
  lhs: ExprMust,
  op: BinaryOp,
  rhs: ExprMust,
) -> Result<Val> {
  match op {
    BinaryOp::And => {
      let l = bool_of_expr(st, env, lhs)?;
      if !l {
        return Ok(Val::Bool(false));
      }
      Ok(Val::Bool(bool_of_expr(st, env, rhs)?))
    }
    BinaryOp::Or => {
      let l = bool_of_expr(st, env, lhs)?;
      if l {
        return Ok(Val::Bool(true));
      }
      Ok(Val::Bool(bool_of_expr(st, env, rhs)?))
    }
    BinaryOp::Add => {
      let l = get(st, env, lhs)?;
      let r = get(st, env, rhs)?;
      add_values(st, span, l, r)
    }
    BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
      let (a, b) = num_pair(st, env, span, lhs, rhs)?;
      let r = match op {
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::Mod => {
          if b == 0.0 {
            return Err(st.err(span, Kind::DivideByZero));
          }
          if matches!(op, BinaryOp::Div) {
            a / b
          } else {
            a % b
          }
        }
        _ => unreachable!("checked above"),
      };
      num(st, span, r)
    }
    BinaryOp::Shl | BinaryOp::Shr | BinaryOp::BitAnd | BinaryOp::BitXor | BinaryOp::BitOr => {
      let (a, b) = num_pair(st, env, span, lhs, rhs)?;
      let (a, b) = (to_i64(a), to_i64(b));
      #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
      let shift = (b & 63) as u32;
      let r = match op {
        BinaryOp::Shl => a.wrapping_shl(shift),
        BinaryOp::Shr => a.wrapping_shr(shift),
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::BitOr => a | b,
        _ => unreachable!("checked above"),
      };
      num(st, span, int_to_f64(r))
    }
    BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
      let l = get(st, env, lhs)?;
      let r = get(st, env, rhs)?;
      let ord = cmp_val(st, span, &l, &r)?;
      let b = match op {
        BinaryOp::Lt => ord.is_lt(),
        BinaryOp::LtEq => ord.is_le(),
        BinaryOp::Gt => ord.is_gt(),
        BinaryOp::GtEq => ord.is_ge(),
        _ => unreachable!("checked above"),
      };
      Ok(Val::Bool(b))
    }
    BinaryOp::Eq | BinaryOp::NotEq => {
      let l = get(st, env, lhs)?;
      let r = get(st, env, rhs)?;
      let eq = eq_val(st, span, &l, &r)?;
      Ok(Val::Bool(if matches!(op, BinaryOp::Eq) { eq } else { !eq }))
    }
    BinaryOp::In => {
      let l_span = st.arenas(env.file()).expr.span(lhs);
      let name = match get(st, env, lhs)? {
        Val::Str(s) => s,
        other => return Err(st.err(l_span, incompatible("a string", &other))),
      };
      match get(st, env, rhs)? {
        Val::Obj(obj) => Ok(Val::Bool(obj.has_field_from(0, &name))),
        other => Err(st.err(span, incompatible("an object", &other))),
      }
    }
  }
}

/// `lhs + rhs` with all of `+`'s overloads.
pub(crate) fn add_values(st: &mut St<'_>, span: Span, lhs: Val, rhs: Val) -> Result<Val> {
  match (lhs, rhs) {
    (Val::Str(a), b) => {
      let b = str_conv(st, span, b)?;
      Ok(Val::Str(concat_str(&a, &b)))
    }
    (a, Val::Str(b)) => {
      let a = str_conv(st, span, a)?;
      Ok(Val::Str(concat_str(&a, &b)))
    }
    (Val::Num(a), Val::Num(b)) => num(st, span, a.value() + b.value()),
    (Val::Arr(a), Val::Arr(b)) => Ok(Val::Arr(Array::concat(&a, &b))),
    (Val::Obj(a), Val::Obj(b)) => {
      let uid = st.next_uid();
      Ok(Val::Obj(Object::merge(&a, &b, uid)))
    }
    (a, _) => Err(st.err(span, incompatible("addable operands", &a))),
  }
}

/// Structural equality on manifested forms. A function equals nothing, not even itself.
pub(crate) fn eq_val(st: &mut St<'_>, span: Span, lhs: &Val, rhs: &Val) -> Result<bool> {
  if matches!(lhs, Val::Fn(_)) || matches!(rhs, Val::Fn(_)) {
    return Ok(false);
  }
  let a = manifest::get(st, span, lhs.clone())?;
  let b = manifest::get(st, span, rhs.clone())?;
  Ok(a == b)
}

fn cmp_val(st: &mut St<'_>, span: Span, lhs: &Val, rhs: &Val) -> Result<Ordering> {
  match (lhs, rhs) {
    (Val::Str(a), Val::Str(b)) => Ok(a.cmp(b)),
    (Val::Num(a), Val::Num(b)) => Ok(a.cmp(b)),
    (Val::Arr(a), Val::Arr(b)) => {
      let mut ai = a.iter();
      let mut bi = b.iter();
      loop {
        match (ai.next(), bi.next()) {
          (None, None) => return Ok(Ordering::Equal),
          (None, Some(_)) => return Ok(Ordering::Less),
          (Some(_), None) => return Ok(Ordering::Greater),
          (Some(x), Some(y)) => {
            let (x, y) = (x.clone(), y.clone());
            let xv = force(st, &x)?;
            let yv = force(st, &y)?;
            match cmp_val(st, span, &xv, &yv)? {
              Ordering::Equal => {}
              ord => return Ok(ord),
            }
          }
        }
      }
    }
    _ => Err(st.err(span, incompatible("two comparable values", rhs))),
  }
}

/// Converts to a string: strings are themselves, everything else is its compact JSON form.
pub(crate) fn str_conv(st: &mut St<'_>, span: Span, val: Val) -> Result<Rc<str>> {
  if let Val::Str(s) = val {
    Ok(s)
  } else {
    let json = manifest::get(st, span, val)?;
    let s = json.display_compact().to_string();
    Ok(Rc::from(s.as_str()))
  }
}

pub(crate) fn bool_of(st: &St<'_>, span: Span, v: Val) -> Result<bool> {
  match v {
    Val::Bool(b) => Ok(b),
    other => Err(st.err(span, incompatible("a boolean", &other))),
  }
}

fn bool_of_expr(st: &mut St<'_>, env: &Env, e: ExprMust) -> Result<bool> {
  let span = st.arenas(env.file()).expr.span(e);
  let v = get(st, env, e)?;
  bool_of(st, span, v)
}

fn num_pair(
  st: &mut St<'_>,
  env: &Env,
  span: Span,
  lhs: ExprMust,
  rhs: ExprMust,
) -> Result<(f64, f64)> {
  let l = get(st, env, lhs)?;
  let r = get(st, env, rhs)?;
  match (l, r) {
    (Val::Num(a), Val::Num(b)) => Ok((a.value(), b.value())),
    (Val::Num(_), other) | (other, _) => {
      Err(st.err(span, incompatible("a number", &other)))
    }
  }
}

pub(crate) fn num(st: &St<'_>, span: Span, r: f64) -> Result<Val> {
  match Float::try_from(r) {
    Ok(n) => Ok(Val::Num(n)),
    Err(inf) => Err(st.err(span, Kind::Infinite(inf))),
  }
}

fn index_number(st: &St<'_>, span: Span, v: Val) -> Result<usize> {
  let Val::Num(n) = v else {
    return Err(st.err(span, incompatible("a number", &v)));
  };
  let n = n.value();
  if n.fract() != 0.0 {
    return Err(st.err(span, Kind::ArrayIdxNotInteger));
  }
  if n < 0.0 {
    return Err(st.err(span, Kind::ArrayIdxOutOfRange));
  }
  #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
  Ok(n as usize)
}

fn slice_bound(
  st: &mut St<'_>,
  env: &Env,
  e: Option<ExprMust>,
) -> Result<Option<usize>> {
  let Some(e) = e else { return Ok(None) };
  let span = st.arenas(env.file()).expr.span(e);
  match get(st, env, e)? {
    Val::Null => Ok(None),
    Val::Num(n) => {
      let v = n.value();
      if v.fract() != 0.0 || v < 0.0 {
        return Err(st.err(span, Kind::SliceOutOfDomain));
      }
      #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
      Ok(Some(v as usize))
    }
    other => Err(st.err(span, incompatible("a number", &other))),
  }
}

pub(crate) fn incompatible(want: &'static str, got: &Val) -> Kind {
  Kind::IncompatibleTypes { want, got: got.type_name() }
}

#[allow(clippy::cast_possible_truncation)]
fn to_i64(f: f64) -> i64 {
  f as i64
}

#[allow(clippy::cast_precision_loss)]
fn int_to_f64(n: i64) -> f64 {
  n as f64
}

fn concat_str(a: &str, b: &str) -> Rc<str> {
  let both = format!("{a}{b}");
  Rc::from(both.as_str())
}
