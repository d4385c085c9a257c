//! The internal impl.

use crate::st::St;
use sonnet_ast as ast;
use sonnet_core::{
  BinaryOp, CompSpec, ExprData, ExprMust, Field, Float, Id, ImportKind, Prim, UnaryOp,
  Visibility,
};
use sonnet_source::Span;

pub(crate) fn expr(st: &mut St, e: ast::Expr) -> ExprMust {
  let span = e.span;
  let data = match e.kind {
    ast::ExprKind::Null => ExprData::Prim(Prim::Null),
    ast::ExprKind::True => ExprData::Prim(Prim::Bool(true)),
    ast::ExprKind::False => ExprData::Prim(Prim::Bool(false)),
    ast::ExprKind::SelfExpr => ExprData::SelfExpr,
    ast::ExprKind::Dollar => ExprData::Id(Id::DOLLAR),
    ast::ExprKind::Int(n) => {
      #[allow(clippy::cast_precision_loss)]
      let f = n as f64;
      ExprData::Prim(Prim::Number(Float::try_from(f).expect("int literal is finite")))
    }
    ast::ExprKind::Float(n) => {
      ExprData::Prim(Prim::Number(Float::try_from(n).expect("float literal is finite")))
    }
    ast::ExprKind::Str(s) => {
      let s = st.str(&s);
      ExprData::Prim(Prim::String(s))
    }
    ast::ExprKind::Id(name) => ExprData::Id(st.id(&name)),
    ast::ExprKind::Array(elems) => {
      let elems: Vec<_> = elems.into_iter().map(|e| expr(st, e)).collect();
      ExprData::Array(elems)
    }
    ast::ExprKind::ArrayComp { elem, specs } => {
      let elem = expr(st, *elem);
      let specs = comp_specs(st, specs);
      ExprData::ArrayComp { elem, specs }
    }
    ast::ExprKind::Object { members, specs } => return object(st, members, specs, span),
    ast::ExprKind::FieldGet { on, name } => {
      let on = expr(st, *on);
      let idx = str_lit(st, &name);
      ExprData::Subscript { on, idx }
    }
    ast::ExprKind::Subscript { on, idx } => {
      let on = expr(st, *on);
      let idx = expr(st, *idx);
      ExprData::Subscript { on, idx }
    }
    ast::ExprKind::Slice { on, lo, hi, step } => {
      let on = expr(st, *on);
      let lo = lo.map(|e| expr(st, *e));
      let hi = hi.map(|e| expr(st, *e));
      let step = step.map(|e| expr(st, *e));
      ExprData::Slice { on, lo, hi, step }
    }
    ast::ExprKind::SuperField { name } => {
      let idx = str_lit(st, &name);
      ExprData::SuperSubscript { idx }
    }
    ast::ExprKind::SuperSubscript { idx } => {
      let idx = expr(st, *idx);
      ExprData::SuperSubscript { idx }
    }
    ast::ExprKind::InSuper { lhs } => {
      let lhs = expr(st, *lhs);
      ExprData::InSuper { lhs }
    }
    ast::ExprKind::Call { func, args } => {
      let func = expr(st, *func);
      let mut positional = Vec::<ExprMust>::new();
      let mut named = Vec::<(Id, ExprMust)>::new();
      for arg in args {
        let val = expr(st, arg.val);
        match arg.name {
          None => positional.push(val),
          Some(name) => named.push((st.id(&name.text), val)),
        }
      }
      ExprData::Call { func, positional, named }
    }
    ast::ExprKind::Function { params, body } => {
      let params = fn_params(st, params);
      let body = expr(st, *body);
      ExprData::Function { params, body }
    }
    ast::ExprKind::Local { binds, body } => {
      let binds: Vec<_> = binds.into_iter().map(|b| bind(st, b)).collect();
      let body = expr(st, *body);
      ExprData::Local { binds, body }
    }
    ast::ExprKind::If { cond, yes, no } => {
      let cond = expr(st, *cond);
      let yes = expr(st, *yes);
      let no = match no {
        Some(no) => expr(st, *no),
        None => st.expr(ExprData::Prim(Prim::Null), span),
      };
      ExprData::If { cond, yes, no }
    }
    ast::ExprKind::Binary { op, lhs, rhs } => {
      let lhs = expr(st, *lhs);
      let rhs = expr(st, *rhs);
      ExprData::BinaryOp { lhs, op: bin_op(op), rhs }
    }
    ast::ExprKind::Unary { op, inner } => {
      let inner = expr(st, *inner);
      ExprData::UnaryOp { op: un_op(op), inner }
    }
    ast::ExprKind::Error(inner) => {
      let inner = expr(st, *inner);
      ExprData::Error(inner)
    }
    ast::ExprKind::Assert { cond, msg, body } => {
      let cond = expr(st, *cond);
      let msg = msg.map(|m| expr(st, *m));
      let body = expr(st, *body);
      ExprData::Assert { cond, msg, body }
    }
    ast::ExprKind::Import { kind, path } => {
      let kind = match kind {
        ast::ImportKind::Code => ImportKind::Code,
        ast::ImportKind::String => ImportKind::String,
      };
      ExprData::Import { kind, path: st.str(&path.text) }
    }
  };
  st.expr(data, span)
}

fn object(
  st: &mut St,
  members: Vec<ast::Member>,
  specs: Vec<ast::CompSpec>,
  span: Span,
) -> ExprMust {
  let mut locals = Vec::<(Id, ExprMust)>::new();
  let mut fields = Vec::<ast::Field>::new();
  let mut obj_asserts = Vec::<ast::ObjAssert>::new();
  for member in members {
    match member {
      ast::Member::Local(b) => {
        let b = bind(st, b);
        locals.push(b);
      }
      ast::Member::Field(f) => fields.push(f),
      ast::Member::Assert(a) => obj_asserts.push(a),
    }
  }
  if specs.is_empty() {
    let asserts: Vec<_> = obj_asserts
      .into_iter()
      .map(|a| {
        let a_span = a.cond.span;
        let cond = expr(st, a.cond);
        let msg = a.msg.map(|m| expr(st, m));
        let null = st.expr(ExprData::Prim(Prim::Null), a_span);
        let assert = st.expr(ExprData::Assert { cond, msg, body: null }, a_span);
        wrap_locals(st, &locals, assert, a_span)
      })
      .collect();
    let fields: Vec<_> = fields.into_iter().map(|f| field(st, &locals, f)).collect();
    st.expr(ExprData::Object { asserts, fields }, span)
  } else {
    // the parser checked: exactly one field, computed key, `:` visibility, no asserts.
    let f = fields.pop().expect("object comp has one field");
    let key = match f.name {
      ast::FieldName::Computed(e) => expr(st, e),
      ast::FieldName::Id(_) | ast::FieldName::Str(_) => {
        unreachable!("object comp field name is computed")
      }
    };
    let val_span = f.val.span;
    let val = expr(st, f.val);
    let val = wrap_locals(st, &locals, val, val_span);
    let specs = comp_specs(st, specs);
    st.expr(ExprData::ObjectComp { key, val, specs }, span)
  }
}

fn field(st: &mut St, locals: &[(Id, ExprMust)], f: ast::Field) -> Field {
  let key = match f.name {
    ast::FieldName::Id(name) | ast::FieldName::Str(name) => str_lit(st, &name),
    ast::FieldName::Computed(e) => expr(st, e),
  };
  let val_span = f.val.span;
  let mut val = expr(st, f.val);
  if let Some(params) = f.params {
    let params = fn_params(st, params);
    val = st.expr(ExprData::Function { params, body: val }, val_span);
  }
  let val = wrap_locals(st, locals, val, val_span);
  let vis = match f.vis {
    ast::Visibility::Default => Visibility::Default,
    ast::Visibility::Hidden => Visibility::Hidden,
    ast::Visibility::Visible => Visibility::Visible,
  };
  Field { key, plus: f.plus, vis, val }
}

/// wraps `body` so the object's `local`s are in scope. the binds are shared across fields; each
/// field instantiates them afresh when forced.
fn wrap_locals(
  st: &mut St,
  locals: &[(Id, ExprMust)],
  body: ExprMust,
  span: Span,
) -> ExprMust {
  if locals.is_empty() {
    body
  } else {
    st.expr(ExprData::Local { binds: locals.to_vec(), body }, span)
  }
}

fn bind(st: &mut St, b: ast::Bind) -> (Id, ExprMust) {
  let id = st.id(&b.name.text);
  let val_span = b.val.span;
  let mut val = expr(st, b.val);
  if let Some(params) = b.params {
    let params = fn_params(st, params);
    val = st.expr(ExprData::Function { params, body: val }, val_span);
  }
  (id, val)
}

fn fn_params(st: &mut St, params: Vec<ast::Param>) -> Vec<(Id, Option<ExprMust>)> {
  params
    .into_iter()
    .map(|p| {
      let id = st.id(&p.name.text);
      let default = p.default.map(|d| expr(st, d));
      (id, default)
    })
    .collect()
}

fn comp_specs(st: &mut St, specs: Vec<ast::CompSpec>) -> Vec<CompSpec> {
  specs
    .into_iter()
    .map(|spec| match spec {
      ast::CompSpec::For { var, seq } => {
        CompSpec::For { id: st.id(&var.text), seq: expr(st, seq) }
      }
      ast::CompSpec::If { cond } => CompSpec::If { cond: expr(st, cond) },
    })
    .collect()
}

fn str_lit(st: &mut St, name: &ast::Name) -> ExprMust {
  let s = st.str(&name.text);
  st.expr(ExprData::Prim(Prim::String(s)), name.span)
}

fn bin_op(op: ast::BinaryOp) -> BinaryOp {
  match op {
    ast::BinaryOp::Mul => BinaryOp::Mul,
    ast::BinaryOp::Div => BinaryOp::Div,
    ast::BinaryOp::Mod => BinaryOp::Mod,
    ast::BinaryOp::Add => BinaryOp::Add,
    ast::BinaryOp::Sub => BinaryOp::Sub,
    ast::BinaryOp::Shl => BinaryOp::Shl,
    ast::BinaryOp::Shr => BinaryOp::Shr,
    ast::BinaryOp::Lt => BinaryOp::Lt,
    ast::BinaryOp::LtEq => BinaryOp::LtEq,
    ast::BinaryOp::Gt => BinaryOp::Gt,
    ast::BinaryOp::GtEq => BinaryOp::GtEq,
    ast::BinaryOp::In => BinaryOp::In,
    ast::BinaryOp::Eq => BinaryOp::Eq,
    ast::BinaryOp::NotEq => BinaryOp::NotEq,
    ast::BinaryOp::BitAnd => BinaryOp::BitAnd,
    ast::BinaryOp::BitXor => BinaryOp::BitXor,
    ast::BinaryOp::BitOr => BinaryOp::BitOr,
    ast::BinaryOp::And => BinaryOp::And,
    ast::BinaryOp::Or => BinaryOp::Or,
  }
}

fn un_op(op: ast::UnaryOp) -> UnaryOp {
  match op {
    ast::UnaryOp::Neg => UnaryOp::Neg,
    ast::UnaryOp::Pos => UnaryOp::Pos,
    ast::UnaryOp::LogicalNot => UnaryOp::LogicalNot,
    ast::UnaryOp::BitNot => UnaryOp::BitNot,
  }
}
