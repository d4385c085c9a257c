//! The internal impl.

use crate::error::{Error, Expected, Kind};
use rustc_hash::FxHashSet;
use sonnet_ast::{
  Arg, Bind, BinaryOp, CompSpec, Expr, ExprKind, Field, FieldName, ImportKind, Member, Name,
  ObjAssert, Param, UnaryOp, Visibility,
};
use sonnet_lex::{Token, TokenKind as TK};
use sonnet_source::{FileId, Span};
use text_size::{TextRange, TextSize};

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub(crate) struct P<'a> {
  file: FileId,
  src: &'a str,
  toks: &'a [Token],
  i: usize,
  last_range: TextRange,
}

impl<'a> P<'a> {
  pub(crate) fn new(file: FileId, src: &'a str, toks: &'a [Token]) -> Self {
    Self { file, src, toks, i: 0, last_range: TextRange::empty(TextSize::from(0)) }
  }

  pub(crate) fn peek(&self) -> Option<Token> {
    self.toks.get(self.i).copied()
  }

  fn peek_nth(&self, n: usize) -> Option<Token> {
    self.toks.get(self.i + n).copied()
  }

  fn at(&self, kind: TK) -> bool {
    self.peek().is_some_and(|t| t.kind == kind)
  }

  fn bump(&mut self) -> Token {
    let tok = self.toks[self.i];
    self.last_range = tok.range;
    self.i += 1;
    tok
  }

  fn eat(&mut self, kind: TK) -> Result<Token> {
    match self.peek() {
      Some(tok) if tok.kind == kind => Ok(self.bump()),
      _ => Err(self.err(Kind::Expected(Expected::Kind(kind)))),
    }
  }

  fn text(&self, tok: Token) -> &'a str {
    &self.src[std::ops::Range::<usize>::from(tok.range)]
  }

  pub(crate) fn span(&self, tok: Token) -> Span {
    Span { file: self.file, range: tok.range }
  }

  /// the span of the current token, or an empty span at the end of input.
  fn cur_span(&self) -> Span {
    match self.peek() {
      Some(tok) => self.span(tok),
      None => Span { file: self.file, range: TextRange::empty(self.last_range.end()) },
    }
  }

  /// the span from `start` through the last bumped token.
  fn span_from(&self, start: Span) -> Span {
    start.cover(Span { file: self.file, range: self.last_range })
  }

  fn err(&self, kind: Kind) -> Error {
    Error { span: self.cur_span(), kind }
  }

  fn err_at(&self, span: Span, kind: Kind) -> Error {
    Error { span, kind }
  }
}

pub(crate) fn expr(p: &mut P<'_>) -> Result<Expr> {
  expr_prec(p, Prec::Min)
}

/// handles precedence.
#[allow(clippy::too_many_lines)]
fn expr_prec(p: &mut P<'_>, min_prec: Prec) -> Result<Expr> {
  let Some(cur) = p.peek() else {
    return Err(p.err(Kind::Expected(Expected::Expr)));
  };
  let start = p.span(cur);
  let kind = match cur.kind {
    TK::NullKw => {
      p.bump();
      ExprKind::Null
    }
    TK::TrueKw => {
      p.bump();
      ExprKind::True
    }
    TK::FalseKw => {
      p.bump();
      ExprKind::False
    }
    TK::SelfKw => {
      p.bump();
      ExprKind::SelfExpr
    }
    TK::Dollar => {
      p.bump();
      ExprKind::Dollar
    }
    TK::Number => {
      p.bump();
      number(p, cur)?
    }
    TK::DoubleQuotedString
    | TK::SingleQuotedString
    | TK::DoubleQuotedVerbatim
    | TK::SingleQuotedVerbatim
    | TK::TextBlock => {
      p.bump();
      ExprKind::Str(cook(p, cur)?)
    }
    TK::Id => {
      p.bump();
      ExprKind::Id(p.text(cur).to_owned())
    }
    TK::LRound => {
      p.bump();
      let e = expr(p)?;
      p.eat(TK::RRound)?;
      e.kind
    }
    TK::LCurly => object(p)?.kind,
    TK::LSquare => array(p)?,
    TK::ImportKw | TK::ImportstrKw => {
      p.bump();
      let kind =
        if cur.kind == TK::ImportKw { ImportKind::Code } else { ImportKind::String };
      let path = string_name(p)?;
      ExprKind::Import { kind, path }
    }
    TK::LocalKw => {
      p.bump();
      let binds = binds(p)?;
      p.eat(TK::Semicolon)?;
      let body = expr(p)?;
      ExprKind::Local { binds, body: Box::new(body) }
    }
    TK::IfKw => {
      p.bump();
      let cond = expr(p)?;
      p.eat(TK::ThenKw)?;
      let yes = expr(p)?;
      let no = if p.at(TK::ElseKw) {
        p.bump();
        Some(Box::new(expr(p)?))
      } else {
        None
      };
      ExprKind::If { cond: Box::new(cond), yes: Box::new(yes), no }
    }
    TK::FunctionKw => {
      p.bump();
      p.eat(TK::LRound)?;
      let params = params(p)?;
      let body = expr(p)?;
      ExprKind::Function { params, body: Box::new(body) }
    }
    TK::AssertKw => {
      p.bump();
      let cond = expr(p)?;
      let msg = if p.at(TK::Colon) {
        p.bump();
        Some(Box::new(expr(p)?))
      } else {
        None
      };
      p.eat(TK::Semicolon)?;
      let body = expr(p)?;
      ExprKind::Assert { cond: Box::new(cond), msg, body: Box::new(body) }
    }
    TK::ErrorKw => {
      p.bump();
      let inner = expr(p)?;
      ExprKind::Error(Box::new(inner))
    }
    TK::SuperKw => {
      p.bump();
      match p.peek().map(|t| t.kind) {
        Some(TK::Dot) => {
          p.bump();
          let name = ident(p)?;
          ExprKind::SuperField { name }
        }
        Some(TK::LSquare) => {
          p.bump();
          let idx = expr(p)?;
          p.eat(TK::RSquare)?;
          ExprKind::SuperSubscript { idx: Box::new(idx) }
        }
        _ => return Err(p.err_at(start, Kind::SuperNeedsField)),
      }
    }
    TK::Minus | TK::Plus | TK::Bang | TK::Tilde => {
      p.bump();
      let op = match cur.kind {
        TK::Minus => UnaryOp::Neg,
        TK::Plus => UnaryOp::Pos,
        TK::Bang => UnaryOp::LogicalNot,
        _ => UnaryOp::BitNot,
      };
      let inner = expr_prec(p, Prec::Unary)?;
      ExprKind::Unary { op, inner: Box::new(inner) }
    }
    _ => return Err(p.err(Kind::Expected(Expected::Expr))),
  };
  let mut lhs = Expr::new(kind, p.span_from(start));
  // pratt parser for the postfix and infix operators.
  while let Some(cur) = p.peek() {
    lhs = match cur.kind {
      TK::LRound => {
        p.bump();
        let args = args(p)?;
        if p.at(TK::TailstrictKw) {
          p.bump();
        }
        Expr::new(ExprKind::Call { func: Box::new(lhs), args }, p.span_from(start))
      }
      TK::LSquare => {
        p.bump();
        let kind = subscript_or_slice(p, lhs)?;
        Expr::new(kind, p.span_from(start))
      }
      TK::Dot => {
        p.bump();
        let name = ident(p)?;
        Expr::new(ExprKind::FieldGet { on: Box::new(lhs), name }, p.span_from(start))
      }
      TK::LCurly => {
        let rhs = object(p)?;
        let kind =
          ExprKind::Binary { op: BinaryOp::Add, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        Expr::new(kind, p.span_from(start))
      }
      op => match bin_op_prec(op) {
        Some((bin_op, op_prec)) => {
          if op_prec <= min_prec {
            break;
          }
          p.bump();
          if bin_op == BinaryOp::In && p.at(TK::SuperKw) {
            p.bump();
            Expr::new(ExprKind::InSuper { lhs: Box::new(lhs) }, p.span_from(start))
          } else {
            let rhs = expr_prec(p, op_prec)?;
            let kind =
              ExprKind::Binary { op: bin_op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
            Expr::new(kind, p.span_from(start))
          }
        }
        None => break,
      },
    };
  }
  Ok(lhs)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
  Min,
  LogicalOr,
  LogicalAnd,
  BitOr,
  BitXor,
  BitAnd,
  Eq,
  Cmp,
  Shift,
  Add,
  Mul,
  Unary,
}

fn bin_op_prec(op: TK) -> Option<(BinaryOp, Prec)> {
  let ret = match op {
    TK::Star => (BinaryOp::Mul, Prec::Mul),
    TK::Slash => (BinaryOp::Div, Prec::Mul),
    TK::Percent => (BinaryOp::Mod, Prec::Mul),
    TK::Plus => (BinaryOp::Add, Prec::Add),
    TK::Minus => (BinaryOp::Sub, Prec::Add),
    TK::LtLt => (BinaryOp::Shl, Prec::Shift),
    TK::GtGt => (BinaryOp::Shr, Prec::Shift),
    TK::Lt => (BinaryOp::Lt, Prec::Cmp),
    TK::LtEq => (BinaryOp::LtEq, Prec::Cmp),
    TK::Gt => (BinaryOp::Gt, Prec::Cmp),
    TK::GtEq => (BinaryOp::GtEq, Prec::Cmp),
    TK::InKw => (BinaryOp::In, Prec::Cmp),
    TK::EqEq => (BinaryOp::Eq, Prec::Eq),
    TK::BangEq => (BinaryOp::NotEq, Prec::Eq),
    TK::And => (BinaryOp::BitAnd, Prec::BitAnd),
    TK::Carat => (BinaryOp::BitXor, Prec::BitXor),
    TK::Bar => (BinaryOp::BitOr, Prec::BitOr),
    TK::AndAnd => (BinaryOp::And, Prec::LogicalAnd),
    TK::BarBar => (BinaryOp::Or, Prec::LogicalOr),
    _ => return None,
  };
  Some(ret)
}

/// we are past the `[` of a postfix subscript.
fn subscript_or_slice(p: &mut P<'_>, on: Expr) -> Result<ExprKind> {
  let on = Box::new(on);
  let lo = if p.at(TK::Colon) { None } else { Some(Box::new(expr(p)?)) };
  if p.at(TK::RSquare) {
    p.bump();
    return match lo {
      Some(idx) => Ok(ExprKind::Subscript { on, idx }),
      None => Err(p.err(Kind::Expected(Expected::Expr))),
    };
  }
  p.eat(TK::Colon)?;
  let hi = if p.at(TK::Colon) || p.at(TK::RSquare) { None } else { Some(Box::new(expr(p)?)) };
  let step = if p.at(TK::Colon) {
    p.bump();
    if p.at(TK::RSquare) {
      None
    } else {
      Some(Box::new(expr(p)?))
    }
  } else {
    None
  };
  p.eat(TK::RSquare)?;
  Ok(ExprKind::Slice { on, lo, hi, step })
}

/// we are at the `[` of an array literal or comprehension.
fn array(p: &mut P<'_>) -> Result<ExprKind> {
  p.bump();
  if p.at(TK::RSquare) {
    p.bump();
    return Ok(ExprKind::Array(Vec::new()));
  }
  let first = expr(p)?;
  if p.at(TK::Comma) {
    p.bump();
  }
  if p.at(TK::ForKw) {
    let specs = comp_specs(p)?;
    p.eat(TK::RSquare)?;
    return Ok(ExprKind::ArrayComp { elem: Box::new(first), specs });
  }
  let mut elems = vec![first];
  while !p.at(TK::RSquare) && p.peek().is_some() {
    elems.push(expr(p)?);
    if p.at(TK::Comma) {
      p.bump();
    } else {
      break;
    }
  }
  p.eat(TK::RSquare)?;
  Ok(ExprKind::Array(elems))
}

/// we are at `for`.
fn comp_specs(p: &mut P<'_>) -> Result<Vec<CompSpec>> {
  let mut ret = Vec::<CompSpec>::new();
  loop {
    match p.peek().map(|t| t.kind) {
      Some(TK::ForKw) => {
        p.bump();
        let var = ident(p)?;
        p.eat(TK::InKw)?;
        let seq = expr(p)?;
        ret.push(CompSpec::For { var, seq });
      }
      Some(TK::IfKw) => {
        p.bump();
        let cond = expr(p)?;
        ret.push(CompSpec::If { cond });
      }
      _ => return Ok(ret),
    }
  }
}

/// we are at the `{` of an object literal or comprehension.
fn object(p: &mut P<'_>) -> Result<Expr> {
  let start = p.cur_span();
  p.bump();
  let mut members = Vec::<Member>::new();
  let mut specs = Vec::<CompSpec>::new();
  loop {
    if p.at(TK::RCurly) {
      p.bump();
      break;
    }
    if p.at(TK::ForKw) {
      specs = comp_specs(p)?;
      p.eat(TK::RCurly)?;
      break;
    }
    members.push(member(p)?);
    if p.at(TK::Comma) {
      p.bump();
    } else if !p.at(TK::RCurly) && !p.at(TK::ForKw) {
      return Err(p.err(Kind::Expected(Expected::Kind(TK::RCurly))));
    }
  }
  let span = p.span_from(start);
  if specs.is_empty() {
    check_duplicate_fields(p, &members)?;
  } else {
    check_comp_members(p, span, &members)?;
  }
  Ok(Expr::new(ExprKind::Object { members, specs }, span))
}

fn member(p: &mut P<'_>) -> Result<Member> {
  match p.peek().map(|t| t.kind) {
    Some(TK::LocalKw) => {
      p.bump();
      Ok(Member::Local(bind(p)?))
    }
    Some(TK::AssertKw) => {
      p.bump();
      let cond = expr(p)?;
      let msg = if p.at(TK::Colon) {
        p.bump();
        Some(expr(p)?)
      } else {
        None
      };
      Ok(Member::Assert(ObjAssert { cond, msg }))
    }
    _ => Ok(Member::Field(field(p)?)),
  }
}

fn field(p: &mut P<'_>) -> Result<Field> {
  let name = field_name(p)?;
  let mut plus = false;
  let mut params_ = None::<Vec<Param>>;
  if p.at(TK::Plus) {
    p.bump();
    plus = true;
  } else if p.at(TK::LRound) {
    p.bump();
    params_ = Some(params(p)?);
  }
  let vis = match p.peek().map(|t| t.kind) {
    Some(TK::Colon) => Visibility::Default,
    Some(TK::ColonColon) => Visibility::Hidden,
    Some(TK::ColonColonColon) => Visibility::Visible,
    _ => return Err(p.err(Kind::Expected(Expected::Visibility))),
  };
  p.bump();
  let val = expr(p)?;
  Ok(Field { name, plus, params: params_, vis, val })
}

fn field_name(p: &mut P<'_>) -> Result<FieldName> {
  match p.peek().map(|t| t.kind) {
    Some(TK::Id) => Ok(FieldName::Id(ident(p)?)),
    Some(
      TK::DoubleQuotedString
      | TK::SingleQuotedString
      | TK::DoubleQuotedVerbatim
      | TK::SingleQuotedVerbatim
      | TK::TextBlock,
    ) => Ok(FieldName::Str(string_name(p)?)),
    Some(TK::LSquare) => {
      p.bump();
      let e = expr(p)?;
      p.eat(TK::RSquare)?;
      Ok(FieldName::Computed(e))
    }
    _ => Err(p.err(Kind::Expected(Expected::Member))),
  }
}

fn check_duplicate_fields(p: &P<'_>, members: &[Member]) -> Result<()> {
  let mut seen = FxHashSet::<&str>::default();
  for member in members {
    let Member::Field(field) = member else { continue };
    let Some(name) = field.name.literal() else { continue };
    if !seen.insert(name.text.as_str()) {
      return Err(p.err_at(name.span, Kind::DuplicateField(name.text.clone())));
    }
  }
  Ok(())
}

fn check_comp_members(p: &P<'_>, span: Span, members: &[Member]) -> Result<()> {
  let mut fields = members.iter().filter_map(|m| match m {
    Member::Field(f) => Some(f),
    Member::Local(_) => None,
    Member::Assert(_) => None,
  });
  let field = fields.next();
  if field.is_none() || fields.next().is_some() {
    return Err(p.err_at(span, Kind::ObjectCompNotOne));
  }
  if members.iter().any(|m| matches!(m, Member::Assert(_))) {
    return Err(p.err_at(span, Kind::ObjectCompAssert));
  }
  let field = field.expect("just checked");
  if let Some(name) = field.name.literal() {
    return Err(p.err_at(name.span, Kind::ObjectCompLiteralFieldName));
  }
  if field.plus || field.params.is_some() {
    return Err(p.err_at(span, Kind::ObjectCompFieldExtra));
  }
  if field.vis != Visibility::Default {
    return Err(p.err_at(span, Kind::ObjectCompVisibility));
  }
  Ok(())
}

/// comma-separated binds for a `local` expression.
fn binds(p: &mut P<'_>) -> Result<Vec<Bind>> {
  let mut ret = vec![bind(p)?];
  while p.at(TK::Comma) {
    p.bump();
    ret.push(bind(p)?);
  }
  let mut seen = FxHashSet::<&str>::default();
  for b in &ret {
    if !seen.insert(b.name.text.as_str()) {
      return Err(p.err_at(b.name.span, Kind::DuplicateBind(b.name.text.clone())));
    }
  }
  Ok(ret)
}

fn bind(p: &mut P<'_>) -> Result<Bind> {
  let name = ident(p)?;
  let params_ = if p.at(TK::LRound) {
    p.bump();
    Some(params(p)?)
  } else {
    None
  };
  p.eat(TK::Eq)?;
  let val = expr(p)?;
  Ok(Bind { name, params: params_, val })
}

/// we are past the `(`; eats through the `)`.
fn params(p: &mut P<'_>) -> Result<Vec<Param>> {
  let mut ret = Vec::<Param>::new();
  while !p.at(TK::RRound) && p.peek().is_some() {
    let name = ident(p)?;
    let default = if p.at(TK::Eq) {
      p.bump();
      Some(expr(p)?)
    } else {
      None
    };
    ret.push(Param { name, default });
    if p.at(TK::Comma) {
      p.bump();
    } else {
      break;
    }
  }
  p.eat(TK::RRound)?;
  let mut seen = FxHashSet::<&str>::default();
  for param in &ret {
    if !seen.insert(param.name.text.as_str()) {
      return Err(p.err_at(param.name.span, Kind::DuplicateParam(param.name.text.clone())));
    }
  }
  Ok(ret)
}

/// we are past the `(`; eats through the `)`.
fn args(p: &mut P<'_>) -> Result<Vec<Arg>> {
  let mut ret = Vec::<Arg>::new();
  let mut named_seen = false;
  while !p.at(TK::RRound) && p.peek().is_some() {
    let named = p.at(TK::Id) && p.peek_nth(1).is_some_and(|t| t.kind == TK::Eq);
    if named {
      let name = ident(p)?;
      p.eat(TK::Eq)?;
      let val = expr(p)?;
      if ret.iter().any(|a| a.name.as_ref().is_some_and(|n| n.text == name.text)) {
        return Err(p.err_at(name.span, Kind::DuplicateNamedArg(name.text.clone())));
      }
      named_seen = true;
      ret.push(Arg { name: Some(name), val });
    } else {
      let val = expr(p)?;
      if named_seen {
        return Err(p.err_at(val.span, Kind::PositionalArgAfterNamedArg));
      }
      ret.push(Arg { name: None, val });
    }
    if p.at(TK::Comma) {
      p.bump();
    } else {
      break;
    }
  }
  p.eat(TK::RRound)?;
  Ok(ret)
}

fn ident(p: &mut P<'_>) -> Result<Name> {
  let tok = p.eat(TK::Id)?;
  Ok(Name { text: p.text(tok).to_owned(), span: p.span(tok) })
}

/// a string literal as a name (field name, import path).
fn string_name(p: &mut P<'_>) -> Result<Name> {
  let Some(tok) = p.peek() else {
    return Err(p.err(Kind::Expected(Expected::String)));
  };
  match tok.kind {
    TK::DoubleQuotedString
    | TK::SingleQuotedString
    | TK::DoubleQuotedVerbatim
    | TK::SingleQuotedVerbatim
    | TK::TextBlock => {
      p.bump();
      Ok(Name { text: cook(p, tok)?, span: p.span(tok) })
    }
    _ => Err(p.err(Kind::Expected(Expected::String))),
  }
}

fn number(p: &P<'_>, tok: Token) -> Result<ExprKind> {
  let text = p.text(tok);
  let err = || p.err_at(p.span(tok), Kind::CannotRepresentNumber);
  if text.bytes().all(|b| b.is_ascii_digit()) {
    if let Ok(n) = text.parse::<i64>() {
      return Ok(ExprKind::Int(n));
    }
  }
  let n = text.parse::<f64>().map_err(|_| err())?;
  if n.is_finite() {
    Ok(ExprKind::Float(n))
  } else {
    Err(err())
  }
}

/// cooks the contents of a string token.
fn cook(p: &P<'_>, tok: Token) -> Result<String> {
  let bytes = p.text(tok).as_bytes();
  let (skip, scan) = match tok.kind {
    TK::DoubleQuotedString => (1, sonnet_escape::quoted(&bytes[1..], b'"')),
    TK::SingleQuotedString => (1, sonnet_escape::quoted(&bytes[1..], b'\'')),
    TK::DoubleQuotedVerbatim => (2, sonnet_escape::raw(&bytes[2..], b'"')),
    TK::SingleQuotedVerbatim => (2, sonnet_escape::raw(&bytes[2..], b'\'')),
    TK::TextBlock => (3, sonnet_escape::block(&bytes[3..])),
    _ => unreachable!("cook a non-string token"),
  };
  match scan.errors.first() {
    None => Ok(scan.text),
    Some(&(idx, e)) => {
      let abs = usize::from(tok.range.start()) + skip + idx;
      Err(Error {
        span: Span::new(p.file, abs, abs + 1),
        kind: Kind::Escape(e),
      })
    }
  }
}
