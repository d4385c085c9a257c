//! Lexing a string into a sequence of tokens.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]

mod error;
mod internal;
mod st;

use sonnet_source::FileId;
use text_size::TextRange;

pub use error::{Error, Kind as ErrorKind};

/// A token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TokenKind {
  // trivia, not emitted
  Whitespace,
  Comment,
  // literals and names
  Id,
  Number,
  DoubleQuotedString,
  SingleQuotedString,
  DoubleQuotedVerbatim,
  SingleQuotedVerbatim,
  TextBlock,
  // keywords
  AssertKw,
  ElseKw,
  ErrorKw,
  FalseKw,
  ForKw,
  FunctionKw,
  IfKw,
  ImportKw,
  ImportstrKw,
  InKw,
  LocalKw,
  NullKw,
  SelfKw,
  SuperKw,
  TailstrictKw,
  ThenKw,
  TrueKw,
  // punctuation
  LCurly,
  RCurly,
  LSquare,
  RSquare,
  LRound,
  RRound,
  Comma,
  Dot,
  Semicolon,
  Dollar,
  ColonColonColon,
  ColonColon,
  Colon,
  EqEq,
  Eq,
  BangEq,
  Bang,
  LtEq,
  LtLt,
  Lt,
  GtEq,
  GtGt,
  Gt,
  AndAnd,
  And,
  BarBar,
  Bar,
  Plus,
  Minus,
  Star,
  Slash,
  Percent,
  Carat,
  Tilde,
}

impl TokenKind {
  /// Punctuation, longest first, so that e.g. `==` never lexes as two `=`.
  pub(crate) const PUNCTUATION: [(&'static [u8], Self); 33] = [
    (b":::", Self::ColonColonColon),
    (b"::", Self::ColonColon),
    (b"==", Self::EqEq),
    (b"!=", Self::BangEq),
    (b"<=", Self::LtEq),
    (b"<<", Self::LtLt),
    (b">=", Self::GtEq),
    (b">>", Self::GtGt),
    (b"&&", Self::AndAnd),
    (b"||", Self::BarBar),
    (b":", Self::Colon),
    (b"=", Self::Eq),
    (b"!", Self::Bang),
    (b"<", Self::Lt),
    (b">", Self::Gt),
    (b"&", Self::And),
    (b"|", Self::Bar),
    (b"{", Self::LCurly),
    (b"}", Self::RCurly),
    (b"[", Self::LSquare),
    (b"]", Self::RSquare),
    (b"(", Self::LRound),
    (b")", Self::RRound),
    (b",", Self::Comma),
    (b".", Self::Dot),
    (b";", Self::Semicolon),
    (b"$", Self::Dollar),
    (b"+", Self::Plus),
    (b"-", Self::Minus),
    (b"*", Self::Star),
    (b"%", Self::Percent),
    (b"^", Self::Carat),
    (b"~", Self::Tilde),
  ];

  pub(crate) fn keyword(text: &[u8]) -> Option<Self> {
    let ret = match text {
      b"assert" => Self::AssertKw,
      b"else" => Self::ElseKw,
      b"error" => Self::ErrorKw,
      b"false" => Self::FalseKw,
      b"for" => Self::ForKw,
      b"function" => Self::FunctionKw,
      b"if" => Self::IfKw,
      b"import" => Self::ImportKw,
      b"importstr" => Self::ImportstrKw,
      b"in" => Self::InKw,
      b"local" => Self::LocalKw,
      b"null" => Self::NullKw,
      b"self" => Self::SelfKw,
      b"super" => Self::SuperKw,
      b"tailstrict" => Self::TailstrictKw,
      b"then" => Self::ThenKw,
      b"true" => Self::TrueKw,
      _ => return None,
    };
    Some(ret)
  }

  fn is_trivia(self) -> bool {
    matches!(self, Self::Whitespace | Self::Comment)
  }

  /// A short human description, for diagnostics.
  #[must_use]
  pub fn describe(self) -> &'static str {
    match self {
      Self::Whitespace => "whitespace",
      Self::Comment => "a comment",
      Self::Id => "an identifier",
      Self::Number => "a number",
      Self::DoubleQuotedString
      | Self::SingleQuotedString
      | Self::DoubleQuotedVerbatim
      | Self::SingleQuotedVerbatim
      | Self::TextBlock => "a string",
      Self::AssertKw => "`assert`",
      Self::ElseKw => "`else`",
      Self::ErrorKw => "`error`",
      Self::FalseKw => "`false`",
      Self::ForKw => "`for`",
      Self::FunctionKw => "`function`",
      Self::IfKw => "`if`",
      Self::ImportKw => "`import`",
      Self::ImportstrKw => "`importstr`",
      Self::InKw => "`in`",
      Self::LocalKw => "`local`",
      Self::NullKw => "`null`",
      Self::SelfKw => "`self`",
      Self::SuperKw => "`super`",
      Self::TailstrictKw => "`tailstrict`",
      Self::ThenKw => "`then`",
      Self::TrueKw => "`true`",
      Self::LCurly => "`{`",
      Self::RCurly => "`}`",
      Self::LSquare => "`[`",
      Self::RSquare => "`]`",
      Self::LRound => "`(`",
      Self::RRound => "`)`",
      Self::Comma => "`,`",
      Self::Dot => "`.`",
      Self::Semicolon => "`;`",
      Self::Dollar => "`$`",
      Self::ColonColonColon => "`:::`",
      Self::ColonColon => "`::`",
      Self::Colon => "`:`",
      Self::EqEq => "`==`",
      Self::Eq => "`=`",
      Self::BangEq => "`!=`",
      Self::Bang => "`!`",
      Self::LtEq => "`<=`",
      Self::LtLt => "`<<`",
      Self::Lt => "`<`",
      Self::GtEq => "`>=`",
      Self::GtGt => "`>>`",
      Self::Gt => "`>`",
      Self::AndAnd => "`&&`",
      Self::And => "`&`",
      Self::BarBar => "`||`",
      Self::Bar => "`|`",
      Self::Plus => "`+`",
      Self::Minus => "`-`",
      Self::Star => "`*`",
      Self::Slash => "`/`",
      Self::Percent => "`%`",
      Self::Carat => "`^`",
      Self::Tilde => "`~`",
    }
  }
}

/// A token: a kind plus the byte range of its text.
#[derive(Debug, Clone, Copy)]
pub struct Token {
  /// The kind.
  pub kind: TokenKind,
  /// The range.
  pub range: TextRange,
}

/// Transforms a string into tokens, skipping whitespace and comments.
///
/// # Errors
///
/// On the first lexical error.
pub fn get(file: FileId, s: &str) -> Result<Vec<Token>, Error> {
  let mut st = st::St::new(file, s);
  let mut ret = Vec::<Token>::new();
  while let Some(b) = st.cur() {
    let start = st.mark();
    let kind = internal::token(&mut st, b);
    if let Some(e) = st.take_err() {
      return Err(e);
    }
    if !kind.is_trivia() {
      ret.push(Token { kind, range: st.range_since(start) });
    }
  }
  Ok(ret)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(s: &str) -> Vec<TokenKind> {
    let mut map = sonnet_source::SourceMap::default();
    let file = map.insert("t.jsonnet".into(), s.to_owned());
    get(file, s).expect("lex error").into_iter().map(|t| t.kind).collect()
  }

  #[test]
  fn greedy_ops() {
    assert_eq!(kinds("a == b"), [TokenKind::Id, TokenKind::EqEq, TokenKind::Id]);
    assert_eq!(kinds("1 << 2"), [TokenKind::Number, TokenKind::LtLt, TokenKind::Number]);
    assert_eq!(
      kinds("a ::: b"),
      [TokenKind::Id, TokenKind::ColonColonColon, TokenKind::Id]
    );
  }

  #[test]
  fn comments() {
    assert_eq!(
      kinds("1 // x\n# y\n/* z */ 2"),
      [TokenKind::Number, TokenKind::Number]
    );
  }

  #[test]
  fn strings() {
    let s = "\"a\\n\" 'b' @\"c\"\"d\" |||\n  e\n|||";
    assert_eq!(kinds(s), [
      TokenKind::DoubleQuotedString,
      TokenKind::SingleQuotedString,
      TokenKind::DoubleQuotedVerbatim,
      TokenKind::TextBlock,
    ]);
  }

  #[test]
  fn keywords() {
    assert_eq!(
      kinds("self tailstrict selfish"),
      [TokenKind::SelfKw, TokenKind::TailstrictKw, TokenKind::Id]
    );
  }

  #[test]
  fn leading_zero() {
    let mut map = sonnet_source::SourceMap::default();
    let file = map.insert("t.jsonnet".into(), "077".to_owned());
    assert!(get(file, "077").is_err());
  }
}
