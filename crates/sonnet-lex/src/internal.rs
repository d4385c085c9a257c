//! The internal impl.

use crate::error::Kind;
use crate::st::St;
use crate::TokenKind as TK;

pub(crate) fn token(st: &mut St<'_>, b: u8) -> TK {
  if is_ws(b) {
    st.bump();
    st.advance_while(is_ws);
    return TK::Whitespace;
  }
  if b == b'#' {
    st.bump();
    st.advance_while(|b| b != b'\n');
    return TK::Comment;
  }
  if b == b'/' {
    st.bump();
    match st.cur() {
      Some(b'/') => {
        st.bump();
        st.advance_while(|b| b != b'\n');
        return TK::Comment;
      }
      Some(b'*') => {
        st.bump();
        let Some(mut prev) = st.cur() else {
          st.err(Kind::UnclosedComment);
          return TK::Comment;
        };
        st.bump();
        while let Some(cur) = st.cur() {
          st.bump();
          if prev == b'*' && cur == b'/' {
            return TK::Comment;
          }
          prev = cur;
        }
        st.err(Kind::UnclosedComment);
        return TK::Comment;
      }
      Some(_) | None => return TK::Slash,
    }
  }
  // before the punctuation table, since that contains `||` and `|`.
  if st.eat_prefix(b"|||") {
    let scan = sonnet_escape::block(st.rest());
    st.finish_scan(&scan);
    return TK::TextBlock;
  }
  if let Some(&(_, tk)) = TK::PUNCTUATION.iter().find(|&&(bs, _)| st.eat_prefix(bs)) {
    return tk;
  }
  if b.is_ascii_alphabetic() || b == b'_' {
    let start = st.mark();
    st.bump();
    st.advance_while(|b| b.is_ascii_alphanumeric() || b == b'_');
    return TK::keyword(st.since(start)).unwrap_or(TK::Id);
  }
  if b.is_ascii_digit() {
    st.bump();
    let m = st.mark();
    st.advance_while(|b| b.is_ascii_digit());
    if st.did_advance_since(m) && b == b'0' {
      st.err(Kind::LeadingZero);
    }
    if let Some(b'.') = st.cur() {
      st.bump();
      digits(st);
    }
    if let Some(b'e' | b'E') = st.cur() {
      st.bump();
      if let Some(b'-' | b'+') = st.cur() {
        st.bump();
      }
      digits(st);
    }
    return TK::Number;
  }
  if b == b'"' || b == b'\'' {
    st.bump();
    let scan = sonnet_escape::quoted(st.rest(), b);
    st.finish_scan(&scan);
    return if b == b'"' { TK::DoubleQuotedString } else { TK::SingleQuotedString };
  }
  if b == b'@' {
    st.bump();
    let Some(delim @ (b'"' | b'\'')) = st.cur() else {
      st.err(Kind::InvalidVerbatimDelim);
      return TK::DoubleQuotedVerbatim;
    };
    st.bump();
    let scan = sonnet_escape::raw(st.rest(), delim);
    st.finish_scan(&scan);
    return if delim == b'"' { TK::DoubleQuotedVerbatim } else { TK::SingleQuotedVerbatim };
  }
  st.err(Kind::InvalidBytes);
  st.bump();
  TK::Whitespace
}

fn digits(st: &mut St<'_>) {
  let m = st.mark();
  st.advance_while(|b| b.is_ascii_digit());
  if !st.did_advance_since(m) {
    st.err(Kind::NeedDigits);
  }
}

fn is_ws(b: u8) -> bool {
  matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}
