//! The lexer state: a byte cursor that records the first error.

use crate::error::{Error, Kind};
use sonnet_source::{FileId, Span};
use text_size::{TextRange, TextSize};

#[derive(Debug)]
pub(crate) struct St<'a> {
  file: FileId,
  bytes: &'a [u8],
  idx: usize,
  err: Option<Error>,
}

impl<'a> St<'a> {
  pub(crate) fn new(file: FileId, s: &'a str) -> Self {
    Self { file, bytes: s.as_bytes(), idx: 0, err: None }
  }

  pub(crate) fn cur(&self) -> Option<u8> {
    self.bytes.get(self.idx).copied()
  }

  pub(crate) fn bump(&mut self) {
    self.idx += 1;
  }

  pub(crate) fn mark(&self) -> usize {
    self.idx
  }

  pub(crate) fn did_advance_since(&self, mark: usize) -> bool {
    self.idx > mark
  }

  pub(crate) fn advance_while(&mut self, p: fn(u8) -> bool) {
    while self.cur().is_some_and(p) {
      self.bump();
    }
  }

  pub(crate) fn eat_prefix(&mut self, prefix: &[u8]) -> bool {
    if self.bytes[self.idx.min(self.bytes.len())..].starts_with(prefix) {
      self.idx += prefix.len();
      true
    } else {
      false
    }
  }

  pub(crate) fn since(&self, mark: usize) -> &[u8] {
    &self.bytes[mark..self.idx]
  }

  /// the unconsumed bytes, for handing off to a string scanner.
  pub(crate) fn rest(&self) -> &'a [u8] {
    &self.bytes[self.idx..]
  }

  /// records a scan's errors (at offsets relative to the current position) and consumes its
  /// length.
  pub(crate) fn finish_scan(&mut self, scan: &sonnet_escape::Scan) {
    for &(off, e) in &scan.errors {
      self.err_at(self.idx + off, Kind::Escape(e));
    }
    self.idx += scan.len;
  }

  pub(crate) fn range_since(&self, mark: usize) -> TextRange {
    let start = u32::try_from(mark).expect("offset overflow");
    let end = u32::try_from(self.idx).expect("offset overflow");
    TextRange::new(TextSize::from(start), TextSize::from(end))
  }

  /// records an error at the current byte. only the first error is kept.
  pub(crate) fn err(&mut self, kind: Kind) {
    self.err_at(self.idx, kind);
  }

  pub(crate) fn err_at(&mut self, idx: usize, kind: Kind) {
    if self.err.is_none() {
      let end = (idx + 1).min(self.bytes.len().max(1));
      let start = idx.min(end - 1);
      self.err = Some(Error { span: Span::new(self.file, start, end), kind });
    }
  }

  pub(crate) fn take_err(&mut self) -> Option<Error> {
    self.err.take()
  }
}
