//! Source files, spans, and line/column lookup for diagnostics.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]

use rustc_hash::FxHashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use text_size::{TextRange, TextSize};

/// An id for a loaded source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u32);

impl FileId {
  fn from_usize(n: usize) -> Self {
    Self(u32::try_from(n).expect("file id overflow"))
  }

  fn to_usize(self) -> usize {
    usize::try_from(self.0).expect("file id overflow")
  }
}

/// A byte range in a specific file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
  /// The file.
  pub file: FileId,
  /// The byte range.
  pub range: TextRange,
}

impl Span {
  /// Returns a span over the byte range `[start, end)`.
  ///
  /// # Panics
  ///
  /// If the offsets overflow `u32`.
  #[must_use]
  pub fn new(file: FileId, start: usize, end: usize) -> Self {
    let start = u32::try_from(start).expect("span start overflow");
    let end = u32::try_from(end).expect("span end overflow");
    Self { file, range: TextRange::new(TextSize::from(start), TextSize::from(end)) }
  }

  /// Returns the smallest span covering both `self` and `other`.
  ///
  /// Both must be in the same file.
  #[must_use]
  pub fn cover(self, other: Span) -> Self {
    assert_eq!(self.file, other.file, "cover spans from different files");
    Self { file: self.file, range: self.range.cover(other.range) }
  }
}

/// A 1-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
  /// 1-based line.
  pub line: u32,
  /// 1-based column, counted in characters.
  pub col: u32,
}

#[derive(Debug)]
struct SourceFile {
  path: PathBuf,
  text: String,
  /// byte offset of the start of each line.
  line_starts: Vec<TextSize>,
}

/// All loaded source files.
#[derive(Debug, Default)]
pub struct SourceMap {
  files: Vec<SourceFile>,
  id_of: FxHashMap<PathBuf, FileId>,
}

impl SourceMap {
  /// Registers a file, returning its id. Re-registering the same path returns the original id and
  /// keeps the original text.
  pub fn insert(&mut self, path: PathBuf, text: String) -> FileId {
    if let Some(&id) = self.id_of.get(&path) {
      return id;
    }
    let id = FileId::from_usize(self.files.len());
    let line_starts = line_starts(&text);
    self.id_of.insert(path.clone(), id);
    self.files.push(SourceFile { path, text, line_starts });
    id
  }

  /// Returns the id for a previously registered path.
  #[must_use]
  pub fn get_id(&self, path: &Path) -> Option<FileId> {
    self.id_of.get(path).copied()
  }

  /// Returns the path of the file.
  #[must_use]
  pub fn path(&self, file: FileId) -> &Path {
    &self.files[file.to_usize()].path
  }

  /// Returns the text of the file.
  #[must_use]
  pub fn text(&self, file: FileId) -> &str {
    &self.files[file.to_usize()].text
  }

  /// Returns the line/column position of a byte offset in the file.
  #[must_use]
  pub fn position(&self, file: FileId, offset: TextSize) -> Position {
    let f = &self.files[file.to_usize()];
    let line_idx = match f.line_starts.binary_search(&offset) {
      Ok(i) => i,
      Err(i) => i - 1,
    };
    let line_start = f.line_starts[line_idx];
    let col_text = &f.text[usize::from(line_start)..usize::from(offset)];
    let col = u32::try_from(col_text.chars().count()).unwrap_or(u32::MAX);
    Position { line: u32::try_from(line_idx).unwrap_or(u32::MAX) + 1, col: col + 1 }
  }

  /// Returns something that displays the span as `path:line:col-line:col`.
  #[must_use]
  pub fn display_span(&self, span: Span) -> impl fmt::Display + '_ {
    DisplaySpan { map: self, span }
  }
}

fn line_starts(text: &str) -> Vec<TextSize> {
  let mut ret = vec![TextSize::from(0)];
  for (i, b) in text.bytes().enumerate() {
    if b == b'\n' {
      let off = u32::try_from(i + 1).expect("file too large");
      ret.push(TextSize::from(off));
    }
  }
  ret
}

struct DisplaySpan<'a> {
  map: &'a SourceMap,
  span: Span,
}

impl fmt::Display for DisplaySpan<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let begin = self.map.position(self.span.file, self.span.range.start());
    let end = self.map.position(self.span.file, self.span.range.end());
    let path = self.map.path(self.span.file).display();
    write!(f, "{path}:{}:{}-{}:{}", begin.line, begin.col, end.line, end.col)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn positions() {
    let mut map = SourceMap::default();
    let id = map.insert(PathBuf::from("a.jsonnet"), "ab\ncd\n".to_owned());
    assert_eq!(map.position(id, TextSize::from(0)), Position { line: 1, col: 1 });
    assert_eq!(map.position(id, TextSize::from(2)), Position { line: 1, col: 3 });
    assert_eq!(map.position(id, TextSize::from(3)), Position { line: 2, col: 1 });
    assert_eq!(map.position(id, TextSize::from(5)), Position { line: 2, col: 3 });
  }

  #[test]
  fn reinsert_keeps_id() {
    let mut map = SourceMap::default();
    let a = map.insert(PathBuf::from("a.jsonnet"), "1".to_owned());
    let b = map.insert(PathBuf::from("a.jsonnet"), "2".to_owned());
    assert_eq!(a, b);
    assert_eq!(map.text(a), "1");
  }
}
