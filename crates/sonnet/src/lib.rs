//! A Jsonnet interpreter.
//!
//! The pipeline: lex and parse each file into a surface tree, desugar it to the core calculus,
//! resolve and recursively load its imports, then evaluate call-by-need and manifest the result
//! as JSON. This crate is the front door: it owns the import hook, the per-file cache, and the
//! rendering of every stage's errors.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]

use rustc_hash::FxHashMap;
use sonnet_core::ExprData;
use sonnet_eval::FileArt;
use sonnet_source::FileId;
use std::fmt;
use std::path::{Component, Path, PathBuf};

pub use sonnet_eval::{HostFns, Json, Options};
pub use sonnet_source::{SourceMap, Span};

/// Loads imported files.
///
/// Hosts may substitute their own, e.g. an in-memory one for tests. The returned path must be
/// canonical: two imports that name the same file must return the same path, so the file is
/// parsed and evaluated once.
pub trait ImportHook {
  /// Resolves `path` relative to `caller_dir`, returning the canonical path and the contents.
  ///
  /// # Errors
  ///
  /// If the file could not be resolved or read.
  fn load(&self, caller_dir: &Path, path: &Path) -> std::io::Result<(PathBuf, String)>;
}

/// An import hook that reads the real file system.
#[derive(Debug, Default)]
pub struct FsImportHook;

impl ImportHook for FsImportHook {
  fn load(&self, caller_dir: &Path, path: &Path) -> std::io::Result<(PathBuf, String)> {
    let joined = if path.is_absolute() { path.to_owned() } else { caller_dir.join(path) };
    let canonical = joined.canonicalize()?;
    let contents = std::fs::read_to_string(&canonical)?;
    Ok((canonical, contents))
  }
}

/// An in-memory import hook.
#[derive(Debug, Default)]
pub struct MemImportHook {
  files: FxHashMap<PathBuf, String>,
}

impl MemImportHook {
  /// Returns a hook serving the given files.
  #[must_use]
  pub fn new<I, P, S>(files: I) -> Self
  where
    I: IntoIterator<Item = (P, S)>,
    P: Into<PathBuf>,
    S: Into<String>,
  {
    let files =
      files.into_iter().map(|(p, s)| (normalize(&p.into()), s.into())).collect();
    Self { files }
  }
}

impl ImportHook for MemImportHook {
  fn load(&self, caller_dir: &Path, path: &Path) -> std::io::Result<(PathBuf, String)> {
    let joined = if path.is_absolute() { path.to_owned() } else { caller_dir.join(path) };
    let normal = normalize(&joined);
    match self.files.get(&normal) {
      Some(contents) => Ok((normal, contents.clone())),
      None => Err(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("no such file: {}", normal.display()),
      )),
    }
  }
}

/// lexically removes `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
  let mut ret = PathBuf::new();
  for c in path.components() {
    match c {
      Component::CurDir => {}
      Component::ParentDir => {
        if !ret.pop() {
          ret.push(c.as_os_str());
        }
      }
      c => ret.push(c.as_os_str()),
    }
  }
  ret
}

/// An error from any stage of the pipeline.
#[derive(Debug)]
pub enum Error {
  /// A lexical error.
  Lex(sonnet_lex::Error),
  /// A syntax error.
  Parse(sonnet_parse::Error),
  /// An I/O failure resolving an import.
  Import {
    /// The span of the `import` expression, if there is one.
    span: Option<Span>,
    /// The path that failed to resolve.
    path: PathBuf,
    /// The underlying I/O error.
    message: String,
  },
  /// An evaluation or manifestation error.
  Eval(sonnet_eval::error::Error),
}

impl Error {
  /// The error kind, for diagnostics and exit reporting.
  #[must_use]
  pub fn kind_str(&self) -> &'static str {
    match self {
      Error::Lex(_) | Error::Parse(_) => "parse error",
      Error::Import { .. } => "import error",
      Error::Eval(e) => match e.class() {
        sonnet_eval::error::Class::Type => "type error",
        sonnet_eval::error::Class::Runtime => "runtime error",
        sonnet_eval::error::Class::InfiniteLoop => "infinite loop",
        sonnet_eval::error::Class::InfiniteManifest => "infinite manifest",
      },
    }
  }

  /// The primary span, if there is one.
  #[must_use]
  pub fn span(&self) -> Option<Span> {
    match self {
      Error::Lex(e) => Some(e.span()),
      Error::Parse(e) => Some(e.span()),
      Error::Import { span, .. } => *span,
      Error::Eval(e) => Some(e.span()),
    }
  }

  /// Returns something that displays this with file/line/column positions.
  #[must_use]
  pub fn display<'a>(&'a self, sources: &'a SourceMap) -> impl fmt::Display + 'a {
    DisplayError { error: self, sources }
  }
}

struct DisplayError<'a> {
  error: &'a Error,
  sources: &'a SourceMap,
}

impl fmt::Display for DisplayError<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.error {
      Error::Lex(e) => {
        write!(f, "parse error: {e}")?;
        write!(f, "\n  at {}", self.sources.display_span(e.span()))
      }
      Error::Parse(e) => {
        write!(f, "parse error: {e}")?;
        write!(f, "\n  at {}", self.sources.display_span(e.span()))
      }
      Error::Import { span, path, message } => {
        write!(f, "import error: {}: {message}", path.display())?;
        if let Some(span) = span {
          write!(f, "\n  at {}", self.sources.display_span(*span))?;
        }
        Ok(())
      }
      Error::Eval(e) => {
        write!(f, "{}: {e}", self.error.kind_str())?;
        write!(f, "\n  at {}", self.sources.display_span(e.span()))?;
        for &frame in e.trace().iter().rev() {
          write!(f, "\n  at {}", self.sources.display_span(frame))?;
        }
        Ok(())
      }
    }
  }
}

/// The result of an evaluation: the loaded sources (for rendering spans) and the outcome.
#[derive(Debug)]
pub struct Output {
  /// Every source file touched.
  pub sources: SourceMap,
  /// The manifested JSON, or the first error.
  pub result: Result<Json, Error>,
}

/// Evaluates `source` as the contents of the file at `path`, loading imports through `hook`.
#[must_use]
pub fn evaluate(path: &Path, source: &str, hook: &dyn ImportHook, options: Options) -> Output {
  evaluate_with_host_fns(path, source, hook, options, &HostFns::default())
}

/// Like [`evaluate`], with extra host-injected native functions bound at the root environment.
#[must_use]
pub fn evaluate_with_host_fns(
  path: &Path,
  source: &str,
  hook: &dyn ImportHook,
  options: Options,
  host_fns: &HostFns,
) -> Output {
  let mut sources = SourceMap::default();
  let mut files = FxHashMap::<FileId, FileArt>::default();
  let mut str_files = FxHashMap::<FileId, String>::default();
  let result = load(&mut sources, &mut files, &mut str_files, hook, path, source).and_then(
    |entry| {
      let cx = sonnet_eval::Cx { files: &files, str_files: &str_files, host_fns };
      sonnet_eval::get(cx, entry, options).map_err(Error::Eval)
    },
  );
  Output { sources, result }
}

/// Evaluates the file at `path`, reading it (and its imports) through `hook`.
#[must_use]
pub fn evaluate_file(path: &Path, hook: &dyn ImportHook, options: Options) -> Output {
  let dot = PathBuf::from(".");
  match hook.load(&dot, path) {
    Ok((canonical, contents)) => evaluate(&canonical, &contents, hook, options),
    Err(e) => Output {
      sources: SourceMap::default(),
      result: Err(Error::Import { span: None, path: path.to_owned(), message: e.to_string() }),
    },
  }
}

/// Parses, desugars, and records `source` and every file it transitively imports. Returns the
/// entry file's id.
fn load(
  sources: &mut SourceMap,
  files: &mut FxHashMap<FileId, FileArt>,
  str_files: &mut FxHashMap<FileId, String>,
  hook: &dyn ImportHook,
  path: &Path,
  source: &str,
) -> Result<FileId, Error> {
  let entry = sources.insert(path.to_owned(), source.to_owned());
  let mut todo = vec![entry];
  while let Some(file) = todo.pop() {
    if files.contains_key(&file) {
      continue;
    }
    log::debug!("loading {}", sources.path(file).display());
    let text = sources.text(file).to_owned();
    let tokens = sonnet_lex::get(file, &text).map_err(Error::Lex)?;
    let ast = sonnet_parse::get(file, &text, &tokens).map_err(Error::Parse)?;
    let desugar = sonnet_desugar::get(ast);
    let caller_dir = sources.path(file).parent().unwrap_or_else(|| Path::new("")).to_owned();
    let mut imports = FxHashMap::<sonnet_core::ExprMust, FileId>::default();
    for (e, data) in desugar.arenas.expr.iter() {
      let ExprData::Import { kind, path: import_path } = data else { continue };
      let rel = desugar.arenas.str.get(*import_path);
      let span = desugar.arenas.expr.span(e);
      let loaded = hook.load(&caller_dir, Path::new(rel)).map_err(|io_err| Error::Import {
        span: Some(span),
        path: PathBuf::from(rel),
        message: io_err.to_string(),
      })?;
      let (canonical, contents) = loaded;
      let id = sources.insert(canonical, contents);
      imports.insert(e, id);
      match kind {
        sonnet_core::ImportKind::Code => todo.push(id),
        sonnet_core::ImportKind::String => {
          str_files.insert(id, sources.text(id).to_owned());
        }
      }
    }
    files.insert(file, FileArt { arenas: desugar.arenas, top: desugar.top, imports });
  }
  log::debug!("loaded {} files", files.len());
  Ok(entry)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_paths() {
    assert_eq!(normalize(Path::new("a/./b/../c.jsonnet")), PathBuf::from("a/c.jsonnet"));
    assert_eq!(normalize(Path::new("./x.jsonnet")), PathBuf::from("x.jsonnet"));
  }
}
