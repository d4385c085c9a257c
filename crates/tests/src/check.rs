//! The test harness: run the whole pipeline over in-memory files.

use pretty_assertions::assert_eq;
use sonnet::{evaluate, Json, MemImportHook, Options, Output};
use std::path::Path;

pub(crate) fn run(files: &[(&str, &str)], src: &str) -> Output {
  let hook = MemImportHook::new(files.iter().copied());
  evaluate(Path::new("input.jsonnet"), src, &hook, Options::default())
}

pub(crate) fn manifest_with(files: &[(&str, &str)], src: &str) -> Json {
  let out = run(files, src);
  match out.result {
    Ok(json) => json,
    Err(e) => panic!("evaluate error: {}", e.display(&out.sources)),
  }
}

pub(crate) fn manifest(src: &str) -> Json {
  manifest_with(&[], src)
}

/// checks that `src` manifests as the JSON `want`.
pub(crate) fn check(src: &str, want: &str) {
  check_with(&[], src, want);
}

pub(crate) fn check_with(files: &[(&str, &str)], src: &str, want: &str) {
  let want: serde_json::Value = serde_json::from_str(want).expect("want should be valid JSON");
  let want = Json::from_serde(&want);
  let got = manifest_with(files, src);
  assert_eq!(want, got);
}

/// checks that evaluating `src` fails and the rendered error contains `want`.
pub(crate) fn check_err(src: &str, want: &str) {
  check_err_with(&[], src, want);
}

pub(crate) fn check_err_with(files: &[(&str, &str)], src: &str, want: &str) {
  let out = run(files, src);
  match out.result {
    Ok(json) => panic!("expected an error, got: {}", json.display()),
    Err(e) => {
      let msg = e.display(&out.sources).to_string();
      assert!(msg.contains(want), "error should contain `{want}`, got: {msg}");
    }
  }
}
