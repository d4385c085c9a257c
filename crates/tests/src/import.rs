//! Imports: resolution, caching, laziness, `importstr`.

use crate::check::{check_err_with, check_with};

#[test]
fn simple() {
  check_with(&[("a.jsonnet", "1 + 2")], r#"import "a.jsonnet""#, "3");
}

#[test]
fn chained() {
  check_with(
    &[
      ("a.jsonnet", r#"(import "b.jsonnet") + 1"#),
      ("b.jsonnet", "10"),
    ],
    r#"import "a.jsonnet""#,
    "11",
  );
}

#[test]
fn relative_to_importer() {
  check_with(
    &[
      ("lib/a.jsonnet", r#"import "b.jsonnet""#),
      ("lib/b.jsonnet", "5"),
    ],
    r#"import "lib/a.jsonnet""#,
    "5",
  );
}

#[test]
fn diamond_shares_one_evaluation() {
  // both importers see the same file; it parses and evaluates once, so the results are
  // identical objects.
  check_with(
    &[
      ("shared.jsonnet", "{ v: 1 }"),
      ("left.jsonnet", r#"(import "shared.jsonnet").v"#),
      ("right.jsonnet", r#"(import "shared.jsonnet").v"#),
    ],
    r#"(import "left.jsonnet") + (import "right.jsonnet")"#,
    "2",
  );
}

#[test]
fn import_object_fields() {
  check_with(
    &[("obj.jsonnet", "{ a: 1, b:: 2 }")],
    r#"local o = import "obj.jsonnet"; [o.a, o.b]"#,
    "[1, 2]",
  );
}

#[test]
fn importstr() {
  check_with(
    &[("data.txt", "raw contents\n")],
    r#"importstr "data.txt""#,
    r#""raw contents\n""#,
  );
}

#[test]
fn importstr_is_not_parsed() {
  check_with(
    &[("data.txt", "this is ; not ( jsonnet")],
    r#"std.length(importstr "data.txt")"#,
    "23",
  );
}

#[test]
fn mutually_recursive_files_ok_when_lazy() {
  // the files import each other, but no value depends on itself.
  check_with(
    &[
      ("a.jsonnet", r#"local b = import "b.jsonnet"; { x: 1, y: b.x }"#),
      ("b.jsonnet", r#"local a = import "a.jsonnet"; { x: 2, unused:: a.y }"#),
    ],
    r#"(import "a.jsonnet").y"#,
    "2",
  );
}

#[test]
fn circular_value_dependency_detected() {
  check_err_with(
    &[
      ("a.jsonnet", r#"(import "b.jsonnet") + 1"#),
      ("b.jsonnet", r#"(import "a.jsonnet") + 1"#),
    ],
    r#"import "a.jsonnet""#,
    "infinite loop",
  );
}

#[test]
fn missing_file() {
  check_err_with(&[], r#"import "nope.jsonnet""#, "import error");
}

#[test]
fn missing_file_has_span() {
  check_err_with(&[], r#"import "nope.jsonnet""#, "input.jsonnet:1:1");
}

#[test]
fn parse_error_in_import() {
  check_err_with(&[("bad.jsonnet", "1 +")], r#"import "bad.jsonnet""#, "parse error");
}
