//! The standard library subset.

use crate::check::{check, check_err};

#[test]
fn length() {
  check(r#"std.length("hello")"#, "5");
  check("std.length([1, 2, 3])", "3");
  check("std.length({a: 1, b:: 2})", "1");
  check("std.length(function(a, b) a)", "2");
  check("std.length(function(a, b=1) a)", "1");
  check_err("std.length(3)", "incompatible types");
}

#[test]
fn type_() {
  check("std.type(null)", r#""null""#);
  check("std.type(true)", r#""boolean""#);
  check("std.type(3)", r#""number""#);
  check(r#"std.type("s")"#, r#""string""#);
  check("std.type([])", r#""array""#);
  check("std.type({})", r#""object""#);
  check("std.type(function(x) x)", r#""function""#);
}

#[test]
fn make_array() {
  check("std.makeArray(4, function(i) i * i)", "[0, 1, 4, 9]");
  check("std.makeArray(0, function(i) i)", "[]");
}

#[test]
fn filter() {
  check("std.filter(function(x) x > 1, [1, 2, 3])", "[2, 3]");
  check_err("std.filter(function(x) x, [1])", "incompatible types");
}

#[test]
fn map() {
  check("std.map(function(x) x + 1, [1, 2])", "[2, 3]");
}

#[test]
fn folds() {
  check(r#"std.foldl(function(acc, x) acc + x, ["a", "b", "c"], "")"#, r#""abc""#);
  check(r#"std.foldr(function(x, acc) acc + x, ["a", "b", "c"], "")"#, r#""cba""#);
  check("std.foldl(function(acc, x) acc + x, [], 0)", "0");
}

#[test]
fn range() {
  check("std.range(2, 5)", "[2, 3, 4, 5]");
  check("std.range(3, 2)", "[]");
  check("std.range(-1, 1)", "[-1, 0, 1]");
}

#[test]
fn join() {
  check(r#"std.join(", ", ["a", "b"])"#, r#""a, b""#);
  check(r#"std.join("-", [])"#, r#""""#);
  check("std.join([0], [[1], [2]])", "[1, 0, 2]");
  // nulls are skipped.
  check(r#"std.join("-", ["a", null, "b"])"#, r#""a-b""#);
}

#[test]
fn numeric() {
  check("std.abs(-3)", "3");
  check("std.max(1, 2)", "2");
  check("std.min(1, 2)", "1");
}

#[test]
fn chars() {
  check("std.char(65)", r#""A""#);
  check(r#"std.codepoint("A")"#, "65");
}

#[test]
fn to_string() {
  check("std.toString(3)", r#""3""#);
  check(r#"std.toString("s")"#, r#""s""#);
  check("std.toString([1])", r#""[1]""#);
  check("std.toString(null)", r#""null""#);
}

#[test]
fn equals() {
  check("std.equals({a: [1]}, {a: [1]})", "true");
  check("std.equals(1, 2)", "false");
}

#[test]
fn assert_equal() {
  check("std.assertEqual(1 + 1, 2)", "true");
  check_err("std.assertEqual(1, 2)", "1 != 2");
}

#[test]
fn object_has() {
  check(r#"std.objectHas({a: 1, h:: 2}, "a")"#, "true");
  check(r#"std.objectHas({a: 1, h:: 2}, "h")"#, "false");
  check(r#"std.objectHasAll({a: 1, h:: 2}, "h")"#, "true");
}

#[test]
fn object_fields() {
  check("std.objectFields({b: 1, a: 2, h:: 3})", r#"["a", "b"]"#);
  check("std.objectFieldsAll({b: 1, h:: 3})", r#"["b", "h"]"#);
}

#[test]
fn merge_patch() {
  check(
    "std.mergePatch({a: 1, b: {x: 1, y: 2}}, {b: {y: 3}, c: 4})",
    r#"{ "a": 1, "b": { "x": 1, "y": 3 }, "c": 4 }"#,
  );
  // null in the patch removes the field.
  check("std.mergePatch({a: 1, b: 2}, {b: null})", r#"{ "a": 1 }"#);
  check("std.mergePatch({a: 1}, 7)", "7");
}

#[test]
fn manifest_json() {
  check(r#"std.manifestJson({a: 1}) == "{\n  \"a\": 1\n}""#, "true");
}

#[test]
fn named_args() {
  check("std.makeArray(sz=2, func=function(i) i)", "[0, 1]");
  check_err("std.makeArray(sz=2, bogus=3)", "no such argument");
}

#[test]
fn std_is_shadowable() {
  check("local std = {x: 1}; std.x", "1");
}

#[test]
fn std_in_imported_file() {
  crate::check::check_with(
    &[("lib.jsonnet", "std.length([1, 2])")],
    r#"import "lib.jsonnet""#,
    "2",
  );
}
