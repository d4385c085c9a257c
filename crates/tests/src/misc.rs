//! Cross-cutting properties: determinism, output format, limits, diagnostics.

use crate::check::{check, check_err, manifest, run};
use pretty_assertions::assert_eq;
use sonnet::Json;

#[test]
fn determinism() {
  let src = r#"
local mk(n) = { ["k" + std.toString(i)]: i * n for i in std.range(0, 9) };
mk(3) + { extra: [x for x in std.range(0, 5) if x % 2 == 0] }
"#;
  let a = manifest(src).display().to_string();
  let b = manifest(src).display().to_string();
  assert_eq!(a, b);
}

#[test]
fn idempotent_manifestation() {
  let src = r#"{ a: [1, 2.5, "s", null, true], b: { c: {} } }"#;
  let json = manifest(src);
  let text = json.display().to_string();
  let reparsed: serde_json::Value = serde_json::from_str(&text).expect("output is valid JSON");
  assert_eq!(json, Json::from_serde(&reparsed));
}

#[test]
fn compact_output_is_valid_json() {
  let json = manifest(r#"{ a: [1, 2], b: "x\"y", c: {} }"#);
  let text = json.display_compact().to_string();
  let _: serde_json::Value = serde_json::from_str(&text).expect("output is valid JSON");
}

#[test]
fn pretty_format() {
  assert_eq!(manifest("{}").display().to_string(), "{}");
  assert_eq!(manifest("[]").display().to_string(), "[]");
  assert_eq!(manifest("{ a: 1 }").display().to_string(), "{\n  \"a\": 1\n}");
  assert_eq!(manifest("[1, 2]").display().to_string(), "[\n  1,\n  2\n]");
}

#[test]
fn integral_numbers_print_without_fraction() {
  assert_eq!(manifest("4 / 2").display().to_string(), "2");
  assert_eq!(manifest("8").display().to_string(), "8");
  assert_eq!(manifest("2.5 + 2.5").display().to_string(), "5");
}

#[test]
fn string_escapes_in_output() {
  assert_eq!(
    manifest(r#""a\nb\tc""#).display().to_string(),
    "\"a\\nb\\tc\""
  );
}

#[test]
fn fields_manifest_sorted() {
  assert_eq!(
    manifest("{ b: 1, a: 2 }").display_compact().to_string(),
    r#"{"a": 2, "b": 1}"#
  );
}

#[test]
fn too_deep_recursion_is_an_error() {
  check_err("local f(n) = if n == 0 then 0 else f(n - 1) + 0; f(100000)", "too deep");
}

#[test]
fn reasonable_recursion_is_fine() {
  check("local f(n) = if n == 0 then 0 else f(n - 1) + 1; f(30)", "30");
}

#[test]
fn self_outside_object() {
  check_err("self.a", "`self` used outside an object");
}

#[test]
fn dollar_outside_object() {
  check_err("$.a", "`$` used outside an object");
}

#[test]
fn super_outside_object() {
  check_err("super.a", "`super` used outside an object");
}

#[test]
fn bare_super_is_a_parse_error() {
  check_err("local x = super; 1", "`super` must be followed by");
}

#[test]
fn undefined_variable() {
  check_err("nope", "undefined variable");
}

#[test]
fn trailing_tokens_are_a_parse_error() {
  check_err("1 2", "trailing");
}

#[test]
fn errors_have_positions() {
  let out = run(&[], "local x = 1;\nx + null");
  let err = out.result.expect_err("should fail");
  let msg = err.display(&out.sources).to_string();
  assert!(msg.contains("input.jsonnet:2:"), "got: {msg}");
}

#[test]
fn errors_have_traces() {
  let out = run(&[], "local f(x) = x + null;\nlocal g(x) = f(x);\ng(1)");
  let err = out.result.expect_err("should fail");
  let msg = err.display(&out.sources).to_string();
  // the error site and both application sites.
  assert!(msg.contains("input.jsonnet:1:14"), "got: {msg}");
  assert!(msg.contains("input.jsonnet:2:14"), "got: {msg}");
  assert!(msg.contains("input.jsonnet:3:1"), "got: {msg}");
}

#[test]
fn infinite_manifest_detected() {
  check_err("local x = { a: x }; x", "cycle during manifestation");
}
