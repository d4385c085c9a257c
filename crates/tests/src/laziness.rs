//! Call-by-need: what is not demanded is not evaluated, and what is demanded is evaluated once.
//!
//! Evaluation-count properties are observed from outside the language through a host-injected
//! counter function.

use crate::check::{check, check_err};
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

#[test]
fn unused_local_error() {
  check(r#"local _ = error "x"; 1"#, "1");
}

#[test]
fn unused_field_error() {
  check(r#"{a: error "x", b: 1}.b"#, "1");
}

#[test]
fn unused_array_elem_error() {
  check(r#"local xs = [error "x", 2]; xs[1]"#, "2");
}

#[test]
fn unused_branch_error() {
  check(r#"if true then 1 else error "x""#, "1");
}

#[test]
fn demanded_error_fires() {
  check_err(r#"{a: error "x", b: 1}.a"#, "x");
}

#[test]
fn self_cycle_detected() {
  check_err("local x = x; x", "infinite loop");
}

#[test]
fn mutual_cycle_detected() {
  check_err("local a = b, b = a; a", "infinite loop");
}

#[test]
fn self_field_cycle_detected() {
  check_err("{ a: self.a }.a", "infinite loop");
}

#[test]
fn recursive_binding_through_array_ok() {
  // the inner reference is behind a thunk, so tying the knot is fine.
  check("local xs = [1, xs[0] + 1]; xs[1]", "2");
}

#[test]
fn recursive_makearray() {
  check(
    "local arr = std.makeArray(4, function(i) if i == 0 then 1 else arr[i - 1] * 2); arr",
    "[1, 2, 4, 8]",
  );
}

/// evaluates `src` with a host-injected `probe` function that counts its calls and returns its
/// argument, then returns the manifested JSON and the final count.
fn run_with_probe(src: &str) -> (sonnet::Json, u32) {
  let calls = Rc::new(Cell::new(0u32));
  let mut host = sonnet::HostFns::default();
  let counter = Rc::clone(&calls);
  host.insert("probe", move |args| {
    counter.set(counter.get() + 1);
    Ok(args[0].clone())
  });
  let hook = sonnet::MemImportHook::default();
  let out = sonnet::evaluate_with_host_fns(
    Path::new("input.jsonnet"),
    src,
    &hook,
    sonnet::Options::default(),
    &host,
  );
  let json = match out.result {
    Ok(json) => json,
    Err(e) => panic!("evaluate error: {}", e.display(&out.sources)),
  };
  (json, calls.get())
}

#[test]
fn binding_forced_exactly_once() {
  // without memoization, three reads of `x` would call the probe three times.
  let (json, calls) = run_with_probe("local x = probe(7); [x, x, x]");
  let want: serde_json::Value = serde_json::from_str("[7, 7, 7]").expect("valid JSON");
  assert_eq!(sonnet::Json::from_serde(&want), json);
  assert_eq!(calls, 1);
}

#[test]
fn unused_binding_never_forced() {
  let (json, calls) = run_with_probe("local _ = probe(7); 3");
  let want: serde_json::Value = serde_json::from_str("3").expect("valid JSON");
  assert_eq!(sonnet::Json::from_serde(&want), json);
  assert_eq!(calls, 0);
}

#[test]
fn object_field_forced_exactly_once() {
  let (json, calls) = run_with_probe("local o = { a: probe(1) }; o.a + o.a + o.a");
  let want: serde_json::Value = serde_json::from_str("3").expect("valid JSON");
  assert_eq!(sonnet::Json::from_serde(&want), json);
  assert_eq!(calls, 1);
}
