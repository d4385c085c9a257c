//! Objects: literals, `self`/`super`, `+`, visibility, locals, asserts, comprehensions.

use crate::check::{check, check_err};

#[test]
fn empty() {
  check("{}", "{}");
}

#[test]
fn non_empty() {
  check(
    r#"{ num: 1, bool: true, str: "bar", "foo quz": null }"#,
    r#"{ "num": 1, "bool": true, "str": "bar", "foo quz": null }"#,
  );
}

#[test]
fn self_() {
  check("{ a: 3, b: self.a + 1 }", r#"{ "a": 3, "b": 4 }"#);
}

#[test]
fn self_through_local() {
  check("local x = { a: 1, b: self.a + 1 }; x.b", "2");
}

#[test]
fn super_() {
  check(
    r"
local base = {
  a: 3,
  b: self.a + 1,
};
base + {
  a: 5,
  self_a: self.a,
  self_b: self.b,
  super_a: super.a,
  super_b: super.b,
}
",
    r#"
{
  "a": 5,
  "b": 6,
  "self_a": 5,
  "self_b": 6,
  "super_a": 3,
  "super_b": 6
}
"#,
  );
}

#[test]
fn explicit_plus() {
  check("{ a: 1, b: 2 } + { a: 3, c: 4 }", r#"{ "a": 3, "b": 2, "c": 4 }"#);
}

#[test]
fn implicit_plus() {
  check("{ a: 1 } { b: 2 }", r#"{ "a": 1, "b": 2 }"#);
}

#[test]
fn inheritance_late_binding() {
  check(
    "local base = { a: 1, b: self.a }; base + { a: 10 }",
    r#"{ "a": 10, "b": 10 }"#,
  );
}

#[test]
fn three_layers() {
  check(
    "{ a: 1 } + { a: 2 } + { a: super.a + 10, b: super.a }",
    r#"{ "a": 12, "b": 2 }"#,
  );
}

#[test]
fn in_super() {
  check(
    r#"{ a: 1 } + { has_a: "a" in super, has_b: "b" in super }"#,
    r#"{ "a": 1, "has_a": true, "has_b": false }"#,
  );
}

#[test]
fn super_index() {
  check(r#"{ a: 1 } + { b: super["a"] }"#, r#"{ "a": 1, "b": 1 }"#);
}

#[test]
fn hidden_fields() {
  check("{ a: 1, b:: 2 }", r#"{ "a": 1 }"#);
  check("{ a: 1, b:: 2 }.b", "2");
}

#[test]
fn visibility_merge() {
  // a `:` override keeps the hiddenness of the field below it.
  check("{ h:: 1 } + { h: 2 }", "{}");
  check("({ h:: 1 } + { h: 2 }).h", "2");
  // `:::` forces the field visible again.
  check("{ h:: 1 } + { h::: 2 }", r#"{ "h": 2 }"#);
  check("{ v: 1 } + { v:: 2 }", "{}");
}

#[test]
fn field_plus() {
  check("{ a: [1] } + { a+: [2] }", r#"{ "a": [1, 2] }"#);
  check(r#"{ s: "x" } + { s+: "y" }"#, r#"{ "s": "xy" }"#);
  check("{ o: { a: 1 } } + { o+: { b: 2 } }", r#"{ "o": { "a": 1, "b": 2 } }"#);
  // nothing below: plain field.
  check("{ a+: [2] }", r#"{ "a": [2] }"#);
}

#[test]
fn methods() {
  check("{ f(x):: x + 1, y: self.f(2) }", r#"{ "y": 3 }"#);
}

#[test]
fn object_locals() {
  check("{ local two = 2, a: two, b: two * two }", r#"{ "a": 2, "b": 4 }"#);
  check("{ local me = self, a: 1, b: me.a }", r#"{ "a": 1, "b": 1 }"#);
}

#[test]
fn root_dollar() {
  check("{ foo: 1, bar: $.foo + 2 }", r#"{ "foo": 1, "bar": 3 }"#);
  check(
    "{ a: 1, inner: { a: 2, outer_a: $.a, self_a: self.a } }",
    r#"{ "a": 1, "inner": { "a": 2, "outer_a": 1, "self_a": 2 } }"#,
  );
}

#[test]
fn dollar_sees_final_self() {
  check("local base = { a: 1, b: $.a }; base + { a: 5 }", r#"{ "a": 5, "b": 5 }"#);
}

#[test]
fn computed_keys() {
  check(r#"{ ["a" + "b"]: 1 }"#, r#"{ "ab": 1 }"#);
  check(r#"local k = null; { [k]: 1, a: 2 }"#, r#"{ "a": 2 }"#);
  check_err(r#"local k = "a"; { [k]: 1, a: 2 }"#, "duplicate field");
  check_err("{ [3]: 1 }", "incompatible types");
}

#[test]
fn duplicate_literal_keys_rejected_at_parse() {
  check_err("{ a: 1, a: 2 }", "duplicate field");
  check_err(r#"{ a: 1, "a": 2 }"#, "duplicate field");
}

#[test]
fn asserts() {
  check("{ assert self.a > 0, a: 1 }", r#"{ "a": 1 }"#);
  check_err(r#"{ assert self.a > 0 : "must be positive", a: -1 }"#, "must be positive");
  check_err("{ assert false, a: 1 }.a", "assertion failed");
}

#[test]
fn asserts_run_across_merge() {
  check_err("({ assert self.a > 0, a: 1 } + { a: -1 }).a", "assertion failed");
  check("({ assert self.a > 0, a: -1 } + { a: 1 }).a", "1");
}

#[test]
fn comprehension() {
  check(r#"{ [k]: 1 for k in ["a", "b"] }"#, r#"{ "a": 1, "b": 1 }"#);
  check(
    r#"{ [k]: k + "!" for k in ["x", "y"] if k != "y" }"#,
    r#"{ "x": "x!" }"#,
  );
  check_err(r#"{ [k]: 1 for k in ["a", "a"] }"#, "duplicate field");
}

#[test]
fn no_such_field() {
  check_err("{ a: 1 }.b", "no such field");
}

#[test]
fn field_on_non_object() {
  check_err("(3).a", "incompatible types");
}
