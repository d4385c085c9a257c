//! Small programs exercising one feature at a time.

use crate::check::check;

#[test]
fn null() {
  check("null", "null");
}

#[test]
fn bools() {
  check("true", "true");
  check("false", "false");
}

#[test]
fn numbers() {
  check("0", "0");
  check("42", "42");
  check("2.5", "2.5");
  check("1e2", "100");
  check("1.5e-1", "0.15");
}

#[test]
fn strings() {
  check(r#""hi""#, r#""hi""#);
  check("'hi'", r#""hi""#);
  check(r#""a\nb""#, r#""a\nb""#);
}

#[test]
fn arrays() {
  check("[]", "[]");
  check("[1, 2, 3]", "[1, 2, 3]");
  check("[1, [2, null], true]", "[1, [2, null], true]");
  check("[1, 2, 3,]", "[1, 2, 3]");
}

#[test]
fn parens() {
  check("(1 + 2) * 3", "9");
}

#[test]
fn comments() {
  check("1 // line\n+ 2", "3");
  check("# hash\n7", "7");
  check("/* block\n comment */ 3", "3");
}

#[test]
fn if_else() {
  check("if 1 < 2 then 'yes' else 'no'", r#""yes""#);
  check("if 1 > 2 then 'yes' else 'no'", r#""no""#);
}

#[test]
fn if_without_else_is_null() {
  check("if false then 1", "null");
}

#[test]
fn local_chain() {
  check("local a = 1, b = a + 1; a + b", "3");
  check("local a = 1; local b = a + 1; [a, b]", "[1, 2]");
}

#[test]
fn mutual_recursion() {
  check(
    "local even(n) = if n == 0 then true else odd(n - 1),
           odd(n) = if n == 0 then false else even(n - 1);
     [even(4), odd(4)]",
    "[true, false]",
  );
}

#[test]
fn error_expr() {
  crate::check::check_err(r#"error "boom""#, "boom");
}

#[test]
fn assert_expr() {
  check("assert 1 == 1; 2", "2");
  crate::check::check_err(r#"assert 1 == 2 : "nope"; 2"#, "nope");
  crate::check::check_err("assert false; 2", "assertion failed");
}
