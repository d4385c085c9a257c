//! Operators.

use crate::check::{check, check_err};

#[test]
fn arithmetic() {
  check("1 + 2 * 3", "7");
  check("(1 + 2) * 3", "9");
  check("10 - 4 - 3", "3");
  check("7 / 2", "3.5");
  check("7 % 3", "1");
  check("-7 % 3", "-1");
}

#[test]
fn divide_by_zero() {
  check_err("1 / 0", "division by zero");
  check_err("1 % 0", "division by zero");
}

#[test]
fn unary() {
  check("-3", "-3");
  check("+3", "3");
  check("!true", "false");
  check("~5", "-6");
  check("--3", "3");
}

#[test]
fn bitwise() {
  check("6 & 3", "2");
  check("6 | 3", "7");
  check("6 ^ 3", "5");
  check("1 << 4", "16");
  check("256 >> 4", "16");
}

#[test]
fn comparison() {
  check("1 < 2", "true");
  check("2 <= 2", "true");
  check("3 > 4", "false");
  check("4 >= 4", "true");
  check(r#""abc" < "abd""#, "true");
  check("[1, 2] < [1, 3]", "true");
}

#[test]
fn comparison_wrong_types() {
  check_err("1 < \"2\"", "incompatible types");
  check_err("true < false", "incompatible types");
}

#[test]
fn equality() {
  check("1 == 1", "true");
  check("1 != 2", "true");
  check(r#""a" == "a""#, "true");
  check("[1, [2]] == [1, [2]]", "true");
  check("{a: 1} == {a: 1}", "true");
  check("{a: 1} == {a: 2}", "false");
  check("1 == \"1\"", "false");
  check("null == null", "true");
}

#[test]
fn functions_equal_nothing() {
  check("local f(x) = x; f == f", "false");
}

#[test]
fn logic_short_circuits() {
  check("false && (1 / 0 == 0)", "false");
  check("true || (1 / 0 == 0)", "true");
  check("true && false", "false");
  check_err("1 && true", "incompatible types");
}

#[test]
fn string_concat_coerces() {
  check(r#""n = " + 2"#, r#""n = 2""#);
  check(r#"1 + "x""#, r#""1x""#);
  check(r#""v: " + [1, 2]"#, r#""v: [1, 2]""#);
  check(r#""o: " + {a: 1}"#, r#""o: {\"a\": 1}""#);
}

#[test]
fn array_concat() {
  check("[1] + [2, 3]", "[1, 2, 3]");
}

#[test]
fn add_wrong_types() {
  check_err("1 + null", "incompatible types");
  check_err("true + true", "incompatible types");
}

#[test]
fn in_op() {
  check(r#""a" in {a: 1}"#, "true");
  check(r#""b" in {a: 1}"#, "false");
  check(r#""h" in {h:: 1}"#, "true");
}

#[test]
fn precedence_mix() {
  check("1 + 2 == 3 && 4 < 5", "true");
  check("1 << 2 + 1", "8");
  check("3 | 1 & 2", "3");
}
