//! Functions: literals, application, defaults, named arguments, closures.

use crate::check::{check, check_err};

#[test]
fn apply() {
  check("((function(x) x * x)(5)) == 25", "true");
  check("(function() 7)()", "7");
}

#[test]
fn local_fn_sugar() {
  check("local max(a, b) = if a > b then a else b; max(4, 8)", "8");
}

#[test]
fn closures() {
  check("local add(a) = function(b) a + b; add(2)(3)", "5");
  check("local mk(n) = { v: n }; [mk(1).v, mk(2).v]", "[1, 2]");
}

#[test]
fn recursion() {
  check(
    "local fib(n) = if n < 2 then n else fib(n - 1) + fib(n - 2); fib(10)",
    "55",
  );
}

#[test]
fn defaults() {
  check("local f(a, b=10) = a + b; f(1)", "11");
  check("local f(a, b=10) = a + b; f(1, 2)", "3");
  // a default may refer to another parameter.
  check("local f(a, b=a+1) = [a, b]; f(1)", "[1, 2]");
}

#[test]
fn defaults_are_lazy() {
  check(r#"local f(a, b=error "unused") = a; f(1)"#, "1");
}

#[test]
fn named_args() {
  check("local f(a, b) = a - b; f(b=1, a=10)", "9");
  check("local f(a, b) = a - b; f(10, b=1)", "9");
}

#[test]
fn named_arg_errors() {
  check_err("local f(a) = a; f(b=1)", "no such argument");
  check_err("local f(a, b) = a; f(1, a=2)", "duplicate argument");
}

#[test]
fn arity_errors() {
  check_err("local f(a) = a; f(1, 2)", "too many arguments");
  check_err("local f(a, b) = a; f(1)", "missing argument");
}

#[test]
fn not_callable() {
  check_err("(3)(1)", "not callable");
}

#[test]
fn tailstrict_is_accepted() {
  check("(function(x) x)(1) tailstrict", "1");
}

#[test]
fn args_are_lazy() {
  check(r#"local f(a, b) = a; f(1, error "unused")"#, "1");
}

#[test]
fn functions_do_not_manifest() {
  check_err("{ f: function(x) x }", "cannot manifest");
  check_err("function(x) x", "cannot manifest");
}
