//! Arrays: literals, indexing, slicing, comprehensions.

use crate::check::{check, check_err};

#[test]
fn indexing() {
  check("[1, 2, 3][0]", "1");
  check("[1, 2, 3][2]", "3");
  check_err("[1, 2, 3][3]", "array index out of range");
  check_err("[1][0.5]", "array index not an integer");
}

#[test]
fn slicing() {
  check("[1, 2, 3, 4, 5][1:4]", "[2, 3, 4]");
  check("[1, 2, 3, 4, 5][1:4:2]", "[2, 4]");
  check("[1, 2, 3][1:]", "[2, 3]");
  check("[1, 2, 3][:2]", "[1, 2]");
  check("[1, 2, 3][:]", "[1, 2, 3]");
  check("[1, 2, 3][2:1]", "[]");
}

#[test]
fn slice_domain() {
  check_err("[1, 2, 3][::0]", "slice index out of domain");
}

#[test]
fn comprehension() {
  check("[x * 2 for x in [1, 2, 3]]", "[2, 4, 6]");
  check("[x for x in [1, 2, 3, 4] if x % 2 == 0]", "[2, 4]");
  check("[[x, y] for x in [1, 2] for y in ['a', 'b']]",
    r#"[[1, "a"], [1, "b"], [2, "a"], [2, "b"]]"#);
  check("[x for x in []]", "[]");
}

#[test]
fn comprehension_needs_array() {
  check_err("[x for x in 3]", "incompatible types");
}

#[test]
fn nested() {
  check("[[1, [2]], []][0][1][0]", "2");
}
