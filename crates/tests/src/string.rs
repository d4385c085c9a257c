//! Strings: the four literal forms, escapes, indexing, slicing.

use crate::check::{check, check_err};

#[test]
fn escapes() {
  check(r#""tab\there""#, r#""tab\there""#);
  check(r#""quote\"q""#, r#""quote\"q""#);
  check(r#""back\\slash""#, r#""back\\slash""#);
  check(r#""slash\/""#, r#""slash/""#);
}

#[test]
fn unicode_escape() {
  check(r#""\u0041""#, r#""A""#);
  check(r#""\ud83d\ude00""#, r#""\ud83d\ude00""#);
}

#[test]
fn single_quoted() {
  check(r#"'it\'s'"#, r#""it's""#);
  check(r#"'a"b'"#, "\"a\\\"b\"");
}

#[test]
fn verbatim() {
  check(r#"@"a\n""#, r#""a\\n""#);
  check(r#"@"two""quotes""#, "\"two\\\"quotes\"");
  check("@'x'", r#""x""#);
}

#[test]
fn text_block() {
  check("|||\n  foo\n  bar\n|||", r#""foo\nbar\n""#);
  check("|||\n  indented\n    more\n|||", r#""indented\n  more\n""#);
}

#[test]
fn indexing() {
  check(r#""hello"[1]"#, r#""e""#);
  check_err(r#""hi"[5]"#, "string index out of range");
}

#[test]
fn slicing() {
  check(r#""hello"[1:3]"#, r#""el""#);
  check(r#""hello"[::2]"#, r#""hlo""#);
  check(r#""hello"[3:]"#, r#""lo""#);
}

#[test]
fn bad_escape_is_parse_error() {
  check_err(r#""\q""#, "unrecognized escape sequence");
}

#[test]
fn unclosed_string() {
  check_err(r#""never ends"#, "unterminated string");
}
