//! Diagnostic formatter: a small printf-style composition language used to
//! build error and debug messages out of the rendering primitives.
//!
//! Directives consume arguments strictly left to right:
//!
//! | directive | argument | output |
//! |-----------|----------|--------|
//! | `%f` | float | general number form |
//! | `%d` | integer | decimal integer |
//! | `%s`, `%S` | text | literal bytes |
//! | `%q` | text | quoted/escaped form |
//! | `%c` | integer | single byte |
//! | `%t` | value | type name |
//! | `%T` | type set | `\|`-separated type names |
//! | `%V` | value | display form |
//! | `%v` | value | describe form |
//! | `%p` | value | pretty form, depth 4 |
//!
//! Any other directive byte is emitted literally and consumes no argument; a
//! trailing `%` is dropped. Callers rely on both fallbacks, so they are load
//! bearing, not leniency.

use crate::buffer::Buffer;
use crate::error::Error;
use crate::pretty;
use crate::render;
use crate::scalar;
use crate::value::{TypeSet, Value};

/// Depth budget used by the `%p` directive.
const PRETTY_DEPTH: i32 = 4;

/// One positional argument for [`format`]. A closed enum instead of untyped
/// varargs; the `From` impls feed the [`diag!`](crate::diag!) macro.
#[derive(Debug, Clone, Copy)]
pub enum FormatArg<'a> {
    Float(f64),
    Int(i64),
    Str(&'a str),
    Bytes(&'a [u8]),
    Value(&'a Value),
    Types(TypeSet),
}

impl From<f64> for FormatArg<'_> {
    fn from(x: f64) -> Self {
        FormatArg::Float(x)
    }
}

impl From<i64> for FormatArg<'_> {
    fn from(x: i64) -> Self {
        FormatArg::Int(x)
    }
}

impl<'a> From<&'a str> for FormatArg<'a> {
    fn from(s: &'a str) -> Self {
        FormatArg::Str(s)
    }
}

impl<'a> From<&'a [u8]> for FormatArg<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        FormatArg::Bytes(bytes)
    }
}

impl<'a> From<&'a Value> for FormatArg<'a> {
    fn from(v: &'a Value) -> Self {
        FormatArg::Value(v)
    }
}

impl From<TypeSet> for FormatArg<'_> {
    fn from(types: TypeSet) -> Self {
        FormatArg::Types(types)
    }
}

/// Build a diagnostic string from a pattern and positional arguments.
///
/// ```
/// use quill::{diag, Value};
/// let v = Value::keyword("speed");
/// assert_eq!(diag!("bad %t %v", &v, &v), "bad keyword :speed");
/// ```
#[macro_export]
macro_rules! diag {
    ($pattern:expr $(, $arg:expr)* $(,)?) => {
        $crate::diag::format($pattern, &[$($crate::diag::FormatArg::from($arg)),*])
    };
}

/// Interpret `pattern`, appending to a fresh buffer. See the module docs for
/// the directive table.
pub fn format(pattern: &str, args: &[FormatArg<'_>]) -> String {
    let mut buf = Buffer::with_capacity(pattern.len());
    format_into(&mut buf, pattern, args);
    buf.into_string()
}

/// Interpret `pattern` into a caller-supplied sink.
pub fn format_into(buf: &mut Buffer, pattern: &str, args: &[FormatArg<'_>]) {
    let bytes = pattern.as_bytes();
    let mut args = args.iter();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        i += 1;
        if c != b'%' {
            buf.push(c);
            continue;
        }
        if i >= bytes.len() {
            break; // trailing '%' is dropped
        }
        let directive = bytes[i];
        i += 1;
        match directive {
            b'f' | b'd' | b's' | b'S' | b'q' | b'c' | b't' | b'T' | b'V' | b'v' | b'p' => {
                // Out of arguments: the directive renders nothing.
                if let Some(arg) = args.next() {
                    emit(buf, directive, arg);
                }
            }
            other => buf.push(other),
        }
    }
}

fn emit(buf: &mut Buffer, directive: u8, arg: &FormatArg<'_>) {
    match (directive, arg) {
        (b'f', FormatArg::Float(x)) => scalar::push_number(buf, *x),
        (b'f', FormatArg::Int(n)) => scalar::push_number(buf, *n as f64),
        (b'd', FormatArg::Int(n)) => scalar::push_integer_wide(buf, *n),
        (b's' | b'S', FormatArg::Str(s)) => buf.push_str(s),
        (b's' | b'S', FormatArg::Bytes(bytes)) => buf.push_bytes(bytes),
        (b'q', FormatArg::Str(s)) => scalar::push_escaped(buf, s.as_bytes()),
        (b'q', FormatArg::Bytes(bytes)) => scalar::push_escaped(buf, bytes),
        (b'c', FormatArg::Int(n)) => buf.push(*n as u8),
        (b't', FormatArg::Value(v)) => buf.push_str(v.type_name()),
        (b'T', FormatArg::Types(types)) => push_types(buf, *types),
        (b'V', FormatArg::Value(v)) => render::display_into(buf, v),
        (b'v', FormatArg::Value(v)) => render::describe_into(buf, v),
        (b'p', FormatArg::Value(v)) => pretty::pretty_into(buf, PRETTY_DEPTH, v),
        // Argument does not fit the directive: render it generically rather
        // than failing; malformed diagnostics are never themselves errors.
        (_, arg) => emit_fallback(buf, arg),
    }
}

fn emit_fallback(buf: &mut Buffer, arg: &FormatArg<'_>) {
    match arg {
        FormatArg::Float(x) => scalar::push_number(buf, *x),
        FormatArg::Int(n) => scalar::push_integer_wide(buf, *n),
        FormatArg::Str(s) => buf.push_str(s),
        FormatArg::Bytes(bytes) => buf.push_bytes(bytes),
        FormatArg::Value(v) => render::describe_into(buf, v),
        FormatArg::Types(types) => push_types(buf, *types),
    }
}

fn push_types(buf: &mut Buffer, types: TypeSet) {
    let mut first = true;
    for kind in types.kinds() {
        if !first {
            buf.push(b'|');
        }
        first = false;
        buf.push_str(kind.name());
    }
}

/// Check that a value's kind is in `expected`, building the canonical
/// "expected X, got Y" type error when it is not.
pub fn check_kinds(v: &Value, expected: TypeSet) -> Result<(), Error> {
    if expected.contains(v.kind()) {
        return Ok(());
    }
    Err(Error::type_error(
        format("%T", &[FormatArg::Types(expected)]),
        format("%v", &[FormatArg::Value(v)]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Abstract, ValueKind};
    use std::rc::Rc;

    #[test]
    fn test_positional_consumption() {
        assert_eq!(diag!("%s=%d", "x", 5), "x=5");
        assert_eq!(diag!("%d then %s", 7, "seven"), "7 then seven");
    }

    #[test]
    fn test_unknown_directive_is_literal_and_consumes_nothing() {
        assert_eq!(diag!("100%% done"), "100% done");
        assert_eq!(diag!("%z"), "z");
        // '%%' consumed no argument, so "x" feeds the '%s'
        assert_eq!(diag!("%%%s", "x"), "%x");
    }

    #[test]
    fn test_trailing_percent_dropped() {
        assert_eq!(diag!("trailing%"), "trailing");
    }

    #[test]
    fn test_float_directive() {
        assert_eq!(diag!("%f", 1.5), "1.5");
        assert_eq!(diag!("%f", 1e6), "1e+06");
    }

    #[test]
    fn test_char_directive() {
        assert_eq!(diag!("%c%c", 72, 105), "Hi");
    }

    #[test]
    fn test_quote_directive() {
        assert_eq!(diag!("%q", "a\nb"), "\"a\\nb\"");
        let bytes: &[u8] = &[0xFF];
        assert_eq!(diag!("%q", bytes), "\"\\xff\"");
    }

    #[test]
    fn test_type_directives() {
        let s = Value::string("x");
        assert_eq!(diag!("%t", &s), "string");
        let a = Value::Abstract(Rc::new(Abstract::new("file", ())));
        assert_eq!(diag!("%t", &a), "file");
        let ts = TypeSet::of(ValueKind::Number).with(ValueKind::String);
        assert_eq!(diag!("%T", ts), "number|string");
    }

    #[test]
    fn test_value_directives() {
        let s = Value::string("abc");
        assert_eq!(diag!("%v", &s), "\"abc\"");
        assert_eq!(diag!("%V", &s), "abc");
    }

    #[test]
    fn test_pretty_directive_uses_fixed_depth() {
        let mut v = Value::array(vec![Value::Number(1.0)]);
        for _ in 0..6 {
            v = Value::array(vec![v]);
        }
        let out = diag!("%p", &v);
        assert!(out.contains("..."), "got {out}");

        let flat = Value::tuple(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(diag!("%p", &flat), "(1 2)");
    }

    #[test]
    fn test_missing_argument_renders_nothing() {
        assert_eq!(format("a%db", &[]), "ab");
    }

    #[test]
    fn test_mismatched_argument_falls_back() {
        assert_eq!(diag!("%d", "hi"), "hi");
        assert_eq!(diag!("%f", 2), "2");
    }

    #[test]
    fn test_check_kinds() {
        let ts = TypeSet::of(ValueKind::Number).with(ValueKind::String);
        assert!(check_kinds(&Value::Number(1.0), ts).is_ok());
        let err = check_kinds(&Value::keyword("speed"), ts).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type error: expected number|string, got :speed"
        );
    }
}
