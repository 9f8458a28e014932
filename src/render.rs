//! Value renderer: single-value "describe" (debug) and "display" (content)
//! forms. Both are non-recursive; composite kinds get an identity token here
//! and route through [`crate::pretty`] for structural output.

use std::fmt;
use std::rc::Rc;

use crate::buffer::Buffer;
use crate::registry;
use crate::scalar;
use crate::value::{with_resolved, Value};

/// Append the debug-oriented form of a value: strings quoted, keywords
/// prefixed, opaque kinds as identity tokens.
pub fn describe_into(buf: &mut Buffer, v: &Value) {
    match v {
        Value::Nil => buf.push_str("nil"),
        Value::Bool(true) => buf.push_str("true"),
        Value::Bool(false) => buf.push_str("false"),
        Value::Number(x) => scalar::push_number(buf, *x),
        Value::Keyword(s) => {
            buf.push(b':');
            with_resolved(*s, |name| buf.push_str(name));
        }
        Value::Symbol(s) => with_resolved(*s, |name| buf.push_str(name)),
        Value::String(s) => scalar::push_escaped(buf, s.as_bytes()),
        Value::Buffer(b) => {
            buf.push(b'@');
            scalar::push_escaped(buf, b.borrow().as_bytes());
        }
        Value::Abstract(a) => scalar::push_identity(buf, &a.type_name, v.heap_addr()),
        Value::Native(f) => match registry::lookup(f) {
            Some(name) => {
                buf.push_str("<cfunction ");
                with_resolved(name, |n| buf.push_str(n));
                buf.push(b'>');
            }
            None => generic_token(buf, v),
        },
        Value::Function(f) => match f.name {
            Some(name) => {
                buf.push_str("<function ");
                with_resolved(name, |n| buf.push_str(n));
                buf.push(b'>');
            }
            None => generic_token(buf, v),
        },
        Value::Array(_) | Value::Tuple(_) | Value::Table(_) | Value::Struct(_) => {
            generic_token(buf, v)
        }
    }
}

/// Append the content-oriented form: identical to describe except string-like
/// kinds and buffers render their raw bytes.
pub fn display_into(buf: &mut Buffer, v: &Value) {
    match v {
        Value::String(s) => buf.push_bytes(s.as_bytes()),
        Value::Symbol(s) | Value::Keyword(s) => with_resolved(*s, |name| buf.push_str(name)),
        Value::Buffer(b) => buf.push_bytes(b.borrow().as_bytes()),
        other => describe_into(buf, other),
    }
}

/// Describe into a fresh sink and return the result as an immutable string
/// value.
pub fn describe(v: &Value) -> Value {
    let mut buf = Buffer::new();
    describe_into(&mut buf, v);
    Value::String(Rc::new(buf.into_string()))
}

/// Display into a fresh sink and return the result as an immutable string
/// value.
pub fn display(v: &Value) -> Value {
    let mut buf = Buffer::new();
    display_into(&mut buf, v);
    Value::String(Rc::new(buf.into_string()))
}

fn generic_token(buf: &mut Buffer, v: &Value) {
    scalar::push_identity(buf, v.kind().name(), v.heap_addr());
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Buffer::new();
        display_into(&mut buf, self);
        f.write_str(&buf.into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{intern, Abstract, Function, NativeFn};

    fn describe_str(v: &Value) -> String {
        let mut buf = Buffer::new();
        describe_into(&mut buf, v);
        buf.into_string()
    }

    fn display_str(v: &Value) -> String {
        let mut buf = Buffer::new();
        display_into(&mut buf, v);
        buf.into_string()
    }

    #[test]
    fn test_literals() {
        assert_eq!(describe_str(&Value::Nil), "nil");
        assert_eq!(describe_str(&Value::Bool(true)), "true");
        assert_eq!(describe_str(&Value::Bool(false)), "false");
        assert_eq!(describe_str(&Value::Number(42.0)), "42");
    }

    #[test]
    fn test_describe_quotes_display_does_not() {
        let s = Value::string("abc");
        assert_eq!(describe_str(&s), "\"abc\"");
        assert_eq!(display_str(&s), "abc");
    }

    #[test]
    fn test_symbol_and_keyword() {
        assert_eq!(describe_str(&Value::symbol("foo")), "foo");
        assert_eq!(describe_str(&Value::keyword("foo")), ":foo");
        assert_eq!(display_str(&Value::keyword("foo")), "foo");
    }

    #[test]
    fn test_buffer_prefix() {
        let b = Value::buffer(b"hi\n");
        assert_eq!(describe_str(&b), "@\"hi\\n\"");
        assert_eq!(display_str(&b), "hi\n");
    }

    #[test]
    fn test_named_function() {
        let f = Value::Function(Rc::new(Function {
            name: Some(intern("square")),
            params: vec![intern("x")],
        }));
        assert_eq!(describe_str(&f), "<function square>");
    }

    #[test]
    fn test_unnamed_function_falls_back_to_token() {
        let f = Value::Function(Rc::new(Function {
            name: None,
            params: vec![],
        }));
        assert!(describe_str(&f).starts_with("<function 0x"));
    }

    #[test]
    fn test_native_fn_uses_registry() {
        let inner = Rc::new(NativeFn::new(|_| Ok(Value::Nil)));
        let f = Value::Native(inner.clone());
        assert!(describe_str(&f).starts_with("<cfunction 0x"));
        registry::register(&inner, "print");
        assert_eq!(describe_str(&f), "<cfunction print>");
        registry::unregister(&inner);
    }

    #[test]
    fn test_abstract_token_uses_type_name() {
        let a = Value::Abstract(Rc::new(Abstract::new("file", 7u32)));
        assert!(describe_str(&a).starts_with("<file 0x"));
        assert!(describe_str(&a).ends_with('>'));
    }

    #[test]
    fn test_composites_render_identity_tokens() {
        assert!(describe_str(&Value::array(vec![])).starts_with("<array 0x"));
        assert!(describe_str(&Value::tuple(vec![])).starts_with("<tuple 0x"));
        assert!(describe_str(&Value::table(vec![])).starts_with("<table 0x"));
        assert!(describe_str(&Value::structure(vec![])).starts_with("<struct 0x"));
    }

    #[test]
    fn test_describe_returns_string_value() {
        let out = describe(&Value::Number(1.5));
        assert_eq!(out, Value::string("1.5"));
    }

    #[test]
    fn test_display_impl() {
        assert_eq!(format!("{}", Value::string("x")), "x");
        assert_eq!(format!("{}", Value::Number(2.0)), "2");
    }
}
