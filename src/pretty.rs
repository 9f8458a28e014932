//! Structural pretty-printer: indented, depth-bounded, cycle-safe rendering
//! of composite values. Fairly simple and not that flexible, but fast.

use std::collections::BTreeMap;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::buffer::Buffer;
use crate::render;
use crate::scalar;
use crate::value::{with_resolved, Value, ValueKind};

/// State for one top-level pretty call. Never survives the call; in
/// particular the seen map is discarded, so repeated renders of the same
/// graph start clean.
struct PrettyState<'a> {
    buf: &'a mut Buffer,
    depth: i32,
    indent: usize,
    seen: HashMap<(ValueKind, usize), i32>,
}

fn newline(state: &mut PrettyState<'_>, just_a_space: bool) {
    if just_a_space {
        state.buf.push(b' ');
        return;
    }
    state.buf.push(b'\n');
    for _ in 0..state.indent {
        state.buf.push(b' ');
    }
}

fn pretty_one(state: &mut PrettyState<'_>, v: &Value, is_entry_value: bool) {
    // Nil, booleans, numbers and symbols are exempt from cycle tracking;
    // everything else is registered for the duration of its subtree.
    let id = v.identity();
    if let Some(id) = id {
        if let Some(&index) = state.seen.get(&id) {
            state.buf.push_str("<cycle ");
            scalar::push_integer(state.buf, index);
            state.buf.push(b'>');
            return;
        }
        state.seen.insert(id, state.seen.len() as i32);
    }

    match v {
        Value::Array(items) => {
            state.buf.push_str("@[");
            sequence_body(state, &items.borrow(), false, is_entry_value);
            state.buf.push(b']');
        }
        Value::Tuple(items) => {
            state.buf.push(b'(');
            sequence_body(state, items, true, is_entry_value);
            state.buf.push(b')');
        }
        Value::Table(table) => {
            let table = table.borrow();
            // Object-like tables print their prototype's name as a tag.
            match table.proto_name() {
                Some(name) => with_resolved(name, |n| state.buf.push_str(n)),
                None => state.buf.push(b'@'),
            }
            state.buf.push(b'{');
            mapping_body(state, &table.entries, is_entry_value);
            state.buf.push(b'}');
        }
        Value::Struct(entries) => {
            state.buf.push(b'{');
            mapping_body(state, entries, is_entry_value);
            state.buf.push(b'}');
        }
        leaf => render::describe_into(state.buf, leaf),
    }

    if let Some(id) = id {
        state.seen.remove(&id);
    }
}

fn sequence_body(
    state: &mut PrettyState<'_>,
    items: &[Value],
    lead_space: bool,
    is_entry_value: bool,
) {
    state.depth -= 1;
    state.indent += 2;
    if state.depth <= 0 {
        state.buf.push_str("...");
    } else {
        if lead_space && items.len() >= 5 {
            state.buf.push(b' ');
        }
        if is_entry_value && items.len() >= 5 {
            newline(state, false);
        }
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                newline(state, items.len() < 5);
            }
            pretty_one(state, item, false);
        }
    }
    state.indent -= 2;
    state.depth += 1;
}

fn mapping_body(
    state: &mut PrettyState<'_>,
    entries: &BTreeMap<Value, Value>,
    is_entry_value: bool,
) {
    state.depth -= 1;
    state.indent += 2;
    if state.depth <= 0 {
        state.buf.push_str("...");
    } else {
        let len = entries.len();
        if len >= 4 {
            state.buf.push(b' ');
        }
        if is_entry_value && len >= 5 {
            newline(state, false);
        }
        for (i, (key, value)) in entries.iter().enumerate() {
            if i > 0 {
                newline(state, len < 4);
            }
            pretty_one(state, key, false);
            state.buf.push(b' ');
            pretty_one(state, value, true);
        }
    }
    state.indent -= 2;
    state.depth += 1;
}

/// Pretty-print `v` into `buf` with at most `max_depth` levels of structural
/// recursion. A non-positive budget truncates composites to `...` instead of
/// descending. Not meant for serialization.
pub fn pretty_into(buf: &mut Buffer, max_depth: i32, v: &Value) {
    let mut state = PrettyState {
        buf,
        depth: max_depth,
        indent: 0,
        seen: HashMap::new(),
    };
    pretty_one(&mut state, v, false);
}

/// Pretty-print into a fresh sink and return the result as an immutable
/// string value.
pub fn pretty(max_depth: i32, v: &Value) -> Value {
    let mut buf = Buffer::new();
    pretty_into(&mut buf, max_depth, v);
    Value::String(Rc::new(buf.into_string()))
}
