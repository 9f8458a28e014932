//! Diagnostic and textual-representation engine for the Quill runtime:
//! converts runtime values into human-readable text for REPL echoing, error
//! messages, and debugging, with cycle-safe, depth-bounded pretty-printing
//! and a printf-style diagnostic formatter.
#![allow(clippy::mutable_key_type)]

pub mod buffer;
pub mod diag;
pub mod error;
pub mod pretty;
pub mod registry;
pub mod render;
pub mod scalar;
pub mod value;

pub use buffer::Buffer;
pub use diag::FormatArg;
pub use error::Error;
pub use pretty::{pretty, pretty_into};
pub use render::{describe, describe_into, display, display_into};
pub use value::{intern, resolve, Abstract, Function, NativeFn, Table, TypeSet, Value, ValueKind};
