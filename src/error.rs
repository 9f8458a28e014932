/// Runtime error type for the Quill diagnostic layer.
///
/// Rendering a value never fails; every kind has a defined fallback form.
/// `Error` is what native functions return and what the diagnostic helpers
/// construct their messages into.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("type error: expected {expected}, got {got}")]
    Type { expected: String, got: String },

    #[error("arity error: {name} expects {expected} args, got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("{0}")]
    Message(String),

    #[error("out of memory")]
    OutOfMemory,
}

impl Error {
    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::Type {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn arity(name: impl Into<String>, expected: impl Into<String>, got: usize) -> Self {
        Error::Arity {
            name: name.into(),
            expected: expected.into(),
            got,
        }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Error::Message(message.into())
    }
}
