//! Compiler-bug errors.

/// An internal compiler error indicating a bug in Weave, not a user input problem.
///
/// Raised when the declaration graph violates an assumption the front end is
/// supposed to guarantee (for example a dangling declaration ID). The driver
/// tags errors escaping a backend with that backend's name.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("internal compiler error{}: {message}", backend_suffix(.backend))]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
    /// The backend that was running, if any.
    pub backend: Option<String>,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            backend: None,
        }
    }

    /// Records the backend the error escaped from. An existing tag is kept.
    pub fn in_backend(mut self, name: &str) -> Self {
        if self.backend.is_none() {
            self.backend = Some(name.to_string());
        }
        self
    }
}

fn backend_suffix(backend: &Option<String>) -> String {
    match backend {
        Some(name) => format!(" in backend '{name}'"),
        None => String::new(),
    }
}
