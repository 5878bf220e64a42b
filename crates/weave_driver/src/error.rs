//! Error types for backend registration, resolution and compilation.

use weave_analysis::AnalysisError;
use weave_common::InternalError;
use weave_decl::DeclError;
use weave_output::OutputError;

use crate::instance::CompilerState;

/// Errors raised by the registry and the run state machine.
///
/// All of these are detected before any backend generates a file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// A backend name was registered twice.
    #[error("backend '{0}' is already registered")]
    DuplicateBackend(String),

    /// A requested or required backend is not registered.
    #[error("unknown backend '{name}'{}", requester_suffix(.required_by))]
    UnknownBackend {
        /// The missing backend.
        name: String,
        /// The backend that declared the dependency, `None` when the name
        /// was requested directly.
        required_by: Option<String>,
    },

    /// Backend dependencies form a cycle.
    #[error("cyclic backend dependency: {}", .cycle.join(" -> "))]
    CyclicDependency {
        /// The backends on the cycle, first name repeated at the end.
        cycle: Vec<String>,
    },

    /// Options were given for a backend that is not registered.
    #[error("options given for unknown backend '{0}'")]
    OptionsForUnknownBackend(String),

    /// A backend option has the wrong type or is not recognised.
    #[error("backend '{backend}': invalid option '{option}': {reason}")]
    InvalidOption {
        /// The backend the option was given to.
        backend: String,
        /// The option key.
        option: String,
        /// Why it was rejected.
        reason: String,
    },

    /// `run` was called on an instance that is not idle.
    #[error("compiler instance cannot run in state {0}")]
    NotIdle(CompilerState),
}

fn requester_suffix(required_by: &Option<String>) -> String {
    match required_by {
        Some(by) => format!(" (required by '{by}')"),
        None => String::new(),
    }
}

/// Any error that aborts a compiler run.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Registry or state machine error.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// An analysis could not be computed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// An output file could not be opened, committed or flushed.
    #[error(transparent)]
    Output(#[from] OutputError),

    /// The declaration graph could not be built or extended.
    #[error(transparent)]
    Decl(#[from] DeclError),

    /// A compiler bug.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_backend_names_requester() {
        let direct = DriverError::UnknownBackend {
            name: "cpp-usr".to_string(),
            required_by: None,
        };
        assert_eq!(direct.to_string(), "unknown backend 'cpp-usr'");

        let transitive = DriverError::UnknownBackend {
            name: "cpp-common".to_string(),
            required_by: Some("cpp-user".to_string()),
        };
        assert_eq!(
            transitive.to_string(),
            "unknown backend 'cpp-common' (required by 'cpp-user')"
        );
    }

    #[test]
    fn cycle_display() {
        let err = DriverError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic backend dependency: a -> b -> a");
    }

    #[test]
    fn unknown_option_table_display() {
        let err = DriverError::OptionsForUnknownBackend("ani-brige".to_string());
        assert_eq!(err.to_string(), "options given for unknown backend 'ani-brige'");
    }

    #[test]
    fn compile_error_is_transparent() {
        let err: CompileError = DriverError::DuplicateBackend("abi-header".into()).into();
        assert_eq!(err.to_string(), "backend 'abi-header' is already registered");
    }
}
