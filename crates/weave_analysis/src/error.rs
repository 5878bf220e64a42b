//! Error types for analysis construction.

use std::fmt::Debug;

/// Errors raised while computing an analysis.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// An analysis was requested again while it was still being computed.
    #[error("cyclic analysis dependency: {analysis} for {key} was requested while being computed")]
    Cycle {
        /// Type name of the analysis.
        analysis: &'static str,
        /// Debug spelling of the key.
        key: String,
    },

    /// An analysis factory could not derive its fact from the declaration graph.
    #[error("{analysis} for {key}: {message}")]
    Failed {
        /// Type name of the analysis.
        analysis: &'static str,
        /// Debug spelling of the key.
        key: String,
        /// What went wrong.
        message: String,
    },
}

impl AnalysisError {
    /// Builds a [`Failed`](Self::Failed) error for analysis `A` and `key`.
    pub fn failed<A: 'static>(key: &impl Debug, message: impl Into<String>) -> Self {
        AnalysisError::Failed {
            analysis: std::any::type_name::<A>(),
            key: format!("{key:?}"),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mangled;

    #[test]
    fn cycle_display() {
        let err = AnalysisError::Cycle {
            analysis: "IfaceAbi",
            key: "IfaceId(3)".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("cyclic analysis dependency"));
        assert!(msg.contains("IfaceAbi"));
        assert!(msg.contains("IfaceId(3)"));
    }

    #[test]
    fn failed_names_analysis_and_key() {
        let err = AnalysisError::failed::<Mangled>(&42u32, "no package");
        match &err {
            AnalysisError::Failed { analysis, key, .. } => {
                assert!(analysis.ends_with("Mangled"));
                assert_eq!(key, "42");
            }
            _ => panic!("expected Failed"),
        }
        assert!(err.to_string().ends_with("no package"));
    }
}
