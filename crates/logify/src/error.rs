//! Error types for logify

use crate::parser::SyntaxError;
use crate::solver::SolverError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogifyError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("Unknown proposition: {name}")]
    UnknownProposition { name: String },

    #[error("Invalid confidence {value}: must be strictly between 0 and 1")]
    InvalidConfidence { value: f64 },

    #[error("Hard constraints are inconsistent")]
    InconsistentHardSet,

    #[error("Solver exceeded its time budget of {budget:?}")]
    SolverTimeout { budget: Duration },

    #[error("Solver was cancelled")]
    Cancelled,

    #[error("Neither the query nor its negation is satisfiable with the hard constraints")]
    BothUnreachable,

    #[error("Invalid constraint record: {0}")]
    InvalidRecord(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Solver failure: {0}")]
    SolverFailure(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error kinds as reported in query responses
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    SyntaxError,
    UnknownProposition,
    InvalidConfidence,
    InconsistentHardSet,
    SolverTimeout,
    Cancelled,
    BothUnreachable,
    InvalidRecord,
    InvalidConfig,
    SolverFailure,
}

impl LogifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LogifyError::Syntax(_) => ErrorKind::SyntaxError,
            LogifyError::UnknownProposition { .. } => ErrorKind::UnknownProposition,
            LogifyError::InvalidConfidence { .. } => ErrorKind::InvalidConfidence,
            LogifyError::InconsistentHardSet => ErrorKind::InconsistentHardSet,
            LogifyError::SolverTimeout { .. } => ErrorKind::SolverTimeout,
            LogifyError::Cancelled => ErrorKind::Cancelled,
            LogifyError::BothUnreachable => ErrorKind::BothUnreachable,
            LogifyError::InvalidRecord(_) | LogifyError::Json(_) => ErrorKind::InvalidRecord,
            LogifyError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            LogifyError::SolverFailure(_) => ErrorKind::SolverFailure,
        }
    }

    /// Whether resubmitting with a larger budget may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LogifyError::SolverTimeout { .. } | LogifyError::Cancelled)
    }
}

impl From<SolverError> for LogifyError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::Timeout { budget } => LogifyError::SolverTimeout { budget },
            SolverError::Cancelled => LogifyError::Cancelled,
            SolverError::Failure(msg) => LogifyError::SolverFailure(msg),
            SolverError::Io(e) => LogifyError::SolverFailure(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LogifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_by_name() {
        let kind = LogifyError::BothUnreachable.kind();
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"BothUnreachable\"");
    }

    #[test]
    fn test_solver_errors_map_to_kinds() {
        let budget = Duration::from_millis(5);
        let err: LogifyError = SolverError::Timeout { budget }.into();
        assert_eq!(err.kind(), ErrorKind::SolverTimeout);
        assert!(err.is_recoverable());

        let err: LogifyError = SolverError::Failure("bad output".into()).into();
        assert_eq!(err.kind(), ErrorKind::SolverFailure);
        assert!(!err.is_recoverable());
    }
}
