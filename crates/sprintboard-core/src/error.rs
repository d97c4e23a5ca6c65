use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Reason codes for expected business-rule rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionCode {
    NoAssignee,
    NoEstimate,
    AlreadyInSprint,
    SprintCapacityExceeded,
    MemberCapacityExceeded,
    DuplicateName,
    AlreadyPublished,
    AlreadyClosed,
    NotPublished,
    SprintEnded,
    NoTasks,
    LoggingLimitExceeded,
    MemberNotInSprint,
}

impl RejectionCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoAssignee => "no_assignee",
            Self::NoEstimate => "no_estimate",
            Self::AlreadyInSprint => "already_in_sprint",
            Self::SprintCapacityExceeded => "sprint_capacity_exceeded",
            Self::MemberCapacityExceeded => "member_capacity_exceeded",
            Self::DuplicateName => "duplicate_name",
            Self::AlreadyPublished => "already_published",
            Self::AlreadyClosed => "already_closed",
            Self::NotPublished => "not_published",
            Self::SprintEnded => "sprint_ended",
            Self::NoTasks => "no_tasks",
            Self::LoggingLimitExceeded => "logging_limit_exceeded",
            Self::MemberNotInSprint => "member_not_in_sprint",
        }
    }
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expected business-rule outcome, carried as a value so callers can
/// render precise guidance for the offending entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub code: RejectionCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Uuid>,
    pub message: String,
}

impl Rejection {
    pub fn new(code: RejectionCode, entity_id: Option<Uuid>, message: impl Into<String>) -> Self {
        Self {
            code,
            entity_id,
            message: message.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

#[derive(Error, Debug)]
pub enum SprintboardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(Rejection),

    #[error("Rejected: {0}")]
    Rejected(Rejection),

    #[error("Concurrent modification: expected revision {expected}, found {found}")]
    ConcurrentModification { expected: u64, found: u64 },

    #[error("Operation failed after retry: {0}")]
    Fatal(#[source] Box<SprintboardError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SprintboardError {
    /// Write conflicts inside a unit of work; the only class that is retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Conflict(r) | Self::Rejected(r) => Some(r),
            _ => None,
        }
    }

    /// Stable machine-readable code for wire payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Conflict(r) | Self::Rejected(r) => r.code.as_str(),
            Self::ConcurrentModification { .. } => "concurrent_modification",
            Self::Fatal(_) => "fatal",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<Rejection> for SprintboardError {
    fn from(rejection: Rejection) -> Self {
        match rejection.code {
            RejectionCode::DuplicateName => Self::Conflict(rejection),
            _ => Self::Rejected(rejection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_concurrent_modification_is_transient() {
        let conflict = SprintboardError::ConcurrentModification {
            expected: 1,
            found: 2,
        };
        assert!(conflict.is_transient());
        assert!(!SprintboardError::Validation("x".into()).is_transient());
        assert!(!SprintboardError::Fatal(Box::new(conflict)).is_transient());
    }

    #[test]
    fn test_duplicate_name_maps_to_conflict() {
        let err: SprintboardError =
            Rejection::new(RejectionCode::DuplicateName, None, "name taken").into();
        assert!(matches!(err, SprintboardError::Conflict(_)));
        assert_eq!(err.code(), "duplicate_name");

        let err: SprintboardError =
            Rejection::new(RejectionCode::NoEstimate, Some(Uuid::new_v4()), "no estimate").into();
        assert!(matches!(err, SprintboardError::Rejected(_)));
        assert!(err.rejection().unwrap().entity_id.is_some());
    }
}
