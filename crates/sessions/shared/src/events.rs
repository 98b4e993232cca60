//! Completion events raised by a session provider and the outward
//! notifications the coordinator broadcasts in response.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::OperationKind;
use crate::settings::SessionSearchResult;

/// Outcome of an accepted join operation, forwarded verbatim to callers so
/// they can branch on the distinct failure modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinSessionResult {
    Success,
    SessionIsFull,
    SessionDoesNotExist,
    CouldNotRetrieveAddress,
    AlreadyInSession,
    UnknownError,
}

impl JoinSessionResult {
    pub fn is_success(self) -> bool {
        matches!(self, JoinSessionResult::Success)
    }
}

/// Synchronous rejection reasons surfaced by a provider when it declines to
/// start an operation. No completion event follows a rejection.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("session provider not ready")]
    NotReady,
    #[error("invalid session settings: {0}")]
    InvalidSettings(&'static str),
    #[error("a session with this identity already exists")]
    AlreadyExists,
    #[error("no session with this identity exists")]
    NoSession,
    #[error("{0}")]
    Other(String),
}

/// Completion event for one accepted provider operation.
///
/// Delivered at most once per accepted call, on a later pump, never
/// concurrently with coordinator code.
#[derive(Debug, Clone)]
pub enum Completion {
    Create {
        success: bool,
    },
    Find {
        results: Vec<SessionSearchResult>,
        success: bool,
    },
    Join {
        result: JoinSessionResult,
    },
    Destroy {
        success: bool,
    },
    Start {
        success: bool,
    },
}

impl Completion {
    /// The operation kind this completion resolves.
    pub fn kind(&self) -> OperationKind {
        match self {
            Completion::Create { .. } => OperationKind::Create,
            Completion::Find { .. } => OperationKind::Find,
            Completion::Join { .. } => OperationKind::Join,
            Completion::Destroy { .. } => OperationKind::Destroy,
            Completion::Start { .. } => OperationKind::Start,
        }
    }
}

/// Notification broadcast by the coordinator to its subscribers.
///
/// Fire-and-forget: zero or more listeners, and every operation invocation
/// yields exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotification {
    CreateSessionComplete {
        success: bool,
    },
    FindSessionsComplete {
        results: Vec<SessionSearchResult>,
        success: bool,
    },
    JoinSessionComplete {
        result: JoinSessionResult,
    },
    DestroySessionComplete {
        success: bool,
    },
    StartSessionComplete {
        success: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_success_counts_as_success() {
        assert!(JoinSessionResult::Success.is_success());
        for failure in [
            JoinSessionResult::SessionIsFull,
            JoinSessionResult::SessionDoesNotExist,
            JoinSessionResult::CouldNotRetrieveAddress,
            JoinSessionResult::AlreadyInSession,
            JoinSessionResult::UnknownError,
        ] {
            assert!(!failure.is_success());
        }
    }

    #[test]
    fn completion_reports_its_kind() {
        assert_eq!(
            Completion::Create { success: true }.kind(),
            OperationKind::Create
        );
        assert_eq!(
            Completion::Find {
                results: Vec::new(),
                success: false
            }
            .kind(),
            OperationKind::Find
        );
        assert_eq!(
            Completion::Join {
                result: JoinSessionResult::Success
            }
            .kind(),
            OperationKind::Join
        );
        assert_eq!(
            Completion::Destroy { success: false }.kind(),
            OperationKind::Destroy
        );
        assert_eq!(
            Completion::Start { success: true }.kind(),
            OperationKind::Start
        );
    }
}
