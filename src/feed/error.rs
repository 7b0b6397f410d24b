//! Error types for the feed engine
//!
//! None of these are fatal: the store and controller turn each one into a
//! notification and a degraded-but-rendering state.

use thiserror::Error;

/// Failure talking to the feed API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The API answered with a non-2xx status
    #[error("feed API returned status {0}")]
    Status(u16),

    /// The API could not be reached (connect, timeout, TLS)
    #[error("feed API unreachable: {0}")]
    Network(String),

    /// The API answered 2xx but the body was not what we expected
    #[error("failed to decode feed API response: {0}")]
    Decode(String),
}

impl TransportError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// The initial (or a repeated) project load failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load projects: {source}")]
pub struct LoadError {
    #[from]
    pub source: TransportError,
}

/// A like toggle could not be carried out
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LikeToggleError {
    /// No signed-in viewer; nothing was mutated
    #[error("sign in required to like projects")]
    Unauthenticated,

    /// The project is not in the canonical list
    #[error("project {0} is not in the feed")]
    ProjectNotFound(String),

    /// The API rejected the add/remove; the optimistic state was kept
    #[error("like request for project {project_id} rejected: {source}")]
    Rejected {
        project_id: String,
        #[source]
        source: TransportError,
    },
}
