//! Trait abstraction for the feed API

use crate::feed::error::TransportError;
use crate::feed::models::Project;
use async_trait::async_trait;

/// Everything the feed needs from the remote API.
///
/// Implementations must be thread-safe (`Send + Sync`): like requests run on
/// spawned tasks that share the transport via `Arc<dyn FeedTransport>`.
///
/// # Implementations
///
/// - [`HttpFeedTransport`](super::HttpFeedTransport): reqwest client against the
///   `/api/projects` endpoints
/// - [`MockFeedTransport`](super::MockFeedTransport): in-memory server with
///   failure injection and gated like responses (for tests)
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Fetch every project in the `APPROVED` state.
    ///
    /// A non-2xx answer must come back as [`TransportError::Status`].
    async fn fetch_approved_projects(&self) -> Result<Vec<Project>, TransportError>;

    /// Add (`add = true`) or remove the current session's like on a project.
    ///
    /// Adding an existing like or removing a missing one is not an error.
    async fn set_like(&self, project_id: &str, add: bool) -> Result<(), TransportError>;
}
