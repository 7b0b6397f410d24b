//! In-memory mock implementation of FeedTransport for testing without a real API.

use super::traits::FeedTransport;
use crate::feed::error::TransportError;
use crate::feed::models::{Like, Project};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::sync::{oneshot, RwLock};

/// A like request parked until the test releases it
struct HeldLike {
    project_id: String,
    add: bool,
    reply: oneshot::Sender<Result<(), TransportError>>,
}

/// In-memory mock implementation of FeedTransport.
///
/// Acts as a tiny server: it stores projects, applies like requests for a single
/// session viewer, and can be told to fail fetches or like requests. With
/// [`hold_like_requests`](Self::hold_like_requests) enabled, like requests block
/// until released so tests can complete them in any order.
///
/// # Example
///
/// ```rust
/// use project_feed::transport::{FeedTransport, MockFeedTransport};
///
/// # tokio_test::block_on(async {
/// let transport = MockFeedTransport::new();
/// transport.fail_fetch_with_status(500);
/// assert!(transport.fetch_approved_projects().await.is_err());
/// # });
/// ```
pub struct MockFeedTransport {
    projects: RwLock<Vec<Project>>,
    session_viewer: Mutex<Option<String>>,
    fetch_failure: Mutex<Option<TransportError>>,
    failing_likes: Mutex<HashSet<String>>,
    hold_likes: Mutex<bool>,
    held: Mutex<Vec<HeldLike>>,
    like_calls: Mutex<Vec<(String, bool)>>,
    fetch_calls: Mutex<usize>,
}

impl MockFeedTransport {
    /// Create a new empty mock transport.
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(Vec::new()),
            session_viewer: Mutex::new(None),
            fetch_failure: Mutex::new(None),
            failing_likes: Mutex::new(HashSet::new()),
            hold_likes: Mutex::new(false),
            held: Mutex::new(Vec::new()),
            like_calls: Mutex::new(Vec::new()),
            fetch_calls: Mutex::new(0),
        }
    }

    /// Create a mock serving the given projects.
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            projects: RwLock::new(projects),
            ..Self::new()
        }
    }

    /// Set the viewer whose likes this "server" records.
    pub fn with_session_viewer(self, viewer_id: impl Into<String>) -> Self {
        *lock(&self.session_viewer) = Some(viewer_id.into());
        self
    }

    /// Replace the served projects.
    pub async fn set_projects(&self, projects: Vec<Project>) {
        *self.projects.write().await = projects;
    }

    /// Server-side view of a project.
    pub async fn project(&self, project_id: &str) -> Option<Project> {
        self.projects
            .read()
            .await
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
    }

    /// Make every fetch fail with the given HTTP status.
    pub fn fail_fetch_with_status(&self, status: u16) {
        *lock(&self.fetch_failure) = Some(TransportError::Status(status));
    }

    /// Make every fetch fail as unreachable.
    pub fn fail_fetch_unreachable(&self) {
        *lock(&self.fetch_failure) = Some(TransportError::Network("connection refused".into()));
    }

    /// Let fetches succeed again.
    pub fn clear_fetch_failure(&self) {
        *lock(&self.fetch_failure) = None;
    }

    /// Reject like requests for `project_id` with a 500.
    pub fn fail_likes_for(&self, project_id: &str) {
        lock(&self.failing_likes).insert(project_id.to_string());
    }

    /// Park like requests until [`release_like`](Self::release_like) is called.
    pub fn hold_like_requests(&self) {
        *lock(&self.hold_likes) = true;
    }

    /// Number of parked like requests.
    pub fn held_count(&self) -> usize {
        lock(&self.held).len()
    }

    /// Wait until at least `n` like requests are parked.
    pub async fn wait_for_held(&self, n: usize) {
        while self.held_count() < n {
            tokio::task::yield_now().await;
        }
    }

    /// Complete the parked request at `index` (arrival order among those still
    /// parked). A successful release is applied to the server-side state.
    pub async fn release_like(&self, index: usize, result: Result<(), TransportError>) {
        let held = lock(&self.held).remove(index);
        if result.is_ok() {
            self.apply_like(&held.project_id, held.add).await;
        }
        // the waiting task may have been dropped
        let _ = held.reply.send(result);
    }

    /// Every like request received, in arrival order.
    pub fn like_calls(&self) -> Vec<(String, bool)> {
        lock(&self.like_calls).clone()
    }

    pub fn fetch_calls(&self) -> usize {
        *lock(&self.fetch_calls)
    }

    async fn apply_like(&self, project_id: &str, add: bool) {
        let Some(viewer) = lock(&self.session_viewer).clone() else {
            return;
        };
        let mut projects = self.projects.write().await;
        if let Some(project) = projects.iter_mut().find(|p| p.id == project_id) {
            if add {
                if !project.is_liked_by(&viewer) {
                    project.likes.push(Like::now(viewer));
                }
            } else {
                project.likes.retain(|l| l.hacker_id != viewer);
            }
        }
    }
}

impl Default for MockFeedTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl FeedTransport for MockFeedTransport {
    async fn fetch_approved_projects(&self) -> Result<Vec<Project>, TransportError> {
        *lock(&self.fetch_calls) += 1;
        let failure = lock(&self.fetch_failure).clone();
        if let Some(err) = failure {
            return Err(err);
        }
        Ok(self.projects.read().await.clone())
    }

    async fn set_like(&self, project_id: &str, add: bool) -> Result<(), TransportError> {
        lock(&self.like_calls).push((project_id.to_string(), add));

        let hold = *lock(&self.hold_likes);
        if hold {
            let (tx, rx) = oneshot::channel();
            lock(&self.held).push(HeldLike {
                project_id: project_id.to_string(),
                add,
                reply: tx,
            });
            return rx
                .await
                .unwrap_or_else(|_| Err(TransportError::Network("request dropped".into())));
        }

        let failing = lock(&self.failing_likes).contains(project_id);
        if failing {
            return Err(TransportError::Status(500));
        }
        self.apply_like(project_id, add).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::test_project;

    #[tokio::test]
    async fn test_fetch_returns_projects_and_counts_calls() {
        let mock = MockFeedTransport::with_projects(vec![test_project("p1", "2024-01-01")]);
        let projects = mock.fetch_approved_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(mock.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_and_clear() {
        let mock = MockFeedTransport::new();
        mock.fail_fetch_with_status(502);
        assert_eq!(
            mock.fetch_approved_projects().await.unwrap_err(),
            TransportError::Status(502)
        );
        mock.clear_fetch_failure();
        assert!(mock.fetch_approved_projects().await.is_ok());
    }

    #[tokio::test]
    async fn test_set_like_is_idempotent_server_side() {
        let mock = MockFeedTransport::with_projects(vec![test_project("p1", "2024-01-01")])
            .with_session_viewer("h1");

        mock.set_like("p1", true).await.unwrap();
        mock.set_like("p1", true).await.unwrap();
        assert_eq!(mock.project("p1").await.unwrap().like_count(), 1);

        mock.set_like("p1", false).await.unwrap();
        assert_eq!(mock.project("p1").await.unwrap().like_count(), 0);
        assert_eq!(mock.like_calls().len(), 3);
    }

    #[tokio::test]
    async fn test_failing_likes() {
        let mock = MockFeedTransport::with_projects(vec![test_project("p1", "2024-01-01")])
            .with_session_viewer("h1");
        mock.fail_likes_for("p1");
        assert_eq!(
            mock.set_like("p1", true).await.unwrap_err(),
            TransportError::Status(500)
        );
        assert_eq!(mock.project("p1").await.unwrap().like_count(), 0);
    }
}
