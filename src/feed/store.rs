//! Project Store - the canonical project list of one feed session
//!
//! The store is the only writer of the list. Like toggles mutate it
//! synchronously (optimistic update) and then hand the network leg to a spawned
//! task; the task's result comes back as a [`LikeOutcome`] that the owner feeds
//! to [`ProjectStore::settle`]. Outcomes never write like state, so a response
//! arriving late can't undo a newer toggle.
//!
//! Policy on rejected likes: no rollback. The viewer gets one notification and
//! the list is reconciled with the server on the next reload.

use super::error::{LikeToggleError, LoadError, TransportError};
use super::filter::{sort_projects, SortMode};
use super::models::{Like, Project};
use crate::identity::Viewer;
use crate::notify::Notifier;
use crate::transport::FeedTransport;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const SIGN_IN_REQUIRED_MESSAGE: &str = "Please sign in to like projects";
pub const LIKE_FAILED_MESSAGE: &str = "Failed to like project";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load projects";

/// Handle for one like toggle whose network leg is in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeTicket {
    pub project_id: String,
    /// Monotonic per store; the highest unsettled one per project is the live intent
    pub seq: u64,
    /// `true` for like, `false` for unlike
    pub add: bool,
}

/// Result of a like request, delivered back to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeOutcome {
    pub ticket: LikeTicket,
    pub result: Result<(), TransportError>,
}

/// The newest toggle per project that has not settled yet
#[derive(Debug, Clone)]
struct PendingIntent {
    seq: u64,
    viewer_id: String,
    add: bool,
}

/// Owner of the canonical project list
pub struct ProjectStore {
    transport: Arc<dyn FeedTransport>,
    notifier: Arc<dyn Notifier>,
    projects: Vec<Project>,
    last_load_error: Option<LoadError>,
    next_seq: u64,
    intents: HashMap<String, PendingIntent>,
    in_flight: usize,
    outcomes_tx: mpsc::UnboundedSender<LikeOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<LikeOutcome>,
}

impl ProjectStore {
    /// Create an empty store
    pub fn new(transport: Arc<dyn FeedTransport>, notifier: Arc<dyn Notifier>) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            notifier,
            projects: Vec::new(),
            last_load_error: None,
            next_seq: 0,
            intents: HashMap::new(),
            in_flight: 0,
            outcomes_tx,
            outcomes_rx,
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// The canonical list, newest first as loaded
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    /// The error of the most recent load attempt, cleared by a successful load
    pub fn last_load_error(&self) -> Option<&LoadError> {
        self.last_load_error.as_ref()
    }

    /// Number of like requests whose outcome has not been settled
    pub fn pending_likes(&self) -> usize {
        self.in_flight
    }

    pub fn is_like_pending(&self, project_id: &str) -> bool {
        self.intents.contains_key(project_id)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Initial load. On failure the list is emptied, the failure is recorded and
    /// reported once, and the error is returned as a value.
    pub async fn load(&mut self) -> Result<&[Project], LoadError> {
        let fetched = self.transport.fetch_approved_projects().await;
        match fetched {
            Ok(projects) => {
                self.replace(projects);
                Ok(&self.projects)
            }
            Err(e) => {
                self.projects.clear();
                Err(self.record_load_failure(e))
            }
        }
    }

    /// Refetch and replace the list, reconciling optimistic likes with the server.
    ///
    /// Unsettled toggles are re-applied on top of the fresh data. On failure the
    /// current list is kept.
    pub async fn reload(&mut self) -> Result<&[Project], LoadError> {
        let fetched = self.transport.fetch_approved_projects().await;
        match fetched {
            Ok(projects) => {
                self.replace(projects);
                Ok(&self.projects)
            }
            Err(e) => Err(self.record_load_failure(e)),
        }
    }

    fn replace(&mut self, mut projects: Vec<Project>) {
        let duplicates: usize = projects.iter_mut().map(Project::dedupe_likes).sum();
        if duplicates > 0 {
            warn!(duplicates, "Dropped duplicate likes from feed API payload");
        }

        let mut projects = sort_projects(projects, SortMode::Newest);
        for (project_id, intent) in &self.intents {
            if let Some(project) = projects.iter_mut().find(|p| &p.id == project_id) {
                apply_like(project, &intent.viewer_id, intent.add);
            }
        }

        info!(count = projects.len(), "Loaded approved projects");
        self.projects = projects;
        self.last_load_error = None;
    }

    fn record_load_failure(&mut self, e: TransportError) -> LoadError {
        warn!(error = %e, "Error fetching projects");
        let err = LoadError::from(e);
        self.last_load_error = Some(err.clone());
        self.notifier.error(LOAD_FAILED_MESSAGE);
        err
    }

    // ========================================================================
    // Likes
    // ========================================================================

    /// Optimistically like (`currently_liked = false`) or unlike a project.
    ///
    /// The list is updated before the request is issued. Must be called from
    /// within a Tokio runtime: the request runs on a spawned task.
    pub fn toggle_like(
        &mut self,
        project_id: &str,
        viewer: Option<&Viewer>,
        currently_liked: bool,
    ) -> Result<LikeTicket, LikeToggleError> {
        let Some(viewer) = viewer else {
            self.notifier.error(SIGN_IN_REQUIRED_MESSAGE);
            return Err(LikeToggleError::Unauthenticated);
        };

        let Some(project) = self.projects.iter_mut().find(|p| p.id == project_id) else {
            warn!(project_id = %project_id, "Like toggle for unknown project");
            return Err(LikeToggleError::ProjectNotFound(project_id.to_string()));
        };

        let add = !currently_liked;
        apply_like(project, &viewer.id, add);

        self.next_seq += 1;
        let ticket = LikeTicket {
            project_id: project_id.to_string(),
            seq: self.next_seq,
            add,
        };
        self.intents.insert(
            project_id.to_string(),
            PendingIntent {
                seq: ticket.seq,
                viewer_id: viewer.id.clone(),
                add,
            },
        );
        self.in_flight += 1;

        debug!(project_id = %project_id, seq = ticket.seq, add, "Like toggled optimistically");

        let transport = Arc::clone(&self.transport);
        let tx = self.outcomes_tx.clone();
        let spawned = ticket.clone();
        tokio::spawn(async move {
            let result = transport.set_like(&spawned.project_id, spawned.add).await;
            // receiver lives as long as the store
            let _ = tx.send(LikeOutcome {
                ticket: spawned,
                result,
            });
        });

        Ok(ticket)
    }

    /// Wait for the next like outcome. `None` when nothing is in flight.
    pub async fn next_outcome(&mut self) -> Option<LikeOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        self.outcomes_rx.recv().await
    }

    /// An outcome that has already arrived, without waiting
    pub fn try_next_outcome(&mut self) -> Option<LikeOutcome> {
        self.outcomes_rx.try_recv().ok()
    }

    /// Process a like outcome.
    ///
    /// A rejection of the live intent is reported once and returned; a rejection
    /// of a toggle that has since been superseded is only logged. Like state is
    /// never touched here.
    pub fn settle(&mut self, outcome: LikeOutcome) -> Result<(), LikeToggleError> {
        let LikeOutcome { ticket, result } = outcome;
        self.in_flight = self.in_flight.saturating_sub(1);

        let is_live = self
            .intents
            .get(&ticket.project_id)
            .is_some_and(|intent| intent.seq == ticket.seq);
        if is_live {
            self.intents.remove(&ticket.project_id);
        }

        match result {
            Ok(()) => {
                debug!(project_id = %ticket.project_id, seq = ticket.seq, "Like request settled");
                Ok(())
            }
            Err(source) if is_live => {
                warn!(
                    project_id = %ticket.project_id,
                    seq = ticket.seq,
                    error = %source,
                    "Error toggling like"
                );
                self.notifier.error(LIKE_FAILED_MESSAGE);
                Err(LikeToggleError::Rejected {
                    project_id: ticket.project_id,
                    source,
                })
            }
            Err(source) => {
                debug!(
                    project_id = %ticket.project_id,
                    seq = ticket.seq,
                    error = %source,
                    "Superseded like request failed, ignoring"
                );
                Ok(())
            }
        }
    }
}

/// Set the like membership of `viewer_id` on `project`, keeping at most one record.
fn apply_like(project: &mut Project, viewer_id: &str, add: bool) {
    if add {
        if !project.is_liked_by(viewer_id) {
            project.likes.push(Like::now(viewer_id));
        }
    } else {
        project.likes.retain(|l| l.hacker_id != viewer_id);
    }
}
