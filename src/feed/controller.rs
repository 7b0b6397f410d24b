//! Feed Controller - composes the store and the filter engine
//!
//! State machine: `Loading -> Ready | Empty`, then `Ready <-> Empty` on every
//! filter change or list mutation. There is no way back to `Loading`.
//!
//! The controller is driven one event at a time through `&mut self`: load
//! completion, filter change, like toggle, like settlement. The visible list is
//! recomputed from scratch after each event that can change it.

use super::card::FeedCard;
use super::error::LikeToggleError;
use super::filter::{self, FilterSpec};
use super::models::Project;
use super::store::{LikeOutcome, LikeTicket, ProjectStore};
use crate::identity::{Identity, Viewer};
use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::debug;

/// What the feed is currently showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    Loading,
    Ready(Vec<Project>),
    Empty,
}

/// Owner of the derived, visible project list
pub struct FeedController {
    store: ProjectStore,
    identity: Arc<dyn Identity>,
    spec: FilterSpec,
    state: FeedState,
    generation: u64,
}

impl FeedController {
    pub fn new(store: ProjectStore, identity: Arc<dyn Identity>, spec: FilterSpec) -> Self {
        Self {
            store,
            identity,
            spec,
            state: FeedState::Loading,
            generation: 0,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FeedState::Loading)
    }

    /// The visible projects, empty while loading or when nothing matches
    pub fn visible(&self) -> &[Project] {
        match &self.state {
            FeedState::Ready(projects) => projects,
            FeedState::Loading | FeedState::Empty => &[],
        }
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Incremented every time the visible list is recomputed
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Run the initial load and leave `Loading`. A failed load ends in `Empty`;
    /// the store has already notified the viewer. Later calls are no-ops.
    pub async fn load(&mut self) -> &FeedState {
        if !self.is_loading() {
            debug!("Feed already loaded, ignoring load");
            return &self.state;
        }
        // failure already recorded and notified by the store
        let _ = self.store.load().await;
        self.recompute();
        &self.state
    }

    /// Refetch the canonical list without going back to `Loading`.
    pub async fn reload(&mut self) -> &FeedState {
        if self.is_loading() {
            return self.load().await;
        }
        let _ = self.store.reload().await;
        self.recompute();
        &self.state
    }

    pub fn on_filter_spec_change(&mut self, spec: FilterSpec) {
        self.spec = spec;
        if !self.is_loading() {
            self.recompute();
        }
    }

    /// Toggle the current viewer's like on a project.
    ///
    /// The liked/unliked direction comes from the canonical list, not from what
    /// a possibly stale card showed.
    pub fn on_like_toggle(&mut self, project_id: &str) -> Result<LikeTicket, LikeToggleError> {
        let viewer = self.identity.current_viewer();
        let currently_liked = viewer.as_ref().is_some_and(|v| {
            self.store
                .project(project_id)
                .is_some_and(|p| p.is_liked_by(&v.id))
        });

        let ticket = self
            .store
            .toggle_like(project_id, viewer.as_ref(), currently_liked)?;
        if !self.is_loading() {
            self.recompute();
        }
        Ok(ticket)
    }

    /// Feed back a like outcome. Never changes the visible state.
    pub fn on_like_settled(&mut self, outcome: LikeOutcome) -> Result<(), LikeToggleError> {
        self.store.settle(outcome)
    }

    /// Wait for and process the next like outcome; `None` when nothing is in flight.
    pub async fn next_like_settlement(&mut self) -> Option<Result<(), LikeToggleError>> {
        let outcome = self.store.next_outcome().await?;
        Some(self.on_like_settled(outcome))
    }

    /// Settle every in-flight like request, returning how many were rejected.
    pub async fn settle_all(&mut self) -> usize {
        let mut rejected = 0;
        while let Some(result) = self.next_like_settlement().await {
            if result.is_err() {
                rejected += 1;
            }
        }
        rejected
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Lazily build one card per visible project, in display order.
    ///
    /// The iterator borrows the controller, so it cannot outlive the generation
    /// it was created for.
    pub fn render(&self) -> FeedRender<'_> {
        FeedRender {
            generation: self.generation,
            viewer: self.identity.current_viewer(),
            projects: self.visible().iter(),
        }
    }

    fn recompute(&mut self) {
        let visible = filter::apply(self.store.projects(), &self.spec);
        self.generation += 1;
        debug!(
            generation = self.generation,
            visible = visible.len(),
            total = self.store.projects().len(),
            "Feed recomputed"
        );
        self.state = if visible.is_empty() {
            FeedState::Empty
        } else {
            FeedState::Ready(visible)
        };
    }
}

/// Lazy, finite sequence of cards for one generation of the feed
pub struct FeedRender<'a> {
    generation: u64,
    viewer: Option<Viewer>,
    projects: std::slice::Iter<'a, Project>,
}

impl FeedRender<'_> {
    /// Generation of the visible list these cards come from
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Iterator for FeedRender<'_> {
    type Item = FeedCard;

    fn next(&mut self) -> Option<FeedCard> {
        self.projects
            .next()
            .map(|p| FeedCard::new(p, self.viewer.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.projects.size_hint()
    }
}

impl ExactSizeIterator for FeedRender<'_> {}

impl FusedIterator for FeedRender<'_> {}
