//! Project feed
//!
//! This module provides:
//! - `ProjectStore`: the canonical project list and optimistic likes
//! - `filter`: the pure filter/sort engine over a `FilterSpec`
//! - `FeedController`: the Loading/Ready/Empty state machine and card rendering

pub mod card;
pub mod controller;
pub mod error;
pub mod filter;
pub mod models;
mod query;
pub mod store;

pub use card::FeedCard;
pub use controller::{FeedController, FeedRender, FeedState};
pub use error::{LikeToggleError, LoadError, TransportError};
pub use filter::{FilterSpec, SortMode};
pub use models::{Project, ProjectStatus};
pub use store::{LikeOutcome, LikeTicket, ProjectStore};
