//! Feed API transport
//!
//! Architecture follows the project pattern (trait + impl + mock):
//! - `FeedTransport` trait: async interface to the projects API
//! - `HttpFeedTransport`: reqwest implementation
//! - `MockFeedTransport`: in-memory server for tests

pub mod http;
pub mod mock;
pub mod traits;

pub use http::HttpFeedTransport;
pub use mock::MockFeedTransport;
pub use traits::FeedTransport;
