//! HTTP feed transport
//!
//! Talks to the projects API:
//! - `GET  {base}/api/projects?status=APPROVED`
//! - `POST {base}/api/projects/{id}/like` (add)
//! - `DELETE {base}/api/projects/{id}/like` (remove)
//!
//! The session is carried by an optional bearer token.

use super::traits::FeedTransport;
use crate::feed::error::TransportError;
use crate::feed::models::{Project, ProjectStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// reqwest-backed [`FeedTransport`].
///
/// Cheaply cloneable (shares the reqwest client internally).
#[derive(Clone)]
pub struct HttpFeedTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpFeedTransport {
    /// Create a transport for the API rooted at `base_url`.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn projects_url(&self) -> String {
        format!("{}/api/projects", self.base_url)
    }

    fn like_url(&self, project_id: &str) -> String {
        format!(
            "{}/api/projects/{}/like",
            self.base_url,
            urlencoding::encode(project_id)
        )
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

fn network_error(url: &str, e: reqwest::Error) -> TransportError {
    warn!(url = %url, error = %e, "Feed API request failed");
    TransportError::Network(e.to_string())
}

#[async_trait]
impl FeedTransport for HttpFeedTransport {
    async fn fetch_approved_projects(&self) -> Result<Vec<Project>, TransportError> {
        let url = self.projects_url();
        let response = self
            .authorize(self.client.get(&url))
            .query(&[("status", ProjectStatus::Approved.to_string())])
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Feed API returned an error status");
            return Err(TransportError::Status(status.as_u16()));
        }

        let projects: Vec<Project> = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        debug!(count = projects.len(), "Fetched approved projects");
        Ok(projects)
    }

    async fn set_like(&self, project_id: &str, add: bool) -> Result<(), TransportError> {
        let url = self.like_url(project_id);
        let req = if add {
            self.client.post(&url)
        } else {
            self.client.delete(&url)
        };

        let response = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            // already in the requested state
            debug!(project_id = %project_id, add, "Like already in requested state");
            return Ok(());
        }
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(())
    }
}
