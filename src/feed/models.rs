//! Feed models
//!
//! Projects as served by the feed API. Dates are kept exactly as received and
//! parsed on demand, so a malformed value never prevents a project from loading.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Core Enums
// ============================================================================

/// Moderation status of a project. Set by the moderation process, read-only here.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Pending,
    Approved,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "DRAFT"),
            Self::Pending => write!(f, "PENDING"),
            Self::Approved => write!(f, "APPROVED"),
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            _ => Err(format!("Unknown project status: {}", s)),
        }
    }
}

// ============================================================================
// Supporting records
// ============================================================================

/// A technology or domain tag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reference to an uploaded image (avatar, thumbnail)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaRef {
    pub url: String,
}

/// A person: launch lead or participant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<MediaRef>,
}

/// A participant and the role they played
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub role: String,
    pub hacker: Person,
}

/// A single like. At most one per liker per project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub hacker_id: String,
    pub created_at: String,
}

impl Like {
    /// A like stamped with the current time
    pub fn now(hacker_id: impl Into<String>) -> Self {
        Self {
            hacker_id: hacker_id.into(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

// ============================================================================
// Project
// ============================================================================

/// A project entry in the feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_url: Option<String>,
    #[serde(default)]
    pub tech_tags: Vec<Tag>,
    #[serde(default)]
    pub domain_tags: Vec<Tag>,
    #[serde(rename = "is_starred", default)]
    pub is_starred: bool,
    #[serde(rename = "is_broken", default)]
    pub is_broken: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<MediaRef>,
    pub launch_lead: Person,
    #[serde(default)]
    pub participants: Vec<Participant>,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Project {
    /// Parsed start date, `None` when the raw value is not a recognizable date
    pub fn start_date_parsed(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.start_date)
    }

    /// Parsed creation timestamp
    pub fn created_at_parsed(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.created_at)
    }

    /// Whether `viewer_id` currently has a like on this project
    pub fn is_liked_by(&self, viewer_id: &str) -> bool {
        self.likes.iter().any(|l| l.hacker_id == viewer_id)
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn has_tech_tag(&self, tag_id: &str) -> bool {
        self.tech_tags.iter().any(|t| t.id == tag_id)
    }

    pub fn has_domain_tag(&self, tag_id: &str) -> bool {
        self.domain_tags.iter().any(|t| t.id == tag_id)
    }

    /// Collapse duplicate likes from the same liker, keeping the first one seen.
    ///
    /// Returns the number of records dropped.
    pub fn dedupe_likes(&mut self) -> usize {
        let before = self.likes.len();
        let mut seen = std::collections::HashSet::new();
        self.likes.retain(|l| seen.insert(l.hacker_id.clone()));
        before - self.likes.len()
    }
}

/// Parse a date as sent by the API or typed into a filter.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS` without offset (read as UTC)
/// and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
