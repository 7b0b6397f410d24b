//! Feed cards: the per-project view units handed to the presentation layer
//!
//! A card is plain data derived from one project and the current viewer. It
//! carries no styling; theme, icons and layout belong to whoever draws it.

use super::models::{Person, Project};
use crate::identity::Viewer;
use serde::Serialize;

/// Characters of description shown before "more"
pub const EXCERPT_CHARS: usize = 220;
/// Technology tags shown before the "+N" overflow chip
pub const VISIBLE_TECH_TAGS: usize = 3;
/// Participants stacked behind the launch lead's avatar
pub const VISIBLE_PARTICIPANTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagChip {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Avatar {
    pub person_id: String,
    pub name: String,
    pub image_url: Option<String>,
    /// Fallback letter when there is no image
    pub initial: Option<char>,
    pub is_launch_lead: bool,
}

impl Avatar {
    fn from_person(person: &Person, is_launch_lead: bool) -> Self {
        Self {
            person_id: person.id.clone(),
            name: person.name.clone(),
            image_url: person.avatar.as_ref().map(|a| a.url.clone()),
            initial: person.name.chars().next(),
            is_launch_lead,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Github,
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardLink {
    pub kind: LinkKind,
    pub url: String,
}

/// One rendered feed entry, keyed by project id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedCard {
    pub project_id: String,
    pub title: String,
    /// Details page path
    pub href: String,
    /// Creation date as `YYYY-MM-DD`, if the timestamp parses
    pub created_on: Option<String>,
    pub liked_by_viewer: bool,
    pub like_count: usize,
    pub excerpt: String,
    /// Whether `excerpt` is shorter than the full description
    pub truncated: bool,
    pub tech_tags: Vec<TagChip>,
    /// Tags not shown as chips
    pub hidden_tag_count: usize,
    /// Launch lead first, then the first participants
    pub avatars: Vec<Avatar>,
    pub links: Vec<CardLink>,
    pub thumbnail_url: Option<String>,
    pub is_starred: bool,
    pub is_broken: bool,
}

impl FeedCard {
    pub fn new(project: &Project, viewer: Option<&Viewer>) -> Self {
        let (excerpt, truncated) = excerpt(&project.description, EXCERPT_CHARS);

        let avatars = std::iter::once(Avatar::from_person(&project.launch_lead, true))
            .chain(
                project
                    .participants
                    .iter()
                    .take(VISIBLE_PARTICIPANTS)
                    .map(|p| Avatar::from_person(&p.hacker, false)),
            )
            .collect();

        let links = [
            (LinkKind::Github, project.github_url.as_deref()),
            (LinkKind::Demo, project.demo_url.as_deref()),
        ]
        .into_iter()
        .filter_map(|(kind, url)| {
            url.filter(|u| !u.is_empty()).map(|u| CardLink {
                kind,
                url: u.to_string(),
            })
        })
        .collect();

        Self {
            project_id: project.id.clone(),
            title: project.title.clone(),
            href: format!("/projects/{}", project.id),
            created_on: project
                .created_at_parsed()
                .map(|d| d.format("%Y-%m-%d").to_string()),
            liked_by_viewer: viewer.is_some_and(|v| project.is_liked_by(&v.id)),
            like_count: project.like_count(),
            excerpt,
            truncated,
            tech_tags: project
                .tech_tags
                .iter()
                .take(VISIBLE_TECH_TAGS)
                .map(|t| TagChip {
                    id: t.id.clone(),
                    name: t.name.clone(),
                })
                .collect(),
            hidden_tag_count: project.tech_tags.len().saturating_sub(VISIBLE_TECH_TAGS),
            avatars,
            links,
            thumbnail_url: project.thumbnail.as_ref().map(|t| t.url.clone()),
            is_starred: project.is_starred,
            is_broken: project.is_broken,
        }
    }
}

/// First `max` characters of `text`, and whether anything was cut
fn excerpt(text: &str, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((cut, _)) => (text[..cut].to_string(), true),
        None => (text.to_string(), false),
    }
}
