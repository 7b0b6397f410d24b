//! Test helper factories
//!
//! Convenience constructors for projects and people with sensible defaults.
#![allow(dead_code)]

use crate::feed::models::{Like, Person, Project, ProjectStatus, Tag};
use uuid::Uuid;

// ============================================================================
// People
// ============================================================================

/// A person with a random id and no avatar
pub fn test_person(name: &str) -> Person {
    Person {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        bio: None,
        twitter_url: None,
        linkedin_url: None,
        avatar: None,
    }
}

// ============================================================================
// Projects
// ============================================================================

/// An approved project titled after its id, created on its start date
pub fn test_project(id: &str, start_date: &str) -> Project {
    ProjectBuilder::new(id).start_date(start_date).build()
}

/// Ids of `projects`, in order
pub fn project_ids(projects: &[Project]) -> Vec<&str> {
    projects.iter().map(|p| p.id.as_str()).collect()
}

fn tag(id: &str) -> Tag {
    Tag {
        id: id.to_string(),
        name: id.to_string(),
        description: None,
    }
}

/// Builder for projects with only the fields a test cares about
pub struct ProjectBuilder {
    project: Project,
    created_at: Option<String>,
}

impl ProjectBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            project: Project {
                id: id.to_string(),
                title: id.to_string(),
                status: ProjectStatus::Approved,
                preview: String::new(),
                description: String::new(),
                github_url: None,
                demo_url: None,
                blog_url: None,
                tech_tags: Vec::new(),
                domain_tags: Vec::new(),
                is_starred: false,
                is_broken: false,
                thumbnail: None,
                launch_lead: test_person("Ada"),
                participants: Vec::new(),
                start_date: String::new(),
                end_date: None,
                likes: Vec::new(),
                created_at: String::new(),
                updated_at: String::new(),
            },
            created_at: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.project.title = title.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.project.description = description.to_string();
        self
    }

    pub fn start_date(mut self, start_date: &str) -> Self {
        self.project.start_date = start_date.to_string();
        self
    }

    /// Defaults to the start date when not set
    pub fn created_at(mut self, created_at: &str) -> Self {
        self.created_at = Some(created_at.to_string());
        self
    }

    pub fn status(mut self, status: ProjectStatus) -> Self {
        self.project.status = status;
        self
    }

    pub fn tech_tags(mut self, ids: &[&str]) -> Self {
        self.project.tech_tags = ids.iter().map(|id| tag(id)).collect();
        self
    }

    pub fn domain_tags(mut self, ids: &[&str]) -> Self {
        self.project.domain_tags = ids.iter().map(|id| tag(id)).collect();
        self
    }

    /// One like per entry; repeated ids produce duplicate records
    pub fn likes(mut self, hacker_ids: &[&str]) -> Self {
        self.project.likes = hacker_ids.iter().map(|id| Like::now(*id)).collect();
        self
    }

    pub fn build(mut self) -> Project {
        self.project.created_at = self
            .created_at
            .unwrap_or_else(|| self.project.start_date.clone());
        self.project.updated_at = self.project.created_at.clone();
        self.project
    }
}
