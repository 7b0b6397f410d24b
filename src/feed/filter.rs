//! Filter engine: the pure `(projects, spec) -> visible projects` function
//!
//! Every stage is conjunctive. The engine never mutates its input and always
//! returns a freshly ordered list.

use super::models::{parse_date, Project, ProjectStatus};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Sort mode
// ============================================================================

/// Display order of the feed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Descending start date, ties by descending creation time
    #[default]
    Newest,
    /// Ascending start date, ties by ascending creation time
    Oldest,
    /// Most likes first, ties by newest
    MostLiked,
    /// Title A–Z, case-insensitive
    Title,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Newest => write!(f, "newest"),
            Self::Oldest => write!(f, "oldest"),
            Self::MostLiked => write!(f, "most_liked"),
            Self::Title => write!(f, "title"),
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "latest" | "recent" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "most_liked" | "trending" | "popular" => Ok(Self::MostLiked),
            "title" | "alphabetical" => Ok(Self::Title),
            _ => Err(format!("Unknown sort mode: {}", s)),
        }
    }
}

impl SortMode {
    /// Parse a sort identifier, falling back to [`SortMode::Newest`] for unknown values.
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_else(|e| {
            tracing::debug!("{}, falling back to newest", e);
            Self::default()
        })
    }
}

// ============================================================================
// Filter spec
// ============================================================================

/// A viewer-supplied feed query. Empty fields constrain nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Technology tag ids; a project must carry at least one of them
    pub tech_tags: Vec<String>,
    /// Domain tag ids; a project must carry at least one of them
    pub domain_tags: Vec<String>,
    /// Case-insensitive substring matched against title and description
    pub search: Option<String>,
    /// Inclusive lower bound on the start date
    pub from_date: Option<String>,
    /// Inclusive upper bound on the start date (a bare date covers the whole day)
    pub to_date: Option<String>,
    /// Allowed statuses; empty means approved only
    pub status: Vec<ProjectStatus>,
    pub sort: SortMode,
}

impl FilterSpec {
    pub fn with_tech_tag(mut self, tag_id: impl Into<String>) -> Self {
        self.tech_tags.push(tag_id.into());
        self
    }

    pub fn with_domain_tag(mut self, tag_id: impl Into<String>) -> Self {
        self.domain_tags.push(tag_id.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_date_range(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.from_date = from.map(str::to_string);
        self.to_date = to.map(str::to_string);
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status.push(status);
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    /// Normalized search needle, `None` when there is nothing to match
    fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn status_allows(&self, status: ProjectStatus) -> bool {
        if self.status.is_empty() {
            status == ProjectStatus::Approved
        } else {
            self.status.contains(&status)
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Resolved date bounds. An unparsable bound is unbounded on that side.
#[derive(Debug, Clone, Copy)]
struct DateBounds {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

impl DateBounds {
    fn from_spec(spec: &FilterSpec) -> Self {
        Self {
            from: spec.from_date.as_deref().and_then(parse_date),
            to: spec.to_date.as_deref().and_then(upper_bound),
        }
    }

    fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    fn contains(&self, project: &Project) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(start) = project.start_date_parsed() else {
            return false;
        };
        self.from.map_or(true, |from| start >= from) && self.to.map_or(true, |to| start <= to)
    }
}

/// Upper bound for a `to_date`: a bare `YYYY-MM-DD` includes the whole day.
fn upper_bound(raw: &str) -> Option<DateTime<Utc>> {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(day) => day
            .checked_add_days(Days::new(1))
            .and_then(|next| next.and_hms_opt(0, 0, 0))
            .map(|midnight| midnight.and_utc() - chrono::Duration::nanoseconds(1)),
        Err(_) => parse_date(raw),
    }
}

/// Whether a single project passes every filter stage (sorting aside)
pub fn matches(project: &Project, spec: &FilterSpec) -> bool {
    matches_with(project, spec, spec.search_needle().as_deref(), DateBounds::from_spec(spec))
}

fn matches_with(
    project: &Project,
    spec: &FilterSpec,
    needle: Option<&str>,
    bounds: DateBounds,
) -> bool {
    if !spec.status_allows(project.status) {
        return false;
    }
    if !spec.tech_tags.is_empty() && !spec.tech_tags.iter().any(|t| project.has_tech_tag(t)) {
        return false;
    }
    if !spec.domain_tags.is_empty() && !spec.domain_tags.iter().any(|t| project.has_domain_tag(t))
    {
        return false;
    }
    if let Some(needle) = needle {
        let hit = project.title.to_lowercase().contains(needle)
            || project.description.to_lowercase().contains(needle);
        if !hit {
            return false;
        }
    }
    bounds.contains(project)
}

/// Apply `spec` to `projects`, returning the visible subset in display order.
pub fn apply(projects: &[Project], spec: &FilterSpec) -> Vec<Project> {
    let needle = spec.search_needle();
    let bounds = DateBounds::from_spec(spec);

    let visible: Vec<Project> = projects
        .iter()
        .filter(|p| matches_with(p, spec, needle.as_deref(), bounds))
        .cloned()
        .collect();

    sort_projects(visible, spec.sort)
}

/// Order projects according to `mode`.
///
/// Date-ordered modes leave projects with an unparsable start date in the slot
/// they arrived in; only the dated projects are reordered around them.
pub fn sort_projects(projects: Vec<Project>, mode: SortMode) -> Vec<Project> {
    match mode {
        SortMode::Newest => sort_by_start(projects, true),
        SortMode::Oldest => sort_by_start(projects, false),
        SortMode::MostLiked => {
            let mut projects = projects;
            projects.sort_by_cached_key(|p| {
                (
                    Reverse(p.like_count()),
                    Reverse(p.start_date_parsed()),
                    Reverse(p.created_at_parsed()),
                )
            });
            projects
        }
        SortMode::Title => {
            let mut projects = projects;
            projects.sort_by_cached_key(|p| p.title.to_lowercase());
            projects
        }
    }
}

fn sort_by_start(projects: Vec<Project>, descending: bool) -> Vec<Project> {
    let mut slots: Vec<Option<Project>> = Vec::with_capacity(projects.len());
    let mut dated_slots = Vec::new();
    let mut dated = Vec::new();

    for project in projects {
        match project.start_date_parsed() {
            Some(start) => {
                dated_slots.push(slots.len());
                dated.push((start, project.created_at_parsed(), project));
                slots.push(None);
            }
            None => slots.push(Some(project)),
        }
    }

    dated.sort_by(|a, b| {
        let ord = a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1));
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });

    for (slot, (_, _, project)) in dated_slots.into_iter().zip(dated) {
        slots[slot] = Some(project);
    }
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{project_ids, test_project, ProjectBuilder};

    fn three_dated() -> Vec<Project> {
        vec![
            test_project("jan", "2024-01-01"),
            test_project("mar", "2024-03-01"),
            test_project("feb", "2024-02-01"),
        ]
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    #[test]
    fn test_default_sort_is_newest_first() {
        let visible = apply(&three_dated(), &FilterSpec::default());
        assert_eq!(project_ids(&visible), vec!["mar", "feb", "jan"]);
    }

    #[test]
    fn test_newest_ties_broken_by_created_at_desc() {
        let projects = vec![
            ProjectBuilder::new("early")
                .start_date("2024-05-01")
                .created_at("2024-04-01T08:00:00Z")
                .build(),
            ProjectBuilder::new("late")
                .start_date("2024-05-01")
                .created_at("2024-04-02T08:00:00Z")
                .build(),
        ];
        let visible = apply(&projects, &FilterSpec::default());
        assert_eq!(project_ids(&visible), vec!["late", "early"]);
    }

    #[test]
    fn test_oldest_sort() {
        let spec = FilterSpec::default().with_sort(SortMode::Oldest);
        let visible = apply(&three_dated(), &spec);
        assert_eq!(project_ids(&visible), vec!["jan", "feb", "mar"]);
    }

    #[test]
    fn test_unparsable_start_dates_keep_their_slot() {
        let projects = vec![
            test_project("jan", "2024-01-01"),
            test_project("broken", "someday"),
            test_project("mar", "2024-03-01"),
            test_project("feb", "2024-02-01"),
            test_project("empty", ""),
        ];
        let visible = apply(&projects, &FilterSpec::default());
        assert_eq!(
            project_ids(&visible),
            vec!["mar", "broken", "feb", "jan", "empty"]
        );
    }

    #[test]
    fn test_all_unparsable_dates_preserve_input_order() {
        let projects = vec![
            test_project("b", "??"),
            test_project("a", "n/a"),
            test_project("c", "tomorrow"),
        ];
        let visible = apply(&projects, &FilterSpec::default());
        assert_eq!(project_ids(&visible), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_most_liked_sort_ties_by_newest() {
        let projects = vec![
            ProjectBuilder::new("one-old").start_date("2024-01-01").likes(&["a"]).build(),
            ProjectBuilder::new("none").start_date("2024-06-01").build(),
            ProjectBuilder::new("two").start_date("2023-01-01").likes(&["a", "b"]).build(),
            ProjectBuilder::new("one-new").start_date("2024-02-01").likes(&["c"]).build(),
        ];
        let spec = FilterSpec::default().with_sort(SortMode::MostLiked);
        let visible = apply(&projects, &spec);
        assert_eq!(
            project_ids(&visible),
            vec!["two", "one-new", "one-old", "none"]
        );
    }

    #[test]
    fn test_title_sort_case_insensitive() {
        let projects = vec![
            ProjectBuilder::new("z").title("zebra").start_date("2024-01-01").build(),
            ProjectBuilder::new("a").title("Aardvark").start_date("2024-01-02").build(),
            ProjectBuilder::new("m").title("mole").start_date("2024-01-03").build(),
        ];
        let spec = FilterSpec::default().with_sort(SortMode::Title);
        assert_eq!(project_ids(&apply(&projects, &spec)), vec!["a", "m", "z"]);
    }

    #[test]
    fn test_sort_mode_parsing() {
        assert_eq!("trending".parse::<SortMode>(), Ok(SortMode::MostLiked));
        assert_eq!("Newest".parse::<SortMode>(), Ok(SortMode::Newest));
        assert_eq!(SortMode::parse_or_default("bogus"), SortMode::Newest);
        assert_eq!(SortMode::parse_or_default("oldest"), SortMode::Oldest);
    }

    // =========================================================================
    // Stages
    // =========================================================================

    #[test]
    fn test_empty_spec_keeps_only_approved() {
        let projects = vec![
            test_project("a", "2024-01-01"),
            ProjectBuilder::new("draft")
                .start_date("2024-05-01")
                .status(ProjectStatus::Draft)
                .build(),
            ProjectBuilder::new("pending")
                .start_date("2024-04-01")
                .status(ProjectStatus::Pending)
                .build(),
            test_project("b", "2024-02-01"),
        ];
        let visible = apply(&projects, &FilterSpec::default());
        assert_eq!(project_ids(&visible), vec!["b", "a"]);
    }

    #[test]
    fn test_explicit_status_set() {
        let projects = vec![
            test_project("a", "2024-01-01"),
            ProjectBuilder::new("pending")
                .start_date("2024-04-01")
                .status(ProjectStatus::Pending)
                .build(),
        ];
        let spec = FilterSpec::default().with_status(ProjectStatus::Pending);
        assert_eq!(project_ids(&apply(&projects, &spec)), vec!["pending"]);
    }

    #[test]
    fn test_tech_tag_filter_isolates_single_project() {
        let projects = vec![
            ProjectBuilder::new("go").start_date("2024-01-01").tech_tags(&["go"]).build(),
            ProjectBuilder::new("rusty")
                .start_date("2024-01-02")
                .tech_tags(&["rust", "wasm"])
                .build(),
            ProjectBuilder::new("ts").start_date("2024-01-03").tech_tags(&["typescript"]).build(),
        ];
        let spec = FilterSpec::default().with_tech_tag("rust");
        let visible = apply(&projects, &spec);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0], projects[1]);
    }

    #[test]
    fn test_tag_sets_are_independent_and_conjunctive() {
        let projects = vec![
            ProjectBuilder::new("both")
                .start_date("2024-01-01")
                .tech_tags(&["rust"])
                .domain_tags(&["health"])
                .build(),
            ProjectBuilder::new("tech-only")
                .start_date("2024-01-02")
                .tech_tags(&["rust"])
                .domain_tags(&["finance"])
                .build(),
        ];
        let spec = FilterSpec::default()
            .with_tech_tag("rust")
            .with_domain_tag("health")
            .with_domain_tag("edu");
        assert_eq!(project_ids(&apply(&projects, &spec)), vec!["both"]);
    }

    #[test]
    fn test_search_matches_title_or_description_case_insensitive() {
        let projects = vec![
            ProjectBuilder::new("t").title("Crab Radar").start_date("2024-01-01").build(),
            ProjectBuilder::new("d")
                .description("an app that finds CRABS")
                .start_date("2024-01-02")
                .build(),
            ProjectBuilder::new("x").title("Lobster").start_date("2024-01-03").build(),
        ];
        let spec = FilterSpec::default().with_search("  crab ");
        assert_eq!(project_ids(&apply(&projects, &spec)), vec!["d", "t"]);
    }

    #[test]
    fn test_blank_search_passes_everything() {
        let spec = FilterSpec::default().with_search("   ");
        assert_eq!(apply(&three_dated(), &spec).len(), 3);
    }

    #[test]
    fn test_date_range_inclusive() {
        let spec = FilterSpec::default().with_date_range(Some("2024-02-01"), Some("2024-03-01"));
        assert_eq!(project_ids(&apply(&three_dated(), &spec)), vec!["mar", "feb"]);
    }

    #[test]
    fn test_bare_to_date_covers_whole_day() {
        let projects = vec![test_project("afternoon", "2024-03-01T15:30:00Z")];
        let spec = FilterSpec::default().with_date_range(None, Some("2024-03-01"));
        assert_eq!(apply(&projects, &spec).len(), 1);
    }

    #[test]
    fn test_unparsable_bound_is_unbounded() {
        let spec = FilterSpec::default().with_date_range(Some("garbage"), Some("2024-02-15"));
        assert_eq!(project_ids(&apply(&three_dated(), &spec)), vec!["feb", "jan"]);

        let spec = FilterSpec::default().with_date_range(Some("nope"), Some("also nope"));
        assert_eq!(apply(&three_dated(), &spec).len(), 3);
    }

    #[test]
    fn test_undated_project_excluded_only_when_range_active() {
        let projects = vec![test_project("dated", "2024-01-10"), test_project("undated", "?")];
        assert_eq!(apply(&projects, &FilterSpec::default()).len(), 2);

        let spec = FilterSpec::default().with_date_range(Some("2024-01-01"), None);
        assert_eq!(project_ids(&apply(&projects, &spec)), vec!["dated"]);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[test]
    fn test_apply_is_idempotent() {
        let projects = vec![
            test_project("jan", "2024-01-01"),
            test_project("broken", "someday"),
            ProjectBuilder::new("rust")
                .start_date("2024-03-01")
                .tech_tags(&["rust"])
                .likes(&["a", "b"])
                .build(),
            ProjectBuilder::new("draft")
                .start_date("2024-02-01")
                .status(ProjectStatus::Draft)
                .build(),
            test_project("feb", "2024-02-01"),
        ];

        let specs = vec![
            FilterSpec::default(),
            FilterSpec::default().with_sort(SortMode::MostLiked),
            FilterSpec::default().with_sort(SortMode::Oldest),
            FilterSpec::default().with_tech_tag("rust"),
            FilterSpec::default().with_search("a"),
            FilterSpec::default()
                .with_status(ProjectStatus::Draft)
                .with_status(ProjectStatus::Approved),
            FilterSpec::default().with_date_range(Some("2024-01-15"), None),
        ];

        for spec in &specs {
            let once = apply(&projects, spec);
            let twice = apply(&once, spec);
            assert_eq!(once, twice, "not idempotent for {:?}", spec);
        }
    }

    #[test]
    fn test_apply_does_not_mutate_input() {
        let projects = three_dated();
        let snapshot = projects.clone();
        let _ = apply(&projects, &FilterSpec::default());
        assert_eq!(projects, snapshot);
    }

    #[test]
    fn test_matches_single_project() {
        let project = ProjectBuilder::new("p").start_date("2024-01-01").tech_tags(&["rust"]).build();
        assert!(matches(&project, &FilterSpec::default().with_tech_tag("rust")));
        assert!(!matches(&project, &FilterSpec::default().with_tech_tag("go")));
    }
}
