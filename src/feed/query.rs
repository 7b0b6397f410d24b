//! Feed page query strings
//!
//! Builds a [`FilterSpec`] from the query string of the feed page, e.g.
//! `tech_tag=rust&tech_tag=wasm&search=crab&status=approved,pending&sort=oldest`.

use super::filter::{FilterSpec, SortMode};
use super::models::ProjectStatus;
use tracing::debug;

impl FilterSpec {
    /// Parse a query string (with or without the leading `?`).
    ///
    /// Unknown keys and unknown statuses are skipped, blank values are treated
    /// as absent and an unknown sort falls back to newest. Never fails.
    pub fn from_query_string(query: &str) -> Self {
        Self::from_query_string_with_sort(query, SortMode::default())
    }

    /// Like [`from_query_string`](Self::from_query_string), with `default_sort`
    /// used when the query has no usable `sort` parameter.
    pub fn from_query_string_with_sort(query: &str, default_sort: SortMode) -> Self {
        let mut spec = FilterSpec {
            sort: default_sort,
            ..FilterSpec::default()
        };

        for (key, value) in pairs(query.trim_start_matches('?')) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "tech_tag" => spec.tech_tags.push(value.to_string()),
                "domain_tag" => spec.domain_tags.push(value.to_string()),
                "search" => spec.search = Some(value.to_string()),
                "from_date" => spec.from_date = Some(value.to_string()),
                "to_date" => spec.to_date = Some(value.to_string()),
                "status" => {
                    for raw in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                        match raw.parse::<ProjectStatus>() {
                            Ok(status) if !spec.status.contains(&status) => spec.status.push(status),
                            Ok(_) => {}
                            Err(e) => debug!("{}, skipping", e),
                        }
                    }
                }
                "sort" => match value.parse::<SortMode>() {
                    Ok(sort) => spec.sort = sort,
                    Err(e) => debug!("{}, keeping {}", e, spec.sort),
                },
                other => debug!(key = other, "Ignoring unknown feed query parameter"),
            }
        }

        spec
    }
}

/// Decoded `key=value` pairs; a key without `=` has an empty value
fn pairs(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            (decode(key), decode(value))
        })
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_default_spec() {
        assert_eq!(FilterSpec::from_query_string(""), FilterSpec::default());
        assert_eq!(FilterSpec::from_query_string("?"), FilterSpec::default());
    }

    #[test]
    fn test_repeated_tags_and_decoding() {
        let spec = FilterSpec::from_query_string(
            "?tech_tag=rust&tech_tag=web%20assembly&domain_tag=health&search=crab+radar",
        );
        assert_eq!(spec.tech_tags, vec!["rust", "web assembly"]);
        assert_eq!(spec.domain_tags, vec!["health"]);
        assert_eq!(spec.search.as_deref(), Some("crab radar"));
    }

    #[test]
    fn test_status_repeated_or_comma_separated() {
        let spec = FilterSpec::from_query_string("status=approved,PENDING&status=pending&status=archived");
        assert_eq!(spec.status, vec![ProjectStatus::Approved, ProjectStatus::Pending]);
    }

    #[test]
    fn test_dates_and_sort() {
        let spec = FilterSpec::from_query_string("from_date=2024-01-01&to_date=2024-03-31&sort=most_liked");
        assert_eq!(spec.from_date.as_deref(), Some("2024-01-01"));
        assert_eq!(spec.to_date.as_deref(), Some("2024-03-31"));
        assert_eq!(spec.sort, SortMode::MostLiked);
    }

    #[test]
    fn test_configured_default_sort() {
        let spec = FilterSpec::from_query_string_with_sort("tech_tag=rust", SortMode::Title);
        assert_eq!(spec.sort, SortMode::Title);
        let spec = FilterSpec::from_query_string_with_sort("sort=oldest", SortMode::Title);
        assert_eq!(spec.sort, SortMode::Oldest);
        let spec = FilterSpec::from_query_string_with_sort("sort=sideways", SortMode::Title);
        assert_eq!(spec.sort, SortMode::Title);
    }

    #[test]
    fn test_blank_and_unknown_values() {
        let spec = FilterSpec::from_query_string("search=&tech_tag=%20&sort=sideways&page=2&flag");
        assert_eq!(spec, FilterSpec::default());
    }
}
