//! Search index queries
//!
//! Provides structured queries and result types for scanning the search
//! index. Results always keep table order.

use serde::{Deserialize, Serialize};

use super::store::{label_matches, SearchIndex};
use super::types::{SearchCategory, SearchEntry};
use crate::utils::find_ignore_case;

/// How the query text is compared with an entry's key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Exact,
    #[default]
    Prefix,
    Substring,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MatchMode::Exact => "exact",
            MatchMode::Prefix => "prefix",
            MatchMode::Substring => "substring",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(MatchMode::Exact),
            "prefix" => Ok(MatchMode::Prefix),
            "substring" | "contains" => Ok(MatchMode::Substring),
            _ => Err(format!("Unknown match mode: {}", s)),
        }
    }
}

/// Structured search query
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Text matched against the decoded key
    pub text: String,
    pub mode: MatchMode,
    /// Only entries from this index section
    pub category: Option<SearchCategory>,
    /// Only entries with a link whose scope label contains this text
    pub scope: Option<String>,
    /// Only entries with at least one link into the generated site
    pub local_only: bool,
    /// Maximum results to return
    pub limit: Option<usize>,
}

impl SearchQuery {
    /// Create a prefix query, the way the search box matches
    pub fn prefix(text: &str) -> Self {
        Self {
            text: text.to_string(),
            mode: MatchMode::Prefix,
            ..Default::default()
        }
    }

    pub fn substring(text: &str) -> Self {
        Self {
            text: text.to_string(),
            mode: MatchMode::Substring,
            ..Default::default()
        }
    }

    pub fn exact(text: &str) -> Self {
        Self {
            text: text.to_string(),
            mode: MatchMode::Exact,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a limit to the query
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_category(mut self, category: SearchCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Add scope filter
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn local_only(mut self) -> Self {
        self.local_only = true;
        self
    }
}

/// A matched entry
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<'a> {
    /// Position of the entry in the index
    pub position: usize,
    pub entry: &'a SearchEntry,
    /// Matched byte range of the label, for highlighting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<(usize, usize)>,
}

/// Execute a search query against the index
pub fn execute_search<'a>(index: &'a SearchIndex, query: &SearchQuery) -> Vec<SearchHit<'a>> {
    let text = query.text.to_lowercase();
    let scope = query.scope.as_ref().map(|s| s.to_lowercase());
    let limit = query.limit.unwrap_or(usize::MAX);

    index
        .iter_named()
        .enumerate()
        .filter(|(_, (name, entry))| {
            key_matches(name, entry, &text, &query.text, query.mode)
                && category_matches(entry, query.category.as_ref())
                && scope_matches(entry, scope.as_deref())
                && (!query.local_only || entry.has_local_link())
        })
        .take(limit)
        .map(|(position, (_, entry))| SearchHit {
            position,
            entry,
            highlight: find_ignore_case(&entry.label, &query.text)
                .filter(|(start, end)| start != end),
        })
        .collect()
}

fn key_matches(
    name: &str,
    entry: &SearchEntry,
    lowered: &str,
    original: &str,
    mode: MatchMode,
) -> bool {
    match mode {
        MatchMode::Exact => {
            name == lowered || entry.id == original || label_matches(entry, lowered)
        }
        MatchMode::Prefix => name.starts_with(lowered),
        MatchMode::Substring => name.contains(lowered),
    }
}

fn category_matches(entry: &SearchEntry, category: Option<&SearchCategory>) -> bool {
    match category {
        Some(category) => entry.category.as_ref() == Some(category),
        None => true,
    }
}

fn scope_matches(entry: &SearchEntry, scope: Option<&str>) -> bool {
    let Some(scope) = scope else {
        return true;
    };
    entry
        .links
        .iter()
        .any(|link| link.display_scope().to_lowercase().contains(scope))
}
