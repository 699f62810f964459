//! Consistency checks over a loaded index

use serde::Serialize;
use std::collections::HashMap;

use super::key::decode_key;
use super::store::SearchIndex;
use super::types::SearchCategory;
use crate::utils::decode_html_entities;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    EmptyKey,
    EmptyLabel,
    NoLinks,
    EmptyUrl,
    DuplicateSerial,
    KeyLabelMismatch,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IssueKind::EmptyKey => "empty_key",
            IssueKind::EmptyLabel => "empty_label",
            IssueKind::NoLinks => "no_links",
            IssueKind::EmptyUrl => "empty_url",
            IssueKind::DuplicateSerial => "duplicate_serial",
            IssueKind::KeyLabelMismatch => "key_label_mismatch",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    /// Position of the offending entry in the index
    pub position: usize,
    pub id: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} '{}' [{}]: {}",
            self.position, self.id, self.kind, self.message
        )
    }
}

/// Check every entry of the index. An empty result means the index is valid.
pub fn validate(index: &SearchIndex) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut serials: HashMap<(Option<&SearchCategory>, u32), usize> = HashMap::new();

    for (position, entry) in index.iter().enumerate() {
        let mut report = |kind: IssueKind, message: String| {
            issues.push(ValidationIssue {
                kind,
                position,
                id: entry.id.clone(),
                message,
            })
        };

        if entry.id.is_empty() {
            report(IssueKind::EmptyKey, "entry has no key".to_string());
        }
        if entry.label.is_empty() {
            report(IssueKind::EmptyLabel, "entry has no label".to_string());
        }
        if entry.links.is_empty() {
            report(IssueKind::NoLinks, "entry has no links".to_string());
        }
        for (i, link) in entry.links.iter().enumerate() {
            if link.url.trim().is_empty() {
                report(IssueKind::EmptyUrl, format!("link {} has an empty url", i));
            }
        }

        if entry.id.is_empty() {
            continue;
        }
        let key = decode_key(&entry.id);
        if let Some(serial) = key.serial {
            if let Some(first) = serials.insert((entry.category.as_ref(), serial), position) {
                report(
                    IssueKind::DuplicateSerial,
                    format!("serial {} already used by entry #{}", serial, first),
                );
            }
        }

        let label = decode_html_entities(&entry.label).to_lowercase();
        if !entry.label.is_empty() && key.name != label {
            report(
                IssueKind::KeyLabelMismatch,
                format!("key decodes to '{}' but label is '{}'", key.name, entry.label),
            );
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_data::types::{LinkTarget, SearchEntry, SearchLink};

    const SAMPLE: &str = include_str!("testdata/all_16.js");

    fn link(url: &str) -> SearchLink {
        SearchLink::new(url, LinkTarget::Local, "")
    }

    #[test]
    fn test_sample_is_valid() {
        let index = SearchIndex::parse(SAMPLE, Some(SearchCategory::All)).unwrap();
        assert!(validate(&index).is_empty());
    }

    #[test]
    fn test_reports_empty_fields() {
        let index = SearchIndex::new(vec![
            SearchEntry::new("", "x", vec![link("x.html")]),
            SearchEntry::new("y_2", "", vec![link("y.html")]),
            SearchEntry::new("z_3", "z", vec![]),
            SearchEntry::new("w_4", "w", vec![link(" ")]),
        ]);
        let kinds: Vec<IssueKind> = validate(&index).iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::EmptyKey,
                IssueKind::EmptyLabel,
                IssueKind::NoLinks,
                IssueKind::EmptyUrl
            ]
        );
    }

    #[test]
    fn test_duplicate_serial_within_category() {
        let index = SearchIndex::new(vec![
            SearchEntry::new("a_7", "a", vec![link("a.html")]).with_category(SearchCategory::All),
            SearchEntry::new("b_7", "b", vec![link("b.html")]).with_category(SearchCategory::All),
            SearchEntry::new("c_7", "c", vec![link("c.html")])
                .with_category(SearchCategory::Classes),
        ]);
        let issues = validate(&index);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::DuplicateSerial);
        assert_eq!(issues[0].position, 1);
        assert!(issues[0].to_string().contains("entry #0"));
    }

    #[test]
    fn test_key_label_mismatch() {
        let index = SearchIndex::new(vec![
            SearchEntry::new("operator_26_26_1", "operator&amp;&amp;", vec![link("o.html")]),
            SearchEntry::new("lcs_2", "lis", vec![link("l.html")]),
        ]);
        let issues = validate(&index);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::KeyLabelMismatch);
        assert_eq!(issues[0].id, "lcs_2");
    }
}
