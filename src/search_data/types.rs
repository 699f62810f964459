//! Search index records
//!
//! One [`SearchEntry`] per element of a generated `searchData` array.

use serde::{Deserialize, Serialize};

use super::key::{decode_key, DecodedKey};
use crate::utils::decode_html_entities;

/// Index section a search data file belongs to, taken from its file name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCategory {
    All,
    Classes,
    Namespaces,
    Files,
    Functions,
    Variables,
    Typedefs,
    Enums,
    EnumValues,
    Related,
    Defines,
    Groups,
    Pages,
    Concepts,
    Other(String),
}

impl std::fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SearchCategory::All => "all",
            SearchCategory::Classes => "classes",
            SearchCategory::Namespaces => "namespaces",
            SearchCategory::Files => "files",
            SearchCategory::Functions => "functions",
            SearchCategory::Variables => "variables",
            SearchCategory::Typedefs => "typedefs",
            SearchCategory::Enums => "enums",
            SearchCategory::EnumValues => "enumvalues",
            SearchCategory::Related => "related",
            SearchCategory::Defines => "defines",
            SearchCategory::Groups => "groups",
            SearchCategory::Pages => "pages",
            SearchCategory::Concepts => "concepts",
            SearchCategory::Other(name) => name,
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for SearchCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SearchCategory::All),
            "classes" => Ok(SearchCategory::Classes),
            "namespaces" => Ok(SearchCategory::Namespaces),
            "files" => Ok(SearchCategory::Files),
            "functions" => Ok(SearchCategory::Functions),
            "variables" => Ok(SearchCategory::Variables),
            "typedefs" => Ok(SearchCategory::Typedefs),
            "enums" => Ok(SearchCategory::Enums),
            "enumvalues" => Ok(SearchCategory::EnumValues),
            "related" => Ok(SearchCategory::Related),
            "defines" => Ok(SearchCategory::Defines),
            "groups" => Ok(SearchCategory::Groups),
            "pages" => Ok(SearchCategory::Pages),
            "concepts" => Ok(SearchCategory::Concepts),
            "" => Err("Empty search category".to_string()),
            other => Ok(SearchCategory::Other(other.to_string())),
        }
    }
}

/// Where a link points: a page of the generated site, or an external
/// tag-file reference. Written as `1` / `0` in the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkTarget {
    Local,
    External,
}

impl LinkTarget {
    pub fn from_flag(flag: i64) -> Self {
        if flag == 0 {
            LinkTarget::External
        } else {
            LinkTarget::Local
        }
    }

    pub fn as_flag(self) -> u8 {
        match self {
            LinkTarget::Local => 1,
            LinkTarget::External => 0,
        }
    }
}

/// A single documentation link of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLink {
    pub url: String,
    pub target: LinkTarget,
    /// Scope label as written, HTML entities included
    #[serde(default)]
    pub scope: String,
}

impl SearchLink {
    pub fn new(url: &str, target: LinkTarget, scope: &str) -> Self {
        Self {
            url: url.to_string(),
            target,
            scope: scope.to_string(),
        }
    }

    pub fn is_external(&self) -> bool {
        self.target == LinkTarget::External
    }

    /// Scope label with `&amp;`-style entities decoded
    pub fn display_scope(&self) -> String {
        decode_html_entities(&self.scope)
    }

    /// URL without its `#anchor`
    pub fn page(&self) -> &str {
        match self.url.split_once('#') {
            Some((page, _)) => page,
            None => &self.url,
        }
    }

    pub fn anchor(&self) -> Option<&str> {
        self.url
            .split_once('#')
            .map(|(_, anchor)| anchor)
            .filter(|anchor| !anchor.is_empty())
    }

    /// Resolve the link against the root URL of the generated site.
    ///
    /// Absolute URLs are returned unchanged, as are relative ones when no
    /// base is given. Relative URLs are written from inside `search/`, so
    /// their leading `../` segments refer to the site root.
    pub fn resolve(&self, base: Option<&str>) -> String {
        if is_absolute_url(&self.url) {
            return self.url.clone();
        }
        let Some(base) = base else {
            return self.url.clone();
        };

        let mut relative = self.url.as_str();
        while let Some(rest) = relative.strip_prefix("../") {
            relative = rest;
        }
        let relative = relative.trim_start_matches("./");

        format!("{}/{}", base.trim_end_matches('/'), relative)
    }
}

fn is_absolute_url(url: &str) -> bool {
    match url.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => url.starts_with("//"),
    }
}

/// One record of the search index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    /// Raw key, e.g. `uint128_5ft_2ehpp_2202`
    pub id: String,
    /// Display label, e.g. `uint128_t.hpp`
    pub label: String,
    pub links: Vec<SearchLink>,
    #[serde(skip)]
    pub category: Option<SearchCategory>,
}

impl SearchEntry {
    pub fn new(id: &str, label: &str, links: Vec<SearchLink>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            links,
            category: None,
        }
    }

    pub fn with_category(mut self, category: SearchCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn decoded_key(&self) -> DecodedKey {
        decode_key(&self.id)
    }

    pub fn display_label(&self) -> String {
        decode_html_entities(&self.label)
    }

    pub fn has_local_link(&self) -> bool {
        self.links.iter().any(|l| l.target == LinkTarget::Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for name in ["all", "classes", "enumvalues", "concepts"] {
            let category: SearchCategory = name.parse().unwrap();
            assert_eq!(category.to_string(), name);
        }
        assert_eq!(
            "searchdata".parse::<SearchCategory>().unwrap(),
            SearchCategory::Other("searchdata".to_string())
        );
        assert!("".parse::<SearchCategory>().is_err());
    }

    #[test]
    fn test_link_target_flag() {
        assert_eq!(LinkTarget::from_flag(0), LinkTarget::External);
        assert_eq!(LinkTarget::from_flag(1), LinkTarget::Local);
        assert_eq!(LinkTarget::Local.as_flag(), 1);
    }

    #[test]
    fn test_page_and_anchor() {
        let link = SearchLink::new(
            "../db/d9a/classuint128__t.html#a7d56143b2e291e8087188192533d2e3c",
            LinkTarget::Local,
            "uint128_t",
        );
        assert_eq!(link.page(), "../db/d9a/classuint128__t.html");
        assert_eq!(link.anchor(), Some("a7d56143b2e291e8087188192533d2e3c"));

        let plain = SearchLink::new("../da/d41/uint128__t_8hpp.html", LinkTarget::Local, "");
        assert_eq!(plain.anchor(), None);
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let local = SearchLink::new("../d3/d17/namespaceutil__functions.html", LinkTarget::Local, "");
        assert_eq!(
            local.resolve(Some("https://docs.example.org/cpp/")),
            "https://docs.example.org/cpp/d3/d17/namespaceutil__functions.html"
        );
        assert_eq!(local.resolve(None), "../d3/d17/namespaceutil__functions.html");

        let external = SearchLink::new(
            "http://en.cppreference.com/w/cpp/io/fpos.html",
            LinkTarget::External,
            "std",
        );
        assert!(external.is_external());
        assert_eq!(
            external.resolve(Some("https://docs.example.org")),
            "http://en.cppreference.com/w/cpp/io/fpos.html"
        );
    }

    #[test]
    fn test_display_scope_decodes_entities() {
        let link = SearchLink::new(
            "../db/d9a/classuint128__t.html",
            LinkTarget::Local,
            "uint128_t::uint128_t(const std::string &amp;str)",
        );
        assert_eq!(
            link.display_scope(),
            "uint128_t::uint128_t(const std::string &str)"
        );
    }
}
