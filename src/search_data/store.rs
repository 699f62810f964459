//! In-memory search index
//!
//! Holds the parsed entries of one or more search data files. The table is
//! built once and never mutated, so it can be shared behind an `Arc` by any
//! number of readers.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::key::decode_key;
use super::parser::parse_search_data;
use super::types::{SearchCategory, SearchEntry};

lazy_static! {
    /// `all_16.js`, `classes_3.js`, ... ; the id is hexadecimal
    static ref DATA_FILE_RE: Regex = Regex::new(r"^([a-z]+)_([0-9a-f]+)\.js$").unwrap();
}

/// A file the index was loaded from
#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub category: Option<SearchCategory>,
    pub entry_count: usize,
}

/// Per-category totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub files: usize,
    pub entries: usize,
    pub links: usize,
    pub external_links: usize,
}

/// Immutable search index table
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
    /// Lowercased decoded key of each entry, same order as `entries`
    names: Vec<String>,
    sources: Vec<SourceFile>,
}

impl SearchIndex {
    pub fn new(entries: Vec<SearchEntry>) -> Self {
        let names = entries
            .iter()
            .map(|e| decode_key(&e.id).name.to_lowercase())
            .collect();
        Self {
            entries,
            names,
            sources: Vec::new(),
        }
    }

    /// Parse a single file's contents
    pub fn parse(text: &str, category: Option<SearchCategory>) -> Result<Self, SearchDataError> {
        let entries = parse_search_data(text, category.as_ref())?;
        Ok(Self::new(entries))
    }

    /// Load one search data file; the category comes from its file name
    pub fn load_file(path: &Path) -> Result<Self, SearchDataError> {
        let category = category_for_path(path).map(|(category, _)| category);
        let entries = read_file(path, category.as_ref())?;

        let mut index = Self::new(entries);
        index.sources.push(SourceFile {
            path: path.to_path_buf(),
            category,
            entry_count: index.entries.len(),
        });
        Ok(index)
    }

    /// Load every `<category>_<id>.js` file of a generated `search/` directory.
    ///
    /// Files are read in category order, then by numeric id. Other
    /// JavaScript files in the directory (`searchdata.js`, `search.js`) are
    /// skipped.
    pub fn load_dir(dir: &Path) -> Result<Self, SearchDataError> {
        if !dir.is_dir() {
            return Err(SearchDataError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a directory: {}", dir.display()),
            )));
        }

        let pattern = format!("{}/*.js", glob::Pattern::escape(&dir.to_string_lossy()));
        let mut files = Vec::new();
        for path in glob::glob(&pattern)? {
            let path = path.map_err(|e| SearchDataError::Io(e.into()))?;
            match category_for_path(&path) {
                Some((category, id)) => files.push((category, id, path)),
                None => debug!("Skipping {}", path.display()),
            }
        }
        files.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));

        let mut entries = Vec::new();
        let mut sources = Vec::with_capacity(files.len());
        for (category, _, path) in files {
            let parsed = read_file(&path, Some(&category))?;
            debug!("Loaded {} entries from {}", parsed.len(), path.display());
            sources.push(SourceFile {
                path,
                category: Some(category),
                entry_count: parsed.len(),
            });
            entries.extend(parsed);
        }

        if sources.is_empty() {
            warn!("No search data files found in {}", dir.display());
        }
        info!(
            "Loaded {} entries from {} file(s) in {}",
            entries.len(),
            sources.len(),
            dir.display()
        );

        let mut index = Self::new(entries);
        index.sources = sources;
        Ok(index)
    }

    /// Load a directory or a single file, whichever `path` is
    pub fn load(path: &Path) -> Result<Self, SearchDataError> {
        if path.is_dir() {
            Self::load_dir(path)
        } else {
            Self::load_file(path)
        }
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchEntry> {
        self.entries.iter()
    }

    /// Entries paired with their lowercased decoded key
    pub(crate) fn iter_named(&self) -> impl Iterator<Item = (&str, &SearchEntry)> {
        self.names.iter().map(String::as_str).zip(self.entries.iter())
    }

    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose key starts with `prefix`, case-insensitive, in table order
    pub fn lookup(&self, prefix: &str) -> Vec<&SearchEntry> {
        let prefix = prefix.to_lowercase();
        self.iter_named()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(_, entry)| entry)
            .collect()
    }

    /// Every entry sharing `key`, in table order.
    ///
    /// `key` may be the symbol name or label (any case, entities written
    /// or decoded), or a raw generated key.
    pub fn lookup_exact(&self, key: &str) -> Vec<&SearchEntry> {
        let lowered = key.to_lowercase();
        self.iter_named()
            .filter(|(name, entry)| {
                *name == lowered || entry.id == key || label_matches(entry, &lowered)
            })
            .map(|(_, entry)| entry)
            .collect()
    }

    /// Totals per category, in category order
    pub fn stats(&self) -> Vec<CategoryStats> {
        let mut stats: Vec<(Option<SearchCategory>, CategoryStats)> = Vec::new();
        for entry in &self.entries {
            let slot = match stats.iter().position(|(c, _)| *c == entry.category) {
                Some(pos) => pos,
                None => {
                    let category = entry.category.clone();
                    let name = category
                        .as_ref()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "uncategorized".to_string());
                    stats.push((
                        category,
                        CategoryStats {
                            category: name,
                            files: 0,
                            entries: 0,
                            links: 0,
                            external_links: 0,
                        },
                    ));
                    stats.len() - 1
                }
            };
            let s = &mut stats[slot].1;
            s.entries += 1;
            s.links += entry.links.len();
            s.external_links += entry.links.iter().filter(|l| l.is_external()).count();
        }

        for source in &self.sources {
            if let Some((_, s)) = stats.iter_mut().find(|(c, _)| *c == source.category) {
                s.files += 1;
            }
        }

        stats.sort_by(|a, b| a.0.cmp(&b.0));
        stats.into_iter().map(|(_, s)| s).collect()
    }
}

/// Case-insensitive label comparison, against both the raw and the
/// entity-decoded label
pub(crate) fn label_matches(entry: &SearchEntry, lowered: &str) -> bool {
    entry.label.to_lowercase() == lowered || entry.display_label().to_lowercase() == lowered
}

fn read_file(
    path: &Path,
    category: Option<&SearchCategory>,
) -> Result<Vec<SearchEntry>, SearchDataError> {
    let text = std::fs::read_to_string(path)?;
    parse_search_data(&text, category).map_err(|e| {
        warn!("Failed to parse {}: {}", path.display(), e);
        SearchDataError::File {
            path: path.to_path_buf(),
            source: Box::new(e),
        }
    })
}

/// Category and numeric id encoded in a data file name
fn category_for_path(path: &Path) -> Option<(SearchCategory, u64)> {
    let name = path.file_name()?.to_str()?;
    let caps = DATA_FILE_RE.captures(name)?;
    let category = caps[1].parse::<SearchCategory>().ok()?;
    let id = u64::from_str_radix(&caps[2], 16).ok()?;
    Some((category, id))
}

/// Error type for search data operations
#[derive(Debug)]
pub enum SearchDataError {
    Io(std::io::Error),
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    Shape {
        index: usize,
        message: String,
    },
    File {
        path: PathBuf,
        source: Box<SearchDataError>,
    },
    Json(serde_json::Error),
    Pattern(glob::PatternError),
}

impl std::fmt::Display for SearchDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchDataError::Io(e) => write!(f, "IO error: {}", e),
            SearchDataError::Parse {
                line,
                column,
                message,
            } => write!(f, "Parse error at {}:{}: {}", line, column, message),
            SearchDataError::Shape { index, message } => {
                write!(f, "Malformed entry #{}: {}", index, message)
            }
            SearchDataError::File { path, source } => write!(f, "{}: {}", path.display(), source),
            SearchDataError::Json(e) => write!(f, "JSON error: {}", e),
            SearchDataError::Pattern(e) => write!(f, "Invalid path pattern: {}", e),
        }
    }
}

impl std::error::Error for SearchDataError {}

impl From<std::io::Error> for SearchDataError {
    fn from(err: std::io::Error) -> Self {
        SearchDataError::Io(err)
    }
}

impl From<serde_json::Error> for SearchDataError {
    fn from(err: serde_json::Error) -> Self {
        SearchDataError::Json(err)
    }
}

impl From<glob::PatternError> for SearchDataError {
    fn from(err: glob::PatternError) -> Self {
        SearchDataError::Pattern(err)
    }
}
