//! Serialization of search entries
//!
//! `write_search_data` reproduces the generator's own layout, so a file that
//! was parsed and written back compares equal byte for byte.

use super::store::SearchDataError;
use super::types::{SearchEntry, SearchLink};

/// Render entries as a `var searchData=[...];` file
pub fn write_search_data<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a SearchEntry>,
{
    let mut out = String::from("var searchData=\n[\n");
    let mut any = false;
    for entry in entries {
        if any {
            out.push_str(",\n");
        }
        out.push_str("  ");
        write_entry(&mut out, entry);
        any = true;
    }
    if any {
        out.push('\n');
    }
    out.push_str("];\n");
    out
}

fn write_entry(out: &mut String, entry: &SearchEntry) {
    out.push('[');
    push_quoted(out, &entry.id);
    out.push_str(",[");
    push_quoted(out, &entry.label);
    for link in &entry.links {
        out.push(',');
        write_link(out, link);
    }
    out.push_str("]]");
}

fn write_link(out: &mut String, link: &SearchLink) {
    out.push('[');
    push_quoted(out, &link.url);
    out.push(',');
    out.push_str(&link.target.as_flag().to_string());
    out.push(',');
    push_quoted(out, &link.scope);
    out.push(']');
}

fn push_quoted(out: &mut String, value: &str) {
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
}

/// Render entries as a pretty-printed JSON array
pub fn to_json<'a, I>(entries: I) -> Result<String, SearchDataError>
where
    I: IntoIterator<Item = &'a SearchEntry>,
{
    let entries: Vec<&SearchEntry> = entries.into_iter().collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Read entries back from the JSON produced by [`to_json`]
pub fn from_json(text: &str) -> Result<Vec<SearchEntry>, SearchDataError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_data::parser::parse_search_data;
    use crate::search_data::types::LinkTarget;

    const SAMPLE: &str = include_str!("testdata/all_16.js");

    #[test]
    fn test_write_reproduces_generated_file() {
        let entries = parse_search_data(SAMPLE, None).unwrap();
        assert_eq!(write_search_data(&entries), SAMPLE);
    }

    #[test]
    fn test_write_then_parse_keeps_order() {
        let entries = vec![
            SearchEntry::new(
                "zeta_2",
                "zeta",
                vec![SearchLink::new("../a/z.html", LinkTarget::Local, "")],
            ),
            SearchEntry::new(
                "alpha_1",
                "it's \\ odd",
                vec![SearchLink::new("http://x.org/a", LinkTarget::External, "ns")],
            ),
        ];
        let text = write_search_data(&entries);
        let parsed = parse_search_data(&text, None).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_write_empty() {
        assert_eq!(write_search_data(&Vec::<SearchEntry>::new()), "var searchData=\n[\n];\n");
    }

    #[test]
    fn test_json_shape() {
        let entries = vec![SearchEntry::new(
            "uppercase_2265",
            "uppercase",
            vec![SearchLink::new(
                "http://en.cppreference.com/w/cpp/io/manip/uppercase.html",
                LinkTarget::External,
                "std",
            )],
        )];
        let json = to_json(&entries).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["id"], "uppercase_2265");
        assert_eq!(value[0]["links"][0]["target"], "external");
        assert_eq!(value[0]["links"][0]["scope"], "std");

        assert_eq!(from_json(&json).unwrap(), entries);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            from_json("{\"id\": 1}"),
            Err(SearchDataError::Json(_))
        ));
    }
}
