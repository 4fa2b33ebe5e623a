//! Substring search index.
//!
//! One entry per indexed document, appended at creation time and never
//! mutated. An entry's term text is the lowercase, space-joined,
//! order-preserving-deduplicated sequence of the document id plus every value
//! extracted from the type's declared index paths. Matching is substring-AND:
//! a document matches when its term text contains every query term somewhere,
//! not only on token boundaries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    document::DocKey,
    extract::{extract, split_path},
};

/// Normalized query terms for [`crate::DocBase::find`].
///
/// Built either from a single string (split on whitespace) or from an
/// explicit term sequence; terms are trimmed, lowercased, and empty terms
/// discarded. Both forms of the same query match identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms(Vec<String>);

impl SearchTerms {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.0
    }

    /// True when `text` contains every term as a substring.
    pub(crate) fn matches(&self, text: &str) -> bool {
        self.0.iter().all(|term| text.contains(term.as_str()))
    }
}

impl From<&str> for SearchTerms {
    fn from(query: &str) -> SearchTerms {
        SearchTerms(
            query
                .split_whitespace()
                .map(str::to_lowercase)
                .collect(),
        )
    }
}

impl From<String> for SearchTerms {
    fn from(query: String) -> SearchTerms {
        SearchTerms::from(query.as_str())
    }
}

impl<S: AsRef<str>> From<Vec<S>> for SearchTerms {
    fn from(terms: Vec<S>) -> SearchTerms {
        SearchTerms(
            terms
                .iter()
                .map(|term| term.as_ref().trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect(),
        )
    }
}

impl<S: AsRef<str>> From<&[S]> for SearchTerms {
    fn from(terms: &[S]) -> SearchTerms {
        SearchTerms(
            terms
                .iter()
                .map(|term| term.as_ref().trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect(),
        )
    }
}

/// Append-only term index over created documents, in creation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchIndex {
    entries: Vec<(DocKey, String)>,
}

impl SearchIndex {
    /// Build and append the term-text entry for a newly created document.
    pub(crate) fn index_document(
        &mut self,
        key: DocKey,
        display_id: &str,
        payload: &Value,
        index_paths: &[String],
    ) {
        let mut terms: Vec<String> = vec![display_id.to_lowercase()];
        for path in index_paths {
            let Some(found) = extract(payload, &split_path(path)) else {
                continue;
            };
            terms.extend(found.into_values().into_iter().map(term_text));
        }
        // Deterministic, order-preserving dedup: first occurrence wins.
        let mut seen = std::collections::BTreeSet::new();
        terms.retain(|term| seen.insert(term.clone()));
        self.entries.push((key, terms.join(" ")));
    }

    /// Lazily scan entries in insertion order, yielding keys whose term text
    /// contains every query term.
    pub(crate) fn scan(&self, terms: SearchTerms) -> impl Iterator<Item = DocKey> + '_ {
        self.entries
            .iter()
            .filter(move |(_, text)| terms.matches(text))
            .map(|(key, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn term_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.to_lowercase(),
        other => other.to_string().to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn indexed(payload: Value, paths: &[&str]) -> SearchIndex {
        let mut index = SearchIndex::default();
        let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
        index.index_document(DocKey(0), "ID-9", &payload, &paths);
        index
    }

    #[test]
    fn term_text_includes_id_and_extracted_values() {
        let index = indexed(
            json!({"name": [{"given": ["Zoe"], "family": "Aberi"}]}),
            &["name.given", "name.family"],
        );
        assert_eq!(index.entries[0].1, "id-9 zoe aberi");
    }

    #[test]
    fn term_text_dedup_preserves_first_occurrence() {
        let index = indexed(
            json!({"name": [
                {"given": ["Zoe"], "family": "Zoe"},
                {"given": ["Ann"], "family": "Aberi"},
            ]}),
            &["name.given", "name.family"],
        );
        assert_eq!(index.entries[0].1, "id-9 zoe ann aberi");
    }

    #[test]
    fn absent_paths_are_skipped() {
        let index = indexed(json!({}), &["name.given"]);
        assert_eq!(index.entries[0].1, "id-9");
    }

    #[test]
    fn substring_and_matching() {
        let index = indexed(
            json!({"name": [{"given": ["Zoe"], "family": "Aberi"}]}),
            &["name.given", "name.family"],
        );
        assert_eq!(index.scan(SearchTerms::from("zoe aber")).count(), 1);
        assert_eq!(index.scan(SearchTerms::from("ZOE")).count(), 1);
        assert_eq!(index.scan(SearchTerms::from(vec!["zoe", "aber"])).count(), 1);
        assert_eq!(index.scan(SearchTerms::from("zoe nomatch")).count(), 0);
    }

    #[test]
    fn string_and_list_queries_normalize_identically() {
        assert_eq!(
            SearchTerms::from("Zoe  Aber "),
            SearchTerms::from(vec![" zoe", "ABER", " "])
        );
    }
}
