//! Result presenter: turns ranked matches into (label, destination) lists.
//!
//! Order is inherited from the match engine. Entries documented in more than
//! one place are marked `grouped`, and each of their links carries a label
//! that tells the places apart.

use crate::matcher::{MatchKind, MatchSet};
use crate::types::{LinkTarget, Occurrence, SymbolEntry};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultLink {
    pub label: String,
    pub url: String,
    pub target: LinkTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    pub display_name: String,
    pub key: String,
    pub kind: MatchKind,
    /// More than one occurrence; labels must be shown to disambiguate
    pub grouped: bool,
    pub links: Vec<ResultLink>,
}

/// What a search hands back to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub items: Vec<ResultItem>,
    /// Matching entries before truncation
    pub total: usize,
    pub truncated: bool,
}

impl SearchResults {
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Flatten to `(displayName, [(label, url)])` pairs.
    pub fn pairs(&self) -> Vec<(&str, Vec<(&str, &str)>)> {
        self.items
            .iter()
            .map(|item| {
                let links = item
                    .links
                    .iter()
                    .map(|l| (l.label.as_str(), l.url.as_str()))
                    .collect();
                (item.display_name.as_str(), links)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Presenter {
    /// Location of the shard directory as seen by the consumer. Shard urls
    /// are relative to it.
    link_base: Option<String>,
}

impl Presenter {
    pub fn new(link_base: Option<String>) -> Self {
        Self { link_base }
    }

    pub fn present(&self, set: &MatchSet) -> SearchResults {
        let items = set
            .matches
            .iter()
            .map(|m| self.present_entry(&m.entry, m.kind))
            .collect();

        SearchResults {
            query: set.query.clone(),
            items,
            total: set.total,
            truncated: set.truncated,
        }
    }

    pub fn present_entry(&self, entry: &SymbolEntry, kind: MatchKind) -> ResultItem {
        let grouped = entry.has_multiple_occurrences();
        let links = entry
            .occurrences
            .iter()
            .map(|occ| ResultLink {
                label: link_label(occ, grouped),
                url: self.resolve_url(&occ.url),
                target: occ.target,
            })
            .collect();

        ResultItem {
            display_name: entry.display_name.clone(),
            key: entry.key.clone(),
            kind,
            grouped,
            links,
        }
    }

    /// Resolve a shard-relative url against the configured base.
    pub fn resolve_url(&self, url: &str) -> String {
        let Some(base) = self.link_base.as_deref() else {
            return url.to_string();
        };
        if url.contains("://") || url.starts_with('/') || url.starts_with('#') {
            return url.to_string();
        }

        let (path, anchor) = match url.split_once('#') {
            Some((path, anchor)) => (path, Some(anchor)),
            None => (url, None),
        };

        let absolute = base.starts_with('/');
        let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
        for part in path.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    if matches!(segments.last(), Some(last) if *last != "..") {
                        segments.pop();
                    } else if !absolute {
                        segments.push("..");
                    }
                }
                other => segments.push(other),
            }
        }

        let mut resolved = segments.join("/");
        if absolute {
            resolved.insert(0, '/');
        }
        if let Some(anchor) = anchor {
            resolved.push('#');
            resolved.push_str(anchor);
        }
        resolved
    }
}

/// Label for one link. Grouped entries fall back to the page name so sibling
/// links never share an empty label.
fn link_label(occ: &Occurrence, grouped: bool) -> String {
    if grouped && occ.container_label.trim().is_empty() {
        occ.page_name().to_string()
    } else {
        occ.container_label.clone()
    }
}
