//! Shard payload parsing.
//!
//! Two encodings of the same shape are accepted:
//!
//! - the script form written by Doxygen, `var searchData=[ ... ];`, whose
//!   body is a JavaScript array literal with single-quoted strings
//! - a plain JSON array
//!
//! Both describe a sequence of `[id, [displayName, occurrence, ...]]` where an
//! occurrence is `[url, flag, containerLabel]` or `[url, containerLabel]`.

use crate::error::{SearchError, SearchResult};
use crate::normalize::{decode_html_entities, decode_search_id, normalize_key};
use crate::types::{LinkTarget, Occurrence, ShardId, SymbolEntry};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Encoding of a shard payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// `var searchData=[...];` with producer-escaped ids
    DoxygenScript,
    /// Plain JSON array with already-normalized keys
    Json,
}

impl PayloadFormat {
    pub fn detect(text: &str) -> Self {
        let trimmed = text.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with("var ") || trimmed.starts_with("var\t") {
            PayloadFormat::DoxygenScript
        } else {
            PayloadFormat::Json
        }
    }
}

/// Entries parsed from one shard, in payload order.
#[derive(Debug, Clone)]
pub struct ParsedShard {
    pub shard: ShardId,
    pub entries: Vec<SymbolEntry>,
    /// Entries dropped because nothing searchable remained in their key
    pub skipped: usize,
}

/// Parse a raw shard payload, detecting its encoding.
pub fn parse_shard(shard: &ShardId, text: &str) -> SearchResult<ParsedShard> {
    let format = PayloadFormat::detect(text);
    let root = match format {
        PayloadFormat::DoxygenScript => read_script_literal(text).map_err(|reason| {
            SearchError::ShardParse {
                shard: shard.clone(),
                reason,
            }
        })?,
        PayloadFormat::Json => {
            serde_json::from_str::<Value>(text).map_err(|e| SearchError::ShardParse {
                shard: shard.clone(),
                reason: e.to_string(),
            })?
        }
    };

    entries_from_value(shard, format, &root)
}

fn entries_from_value(
    shard: &ShardId,
    format: PayloadFormat,
    root: &Value,
) -> SearchResult<ParsedShard> {
    let fail = |reason: String| SearchError::ShardParse {
        shard: shard.clone(),
        reason,
    };

    let rows = root
        .as_array()
        .ok_or_else(|| fail("payload root is not an array".to_string()))?;

    let mut entries = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for (row_index, row) in rows.iter().enumerate() {
        let entry = entry_from_row(format, row).map_err(|e| fail(format!("entry {row_index}: {e}")))?;
        match entry {
            Some(entry) => entries.push(entry),
            None => {
                tracing::debug!("[shard] {shard}: entry {row_index} has an empty key, skipped");
                skipped += 1;
            }
        }
    }

    Ok(ParsedShard {
        shard: shard.clone(),
        entries,
        skipped,
    })
}

fn entry_from_row(format: PayloadFormat, row: &Value) -> Result<Option<SymbolEntry>, String> {
    let fields = row.as_array().ok_or("expected [id, [name, ...]]")?;
    let [id, body] = fields.as_slice() else {
        return Err(format!("expected 2 fields, found {}", fields.len()));
    };
    let id = id.as_str().ok_or("id is not a string")?;
    let body = body.as_array().ok_or("symbol body is not an array")?;

    let (name, occurrences) = body.split_first().ok_or("symbol body is empty")?;
    let display_name = decode_html_entities(name.as_str().ok_or("display name is not a string")?)
        .into_owned();

    if occurrences.is_empty() {
        return Err(format!("'{display_name}' has no occurrences"));
    }

    let occurrences = occurrences
        .iter()
        .map(occurrence_from_value)
        .collect::<Result<Vec<_>, _>>()?;

    let key = match format {
        PayloadFormat::DoxygenScript => normalize_key(&decode_search_id(id)),
        PayloadFormat::Json if id.trim().is_empty() => normalize_key(&display_name),
        PayloadFormat::Json => normalize_key(id),
    };
    if key.is_empty() {
        return Ok(None);
    }

    Ok(Some(
        SymbolEntry::new(key, display_name, occurrences).with_source_id(id),
    ))
}

fn occurrence_from_value(value: &Value) -> Result<Occurrence, String> {
    let parts = value.as_array().ok_or("occurrence is not an array")?;
    let (url, target, label) = match parts.as_slice() {
        [url, flag, label] => {
            let flag = flag
                .as_i64()
                .or_else(|| flag.as_bool().map(i64::from))
                .ok_or("occurrence flag is not an integer")?;
            (url, LinkTarget::from_flag(flag), label)
        }
        [url, label] => (url, LinkTarget::Local, label),
        other => return Err(format!("occurrence has {} fields", other.len())),
    };

    let url = url.as_str().ok_or("occurrence url is not a string")?;
    let label = label.as_str().ok_or("container label is not a string")?;

    Ok(Occurrence::new(url, decode_html_entities(label).into_owned()).with_target(target))
}

/// `var <name> =` at the start of a declaration.
static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*var\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=").expect("Invalid regex")
});

/// Split a script into `(name, literal)` pairs, one per `var` declaration.
/// The literal runs up to the next declaration with its trailing `;` removed.
pub(crate) fn script_declarations(text: &str) -> Vec<(&str, &str)> {
    let found: Vec<(usize, usize, &str)> = DECLARATION
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some((whole.start(), whole.end(), name.as_str()))
        })
        .collect();

    found
        .iter()
        .enumerate()
        .map(|(i, &(_, body_start, name))| {
            let body_end = found.get(i + 1).map_or(text.len(), |&(next, _, _)| next);
            let literal = text[body_start..body_end].trim();
            (name, literal.strip_suffix(';').unwrap_or(literal).trim_end())
        })
        .collect()
}

/// Parse a JavaScript literal (single quotes, comments, trailing commas).
pub(crate) fn parse_literal(literal: &str) -> Result<Value, String> {
    json5::from_str::<Value>(literal).map_err(|e| e.to_string())
}

/// Read the array literal out of a `var name = [...];` script.
pub(crate) fn read_script_literal(text: &str) -> Result<Value, String> {
    let (_, literal) = script_declarations(text)
        .into_iter()
        .next()
        .ok_or("missing 'var <name> =' declaration")?;
    parse_literal(literal)
}
