//! Table formatting utilities for structured output.

use crate::present::SearchResults;
use comfy_table::{
    Attribute, Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    /// Create a new table builder.
    pub fn new() -> Self {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.apply_modifier(UTF8_ROUND_CORNERS);
        Self { table }
    }

    /// Set the table headers.
    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        let header_cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect();
        self.table.set_header(header_cells);
        self
    }

    /// Add a row to the table.
    pub fn add_row(mut self, row: Vec<String>) -> Self {
        self.table.add_row(row);
        self
    }

    /// Build and return the formatted table.
    pub fn build(self) -> String {
        self.table.to_string()
    }
}

/// One row per link. Grouped entries print their name once, with one
/// labeled row per occurrence below it.
pub fn create_results_table(results: &SearchResults) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);

    table.set_header(vec![
        Cell::new("Symbol").add_attribute(Attribute::Bold),
        Cell::new("Where").add_attribute(Attribute::Bold),
        Cell::new("Link").add_attribute(Attribute::Bold),
    ]);

    for item in &results.items {
        for (i, link) in item.links.iter().enumerate() {
            let name = if i == 0 {
                Cell::new(&item.display_name).add_attribute(Attribute::Bold)
            } else {
                Cell::new("")
            };
            table.add_row(vec![name, Cell::new(&link.label), Cell::new(&link.url)]);
        }
    }

    if results.truncated {
        table.add_row(vec![
            Cell::new(format!(
                "… {} more",
                results.total.saturating_sub(results.items.len())
            ))
            .fg(Color::Yellow),
            Cell::new(""),
            Cell::new(""),
        ]);
    }

    table.to_string()
}

/// Shard status table: `(shard, new entries, folded entries, status)` rows.
pub fn create_shard_table(rows: Vec<(String, usize, usize, String)>) -> String {
    rows.into_iter()
        .fold(
            TableBuilder::new().set_headers(vec!["Shard", "New entries", "Folded", "Status"]),
            |builder, (shard, added, folded, status)| {
                builder.add_row(vec![shard, added.to_string(), folded.to_string(), status])
            },
        )
        .build()
}
