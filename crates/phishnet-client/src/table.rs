// SPDX-License-Identifier: GPL-3.0-or-later

//! Column-ordered tabular view over row records.

use serde::Serialize;
use serde_json::Value;

use crate::error::{PhishNetError, Result};

/// A grid of string cells with named columns.
///
/// Columns are the union of every record's fields in first-seen order, so
/// records with extra fields widen the table and missing cells stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table with one row per record.
    ///
    /// Records must serialize to JSON objects.
    pub fn from_records<T: Serialize>(records: &[T]) -> Result<Self> {
        let mut table = Self::new();
        for record in records {
            let Value::Object(fields) = serde_json::to_value(record)? else {
                return Err(PhishNetError::InvalidResponse(
                    "table records must serialize to objects".to_string(),
                ));
            };

            let mut row = vec![String::new(); table.columns.len()];
            for (name, value) in fields {
                let index = table.column_index_or_insert(&name);
                if index >= row.len() {
                    row.resize(index + 1, String::new());
                }
                row[index] = cell_text(&value);
            }
            table.rows.push(row);
        }
        table.pad_rows();
        Ok(table)
    }

    /// Append the rows of `other`, widening columns as needed.
    pub fn concat(mut self, other: Table) -> Self {
        let mapping: Vec<usize> = other
            .columns
            .iter()
            .map(|name| self.column_index_or_insert(name))
            .collect();

        for other_row in other.rows {
            let mut row = vec![String::new(); self.columns.len()];
            for (cell, &index) in other_row.into_iter().zip(&mapping) {
                row[index] = cell;
            }
            self.rows.push(row);
        }
        self.pad_rows();
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of a single column, or `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    /// Render as tab-separated text with a header line.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        push_line(&mut out, self.columns.iter().map(String::as_str));
        for row in &self.rows {
            push_line(&mut out, row.iter().map(String::as_str));
        }
        out
    }

    fn column_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(index) = self.columns.iter().position(|c| c == name) {
            return index;
        }
        self.columns.push(name.to_string());
        self.columns.len() - 1
    }

    fn pad_rows(&mut self) {
        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let line: Vec<String> = cells
        .map(|cell| cell.replace(['\t', '\n', '\r'], " "))
        .collect();
    out.push_str(&line.join("\t"));
    out.push('\n');
}
