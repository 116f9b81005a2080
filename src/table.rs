//! Column projection of flat records and CSV export.

use std::{io::Write, path::Path};

use serde_json::Value;

use crate::{
    Res,
    error::MappingError,
    flatten::FlatRecord,
    utils,
};

/// A named table with a fixed header; every row is as wide as the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, header: Vec<String>) -> Self {
        Table {
            name: name.into(),
            header,
            rows: Vec::new(),
        }
    }

    /// Table of plain string cells. Rows are padded or cut to the header width.
    pub fn from_rows<I>(name: impl Into<String>, columns: &[&str], rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut table = Table::new(name, columns.iter().map(|c| c.to_string()).collect());
        let width = table.width();
        table.rows = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<Value> = row.into_iter().take(width).map(Value::String).collect();
                cells.resize(width, Value::Null);
                cells
            })
            .collect();
        table
    }

    /// Two-column link table, e.g. `artist_id, genre`. Duplicate pairs are kept.
    pub fn from_pairs<I>(name: impl Into<String>, columns: [&str; 2], pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Table::from_rows(name, &columns, pairs.into_iter().map(|(a, b)| vec![a, b]))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Values of one column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.header.iter().position(|h| h == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Writes the header row followed by every row as CSV.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> Res<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.header)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(utils::cell_text))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Writes the table to `path`, creating parent directories as needed.
    pub async fn write_csv(&self, path: &Path) -> Res<()> {
        let mut buffer: Vec<u8> = Vec::new();
        self.write_csv_to(&mut buffer)?;

        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        async_fs::write(path, buffer).await?;
        Ok(())
    }
}

/// Projects flat records onto a caller-supplied column list.
pub struct TableBuilder {
    name: String,
    fields: Vec<String>,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>, fields: &[&str]) -> Self {
        TableBuilder {
            name: name.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Builds the table, failing on the first record that lacks a field.
    pub fn build(&self, records: &[FlatRecord]) -> Result<Table, MappingError> {
        let mut table = Table::new(self.name.clone(), self.fields.clone());
        for (idx, record) in records.iter().enumerate() {
            table.rows.push(self.row(idx, record)?);
        }
        Ok(table)
    }

    /// Builds the table, skipping every record that lacks a field and
    /// returning one [`MappingError`] per skipped record.
    pub fn build_lenient(&self, records: &[FlatRecord]) -> (Table, Vec<MappingError>) {
        let mut table = Table::new(self.name.clone(), self.fields.clone());
        let mut skipped = Vec::new();
        for (idx, record) in records.iter().enumerate() {
            match self.row(idx, record) {
                Ok(row) => table.rows.push(row),
                Err(e) => skipped.push(e),
            }
        }
        (table, skipped)
    }

    fn row(&self, idx: usize, record: &FlatRecord) -> Result<Vec<Value>, MappingError> {
        self.fields
            .iter()
            .map(|field| {
                record.get(field).cloned().ok_or_else(|| MappingError {
                    table: self.name.clone(),
                    row: idx,
                    field: field.clone(),
                })
            })
            .collect()
    }
}
