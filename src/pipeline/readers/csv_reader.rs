// src/pipeline/readers/csv_reader.rs

use crate::config::InputConfig;
use crate::error::{DashboardError, Result};
use crate::pipeline::readers::base_reader::{BaseReader, RawRow};

use csv::{ReaderBuilder, StringRecord};

/// Reads rows from a CSV file with a header line.
#[derive(Debug)]
pub struct CsvReader {
    config: InputConfig,
}

/// Header positions of the mapped columns.
#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    text: usize,
    sentiment: usize,
    entity: usize,
    created_at: usize,
    coordinates: Option<usize>,
    id: Option<usize>,
}

impl CsvReader {
    pub fn new(config: InputConfig) -> Self {
        CsvReader { config }
    }

    fn required(&self, headers: &StringRecord, column: &str) -> Result<usize> {
        find_column(headers, column).ok_or_else(|| DashboardError::MissingColumn {
            column: column.to_string(),
            source_path: self.config.path.clone(),
        })
    }

    fn resolve_columns(&self, headers: &StringRecord) -> Result<ColumnIndices> {
        let columns = &self.config.columns;
        Ok(ColumnIndices {
            text: self.required(headers, &columns.text)?,
            sentiment: self.required(headers, &columns.sentiment)?,
            entity: self.required(headers, &columns.entity)?,
            created_at: self.required(headers, &columns.created_at)?,
            // Optional columns that are missing are simply not read
            coordinates: columns
                .coordinates
                .as_deref()
                .and_then(|c| find_column(headers, c)),
            id: columns.id.as_deref().and_then(|c| find_column(headers, c)),
        })
    }
}

fn find_column(headers: &StringRecord, column: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == column)
}

fn field(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or_default().to_string()
}

impl BaseReader for CsvReader {
    fn source(&self) -> &str {
        &self.config.path
    }

    fn read_rows(&self) -> Result<Box<dyn Iterator<Item = Result<RawRow>>>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.config.path)?;
        let headers = reader.headers()?.clone();
        let indices = self.resolve_columns(&headers)?;

        let iterator = reader
            .into_records()
            .enumerate()
            .map(move |(row, result)| {
                let record = result?;
                Ok(RawRow {
                    row,
                    id: indices.id.map(|idx| field(&record, idx)),
                    text: field(&record, indices.text),
                    sentiment: field(&record, indices.sentiment),
                    entity: field(&record, indices.entity),
                    created_at: field(&record, indices.created_at),
                    coordinates: indices.coordinates.map(|idx| field(&record, idx)),
                })
            });

        Ok(Box::new(iterator))
    }
}
