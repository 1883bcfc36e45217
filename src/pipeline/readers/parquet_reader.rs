// src/pipeline/readers/parquet_reader.rs

use crate::config::InputConfig;
use crate::error::{DashboardError, Result};
use crate::pipeline::readers::base_reader::{BaseReader, RawRow};

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;

/// Reads rows from a Parquet file.
#[derive(Debug)]
pub struct ParquetReader {
    config: InputConfig,
}

#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    text: usize,
    sentiment: usize,
    entity: usize,
    created_at: usize,
    coordinates: Option<usize>,
    id: Option<usize>,
}

impl ParquetReader {
    /// Creates a new ParquetReader with the given configuration.
    pub fn new(config: InputConfig) -> Self {
        ParquetReader { config }
    }

    fn required(&self, schema: &Schema, column: &str) -> Result<usize> {
        schema
            .index_of(column)
            .map_err(|_| DashboardError::MissingColumn {
                column: column.to_string(),
                source_path: self.config.path.clone(),
            })
    }

    fn resolve_columns(&self, schema: &Schema) -> Result<ColumnIndices> {
        let columns = &self.config.columns;
        Ok(ColumnIndices {
            text: self.required(schema, &columns.text)?,
            sentiment: self.required(schema, &columns.sentiment)?,
            entity: self.required(schema, &columns.entity)?,
            created_at: self.required(schema, &columns.created_at)?,
            coordinates: columns
                .coordinates
                .as_deref()
                .and_then(|c| schema.index_of(c).ok()),
            id: columns.id.as_deref().and_then(|c| schema.index_of(c).ok()),
        })
    }
}

/// Casts any column (integer ids, timestamps, large strings) to plain Utf8.
fn as_strings(column: &ArrayRef) -> Result<StringArray> {
    let casted = cast(column, &DataType::Utf8)?;
    casted
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| DashboardError::Unexpected("Column did not cast to a Utf8 StringArray".to_string()))
}

fn value_at(array: &StringArray, i: usize) -> Option<String> {
    if array.is_null(i) {
        None
    } else {
        Some(array.value(i).to_string())
    }
}

fn batch_rows(batch: &RecordBatch, indices: ColumnIndices, first_row: usize) -> Result<Vec<RawRow>> {
    let texts = as_strings(batch.column(indices.text))?;
    let sentiments = as_strings(batch.column(indices.sentiment))?;
    let entities = as_strings(batch.column(indices.entity))?;
    let created = as_strings(batch.column(indices.created_at))?;
    let coords = indices
        .coordinates
        .map(|idx| as_strings(batch.column(idx)))
        .transpose()?;
    let ids = indices
        .id
        .map(|idx| as_strings(batch.column(idx)))
        .transpose()?;

    Ok((0..batch.num_rows())
        .map(|i| RawRow {
            row: first_row + i,
            id: ids.as_ref().and_then(|a| value_at(a, i)),
            // Nulls in required columns become empty strings and fail parsing downstream
            text: value_at(&texts, i).unwrap_or_default(),
            sentiment: value_at(&sentiments, i).unwrap_or_default(),
            entity: value_at(&entities, i).unwrap_or_default(),
            created_at: value_at(&created, i).unwrap_or_default(),
            coordinates: coords.as_ref().and_then(|a| value_at(a, i)),
        })
        .collect())
}

impl BaseReader for ParquetReader {
    fn source(&self) -> &str {
        &self.config.path
    }

    fn read_rows(&self) -> Result<Box<dyn Iterator<Item = Result<RawRow>>>> {
        let file = File::open(&self.config.path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let builder = if let Some(batch_size) = self.config.batch_size {
            builder.with_batch_size(batch_size)
        } else {
            builder
        };
        let record_batch_reader = builder.build()?;
        let schema = record_batch_reader.schema();
        let indices = self.resolve_columns(&schema)?;
        let config_path = self.config.path.clone();

        let mut next_row = 0usize;
        let iterator = record_batch_reader.flat_map(move |batch_result| match batch_result {
            Ok(batch) => {
                let first_row = next_row;
                next_row += batch.num_rows();
                match batch_rows(&batch, indices, first_row) {
                    Ok(rows) => rows.into_iter().map(Ok).collect::<Vec<_>>(),
                    Err(e) => vec![Err(e)],
                }
            }
            Err(e) => {
                tracing::error!("Failed to read Parquet batch from '{}': {}", config_path, e);
                vec![Err(DashboardError::from(e))]
            }
        });

        Ok(Box::new(iterator))
    }
}
