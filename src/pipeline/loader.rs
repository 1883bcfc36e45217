// src/pipeline/loader.rs

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::cache::Memo;
use crate::config::{InputConfig, InputFormat, InvalidRowPolicy};
use crate::data_model::Dataset;
use crate::error::Result;
use crate::pipeline::readers::{BaseReader, CsvReader, ParquetReader};
use crate::utils::prometheus_metrics::{RECORDS_LOADED, ROWS_SKIPPED_TOTAL};

/// Reads the whole input described by `config` into a [`Dataset`].
///
/// Missing required columns and I/O failures always fail the load. Rows whose
/// timestamp or sentiment cannot be parsed either fail the load
/// ([`InvalidRowPolicy::Abort`]) or are dropped and counted
/// ([`InvalidRowPolicy::Skip`]).
pub fn load(config: &InputConfig) -> Result<Dataset> {
    let reader: Box<dyn BaseReader> = match config.resolved_format() {
        InputFormat::Csv => Box::new(CsvReader::new(config.clone())),
        InputFormat::Parquet => Box::new(ParquetReader::new(config.clone())),
    };
    load_from(reader.as_ref(), config.on_invalid_row)
}

pub fn load_from(reader: &dyn BaseReader, policy: InvalidRowPolicy) -> Result<Dataset> {
    let started = Instant::now();
    let source = reader.source().to_string();
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.read_rows()? {
        // Errors from the file itself are never skippable
        let raw = row?;
        match raw.into_record(&source) {
            Ok(record) => records.push(record),
            Err(e) => match policy {
                InvalidRowPolicy::Abort => return Err(e),
                InvalidRowPolicy::Skip => {
                    warn!(error = %e, "Skipping invalid row");
                    skipped += 1;
                }
            },
        }
    }

    RECORDS_LOADED.set(records.len() as f64);
    ROWS_SKIPPED_TOTAL.inc_by(skipped as f64);
    info!(
        source = %source,
        records = records.len(),
        skipped,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Dataset loaded"
    );

    Ok(Dataset::new(source, records, skipped))
}

/// Loads datasets once per distinct input description.
#[derive(Debug)]
pub struct DatasetLoader {
    cache: Memo<InputConfig, Dataset>,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader {
    pub fn new() -> Self {
        DatasetLoader {
            cache: Memo::new("dataset"),
        }
    }

    pub fn load(&self, config: &InputConfig) -> Result<Arc<Dataset>> {
        self.cache
            .get_or_try_insert_with(config.clone(), || load(config))
    }
}
