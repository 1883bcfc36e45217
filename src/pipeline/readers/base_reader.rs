use chrono::{DateTime, FixedOffset, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::data_model::{Coordinates, Record, Sentiment};
use crate::error::{DashboardError, Result};

/// A row as it comes out of the file, before any field is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub row: usize,
    pub id: Option<String>,
    pub text: String,
    pub sentiment: String,
    pub entity: String,
    pub created_at: String,
    pub coordinates: Option<String>,
}

pub trait BaseReader {
    /// Where the rows come from, used for error messages and fallback ids.
    fn source(&self) -> &str;

    fn read_rows(&self) -> Result<Box<dyn Iterator<Item = Result<RawRow>>>>;
}

static COORD_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[\s*([-+]?\d+(?:\.\d+)?)\s*,\s*([-+]?\d+(?:\.\d+)?)\s*\]$")
        .expect("coordinate pattern is valid")
});

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%dT%H:%M:%S%.f%z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses `tweet_created`. Offsets are kept as written; naive values are read as +00:00.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts);
    }
    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    None
}

/// Parses `tweet_coord` ("[lat, long]"). Blank, malformed or out-of-range values give `None`.
pub fn parse_coordinates(value: &str) -> Option<Coordinates> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let caps = COORD_PAIR.captures(value)?;
    let latitude: f64 = caps[1].parse().ok()?;
    let longitude: f64 = caps[2].parse().ok()?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some(Coordinates {
        latitude,
        longitude,
    })
}

impl RawRow {
    pub fn into_record(self, source: &str) -> Result<Record> {
        let created_at =
            parse_timestamp(&self.created_at).ok_or_else(|| DashboardError::ParseError {
                source_path: source.to_string(),
                row: self.row,
                field: "created_at",
                value: self.created_at.clone(),
                reason: "unrecognised timestamp format".to_string(),
            })?;

        let sentiment: Sentiment =
            self.sentiment
                .parse()
                .map_err(|_| DashboardError::ParseError {
                    source_path: source.to_string(),
                    row: self.row,
                    field: "sentiment",
                    value: self.sentiment.clone(),
                    reason: "expected positive, neutral or negative".to_string(),
                })?;

        let coordinates = match self.coordinates.as_deref() {
            Some(raw) => {
                let parsed = parse_coordinates(raw);
                if parsed.is_none() && !raw.trim().is_empty() {
                    debug!(row = self.row, value = raw, "Ignoring unparseable coordinates");
                }
                parsed
            }
            None => None,
        };

        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => format!("{}_row_{}", source, self.row),
        };

        Ok(Record {
            id,
            text: self.text,
            sentiment,
            entity: self.entity.trim().to_string(),
            created_at,
            coordinates,
        })
    }
}
