use serde::Deserialize;
use std::path::Path;

/// File formats the loader understands.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Csv,
    Parquet,
}

impl InputFormat {
    /// Guesses the format from the file extension, defaulting to CSV.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
        {
            Some(ext) if ext == "parquet" || ext == "pq" => InputFormat::Parquet,
            _ => InputFormat::Csv,
        }
    }
}

/// What to do with a row whose timestamp or sentiment cannot be parsed.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRowPolicy {
    /// Fail the whole load on the first bad row.
    #[default]
    Abort,
    /// Drop the row, log it and keep going.
    Skip,
}

/// Column names in the input file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct ColumnMapping {
    pub text: String,
    pub sentiment: String,
    pub entity: String,
    pub created_at: String,
    pub coordinates: Option<String>, // optional "[lat, long]" column
    pub id: Option<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping {
            text: "text".to_string(),
            sentiment: "airline_sentiment".to_string(),
            entity: "airline".to_string(),
            created_at: "tweet_created".to_string(),
            coordinates: Some("tweet_coord".to_string()),
            id: Some("tweet_id".to_string()),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct InputConfig {
    pub path: String,
    pub format: Option<InputFormat>, // inferred from the extension when None
    pub columns: ColumnMapping,
    pub on_invalid_row: InvalidRowPolicy,
    pub batch_size: Option<usize>, // Arrow batch size for Parquet input
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            path: "Tweets.csv".to_string(),
            format: None,
            columns: ColumnMapping::default(),
            on_invalid_row: InvalidRowPolicy::Abort,
            batch_size: None,
        }
    }
}

impl InputConfig {
    pub fn new(path: impl Into<String>) -> Self {
        InputConfig {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn resolved_format(&self) -> InputFormat {
        self.format.unwrap_or_else(|| InputFormat::from_path(&self.path))
    }
}
