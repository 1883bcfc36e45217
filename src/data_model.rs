use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Timelike};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Pre-supplied sentiment label of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            _ => Err(DashboardError::UnknownSentiment(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One social-media post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String, // tweet_id, or "<source>_row_<n>" when the column is absent
    pub text: String,
    pub sentiment: Sentiment,
    pub entity: String, // the airline the post is about
    pub created_at: DateTime<FixedOffset>,
    pub coordinates: Option<Coordinates>,
}

impl Record {
    /// Hour of day in the offset the timestamp was written in.
    pub fn hour(&self) -> u32 {
        self.created_at.hour()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.latitude)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.longitude)
    }
}

/// The loaded record set. Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    source: String,
    records: Vec<Record>,
    skipped_rows: usize,
}

impl Dataset {
    pub fn new(source: impl Into<String>, records: Vec<Record>, skipped_rows: usize) -> Self {
        Dataset {
            source: source.into(),
            records,
            skipped_rows,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Distinct entity names in first-seen order.
    pub fn entities(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.entity.as_str()).unique().collect()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A borrowed, ordered selection of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subset<'a> {
    records: Vec<&'a Record>,
}

impl<'a> Subset<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, &'a Record>> {
        self.records.iter().copied()
    }

    pub fn as_slice(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn to_owned_records(&self) -> Vec<Record> {
        self.records.iter().map(|r| (*r).clone()).collect()
    }
}

impl<'a> FromIterator<&'a Record> for Subset<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Record>>(iter: I) -> Self {
        Subset {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'s, 'a> IntoIterator for &'s Subset<'a> {
    type Item = &'a Record;
    type IntoIter = std::iter::Copied<std::slice::Iter<'s, &'a Record>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter().copied()
    }
}

/// Grouped counts. Iterates in descending count order, ties kept in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Counts<K> {
    entries: Vec<(K, usize)>,
}

pub type SentimentCount = Counts<Sentiment>;
pub type EntityCount = Counts<String>;

impl<K: Eq + Hash + Clone> Counts<K> {
    pub fn tally<I: IntoIterator<Item = K>>(keys: I) -> Self {
        let mut index: HashMap<K, usize> = HashMap::new();
        let mut entries: Vec<(K, usize)> = Vec::new();
        for key in keys {
            match index.get(&key) {
                Some(&slot) => entries[slot].1 += 1,
                None => {
                    index.insert(key.clone(), entries.len());
                    entries.push((key, 1));
                }
            }
        }
        // sorted_by is stable, so equal counts keep their first-seen order
        let entries = entries.into_iter().sorted_by(|a, b| b.1.cmp(&a.1)).collect();
        Counts { entries }
    }

    pub fn get(&self, key: &K) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

impl<K> Counts<K> {
    pub fn empty() -> Self {
        Counts { entries: Vec::new() }
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(k, count)| (k, *count))
    }
}

/// Word-cloud input for one sentiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordFrequencySet {
    pub sentiment: Sentiment,
    pub total_tokens: usize, // cleaned tokens before stop-word removal
    pub frequencies: Vec<(String, usize)>,
}

impl WordFrequencySet {
    pub fn empty(sentiment: Sentiment) -> Self {
        WordFrequencySet {
            sentiment,
            total_tokens: 0,
            frequencies: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn get(&self, word: &str) -> usize {
        self.frequencies
            .iter()
            .find(|(w, _)| w == word)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
    /// The `n` most frequent words. `total_tokens` is unchanged.
    pub fn top(&self, n: usize) -> WordFrequencySet {
        WordFrequencySet {
            sentiment: self.sentiment,
            total_tokens: self.total_tokens,
            frequencies: self.frequencies.iter().take(n).cloned().collect(),
        }
    }
}
