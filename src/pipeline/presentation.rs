//! Shapes aggregation results into chart-ready data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data_model::{Counts, Record, SentimentCount, WordFrequencySet};
use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Pie,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Bar => f.write_str("bar"),
            ChartKind::Pie => f.write_str("pie"),
        }
    }
}

impl FromStr for ChartKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bar" | "bar plot" => Ok(ChartKind::Bar),
            "pie" | "pie chart" => Ok(ChartKind::Pie),
            _ => Err(DashboardError::InvalidChartKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn total(&self) -> usize {
        self.points.iter().map(|p| p.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chart {
    pub title: String,
    pub kind: ChartKind,
    pub series: Series,
}

/// Side-by-side subplots, one column per entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubplotGrid {
    pub title: String,
    pub kind: ChartKind,
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Series>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordWeight {
    pub word: String,
    pub count: usize,
    pub weight: f64, // relative to the most frequent word
}

/// `(label, value)` pairs in the counts' own order.
pub fn to_series<K: fmt::Display>(counts: &Counts<K>) -> Vec<SeriesPoint> {
    counts
        .iter()
        .map(|(label, value)| SeriesPoint {
            label: label.to_string(),
            value,
        })
        .collect()
}

pub fn to_chart<K: fmt::Display>(
    title: impl Into<String>,
    kind: ChartKind,
    series_name: impl Into<String>,
    counts: &Counts<K>,
) -> Chart {
    Chart {
        title: title.into(),
        kind,
        series: Series {
            name: series_name.into(),
            points: to_series(counts),
        },
    }
}

/// A 1 x N grid in input order. Entities without records keep an empty series.
pub fn to_grid<I>(title: impl Into<String>, kind: ChartKind, per_entity: I) -> SubplotGrid
where
    I: IntoIterator<Item = (String, SentimentCount)>,
{
    let cells: Vec<Series> = per_entity
        .into_iter()
        .map(|(entity, counts)| Series {
            name: entity,
            points: to_series(&counts),
        })
        .collect();
    SubplotGrid {
        title: title.into(),
        kind,
        rows: 1,
        cols: cells.len(),
        cells,
    }
}

pub fn to_map_points<'a, I>(records: I) -> Vec<MapPoint>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter_map(|r| r.coordinates)
        .map(|c| MapPoint {
            latitude: c.latitude,
            longitude: c.longitude,
        })
        .collect()
}

pub fn hour_caption(count: usize, hour: u32) -> String {
    format!(
        "{} tweets between {}:00 and {}:00",
        count,
        hour,
        (hour % 24 + 1) % 24
    )
}

pub fn to_word_weights(freqs: &WordFrequencySet) -> Vec<WordWeight> {
    let max = freqs
        .frequencies
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0);
    if max == 0 {
        return Vec::new();
    }
    freqs
        .frequencies
        .iter()
        .map(|(word, count)| WordWeight {
            word: word.clone(),
            count: *count,
            weight: *count as f64 / max as f64,
        })
        .collect()
}
