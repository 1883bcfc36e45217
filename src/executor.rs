use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::Memo;
use crate::config::DashboardConfig;
use crate::data_model::{Dataset, Record, Sentiment, SentimentCount, WordFrequencySet};
use crate::error::{DashboardError, Result};
use crate::pipeline::aggregation::{
    count_by_entity, count_by_entity_and_sentiment, count_by_sentiment, filter_by_hour,
    validate_hour,
};
use crate::pipeline::presentation::{
    hour_caption, to_chart, to_grid, to_map_points, to_word_weights, Chart, ChartKind, MapPoint,
    SubplotGrid, WordWeight,
};
use crate::pipeline::text_filter::{
    clean_tokens, filter_by_sentiment, sample_one, word_frequencies, WordFrequencyOptions,
};
use crate::utils::prometheus_metrics::{PANELS_RENDERED_TOTAL, PANEL_RENDER_DURATION_SECONDS};
use crate::utils::text::build_stop_words;

/// Memo tables for the parameterised queries.
#[derive(Debug)]
pub struct QueryCache {
    pub entity_sentiment: Memo<String, SentimentCount>,
    pub hour_rows: Memo<u32, Vec<Record>>,
    pub word_frequencies: Memo<Sentiment, WordFrequencySet>,
}

impl Default for QueryCache {
    fn default() -> Self {
        QueryCache {
            entity_sentiment: Memo::new("entity_sentiment"),
            hour_rows: Memo::new("hour_rows"),
            word_frequencies: Memo::new("word_frequencies"),
        }
    }
}

/// Everything a panel needs: the shared dataset plus per-process settings.
#[derive(Debug)]
pub struct DashboardContext {
    pub dataset: Arc<Dataset>,
    pub known_entities: Vec<String>,
    pub word_options: WordFrequencyOptions,
    pub cache: QueryCache,
}

impl DashboardContext {
    pub fn new(dataset: Arc<Dataset>, config: &DashboardConfig) -> Self {
        let known_entities = config.known_entities();
        let word_options = WordFrequencyOptions {
            max_words: config.word_cloud.max_words,
            min_word_length: config.word_cloud.min_word_length,
            stop_words: build_stop_words(
                config.word_cloud.stop_words.as_deref(),
                &config.word_cloud.extra_stop_words,
            ),
        };
        DashboardContext {
            dataset,
            known_entities,
            word_options,
            cache: QueryCache::default(),
        }
    }

    pub fn validate_entity(&self, entity: &str) -> Result<()> {
        if self.known_entities.iter().any(|e| e == entity) {
            Ok(())
        } else {
            Err(DashboardError::UnknownEntity(entity.to_string()))
        }
    }

    pub fn entity_sentiment(&self, entity: &str) -> Result<Arc<SentimentCount>> {
        self.cache
            .entity_sentiment
            .get_or_try_insert_with(entity.to_string(), || {
                Ok(count_by_entity_and_sentiment(self.dataset.as_ref(), entity))
            })
    }

    pub fn hour_rows(&self, hour: u32) -> Result<Arc<Vec<Record>>> {
        self.cache.hour_rows.get_or_try_insert_with(hour, || {
            Ok(filter_by_hour(self.dataset.as_ref(), hour)?.to_owned_records())
        })
    }

    /// Word frequencies for `sentiment`, cut at the configured `max_words`.
    pub fn word_frequencies(&self, sentiment: Sentiment) -> Result<Arc<WordFrequencySet>> {
        self.cache
            .word_frequencies
            .get_or_try_insert_with(sentiment, || {
                let subset = filter_by_sentiment(self.dataset.as_ref(), sentiment);
                Ok(word_frequencies(
                    sentiment,
                    clean_tokens(&subset),
                    &self.word_options,
                ))
            })
    }
}

/// Hour panel result: caption, map points and optionally the raw rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationView {
    pub hour: u32,
    pub caption: String,
    pub tweet_count: usize,
    pub points: Vec<MapPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Vec<Record>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCloudView {
    pub sentiment: Sentiment,
    pub total_tokens: usize,
    pub words: Vec<WordWeight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PanelOutput {
    Tweet {
        sentiment: Sentiment,
        tweet: Option<Record>,
    },
    Chart(Chart),
    Grid(SubplotGrid),
    Locations(LocationView),
    WordCloud(WordCloudView),
}

impl PanelOutput {
    /// True when the panel has nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            PanelOutput::Tweet { tweet, .. } => tweet.is_none(),
            PanelOutput::Chart(chart) => chart.series.points.is_empty(),
            PanelOutput::Grid(grid) => grid.cells.iter().all(|c| c.points.is_empty()),
            PanelOutput::Locations(view) => view.tweet_count == 0,
            PanelOutput::WordCloud(view) => view.words.is_empty(),
        }
    }
}

pub trait Panel: Send + Sync {
    fn name(&self) -> &'static str; // For logging/error reporting

    fn render(&self, ctx: &DashboardContext) -> Result<PanelOutput>;

    /// What to show when `render` fails.
    fn fallback(&self) -> PanelOutput;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStatus {
    Rendered,
    Empty,
    Failed,
}

impl PanelStatus {
    fn as_str(&self) -> &'static str {
        match self {
            PanelStatus::Rendered => "rendered",
            PanelStatus::Empty => "empty",
            PanelStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelReport {
    pub panel: &'static str,
    pub status: PanelStatus,
    /// Visible, non-fatal message for empty results and recovered failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip)]
    pub validation_failure: bool,
    pub output: PanelOutput,
}

// --- Panels ---

pub struct RandomTweetPanel {
    pub sentiment: Sentiment,
    pub seed: Option<u64>,
}

impl RandomTweetPanel {
    pub const NAME: &'static str = "RandomTweet";
}

impl Panel for RandomTweetPanel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn render(&self, ctx: &DashboardContext) -> Result<PanelOutput> {
        let subset = filter_by_sentiment(ctx.dataset.as_ref(), self.sentiment);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(PanelOutput::Tweet {
            sentiment: self.sentiment,
            tweet: sample_one(&subset, &mut rng).cloned(),
        })
    }

    fn fallback(&self) -> PanelOutput {
        PanelOutput::Tweet {
            sentiment: self.sentiment,
            tweet: None,
        }
    }
}

pub struct SentimentCountPanel {
    pub chart: ChartKind,
}

impl SentimentCountPanel {
    pub const NAME: &'static str = "SentimentCounts";
    const TITLE: &'static str = "Number of tweets by sentiment";
}

impl Panel for SentimentCountPanel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn render(&self, ctx: &DashboardContext) -> Result<PanelOutput> {
        let counts = count_by_sentiment(ctx.dataset.as_ref());
        Ok(PanelOutput::Chart(to_chart(Self::TITLE, self.chart, "Tweets", &counts)))
    }

    fn fallback(&self) -> PanelOutput {
        PanelOutput::Chart(to_chart(
            Self::TITLE,
            self.chart,
            "Tweets",
            &SentimentCount::empty(),
        ))
    }
}

pub struct TweetLocationPanel {
    pub hour: u32,
    pub include_raw: bool,
}

impl TweetLocationPanel {
    pub const NAME: &'static str = "TweetLocations";
}

impl Panel for TweetLocationPanel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn render(&self, ctx: &DashboardContext) -> Result<PanelOutput> {
        let rows = ctx.hour_rows(self.hour)?;
        Ok(PanelOutput::Locations(LocationView {
            hour: self.hour,
            caption: hour_caption(rows.len(), self.hour),
            tweet_count: rows.len(),
            points: to_map_points(rows.iter()),
            raw: self.include_raw.then(|| rows.as_ref().clone()),
        }))
    }

    fn fallback(&self) -> PanelOutput {
        // An out-of-range hour gets no caption; the notice explains the failure
        PanelOutput::Locations(LocationView {
            hour: self.hour,
            caption: validate_hour(self.hour)
                .map(|hour| hour_caption(0, hour))
                .unwrap_or_default(),
            tweet_count: 0,
            points: Vec::new(),
            raw: None,
        })
    }
}

pub struct EntityTotalsPanel {
    pub chart: ChartKind,
}

impl EntityTotalsPanel {
    pub const NAME: &'static str = "AirlineTotals";
    const TITLE: &'static str = "Total number of tweets for each airline";
}

impl Panel for EntityTotalsPanel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn render(&self, ctx: &DashboardContext) -> Result<PanelOutput> {
        let counts = count_by_entity(ctx.dataset.as_ref());
        Ok(PanelOutput::Chart(to_chart(Self::TITLE, self.chart, "Tweets", &counts)))
    }

    fn fallback(&self) -> PanelOutput {
        PanelOutput::Chart(to_chart(
            Self::TITLE,
            self.chart,
            "Tweets",
            &crate::data_model::EntityCount::empty(),
        ))
    }
}

pub struct EntityBreakdownPanel {
    pub entities: Vec<String>,
    pub chart: ChartKind,
}

impl EntityBreakdownPanel {
    pub const NAME: &'static str = "AirlineBreakdown";
    const TITLE: &'static str = "Breakdown airline by sentiment";
}

impl Panel for EntityBreakdownPanel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn render(&self, ctx: &DashboardContext) -> Result<PanelOutput> {
        let mut per_entity = Vec::with_capacity(self.entities.len());
        for entity in &self.entities {
            ctx.validate_entity(entity)?;
            let counts = ctx.entity_sentiment(entity)?;
            per_entity.push((entity.clone(), counts.as_ref().clone()));
        }
        Ok(PanelOutput::Grid(to_grid(Self::TITLE, self.chart, per_entity)))
    }

    fn fallback(&self) -> PanelOutput {
        PanelOutput::Grid(to_grid(
            Self::TITLE,
            self.chart,
            self.entities
                .iter()
                .map(|e| (e.clone(), SentimentCount::empty())),
        ))
    }
}

pub struct WordCloudPanel {
    pub sentiment: Sentiment,
    pub max_words: usize,
}

impl WordCloudPanel {
    pub const NAME: &'static str = "WordCloud";
}

impl Panel for WordCloudPanel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn render(&self, ctx: &DashboardContext) -> Result<PanelOutput> {
        // Requests above the configured maximum get the configured maximum
        let limit = self.max_words.min(ctx.word_options.max_words);
        let freqs = ctx.word_frequencies(self.sentiment)?.top(limit);
        Ok(PanelOutput::WordCloud(WordCloudView {
            sentiment: self.sentiment,
            total_tokens: freqs.total_tokens,
            words: to_word_weights(&freqs),
        }))
    }

    fn fallback(&self) -> PanelOutput {
        PanelOutput::WordCloud(WordCloudView {
            sentiment: self.sentiment,
            total_tokens: 0,
            words: Vec::new(),
        })
    }
}

// --- Selection ---

pub const PANEL_NAMES: &[&str] = &[
    RandomTweetPanel::NAME,
    SentimentCountPanel::NAME,
    TweetLocationPanel::NAME,
    EntityTotalsPanel::NAME,
    EntityBreakdownPanel::NAME,
    WordCloudPanel::NAME,
];

/// A UI parameter whose raw value did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedParam {
    pub parameter: &'static str,
    pub value: String,
    pub reason: String,
}

impl RejectedParam {
    /// Parses an optional raw value. Blank values count as absent.
    pub fn parse<T>(
        parameter: &'static str,
        value: Option<&str>,
    ) -> std::result::Result<Option<T>, RejectedParam>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|e| RejectedParam {
                parameter,
                value: raw.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn to_error(&self) -> DashboardError {
        DashboardError::InvalidParameter {
            parameter: self.parameter.to_string(),
            value: self.value.clone(),
            reason: self.reason.clone(),
        }
    }
}

/// Parameter failures keyed by the panel they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rejections {
    entries: Vec<(&'static str, RejectedParam)>,
}

impl Rejections {
    /// Parses `value` for `panel`. A failure is recorded and read as absent.
    pub fn read<T>(
        &mut self,
        panel: &'static str,
        parameter: &'static str,
        value: Option<&str>,
    ) -> Option<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match RejectedParam::parse(parameter, value) {
            Ok(parsed) => parsed,
            Err(rejected) => {
                debug!(panel, parameter, value = %rejected.value, "Rejected parameter");
                self.entries.push((panel, rejected));
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn for_panel(&self, panel: &str) -> Option<&RejectedParam> {
        self.entries
            .iter()
            .find(|(name, _)| *name == panel)
            .map(|(_, rejected)| rejected)
    }

    /// Swaps in a [`RejectedPanel`] when one of the panel's parameters failed.
    pub fn apply(&self, panel: Box<dyn Panel>) -> Box<dyn Panel> {
        match self.for_panel(panel.name()).cloned() {
            Some(rejected) => Box::new(RejectedPanel { panel, rejected }),
            None => panel,
        }
    }
}

/// Stands in for a panel built from defaults after a parameter failed to parse.
/// Rendering reports the parse failure; the fallback is the panel's own.
pub struct RejectedPanel {
    pub panel: Box<dyn Panel>,
    pub rejected: RejectedParam,
}

impl Panel for RejectedPanel {
    fn name(&self) -> &'static str {
        self.panel.name()
    }

    fn render(&self, _ctx: &DashboardContext) -> Result<PanelOutput> {
        Err(self.rejected.to_error())
    }

    fn fallback(&self) -> PanelOutput {
        self.panel.fallback()
    }
}

/// UI control values as plain parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub random_sentiment: Sentiment,
    pub sentiment_chart: ChartKind,
    pub hour: u32,
    pub show_raw: bool,
    pub airline_chart: ChartKind,
    pub breakdown_airlines: Vec<String>,
    pub breakdown_chart: ChartKind,
    pub word_sentiment: Sentiment,
    pub max_words: Option<usize>,
    pub hidden: HashSet<String>,
    pub seed: Option<u64>,
    /// Raw values that did not parse; their panels render as failed.
    #[serde(skip)]
    pub rejected: Rejections,
}

impl Default for Selection {
    fn default() -> Self {
        Selection {
            random_sentiment: Sentiment::Positive,
            sentiment_chart: ChartKind::Bar,
            hour: 0,
            show_raw: false,
            airline_chart: ChartKind::Bar,
            breakdown_airlines: Vec::new(),
            breakdown_chart: ChartKind::Pie,
            word_sentiment: Sentiment::Positive,
            max_words: None,
            hidden: HashSet::new(),
            seed: None,
            rejected: Rejections::default(),
        }
    }
}

impl Selection {
    fn is_visible(&self, panel: &str) -> bool {
        !self.hidden.iter().any(|h| h.eq_ignore_ascii_case(panel))
    }

    /// Builds the visible panels in page order. The breakdown panel only
    /// appears once at least one airline is picked.
    pub fn build_panels(&self, ctx: &DashboardContext) -> Vec<Box<dyn Panel>> {
        let mut panels: Vec<Box<dyn Panel>> = vec![
            Box::new(RandomTweetPanel {
                sentiment: self.random_sentiment,
                seed: self.seed,
            }),
            Box::new(SentimentCountPanel {
                chart: self.sentiment_chart,
            }),
            Box::new(TweetLocationPanel {
                hour: self.hour,
                include_raw: self.show_raw,
            }),
            Box::new(EntityTotalsPanel {
                chart: self.airline_chart,
            }),
        ];
        if !self.breakdown_airlines.is_empty() {
            panels.push(Box::new(EntityBreakdownPanel {
                entities: self.breakdown_airlines.clone(),
                chart: self.breakdown_chart,
            }));
        }
        panels.push(Box::new(WordCloudPanel {
            sentiment: self.word_sentiment,
            max_words: self.max_words.unwrap_or(ctx.word_options.max_words),
        }));
        panels.retain(|p| self.is_visible(p.name()));
        panels.into_iter().map(|p| self.rejected.apply(p)).collect()
    }
}

// --- Executor ---

pub struct DashboardExecutor {
    panels: Vec<Box<dyn Panel>>, // Holds the ordered panels
}

impl DashboardExecutor {
    pub fn new(panels: Vec<Box<dyn Panel>>) -> Self {
        if panels.is_empty() {
            warn!("Dashboard created with no panels.");
        }
        DashboardExecutor { panels }
    }

    pub fn from_selection(selection: &Selection, ctx: &DashboardContext) -> Self {
        Self::new(selection.build_panels(ctx))
    }

    pub fn panel_names(&self) -> Vec<&'static str> {
        self.panels.iter().map(|p| p.name()).collect()
    }

    /// Renders one panel. Failures are recovered: the report carries the
    /// panel's fallback output and a message instead of an error.
    pub fn run_panel(panel: &dyn Panel, ctx: &DashboardContext) -> PanelReport {
        debug!("Rendering panel: {}", panel.name());
        let started = Instant::now();
        let result = panel.render(ctx).map_err(|e| DashboardError::PanelError {
            panel_name: panel.name().to_string(),
            source: Box::new(e),
        });
        PANEL_RENDER_DURATION_SECONDS
            .with_label_values(&[panel.name()])
            .observe(started.elapsed().as_secs_f64());

        let report = match result {
            Ok(output) if output.is_empty() => PanelReport {
                panel: panel.name(),
                status: PanelStatus::Empty,
                notice: Some("No tweets match this selection.".to_string()),
                validation_failure: false,
                output,
            },
            Ok(output) => PanelReport {
                panel: panel.name(),
                status: PanelStatus::Rendered,
                notice: None,
                validation_failure: false,
                output,
            },
            Err(e) => {
                warn!(panel = panel.name(), error = %e, "Panel failed, showing empty result");
                PanelReport {
                    panel: panel.name(),
                    status: PanelStatus::Failed,
                    validation_failure: e.is_validation_error(),
                    notice: Some(e.to_string()),
                    output: panel.fallback(),
                }
            }
        };
        PANELS_RENDERED_TOTAL
            .with_label_values(&[report.panel, report.status.as_str()])
            .inc();
        report
    }

    pub fn run(&self, ctx: &DashboardContext) -> Vec<PanelReport> {
        self.panels
            .iter()
            .map(|panel| Self::run_panel(panel.as_ref(), ctx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ENTITIES;
    use crate::data_model::Coordinates;
    use chrono::{FixedOffset, TimeZone};

    fn record(i: usize, sentiment: Sentiment, entity: &str, hour: u32, text: &str) -> Record {
        Record {
            id: format!("t{}", i),
            text: text.to_string(),
            sentiment,
            entity: entity.to_string(),
            created_at: FixedOffset::west_opt(5 * 3600)
                .unwrap()
                .with_ymd_and_hms(2015, 2, 21, hour, 0, 0)
                .unwrap(),
            coordinates: (i % 2 == 0).then_some(Coordinates {
                latitude: 40.0,
                longitude: -73.0,
            }),
        }
    }

    fn context() -> DashboardContext {
        let dataset = Dataset::new(
            "memory",
            vec![
                record(0, Sentiment::Positive, "Delta", 8, "@Delta great crew thanks"),
                record(1, Sentiment::Negative, "Delta", 8, "RT delayed again http://t.co/x"),
                record(2, Sentiment::Positive, "United", 14, "great service"),
                record(3, Sentiment::Neutral, "United", 23, "boarding now"),
            ],
            0,
        );
        let config = DashboardConfig {
            entities: vec!["Delta".to_string(), "United".to_string(), "Southwest".to_string()],
            ..Default::default()
        };
        DashboardContext::new(Arc::new(dataset), &config)
    }

    #[test]
    fn test_default_selection_renders_all_panels() {
        let ctx = context();
        let selection = Selection {
            breakdown_airlines: vec!["Delta".to_string()],
            seed: Some(1),
            ..Default::default()
        };
        let executor = DashboardExecutor::from_selection(&selection, &ctx);
        assert_eq!(executor.panel_names(), PANEL_NAMES.to_vec());

        let reports = executor.run(&ctx);
        assert_eq!(reports.len(), 6);
        // Nothing was tweeted at midnight
        assert_eq!(reports[2].status, PanelStatus::Empty);
        assert!(reports[2].notice.is_some());
        assert!(reports
            .iter()
            .filter(|r| r.panel != "TweetLocations")
            .all(|r| r.status == PanelStatus::Rendered));
    }

    #[test]
    fn test_breakdown_hidden_without_airlines() {
        let ctx = context();
        let selection = Selection {
            hidden: ["wordcloud".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let names = DashboardExecutor::from_selection(&selection, &ctx).panel_names();
        assert!(!names.contains(&"AirlineBreakdown"));
        assert!(!names.contains(&"WordCloud"));
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_invalid_hour_falls_back() {
        let ctx = context();
        let executor = DashboardExecutor::new(vec![Box::new(TweetLocationPanel {
            hour: 25,
            include_raw: true,
        })]);
        let reports = executor.run(&ctx);
        let report = &reports[0];
        assert_eq!(report.status, PanelStatus::Failed);
        assert!(report.validation_failure);
        assert!(report.notice.as_deref().unwrap().contains("got 25"));
        match &report.output {
            PanelOutput::Locations(view) => {
                assert_eq!(view.tweet_count, 0);
                assert!(view.points.is_empty());
            }
            other => panic!("Expected Locations fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_huge_hour_falls_back_without_panicking() {
        let ctx = context();
        let panel = TweetLocationPanel {
            hour: u32::MAX,
            include_raw: false,
        };
        let report = DashboardExecutor::run_panel(&panel, &ctx);
        assert_eq!(report.status, PanelStatus::Failed);
        assert!(report.validation_failure);
        match &report.output {
            PanelOutput::Locations(view) => {
                assert_eq!(view.hour, u32::MAX);
                assert!(view.caption.is_empty());
                assert_eq!(view.tweet_count, 0);
            }
            other => panic!("Expected Locations fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_default_config_offers_builtin_airlines() {
        let ctx = DashboardContext::new(context().dataset, &DashboardConfig::default());
        assert_eq!(ctx.known_entities.len(), DEFAULT_ENTITIES.len());
        // Known even without tweets in this dataset
        assert!(ctx.validate_entity("Southwest").is_ok());
        assert!(ctx.validate_entity("Ryanair").is_err());
    }

    #[test]
    fn test_rejected_parameter_fails_only_its_panel() {
        let ctx = context();
        let mut rejected = Rejections::default();
        let sentiment: Option<Sentiment> =
            rejected.read(WordCloudPanel::NAME, "word_sentiment", Some("angry"));
        assert!(sentiment.is_none());
        let hour: Option<u32> = rejected.read(TweetLocationPanel::NAME, "hour", Some(" 8 "));
        assert_eq!(hour, Some(8));

        let selection = Selection {
            hour: hour.unwrap_or_default(),
            rejected,
            ..Default::default()
        };
        let reports = DashboardExecutor::from_selection(&selection, &ctx).run(&ctx);
        let cloud = reports.iter().find(|r| r.panel == WordCloudPanel::NAME).unwrap();
        assert_eq!(cloud.status, PanelStatus::Failed);
        assert!(cloud.validation_failure);
        assert!(cloud.notice.as_deref().unwrap().contains("Unknown sentiment 'angry'"));
        assert!(cloud.output.is_empty());
        assert!(reports
            .iter()
            .filter(|r| r.panel != WordCloudPanel::NAME)
            .all(|r| r.status == PanelStatus::Rendered));
    }

    #[test]
    fn test_rejected_param_parse() {
        assert_eq!(RejectedParam::parse::<u32>("hour", None), Ok(None));
        assert_eq!(RejectedParam::parse::<u32>("hour", Some("  ")), Ok(None));
        assert_eq!(
            RejectedParam::parse::<ChartKind>("chart", Some("Pie chart")),
            Ok(Some(ChartKind::Pie))
        );
        let err = RejectedParam::parse::<ChartKind>("chart", Some("donut")).unwrap_err();
        assert_eq!(err.value, "donut");
        assert!(matches!(
            err.to_error(),
            DashboardError::InvalidParameter { .. }
        ));
    }

    #[test]
    fn test_unknown_airline_falls_back_with_full_grid() {
        let ctx = context();
        let executor = DashboardExecutor::new(vec![Box::new(EntityBreakdownPanel {
            entities: vec!["Delta".to_string(), "Ryanair".to_string()],
            chart: ChartKind::Bar,
        })]);
        let report = &executor.run(&ctx)[0];
        assert_eq!(report.status, PanelStatus::Failed);
        assert!(report.notice.as_deref().unwrap().contains("Ryanair"));
        match &report.output {
            PanelOutput::Grid(grid) => assert_eq!(grid.cols, 2),
            other => panic!("Expected Grid fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_known_airline_without_tweets_keeps_its_column() {
        let ctx = context();
        let panel = EntityBreakdownPanel {
            entities: vec!["Southwest".to_string(), "Delta".to_string()],
            chart: ChartKind::Pie,
        };
        match panel.render(&ctx).unwrap() {
            PanelOutput::Grid(grid) => {
                assert_eq!(grid.cols, 2);
                assert!(grid.cells[0].points.is_empty());
                assert_eq!(grid.cells[1].total(), 2);
            }
            other => panic!("Expected Grid, got {:?}", other),
        }
    }

    #[test]
    fn test_location_panel_uses_cache() {
        let ctx = context();
        let panel = TweetLocationPanel {
            hour: 8,
            include_raw: true,
        };
        let first = panel.render(&ctx).unwrap();
        let second = panel.render(&ctx).unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.cache.hour_rows.len(), 1);
        match first {
            PanelOutput::Locations(view) => {
                assert_eq!(view.tweet_count, 2);
                assert_eq!(view.points.len(), 1);
                assert_eq!(view.caption, "2 tweets between 8:00 and 9:00");
                assert_eq!(view.raw.unwrap().len(), 2);
            }
            other => panic!("Expected Locations, got {:?}", other),
        }
    }

    #[test]
    fn test_word_cloud_panel() {
        let ctx = context();
        let panel = WordCloudPanel {
            sentiment: Sentiment::Positive,
            max_words: 10,
        };
        match panel.render(&ctx).unwrap() {
            PanelOutput::WordCloud(view) => {
                assert_eq!(view.words[0].word, "great");
                assert_eq!(view.words[0].count, 2);
                assert!(view.words.iter().all(|w| w.word != "@delta"));
            }
            other => panic!("Expected WordCloud, got {:?}", other),
        }
    }

    #[test]
    fn test_word_cloud_cache_is_keyed_by_sentiment() {
        let ctx = context();
        for max_words in 1..=50 {
            let panel = WordCloudPanel {
                sentiment: Sentiment::Positive,
                max_words,
            };
            match panel.render(&ctx).unwrap() {
                PanelOutput::WordCloud(view) => assert!(view.words.len() <= max_words),
                other => panic!("Expected WordCloud, got {:?}", other),
            }
        }
        assert_eq!(ctx.cache.word_frequencies.len(), 1);
    }

    #[test]
    fn test_word_cloud_clamps_to_configured_maximum() {
        let mut config = DashboardConfig::default();
        config.word_cloud.max_words = 1;
        let ctx = DashboardContext::new(context().dataset, &config);
        let panel = WordCloudPanel {
            sentiment: Sentiment::Positive,
            max_words: 10_000,
        };
        match panel.render(&ctx).unwrap() {
            PanelOutput::WordCloud(view) => {
                assert_eq!(view.words.len(), 1);
                assert_eq!(view.words[0].word, "great");
            }
            other => panic!("Expected WordCloud, got {:?}", other),
        }
    }

    #[test]
    fn test_seeded_random_tweet_is_repeatable() {
        let ctx = context();
        let panel = RandomTweetPanel {
            sentiment: Sentiment::Positive,
            seed: Some(7),
        };
        let a = panel.render(&ctx).unwrap();
        let b = panel.render(&ctx).unwrap();
        assert_eq!(a, b);
        match a {
            PanelOutput::Tweet { tweet, .. } => {
                assert_eq!(tweet.unwrap().sentiment, Sentiment::Positive)
            }
            other => panic!("Expected Tweet, got {:?}", other),
        }
    }
}
