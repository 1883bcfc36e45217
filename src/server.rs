use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use prometheus::{gather, Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::data_model::Sentiment;
use crate::error::{DashboardError, Result};
use crate::executor::{
    DashboardContext, DashboardExecutor, EntityBreakdownPanel, EntityTotalsPanel, Panel,
    RandomTweetPanel, Rejections, Selection, SentimentCountPanel, TweetLocationPanel,
    WordCloudPanel,
};
use crate::pipeline::presentation::ChartKind;

// The application state, shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<DashboardContext>,
}

// Query values stay raw strings and are parsed per panel; a bad value fails
// only the panel it belongs to.

#[derive(Deserialize, Debug, Default)]
pub struct ChartParams {
    pub chart: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SentimentParams {
    pub sentiment: Option<String>,
    pub seed: Option<String>,
    pub max_words: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct LocationParams {
    pub hour: Option<String>,
    pub raw: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct BreakdownParams {
    /// Comma separated airline names.
    pub airlines: Option<String>,
    pub chart: Option<String>,
}

/// Flat query-string form of [`Selection`].
#[derive(Deserialize, Debug, Default)]
pub struct DashboardParams {
    pub random_sentiment: Option<String>,
    pub sentiment_chart: Option<String>,
    pub hour: Option<String>,
    pub raw: Option<String>,
    pub airline_chart: Option<String>,
    pub airlines: Option<String>,
    pub breakdown_chart: Option<String>,
    pub word_sentiment: Option<String>,
    pub max_words: Option<String>,
    pub hide: Option<String>,
    pub seed: Option<String>,
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl DashboardParams {
    pub fn into_selection(self) -> Selection {
        let defaults = Selection::default();
        let mut rejected = Rejections::default();

        let random_sentiment = rejected.read(
            RandomTweetPanel::NAME,
            "random_sentiment",
            self.random_sentiment.as_deref(),
        );
        let seed = rejected.read(RandomTweetPanel::NAME, "seed", self.seed.as_deref());
        let sentiment_chart = rejected.read(
            SentimentCountPanel::NAME,
            "sentiment_chart",
            self.sentiment_chart.as_deref(),
        );
        let hour = rejected.read(TweetLocationPanel::NAME, "hour", self.hour.as_deref());
        let show_raw = rejected.read(TweetLocationPanel::NAME, "raw", self.raw.as_deref());
        let airline_chart = rejected.read(
            EntityTotalsPanel::NAME,
            "airline_chart",
            self.airline_chart.as_deref(),
        );
        let breakdown_chart = rejected.read(
            EntityBreakdownPanel::NAME,
            "breakdown_chart",
            self.breakdown_chart.as_deref(),
        );
        let word_sentiment = rejected.read(
            WordCloudPanel::NAME,
            "word_sentiment",
            self.word_sentiment.as_deref(),
        );
        let max_words = rejected.read(WordCloudPanel::NAME, "max_words", self.max_words.as_deref());

        Selection {
            random_sentiment: random_sentiment.unwrap_or(defaults.random_sentiment),
            sentiment_chart: sentiment_chart.unwrap_or(defaults.sentiment_chart),
            hour: hour.unwrap_or(defaults.hour),
            show_raw: show_raw.unwrap_or(defaults.show_raw),
            airline_chart: airline_chart.unwrap_or(defaults.airline_chart),
            breakdown_airlines: split_list(self.airlines.as_deref()),
            breakdown_chart: breakdown_chart.unwrap_or(defaults.breakdown_chart),
            word_sentiment: word_sentiment.unwrap_or(defaults.word_sentiment),
            max_words,
            hidden: split_list(self.hide.as_deref()).into_iter().collect(),
            seed,
            rejected,
        }
    }
}

fn single_panel(state: &AppState, panel: Box<dyn Panel>, rejected: &Rejections) -> Response {
    let panel = rejected.apply(panel);
    let report = DashboardExecutor::run_panel(panel.as_ref(), &state.ctx);
    let status = if report.validation_failure {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, Json(report)).into_response()
}

pub async fn dashboard_handler(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let selection = params.into_selection();
    let executor = DashboardExecutor::from_selection(&selection, &state.ctx);
    let reports = executor.run(&state.ctx);
    Json(json!({
        "source": state.ctx.dataset.source(),
        "records": state.ctx.dataset.len(),
        "panels": reports,
    }))
    .into_response()
}

pub async fn sentiment_handler(
    State(state): State<AppState>,
    Query(params): Query<ChartParams>,
) -> Response {
    let mut rejected = Rejections::default();
    let chart = rejected.read(SentimentCountPanel::NAME, "chart", params.chart.as_deref());
    single_panel(
        &state,
        Box::new(SentimentCountPanel {
            chart: chart.unwrap_or_default(),
        }),
        &rejected,
    )
}

pub async fn locations_handler(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Response {
    let mut rejected = Rejections::default();
    let hour = rejected.read(TweetLocationPanel::NAME, "hour", params.hour.as_deref());
    let include_raw = rejected.read(TweetLocationPanel::NAME, "raw", params.raw.as_deref());
    single_panel(
        &state,
        Box::new(TweetLocationPanel {
            hour: hour.unwrap_or(0),
            include_raw: include_raw.unwrap_or(false),
        }),
        &rejected,
    )
}

pub async fn airlines_handler(
    State(state): State<AppState>,
    Query(params): Query<ChartParams>,
) -> Response {
    let mut rejected = Rejections::default();
    let chart = rejected.read(EntityTotalsPanel::NAME, "chart", params.chart.as_deref());
    single_panel(
        &state,
        Box::new(EntityTotalsPanel {
            chart: chart.unwrap_or_default(),
        }),
        &rejected,
    )
}

pub async fn breakdown_handler(
    State(state): State<AppState>,
    Query(params): Query<BreakdownParams>,
) -> Response {
    let mut rejected = Rejections::default();
    let chart = rejected.read(EntityBreakdownPanel::NAME, "chart", params.chart.as_deref());
    single_panel(
        &state,
        Box::new(EntityBreakdownPanel {
            entities: split_list(params.airlines.as_deref()),
            chart: chart.unwrap_or(ChartKind::Pie),
        }),
        &rejected,
    )
}

pub async fn wordcloud_handler(
    State(state): State<AppState>,
    Query(params): Query<SentimentParams>,
) -> Response {
    let mut rejected = Rejections::default();
    let sentiment = rejected.read(WordCloudPanel::NAME, "sentiment", params.sentiment.as_deref());
    let max_words = rejected.read(WordCloudPanel::NAME, "max_words", params.max_words.as_deref());
    single_panel(
        &state,
        Box::new(WordCloudPanel {
            sentiment: sentiment.unwrap_or(Sentiment::Positive),
            max_words: max_words.unwrap_or(state.ctx.word_options.max_words),
        }),
        &rejected,
    )
}

pub async fn random_handler(
    State(state): State<AppState>,
    Query(params): Query<SentimentParams>,
) -> Response {
    let mut rejected = Rejections::default();
    let sentiment =
        rejected.read(RandomTweetPanel::NAME, "sentiment", params.sentiment.as_deref());
    let seed = rejected.read(RandomTweetPanel::NAME, "seed", params.seed.as_deref());
    single_panel(
        &state,
        Box::new(RandomTweetPanel {
            sentiment: sentiment.unwrap_or(Sentiment::Positive),
            seed,
        }),
        &rejected,
    )
}

// Axum handler for /metrics
pub async fn metrics_handler() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&gather(), &mut buffer) {
        error!("Could not encode prometheus metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Could not encode prometheus metrics: {}", e),
        );
    }
    match String::from_utf8(buffer) {
        Ok(s) => (StatusCode::OK, s),
        Err(e) => {
            error!("Prometheus metrics UTF-8 error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Prometheus metrics UTF-8 error: {}", e),
            )
        }
    }
}

pub fn router(ctx: Arc<DashboardContext>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/sentiment", get(sentiment_handler))
        .route("/api/locations", get(locations_handler))
        .route("/api/airlines", get(airlines_handler))
        .route("/api/breakdown", get(breakdown_handler))
        .route("/api/wordcloud", get(wordcloud_handler))
        .route("/api/random", get(random_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(AppState { ctx })
        .layer(TraceLayer::new_for_http())
}

/// Serves `/metrics` alone on a separate port, in the background.
pub fn spawn_metrics_server(metrics_port: Option<u16>) {
    let Some(port) = metrics_port else {
        info!("Separate Prometheus metrics endpoint not configured (no port specified).");
        return;
    };
    let app = Router::new().route("/metrics", get(metrics_handler));
    let listener_addr = format!("0.0.0.0:{}", port);
    info!(
        "Metrics endpoint will be available at http://{}/metrics",
        listener_addr
    );

    tokio::spawn(async move {
        match TcpListener::bind(&listener_addr).await {
            Ok(listener) => {
                if let Err(e) = axum::serve(listener, app).await {
                    error!("Metrics server error: {}", e);
                }
            }
            Err(e) => {
                error!("Failed to bind metrics server to {}: {}", listener_addr, e);
            }
        }
    });
}

// The main function to run the server
pub async fn run_server(ctx: Arc<DashboardContext>, bind: &str) -> Result<()> {
    let addr: SocketAddr = bind.parse().map_err(|e| {
        DashboardError::ConfigValidationError(format!("Invalid bind address '{}': {}", bind, e))
    })?;
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}
