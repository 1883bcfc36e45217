// src/bin/report.rs

//! # Report Binary
//!
//! Loads the tweet dataset once, evaluates the dashboard panels for the
//! selection given on the command line and prints the result, either as JSON
//! (for a chart front end) or as a plain-text summary.

use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::info;
use SentimentBoard::config::cli::{OutputFormat, ReportArgs};
use SentimentBoard::config::{load_dashboard_config, DashboardConfig};
use SentimentBoard::data_model::Dataset;
use SentimentBoard::executor::{
    DashboardContext, DashboardExecutor, PanelOutput, PanelReport, Selection,
};
use SentimentBoard::pipeline::loader;
use SentimentBoard::utils::logging::init_tracing;

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()), // Fallback style
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn selection_from_args(args: &ReportArgs) -> Selection {
    Selection {
        random_sentiment: args.random_sentiment,
        sentiment_chart: args.sentiment_chart,
        hour: args.hour,
        show_raw: args.raw,
        airline_chart: args.airline_chart,
        breakdown_airlines: args.airlines.clone(),
        breakdown_chart: args.breakdown_chart,
        word_sentiment: args.word_sentiment,
        max_words: args.max_words,
        hidden: args.hide.iter().cloned().collect(),
        seed: args.seed,
        ..Selection::default()
    }
}

fn render_text(dataset: &Dataset, reports: &[PanelReport]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "Sentiment Analysis of Tweets about US Airlines ({} tweets from {})",
        dataset.len(),
        dataset.source()
    )?;
    for report in reports {
        writeln!(out, "\n== {} [{:?}]", report.panel, report.status)?;
        if let Some(notice) = &report.notice {
            writeln!(out, "   ! {}", notice)?;
        }
        match &report.output {
            PanelOutput::Tweet { sentiment, tweet } => match tweet {
                Some(t) => writeln!(out, "   random {} tweet: {}", sentiment, t.text)?,
                None => writeln!(out, "   no {} tweets", sentiment)?,
            },
            PanelOutput::Chart(chart) => {
                writeln!(out, "   {} ({})", chart.title, chart.kind)?;
                for point in &chart.series.points {
                    writeln!(out, "   {:<16} {:>8}", point.label, point.value)?;
                }
            }
            PanelOutput::Grid(grid) => {
                writeln!(
                    out,
                    "   {} ({}, {}x{})",
                    grid.title, grid.kind, grid.rows, grid.cols
                )?;
                for cell in &grid.cells {
                    let values: Vec<String> = cell
                        .points
                        .iter()
                        .map(|p| format!("{}={}", p.label, p.value))
                        .collect();
                    writeln!(out, "   {:<16} {}", cell.name, values.join(" "))?;
                }
            }
            PanelOutput::Locations(view) => {
                writeln!(out, "   {}", view.caption)?;
                writeln!(out, "   {} with coordinates", view.points.len())?;
                if let Some(raw) = &view.raw {
                    for record in raw {
                        writeln!(
                            out,
                            "   {} | {} | {} | {}",
                            record.created_at, record.entity, record.sentiment, record.text
                        )?;
                    }
                }
            }
            PanelOutput::WordCloud(view) => {
                writeln!(
                    out,
                    "   Word cloud for {} sentiment ({} tokens)",
                    view.sentiment, view.total_tokens
                )?;
                for word in view.words.iter().take(25) {
                    writeln!(out, "   {:<20} {:>6}", word.word, word.count)?;
                }
            }
        }
    }
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    let args = ReportArgs::parse();

    let mut config = match &args.config {
        Some(path) => load_dashboard_config(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    if let Some(input) = &args.input_file {
        config.input.path = input.clone();
    }
    config.validate().context("validating config")?;
    if args.validate_config {
        println!("Configuration is valid.");
        return Ok(());
    }

    let _guard = init_tracing(
        args.json_logs || config.logging.json,
        config.logging.directory.as_deref().map(std::path::Path::new),
        "report.log",
    );
    info!("Input file: {}", config.input.path);

    let spinner = create_spinner("Loading dataset");
    let dataset = match loader::load(&config.input) {
        Ok(dataset) => dataset,
        Err(e) => {
            spinner.finish_with_message(format!("Loading failed: {}", e));
            return Err(e).with_context(|| format!("loading {}", config.input.path));
        }
    };
    spinner.finish_with_message(format!(
        "Loaded {} tweets ({} rows skipped)",
        dataset.len(),
        dataset.skipped_rows()
    ));

    let ctx = DashboardContext::new(Arc::new(dataset), &config);
    let selection = selection_from_args(&args);
    let executor = DashboardExecutor::from_selection(&selection, &ctx);
    let reports = executor.run(&ctx);

    match args.format {
        OutputFormat::Json => {
            let body = json!({
                "source": ctx.dataset.source(),
                "records": ctx.dataset.len(),
                "skipped_rows": ctx.dataset.skipped_rows(),
                "panels": reports,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => print!("{}", render_text(&ctx.dataset, &reports)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use SentimentBoard::executor::PanelStatus;
    use SentimentBoard::pipeline::presentation::{Chart, ChartKind, Series, SeriesPoint};

    #[test]
    fn test_render_text_lists_panels_and_notices() {
        let dataset = Dataset::new("memory", Vec::new(), 0);
        let reports = vec![
            PanelReport {
                panel: "SentimentCounts",
                status: PanelStatus::Rendered,
                notice: None,
                validation_failure: false,
                output: PanelOutput::Chart(Chart {
                    title: "Number of tweets by sentiment".to_string(),
                    kind: ChartKind::Bar,
                    series: Series {
                        name: "Tweets".to_string(),
                        points: vec![SeriesPoint {
                            label: "negative".to_string(),
                            value: 3,
                        }],
                    },
                }),
            },
            PanelReport {
                panel: "RandomTweet",
                status: PanelStatus::Empty,
                notice: Some("No tweets match this selection.".to_string()),
                validation_failure: false,
                output: PanelOutput::Tweet {
                    sentiment: SentimentBoard::Sentiment::Positive,
                    tweet: None,
                },
            },
        ];

        let text = render_text(&dataset, &reports).unwrap();
        assert!(text.starts_with("Sentiment Analysis of Tweets about US Airlines (0 tweets from memory)"));
        assert!(text.contains("== SentimentCounts [Rendered]"));
        assert!(text.contains("negative"));
        assert!(text.contains("   ! No tweets match this selection."));
        assert!(text.contains("no positive tweets"));
    }
}
