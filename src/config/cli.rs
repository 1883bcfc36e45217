// --- Command-Line Arguments Structs ---
// Shared by the binaries and by the library tests.
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::data_model::Sentiment;
use crate::pipeline::presentation::ChartKind;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Evaluates the dashboard panels once and prints the result.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ReportArgs {
    /// Path to the dashboard configuration YAML file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Input file (overrides input.path from the config).
    #[arg(short, long)]
    pub input_file: Option<String>,

    /// Output format of the report.
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Sentiment used by the random tweet panel.
    #[arg(long, default_value = "positive")]
    pub random_sentiment: Sentiment,

    /// Chart type for the tweets-by-sentiment panel.
    #[arg(long, default_value = "bar")]
    pub sentiment_chart: ChartKind,

    /// Hour of day (0-23) for the tweet location panel.
    #[arg(long, default_value_t = 0)]
    pub hour: u32,

    /// Include the raw rows of the selected hour.
    #[arg(long)]
    pub raw: bool,

    /// Chart type for the tweets-per-airline panel.
    #[arg(long, default_value = "bar")]
    pub airline_chart: ChartKind,

    /// Airlines to break down by sentiment (comma separated).
    #[arg(short = 'a', long, value_delimiter = ',')]
    pub airlines: Vec<String>,

    /// Chart type for the breakdown panel.
    #[arg(long, default_value = "pie")]
    pub breakdown_chart: ChartKind,

    /// Sentiment used by the word cloud panel.
    #[arg(short = 'w', long, default_value = "positive")]
    pub word_sentiment: Sentiment,

    /// Maximum number of words in the word cloud (overrides the config).
    #[arg(long)]
    pub max_words: Option<usize>,

    /// Panels to hide (comma separated panel names).
    #[arg(long, value_delimiter = ',')]
    pub hide: Vec<String>,

    /// Seed for the random tweet panel.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,

    /// Validate the configuration and exit.
    #[arg(long)]
    pub validate_config: bool,
}

/// Serves the dashboard panels over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServeArgs {
    /// Path to the dashboard configuration YAML file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Input file (overrides input.path from the config).
    #[arg(short, long)]
    pub input_file: Option<String>,

    /// Address to listen on (overrides server.bind from the config).
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Optional: Port for a separate Prometheus metrics HTTP endpoint.
    #[arg(long)]
    pub metrics_port: Option<u16>,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,

    /// Validate the configuration and exit.
    #[arg(long)]
    pub validate_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_args_parse_lists() {
        let args = ReportArgs::parse_from([
            "report",
            "--airlines",
            "Delta,United",
            "--hour",
            "7",
            "--word-sentiment",
            "negative",
            "--sentiment-chart",
            "pie",
        ]);
        assert_eq!(args.airlines, vec!["Delta".to_string(), "United".to_string()]);
        assert_eq!(args.hour, 7);
        assert_eq!(args.word_sentiment, Sentiment::Negative);
        assert_eq!(args.sentiment_chart, ChartKind::Pie);
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn test_report_args_reject_unknown_sentiment() {
        let result = ReportArgs::try_parse_from(["report", "--word-sentiment", "furious"]);
        assert!(result.is_err());
    }
}
