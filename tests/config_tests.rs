#[cfg(test)]
mod tests {
    use std::io::Write;
    use tempfile::NamedTempFile;
    use SentimentBoard::config::*;
    use SentimentBoard::error::DashboardError;

    // Helper to create a temporary config file with given content
    fn create_temp_config_file(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "{}", content).expect("Failed to write to temp file");
        temp_file
    }

    #[test]
    fn test_load_valid_config() {
        let yaml_content = r#"
input:
  path: data/tweets.parquet
  columns:
    text: body
    sentiment: label
    entity: carrier
    created_at: created
  on_invalid_row: skip
  batch_size: 512
entities: [Delta, United]
word_cloud:
  max_words: 50
  extra_stop_words: [flight]
server:
  bind: 0.0.0.0:8080
  metrics_port: 9090
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        let config_result = load_dashboard_config(temp_file.path());

        assert!(
            config_result.is_ok(),
            "Should load valid config: {:?}",
            config_result.err()
        );
        let config = config_result.unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.input.resolved_format(), InputFormat::Parquet);
        assert_eq!(config.input.columns.text, "body");
        // Unlisted optional columns keep their defaults
        assert_eq!(config.input.columns.coordinates.as_deref(), Some("tweet_coord"));
        assert_eq!(config.input.on_invalid_row, InvalidRowPolicy::Skip);
        assert_eq!(config.input.batch_size, Some(512));
        assert_eq!(config.known_entities(), vec!["Delta", "United"]);
        assert_eq!(config.word_cloud.max_words, 50);
        assert_eq!(config.word_cloud.min_word_length, 2);
        assert_eq!(config.server.metrics_port, Some(9090));
        assert!(!config.logging.json);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let temp_file = create_temp_config_file("{}");
        let config = load_dashboard_config(temp_file.path()).unwrap();
        assert_eq!(config.input.path, "Tweets.csv");
        assert_eq!(config.input.columns.sentiment, "airline_sentiment");
        assert_eq!(config.input.on_invalid_row, InvalidRowPolicy::Abort);
        assert_eq!(config.known_entities().len(), DEFAULT_ENTITIES.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_dashboard_config("non_existent_config.yaml");
        assert!(result.is_err());
        match result.err().unwrap() {
            DashboardError::ConfigError(msg) => {
                assert!(msg.contains("Failed to read dashboard config file"));
                assert!(msg.contains("non_existent_config.yaml"));
            }
            _ => panic!("Expected ConfigError for non-existent file"),
        }
    }

    #[test]
    fn test_load_invalid_yaml_syntax() {
        let yaml_content = r#"
input:
  path: [unclosed
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        match load_dashboard_config(temp_file.path()) {
            Err(DashboardError::ConfigError(msg)) => {
                assert!(msg.contains("Failed to parse dashboard config YAML"))
            }
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let yaml_content = r#"
input:
  on_invalid_row: ignore
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        assert!(matches!(
            load_dashboard_config(temp_file.path()),
            Err(DashboardError::ConfigError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_blank_columns() {
        let yaml_content = r#"
input:
  columns:
    text: ""
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        let config = load_dashboard_config(temp_file.path()).unwrap();
        match config.validate() {
            Err(DashboardError::ConfigValidationError(msg)) => {
                assert!(msg.contains("input.columns.text"))
            }
            other => panic!("Expected ConfigValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_example_config_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/dashboard.yaml");
        let config = load_dashboard_config(path).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.word_cloud.extra_stop_words, vec!["flight", "amp"]);
    }
}
