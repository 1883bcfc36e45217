// src/config.rs
pub mod cli;
pub mod dashboard;
pub mod input;

pub use dashboard::{load_dashboard_config, DashboardConfig, WordCloudConfig, DEFAULT_ENTITIES};
pub use input::{ColumnMapping, InputConfig, InputFormat, InvalidRowPolicy};
