#![allow(non_snake_case)]
#![allow(clippy::too_many_arguments)]

// Modules forming the library's public API, used by the `report` and `serve` binaries
// through `use SentimentBoard::module_name;`
pub mod cache;
pub mod config;
pub mod data_model;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod server;
pub mod utils;

pub use data_model::{Dataset, Record, Sentiment};
pub use error::{DashboardError, Result};
