// Utils

pub mod logging;
pub mod prometheus_metrics;
pub mod text;

pub use text::{build_stop_words, normalize_word, ENGLISH_STOP_WORDS, PUNCTUATION};
