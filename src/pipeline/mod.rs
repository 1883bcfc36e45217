// src/pipeline/mod.rs

pub mod aggregation;
pub mod loader;
pub mod presentation;
pub mod readers;
pub mod text_filter;
