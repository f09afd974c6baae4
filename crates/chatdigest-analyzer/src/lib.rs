//! Chatdigest Analyzer
//!
//! Ties the pieces together: fetch a group's history, compute statistics,
//! run the three LLM extractions concurrently and merge everything into
//! one [`AnalysisResult`](chatdigest_domain::AnalysisResult).
//!
//! # Overview
//!
//! - [`assemble_report`] is the pure merge step
//! - [`GroupAnalyzer`] runs the whole flow for one group
//! - [`AnalyzerConfig`] carries the thresholds, switches and nested
//!   fetcher/extractor settings

#![warn(missing_docs)]

pub mod analyzer;
pub mod config;
pub mod error;
pub mod report;

pub use analyzer::GroupAnalyzer;
pub use config::{AnalyzerConfig, ANALYSIS_DAYS_RANGE};
pub use error::AnalyzerError;
pub use report::assemble_report;
