//! Rule-based customer feedback understanding: lexicon sentiment scoring,
//! keyword theme tagging, department aggregation, insight synthesis and a
//! timed demo workflow over the same pipeline.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod insights;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod store;
pub mod suggestions;
pub mod themes;
pub mod workflow;

pub use error::{Error, Result};
pub use pipeline::FeedbackAnalyzer;
