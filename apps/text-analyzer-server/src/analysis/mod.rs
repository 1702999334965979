//! Lexical analysis of stored documents
//!
//! - `metrics`: the five statistics computed from raw content
//! - `cache`: time-bounded memo of entities by identifier
//! - `service`: analyzer creation and metric lookups

mod cache;
mod metrics;
mod service;

pub use cache::TtlCache;
pub use metrics::TextMetrics;
pub use service::AnalyzerService;
