// src/lib.rs
// Public library surface for the service binary, `quake_probe` and integration tests.

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;

// JMA feeds and report documents
pub mod ingest;
pub mod report;

// Conversion to EPSP records and the cross-checks gating them
pub mod convert;
pub mod validate;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::classify::{EventId, ReportKind, ReportType};
pub use crate::config::QuakeConfig;
pub use crate::convert::NormalizedEvent;
pub use crate::error::PipelineError;
pub use crate::pipeline::{process_report, ConversionPolicy, EventPipeline, ReportOrigin};
pub use crate::validate::{Finding, FindingKind};

use std::sync::Arc;

use crate::ingest::source::HttpSource;

/// Build the HTTP router against the live JMA endpoints described by `config`.
pub fn app(config: &QuakeConfig) -> anyhow::Result<axum::Router> {
    let source = HttpSource::new(&config.http)?;
    let pipeline = EventPipeline::new(Arc::new(source), config.feeds.clone());
    Ok(router(api::AppState::new(pipeline, config.policy)))
}
