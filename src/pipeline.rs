// src/pipeline.rs
//! Event-details orchestration: fetch → decode → convert → validate → policy → JSON.
//!
//! Each run is independent; nothing here holds mutable state between calls.

use metrics::{counter, histogram};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

use crate::classify::EventId;
use crate::config::FeedSettings;
use crate::convert::convert;
use crate::error::{PipelineError, Result};
use crate::ingest::source::FetchError;
use crate::ingest::types::DocumentSource;
use crate::ingest::{ensure_metrics_described, fetch_events};
use crate::report::decode;
use crate::validate::{has_errors, has_warnings, validate, Finding};

/// Operator overrides for validation findings, passed with every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConversionPolicy {
    /// Serve records even when Error findings exist.
    pub force: bool,
    /// Serve records with Warning findings (Errors still block unless `force`).
    pub ignore_warning: bool,
}

impl ConversionPolicy {
    /// Decide whether a record with these findings may be served.
    /// Returns the findings that were let through.
    pub fn gate(&self, event_id: &EventId, findings: Vec<Finding>) -> Result<Vec<Finding>> {
        if has_errors(&findings) && !self.force {
            return Err(PipelineError::Validation {
                event_id: event_id.clone(),
                findings,
            });
        }
        if has_warnings(&findings) && !self.force && !self.ignore_warning {
            return Err(PipelineError::ValidationWarning {
                event_id: event_id.clone(),
                findings,
            });
        }
        Ok(findings)
    }
}

/// Which document tree report URLs are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOrigin {
    Production,
    /// Recorded sample reports (`debug=dummy`).
    Fixture,
}

/// Decode, convert, validate and serialize one report document.
pub fn process_report(event_id: &EventId, bytes: &[u8], policy: ConversionPolicy) -> Result<String> {
    let raw = decode(bytes).map_err(|source| PipelineError::Decode {
        event_id: event_id.clone(),
        source,
    })?;

    let event = convert(event_id, &raw)?;
    let findings = validate(event_id, &raw, &event);
    let passed = policy.gate(event_id, findings)?;
    if !passed.is_empty() {
        tracing::warn!(
            %event_id,
            findings = passed.len(),
            force = policy.force,
            ignore_warning = policy.ignore_warning,
            "serving record despite findings"
        );
    }

    let json = serde_json::to_string(&event).map_err(|source| {
        tracing::error!(%event_id, error = %source, "record failed to serialize");
        PipelineError::Serialization {
            event_id: event_id.clone(),
            source,
        }
    })?;

    counter!("quake_conversions_total", "kind" => event.kind().as_str()).increment(1);
    Ok(json)
}

/// Feed listing and event details over one [`DocumentSource`].
#[derive(Clone)]
pub struct EventPipeline {
    source: Arc<dyn DocumentSource>,
    feeds: FeedSettings,
}

impl EventPipeline {
    pub fn new(source: Arc<dyn DocumentSource>, feeds: FeedSettings) -> Self {
        Self { source, feeds }
    }

    /// Both feeds merged into one ordered, duplicate-free id list.
    pub async fn events(&self) -> std::result::Result<Vec<EventId>, FetchError> {
        fetch_events(self.source.as_ref(), &self.feeds).await
    }

    /// `base + id + ".xml"` for the chosen origin.
    pub fn report_url(&self, event_id: &EventId, origin: ReportOrigin) -> String {
        let base = match origin {
            ReportOrigin::Production => &self.feeds.data_base_url,
            ReportOrigin::Fixture => &self.feeds.fixture_base_url,
        };
        format!("{base}{event_id}.xml")
    }

    /// Fetch one report and run it through [`process_report`].
    pub async fn event_details(
        &self,
        event_id: &EventId,
        policy: ConversionPolicy,
        origin: ReportOrigin,
    ) -> Result<String> {
        ensure_metrics_described();
        let started = Instant::now();

        let url = self.report_url(event_id, origin);
        let result = match self.source.fetch(&url).await {
            Ok(bytes) => process_report(event_id, &bytes, policy),
            Err(source) => Err(PipelineError::Fetch {
                event_id: event_id.clone(),
                source,
            }),
        };

        histogram!("quake_pipeline_ms").record(started.elapsed().as_secs_f64() * 1000.0);
        match &result {
            Ok(json) => tracing::info!(%event_id, bytes = json.len(), "event converted"),
            Err(e) => {
                counter!("quake_pipeline_failures_total", "stage" => e.stage()).increment(1);
                tracing::warn!(
                    %event_id,
                    stage = e.stage(),
                    findings = e.findings().len(),
                    error = %e,
                    "event details failed"
                );
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::FindingKind;

    fn id() -> EventId {
        EventId::parse("20240101_0_VXSE53_010000").unwrap()
    }

    fn one_of_each() -> Vec<Finding> {
        vec![Finding::error("e"), Finding::warning("w")]
    }

    #[test]
    fn default_policy_blocks_errors_first() {
        let err = ConversionPolicy::default().gate(&id(), one_of_each()).unwrap_err();
        assert!(matches!(err, PipelineError::Validation { ref findings, .. } if findings.len() == 2));
    }

    #[test]
    fn ignore_warning_still_blocks_errors() {
        let policy = ConversionPolicy {
            force: false,
            ignore_warning: true,
        };
        assert!(matches!(
            policy.gate(&id(), one_of_each()),
            Err(PipelineError::Validation { .. })
        ));
        let warnings = vec![Finding::warning("w")];
        assert_eq!(policy.gate(&id(), warnings).unwrap().len(), 1);
    }

    #[test]
    fn force_lets_everything_through() {
        let policy = ConversionPolicy {
            force: true,
            ignore_warning: false,
        };
        let passed = policy.gate(&id(), one_of_each()).unwrap();
        assert_eq!(passed[0].kind, FindingKind::Error);
    }

    #[test]
    fn warnings_alone_block_by_default() {
        assert!(matches!(
            ConversionPolicy::default().gate(&id(), vec![Finding::warning("w")]),
            Err(PipelineError::ValidationWarning { .. })
        ));
        assert!(ConversionPolicy::default().gate(&id(), Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn report_url_per_origin() {
        let p = EventPipeline::new(
            Arc::new(crate::ingest::source::FixtureSource::new()),
            FeedSettings::default(),
        );
        assert_eq!(
            p.report_url(&id(), ReportOrigin::Production),
            "https://www.data.jma.go.jp/developer/xml/data/20240101_0_VXSE53_010000.xml"
        );
        assert!(p
            .report_url(&id(), ReportOrigin::Fixture)
            .starts_with("https://raw.githubusercontent.com/"));
    }
}
