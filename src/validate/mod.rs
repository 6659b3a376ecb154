// src/validate/mod.rs
//! Cross-checks a converted record against the raw report it came from.
//!
//! Every check re-reads the raw report on its own terms (descriptions instead
//! of coded values where JMA provides both) so a converter bug shows up as a
//! disagreement. Mismatches that would make the served record wrong are
//! [`FindingKind::Error`]; cosmetic drift is [`FindingKind::Warning`].

pub mod describe;
mod eew;
mod quake;
mod tsunami;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use metrics::counter;
use serde::Serialize;
use std::fmt;

use crate::classify::EventId;
use crate::convert::NormalizedEvent;
use crate::report::{text, Magnitude, RawReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Error,
    Warning,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::Error => "error",
            FindingKind::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub message: String,
}

impl Finding {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FindingKind::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: FindingKind::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == FindingKind::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)
    }
}

pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(Finding::is_error)
}

pub fn has_warnings(findings: &[Finding]) -> bool {
    findings.iter().any(|f| f.kind == FindingKind::Warning)
}

/// Run every check for the record's kind. An empty result means the record
/// agrees with the raw report.
pub fn validate(event_id: &EventId, raw: &RawReport, event: &NormalizedEvent) -> Vec<Finding> {
    crate::ingest::ensure_metrics_described();

    let (id, mut findings) = match event {
        NormalizedEvent::Quake(q) => (&q.id, quake::check(raw, q)),
        NormalizedEvent::Tsunami(t) => (&t.id, tsunami::check(raw, t)),
        NormalizedEvent::EarlyWarning(e) => (&e.id, eew::check(raw, e)),
    };
    if id != event_id.as_str() {
        findings.push(Finding::error(format!(
            "record id {id} does not match event {event_id}"
        )));
    }

    for f in &findings {
        counter!("quake_findings_total", "kind" => f.kind.as_str()).increment(1);
    }
    if !findings.is_empty() {
        tracing::debug!(
            %event_id,
            kind = %event.kind(),
            errors = findings.iter().filter(|f| f.is_error()).count(),
            findings = findings.len(),
            "validation findings"
        );
    }
    findings
}

// Intensity classes as they appear in MaxInt / Int / ForecastInt.
const INTENSITY_CLASSES: [(&str, i32); 12] = [
    ("0", 0),
    ("1", 10),
    ("2", 20),
    ("3", 30),
    ("4", 40),
    ("5-", 45),
    ("5+", 50),
    ("6-", 55),
    ("6+", 60),
    ("7", 70),
    ("over", 99),
    ("不明", -1),
];

pub(crate) fn expected_scale(class: &str) -> Option<i32> {
    let class = class.trim();
    INTENSITY_CLASSES
        .iter()
        .find(|(label, _)| *label == class)
        .map(|(_, scale)| *scale)
}

const RENDERED_TIME: &str = "%Y/%m/%d %H:%M:%S";

/// Warn when a rendered JST time does not denote the same instant as the raw timestamp.
pub(crate) fn time_drift(label: &str, raw: &Option<String>, rendered: &str) -> Option<Finding> {
    let raw = text(raw)?;
    let Ok(expected) = DateTime::parse_from_rfc3339(raw) else {
        return Some(Finding::warning(format!("{label}: unparseable raw time {raw:?}")));
    };
    let jst = FixedOffset::east_opt(9 * 3600)?;
    let actual = NaiveDateTime::parse_from_str(rendered, RENDERED_TIME)
        .ok()
        .and_then(|n| n.and_local_timezone(jst).single());
    match actual {
        Some(t) if t == expected => None,
        _ => Some(Finding::warning(format!(
            "{label}: {rendered:?} does not match {raw}"
        ))),
    }
}

/// Magnitude implied by the raw element. JMA marks a magnitude it cannot
/// determine yet with `condition="不明"` whatever the description says.
pub(crate) fn described_magnitude(m: &Magnitude) -> Option<f64> {
    if m.condition.as_deref().map(str::trim) == Some("不明") {
        return Some(-1.0);
    }
    m.description.as_deref().and_then(describe::magnitude)
}

/// Error when a converted coordinate strays further than `tolerance` from the described one.
pub(crate) fn check_close(
    out: &mut Vec<Finding>,
    label: &str,
    expected: Option<f64>,
    actual: f64,
    tolerance: f64,
) {
    if let Some(expected) = expected {
        if (expected - actual).abs() > tolerance {
            out.push(Finding::error(format!(
                "{label}: expected {expected}, got {actual}"
            )));
        }
    }
}
