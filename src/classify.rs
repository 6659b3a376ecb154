// src/classify.rs
//! Event identifiers, recognized JMA report types and the report-kind dispatch.
//!
//! Classification is a pure function of the EventID string: the raw report is
//! never consulted, so the id must keep the token it was extracted for.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of one JMA detail document, e.g. `20240101071323_0_VXSE53_010000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Derive an id from a feed link: drop the data base URL and the `.xml` suffix.
    /// Either part is only removed when present.
    pub fn from_link(link: &str, data_base_url: &str) -> Self {
        let trimmed = link.strip_prefix(data_base_url).unwrap_or(link);
        let trimmed = trimmed.strip_suffix(".xml").unwrap_or(trimmed);
        Self(trimmed.to_string())
    }

    /// Accept an id coming from outside (query string, CLI).
    /// Only ASCII alphanumerics, `_` and `-` are allowed so the id cannot
    /// change the report URL it gets appended to.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let ok = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        ok.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// JMA products this service knows how to extract from the feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    /// 震度速報
    #[serde(rename = "VXSE51")]
    IntensityFlash,
    /// 震源に関する情報
    #[serde(rename = "VXSE52")]
    Hypocenter,
    /// 震源・震度に関する情報
    #[serde(rename = "VXSE53")]
    HypocenterIntensity,
    /// 緊急地震速報（警報）
    #[serde(rename = "VXSE43")]
    EarlyWarning,
    /// 津波警報・注意報・予報
    #[serde(rename = "VTSE41")]
    TsunamiWarning,
}

impl ReportType {
    pub const ALL: [ReportType; 5] = [
        ReportType::IntensityFlash,
        ReportType::Hypocenter,
        ReportType::HypocenterIntensity,
        ReportType::EarlyWarning,
        ReportType::TsunamiWarning,
    ];

    /// Substring that identifies this product inside a document link.
    pub fn token(self) -> &'static str {
        match self {
            ReportType::IntensityFlash => "_VXSE51_",
            ReportType::Hypocenter => "_VXSE52_",
            ReportType::HypocenterIntensity => "_VXSE53_",
            ReportType::EarlyWarning => "_VXSE43_",
            // JMA appends the issuing office right after the code, sometimes without a separator.
            ReportType::TsunamiWarning => "_VTSE41",
        }
    }

    pub fn kind(self) -> ReportKind {
        match self {
            ReportType::TsunamiWarning => ReportKind::Tsunami,
            ReportType::EarlyWarning => ReportKind::EarlyWarning,
            ReportType::IntensityFlash
            | ReportType::Hypocenter
            | ReportType::HypocenterIntensity => ReportKind::Quake,
        }
    }

    /// True when `link` carries any of the given tokens.
    pub fn any_matches(types: &[ReportType], link: &str) -> bool {
        types.iter().any(|t| link.contains(t.token()))
    }
}

/// Conversion strategy selected for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Tsunami,
    EarlyWarning,
    Quake,
}

impl ReportKind {
    /// Kinds checked before falling back to `Quake`, highest precedence first.
    const PRECEDENCE: [ReportKind; 2] = [ReportKind::Tsunami, ReportKind::EarlyWarning];

    /// Pick the conversion path for an id. Total: anything unrecognized is a quake report.
    pub fn classify(event_id: &EventId) -> Self {
        Self::PRECEDENCE
            .into_iter()
            .find(|kind| {
                ReportType::ALL
                    .iter()
                    .filter(|t| t.kind() == *kind)
                    .any(|t| event_id.contains(t.token()))
            })
            .unwrap_or(ReportKind::Quake)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Tsunami => "tsunami",
            ReportKind::EarlyWarning => "early_warning",
            ReportKind::Quake => "quake",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
