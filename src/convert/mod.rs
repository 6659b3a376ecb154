// src/convert/mod.rs
//! Raw JMA report → normalized EPSP record, one strategy per [`ReportKind`].
//!
//! Converters are pure: they read the decoded report and the EventID only, and
//! fail on the first absent or malformed required field instead of filling in
//! defaults.

pub mod common;
pub mod eew;
pub mod quake;
pub mod tsunami;

use serde::Serialize;
use thiserror::Error;

use crate::classify::{EventId, ReportKind};
use crate::report::RawReport;

pub use common::FieldError;
pub use eew::JmaEew;
pub use quake::JmaQuake;
pub use tsunami::JmaTsunami;

/// The record served for one event. Serialized untagged: the EPSP `code`
/// field identifies the variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedEvent {
    Tsunami(JmaTsunami),
    EarlyWarning(JmaEew),
    Quake(JmaQuake),
}

impl NormalizedEvent {
    pub fn kind(&self) -> ReportKind {
        match self {
            NormalizedEvent::Tsunami(_) => ReportKind::Tsunami,
            NormalizedEvent::EarlyWarning(_) => ReportKind::EarlyWarning,
            NormalizedEvent::Quake(_) => ReportKind::Quake,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {kind} report {event_id}: {source}")]
pub struct ConvertError {
    pub event_id: EventId,
    pub kind: ReportKind,
    #[source]
    pub source: FieldError,
}

/// Classify `event_id` and run the matching converter.
pub fn convert(event_id: &EventId, raw: &RawReport) -> Result<NormalizedEvent, ConvertError> {
    let kind = ReportKind::classify(event_id);
    let converted = match kind {
        ReportKind::Tsunami => tsunami::convert_tsunami(event_id, raw).map(NormalizedEvent::Tsunami),
        ReportKind::EarlyWarning => eew::convert_eew(event_id, raw).map(NormalizedEvent::EarlyWarning),
        ReportKind::Quake => quake::convert_quake(event_id, raw).map(NormalizedEvent::Quake),
    };
    converted.map_err(|source| ConvertError {
        event_id: event_id.clone(),
        kind,
        source,
    })
}
