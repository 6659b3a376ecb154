// src/convert/tsunami.rs
//! VTSE41 → EPSP `JMATsunami` (code 552).

use serde::Serialize;

use crate::classify::EventId;
use crate::convert::common::{optional_time, required_time, FieldError, FieldResult};
use crate::report::{text, RawReport, TsunamiItem};

pub const CODE_TSUNAMI: u16 = 552;
/// FirstHeight condition of an area the tsunami is expected to reach right away.
pub const IMMEDIATE_CONDITION: &str = "ただちに津波来襲と予測";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JmaTsunami {
    pub id: String,
    pub code: u16,
    pub time: String,
    pub cancelled: bool,
    pub issue: TsunamiIssue,
    pub areas: Vec<TsunamiArea>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TsunamiIssue {
    pub source: String,
    pub time: String,
    #[serde(rename = "type")]
    pub issue_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TsunamiArea {
    pub grade: TsunamiGrade,
    pub immediate: bool,
    pub name: String,
    pub first_height: FirstHeight,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<MaxHeight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstHeight {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxHeight {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TsunamiGrade {
    MajorWarning,
    Warning,
    Watch,
    Unknown,
}

impl TsunamiGrade {
    /// `None` for forecast-only and release codes, which are not listed as areas.
    pub fn from_kind_code(code: &str) -> Option<Self> {
        match code.trim() {
            "52" | "53" => Some(TsunamiGrade::MajorWarning),
            "51" => Some(TsunamiGrade::Warning),
            "62" => Some(TsunamiGrade::Watch),
            "00" | "50" | "60" | "71" | "72" | "73" => None,
            _ => Some(TsunamiGrade::Unknown),
        }
    }
}

pub(crate) fn convert_tsunami(event_id: &EventId, raw: &RawReport) -> FieldResult<JmaTsunami> {
    let mut areas = Vec::new();
    for item in raw.tsunami_items() {
        if let Some(area) = area(item)? {
            areas.push(area);
        }
    }

    Ok(JmaTsunami {
        id: event_id.to_string(),
        code: CODE_TSUNAMI,
        time: required_time(&raw.control.date_time, "Control/DateTime")?,
        cancelled: raw.is_cancellation() || areas.is_empty(),
        issue: TsunamiIssue {
            source: text(&raw.control.publishing_office)
                .unwrap_or("気象庁")
                .to_string(),
            time: required_time(&raw.head.report_date_time, "Head/ReportDateTime")?,
            issue_type: "Focus".to_string(),
        },
        areas,
    })
}

fn area(item: &TsunamiItem) -> FieldResult<Option<TsunamiArea>> {
    let code = item
        .category
        .as_ref()
        .and_then(|c| c.kind.as_ref())
        .and_then(|k| text(&k.code))
        .ok_or(FieldError::Missing(
            "Body/Tsunami/Forecast/Item/Category/Kind/Code",
        ))?;
    let Some(grade) = TsunamiGrade::from_kind_code(code) else {
        return Ok(None);
    };

    let name = item
        .area
        .as_ref()
        .map(|a| a.name.trim())
        .filter(|n| !n.is_empty())
        .ok_or(FieldError::Missing("Body/Tsunami/Forecast/Item/Area/Name"))?;

    let (arrival_time, condition) = match &item.first_height {
        Some(fh) => (
            optional_time(
                &fh.arrival_time,
                "Body/Tsunami/Forecast/Item/FirstHeight/ArrivalTime",
            )?,
            text(&fh.condition).map(str::to_string),
        ),
        None => (None, None),
    };

    let max_height = match item.max_height.as_ref().and_then(|m| m.tsunami_height.as_ref()) {
        Some(h) => Some(MaxHeight {
            description: h.description.as_deref().unwrap_or_default().trim().to_string(),
            value: height_value(&h.value)?,
        }),
        None => None,
    };

    Ok(Some(TsunamiArea {
        grade,
        immediate: condition.as_deref() == Some(IMMEDIATE_CONDITION),
        name: name.to_string(),
        first_height: FirstHeight {
            arrival_time,
            condition,
        },
        max_height,
    }))
}

// `NaN` (or nothing) when only a qualitative description like 巨大 is given.
fn height_value(raw: &str) -> FieldResult<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    raw.parse::<f64>().map(Some).map_err(|_| {
        FieldError::invalid("Body/Tsunami/Forecast/Item/MaxHeight/TsunamiHeight", raw)
    })
}
