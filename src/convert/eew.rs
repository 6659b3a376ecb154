// src/convert/eew.rs
//! VXSE43 → EPSP `JMAEEW` (code 556).

use serde::Serialize;

use crate::classify::EventId;
use crate::convert::common::{
    optional_time, parse_coordinate, parse_magnitude, required, required_scale, required_time,
    scale_from_intensity, FieldError, FieldResult,
};
use crate::report::{text, IntensityPref, RawReport};

pub const CODE_EEW: u16 = 556;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JmaEew {
    pub id: String,
    pub code: u16,
    pub time: String,
    pub test: bool,
    pub cancelled: bool,
    pub issue: EewIssue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earthquake: Option<EewEarthquake>,
    pub areas: Vec<EewArea>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EewIssue {
    pub time: String,
    pub event_id: String,
    pub serial: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EewEarthquake {
    pub origin_time: String,
    pub arrival_time: String,
    pub condition: String,
    pub hypocenter: EewHypocenter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EewHypocenter {
    pub name: String,
    pub reduce_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: i32,
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EewArea {
    pub pref: String,
    pub name: String,
    pub scale_from: i32,
    pub scale_to: i32,
    pub kind_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
}

pub(crate) fn convert_eew(event_id: &EventId, raw: &RawReport) -> FieldResult<JmaEew> {
    let cancelled = raw.is_cancellation();

    let issue = EewIssue {
        time: required_time(&raw.head.report_date_time, "Head/ReportDateTime")?,
        event_id: head_field(&raw.head.event_id, "Head/EventID", cancelled)?,
        serial: head_field(&raw.head.serial, "Head/Serial", cancelled)?,
    };

    let (earthquake, areas) = if cancelled {
        (None, Vec::new())
    } else {
        let mut areas = Vec::new();
        if let Some(forecast) = raw.intensity_forecast() {
            for pref in &forecast.prefs {
                pref_areas(pref, &mut areas)?;
            }
        }
        (Some(earthquake(raw)?), areas)
    };

    Ok(JmaEew {
        id: event_id.to_string(),
        code: CODE_EEW,
        time: required_time(&raw.control.date_time, "Control/DateTime")?,
        test: !raw.is_live(),
        cancelled,
        issue,
        earthquake,
        areas,
    })
}

// Cancellations may omit Head fields that a live warning must carry.
fn head_field(v: &Option<String>, field: &'static str, cancelled: bool) -> FieldResult<String> {
    match text(v) {
        Some(s) => Ok(s.to_string()),
        None if cancelled => Ok(String::new()),
        None => Err(FieldError::Missing(field)),
    }
}

fn earthquake(raw: &RawReport) -> FieldResult<EewEarthquake> {
    let eq = raw
        .earthquake()
        .ok_or(FieldError::Missing("Body/Earthquake"))?;
    let area = eq
        .hypocenter
        .as_ref()
        .and_then(|h| h.area.as_ref())
        .ok_or(FieldError::Missing("Body/Earthquake/Hypocenter"))?;
    let coordinate = area
        .coordinate()
        .ok_or(FieldError::Missing("Body/Earthquake/Hypocenter/Area/Coordinate"))?;
    let position = parse_coordinate(
        &coordinate.value,
        "Body/Earthquake/Hypocenter/Area/Coordinate",
    )?;
    let magnitude = eq
        .magnitude
        .as_ref()
        .ok_or(FieldError::Missing("Body/Earthquake/Magnitude"))?;

    Ok(EewEarthquake {
        origin_time: required_time(&eq.origin_time, "Body/Earthquake/OriginTime")?,
        arrival_time: required_time(&eq.arrival_time, "Body/Earthquake/ArrivalTime")?,
        condition: text(&eq.condition).unwrap_or_default().to_string(),
        hypocenter: EewHypocenter {
            name: required(&area.name, "Body/Earthquake/Hypocenter/Area/Name")?.to_string(),
            reduce_name: text(&area.reduce_name).unwrap_or_default().to_string(),
            latitude: position.latitude,
            longitude: position.longitude,
            depth: position.depth,
            magnitude: parse_magnitude(&magnitude.value, "Body/Earthquake/Magnitude")?,
        },
    })
}

fn pref_areas(pref: &IntensityPref, out: &mut Vec<EewArea>) -> FieldResult<()> {
    for area in &pref.areas {
        let range = area
            .forecast_int
            .as_ref()
            .ok_or(FieldError::Missing("Body/Intensity/Forecast/Pref/Area/ForecastInt"))?;
        let scale_from = required_scale(
            &range.from,
            "Body/Intensity/Forecast/Pref/Area/ForecastInt/From",
        )?;
        // No upper bound means a single class.
        let scale_to = match text(&range.to) {
            Some(to) => scale_from_intensity(to).ok_or_else(|| {
                FieldError::invalid("Body/Intensity/Forecast/Pref/Area/ForecastInt/To", to)
            })?,
            None => scale_from,
        };
        let kind_code = area
            .category
            .as_ref()
            .and_then(|c| c.kind.as_ref())
            .and_then(|k| text(&k.code))
            .unwrap_or_default();

        out.push(EewArea {
            pref: pref.name.trim().to_string(),
            name: area.name.trim().to_string(),
            scale_from,
            scale_to,
            kind_code: kind_code.to_string(),
            arrival_time: optional_time(
                &area.arrival_time,
                "Body/Intensity/Forecast/Pref/Area/ArrivalTime",
            )?,
        });
    }
    Ok(())
}
