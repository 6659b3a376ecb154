// src/convert/common.rs
//! Field helpers shared by the three converters.

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::report::text;

pub const UNKNOWN_COORDINATE: f64 = -200.0;
pub const UNKNOWN_DEPTH: i32 = -1;
pub const UNKNOWN_MAGNITUDE: f64 = -1.0;
pub const UNKNOWN_SCALE: i32 = -1;
/// 震度５弱以上未入電: at least 5-, but the value never arrived.
pub const SCALE_5_LOWER_UNRECEIVED: i32 = 46;
/// Upper bound `over` of an early-warning forecast range.
pub const SCALE_OVER: i32 = 99;

pub const UNRECEIVED_CONDITION: &str = "震度５弱以上未入電";

/// A required field was absent or did not parse. Paths are relative to `<Report>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("invalid value {value:?} for `{field}`")]
    Invalid { field: &'static str, value: String },
}

impl FieldError {
    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            value: value.into(),
        }
    }
}

pub type FieldResult<T> = Result<T, FieldError>;

/// Required text node.
pub fn required<'a>(v: &'a Option<String>, field: &'static str) -> FieldResult<&'a str> {
    text(v).ok_or(FieldError::Missing(field))
}

static JST: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::east_opt(9 * 3600).expect("JST offset"));

/// RFC 3339 timestamp → `YYYY/MM/DD hh:mm:ss` in JST.
pub fn format_time(raw: &str, field: &'static str) -> FieldResult<String> {
    let dt = DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|_| FieldError::invalid(field, raw))?;
    Ok(dt.with_timezone(&*JST).format("%Y/%m/%d %H:%M:%S").to_string())
}

/// Required timestamp, rendered.
pub fn required_time(v: &Option<String>, field: &'static str) -> FieldResult<String> {
    format_time(required(v, field)?, field)
}

/// Optional timestamp: absent is fine, present-but-garbage is not.
pub fn optional_time(v: &Option<String>, field: &'static str) -> FieldResult<Option<String>> {
    text(v).map(|raw| format_time(raw, field)).transpose()
}

/// JMA intensity class (`1`..`7`, `5-`, `6+`, `over`) → EPSP scale.
pub fn scale_from_intensity(raw: &str) -> Option<i32> {
    let scale = match raw.trim() {
        "0" => 0,
        "1" => 10,
        "2" => 20,
        "3" => 30,
        "4" => 40,
        "5-" => 45,
        "5+" => 50,
        "6-" => 55,
        "6+" => 60,
        "7" => 70,
        "over" => SCALE_OVER,
        "不明" => UNKNOWN_SCALE,
        _ => return None,
    };
    Some(scale)
}

pub fn required_scale(v: &Option<String>, field: &'static str) -> FieldResult<i32> {
    let raw = required(v, field)?;
    scale_from_intensity(raw).ok_or_else(|| FieldError::invalid(field, raw))
}

/// Latitude, longitude (degrees) and depth (km) from ISO 6709 text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub depth: i32,
}

impl Position {
    pub const UNKNOWN: Position = Position {
        latitude: UNKNOWN_COORDINATE,
        longitude: UNKNOWN_COORDINATE,
        depth: UNKNOWN_DEPTH,
    };
}

static RE_COORDINATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]\d+(?:\.\d+)?)([+-]\d+(?:\.\d+)?)([+-]\d+)?/$").expect("coordinate regex")
});

/// Parse `+37.5+137.3-10000/`. Empty text means the hypocenter is unknown;
/// a missing height means the depth is unknown. Depth is metres below sea level.
pub fn parse_coordinate(raw: &str, field: &'static str) -> FieldResult<Position> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Position::UNKNOWN);
    }
    let caps = RE_COORDINATE
        .captures(raw)
        .ok_or_else(|| FieldError::invalid(field, raw))?;
    let num = |i: usize| -> FieldResult<f64> {
        caps.get(i)
            .map(|m| m.as_str())
            .unwrap_or_default()
            .parse::<f64>()
            .map_err(|_| FieldError::invalid(field, raw))
    };
    let latitude = num(1)?;
    let longitude = num(2)?;
    let depth = match caps.get(3) {
        Some(m) => {
            let metres: i64 = m
                .as_str()
                .parse()
                .map_err(|_| FieldError::invalid(field, raw))?;
            i32::try_from((-metres) / 1000).map_err(|_| FieldError::invalid(field, raw))?
        }
        None => UNKNOWN_DEPTH,
    };
    Ok(Position {
        latitude,
        longitude,
        depth,
    })
}

/// `jmx_eb:Magnitude` text. `NaN` is an explicit "unknown", not a parse failure.
pub fn parse_magnitude(raw: &str, field: &'static str) -> FieldResult<f64> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("nan") {
        return Ok(UNKNOWN_MAGNITUDE);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|m| m.is_finite())
        .ok_or_else(|| FieldError::invalid(field, raw))
}
