// src/report/mod.rs
//! JMA disaster-information XML (`<Report>`), decoded with quick-xml serde.
//!
//! Only the parts the converters and validators read are modelled; everything
//! else is skipped by serde. Element names are matched without namespace prefix
//! (`jmx_eb:Coordinate` → `Coordinate`).

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use thiserror::Error;

/// `InfoType` value of a cancellation.
pub const INFO_TYPE_CANCEL: &str = "取消";
/// `InfoType` value of a correction.
pub const INFO_TYPE_CORRECTION: &str = "訂正";
/// `Control/Status` of a live (non drill, non test) report.
pub const STATUS_NORMAL: &str = "通常";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("report is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("malformed XML: {0}")]
    Syntax(String),

    #[error("expected <Report> root, found <{0}>")]
    UnexpectedRoot(String),

    #[error("report does not match the JMA schema: {0}")]
    Schema(#[from] quick_xml::DeError),
}

/// Decode one report document.
pub fn decode(bytes: &[u8]) -> Result<RawReport, DecodeError> {
    let text = std::str::from_utf8(bytes)?;
    let root = root_element(text)?;
    if root != "Report" {
        return Err(DecodeError::UnexpectedRoot(root));
    }
    Ok(quick_xml::de::from_str(text)?)
}

fn root_element(text: &str) -> Result<String, DecodeError> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err(DecodeError::Syntax("empty document".to_string())),
            Ok(_) => continue,
            Err(e) => return Err(DecodeError::Syntax(e.to_string())),
        }
    }
}

/// Trimmed, non-empty view of an optional text node.
pub fn text(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RawReport {
    #[serde(default)]
    pub control: Control,
    #[serde(default)]
    pub head: Head,
    #[serde(default)]
    pub body: Body,
}

impl RawReport {
    pub fn info_type(&self) -> Option<&str> {
        text(&self.head.info_type)
    }

    pub fn is_cancellation(&self) -> bool {
        self.info_type() == Some(INFO_TYPE_CANCEL)
    }

    pub fn is_correction(&self) -> bool {
        self.info_type() == Some(INFO_TYPE_CORRECTION)
    }

    /// Drill and test transmissions carry a status other than 通常.
    pub fn is_live(&self) -> bool {
        text(&self.control.status) == Some(STATUS_NORMAL)
    }

    /// First `Body/Earthquake` element (tsunami reports may list several).
    pub fn earthquake(&self) -> Option<&Earthquake> {
        self.body.earthquakes.first()
    }

    pub fn observation(&self) -> Option<&Observation> {
        self.body.intensity.as_ref()?.observation.as_ref()
    }

    pub fn intensity_forecast(&self) -> Option<&IntensityForecast> {
        self.body.intensity.as_ref()?.forecast.as_ref()
    }

    pub fn tsunami_items(&self) -> &[TsunamiItem] {
        self.body
            .tsunami
            .as_ref()
            .and_then(|t| t.forecast.as_ref())
            .map(|f| f.items.as_slice())
            .unwrap_or_default()
    }

    /// Codes of the fixed forecast comment (`<Code>` may hold several, space separated).
    pub fn forecast_comment_codes(&self) -> Vec<&str> {
        self.body
            .comments
            .as_ref()
            .and_then(|c| c.forecast_comment.as_ref())
            .and_then(|fc| fc.code.as_deref())
            .map(|codes| codes.split_whitespace().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Control {
    pub title: Option<String>,
    pub date_time: Option<String>,
    pub status: Option<String>,
    pub publishing_office: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Head {
    pub title: Option<String>,
    pub report_date_time: Option<String>,
    pub target_date_time: Option<String>,
    #[serde(rename = "EventID")]
    pub event_id: Option<String>,
    pub info_type: Option<String>,
    pub serial: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Body {
    #[serde(rename = "Earthquake", default)]
    pub earthquakes: Vec<Earthquake>,
    pub intensity: Option<Intensity>,
    pub tsunami: Option<Tsunami>,
    pub comments: Option<Comments>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Earthquake {
    pub origin_time: Option<String>,
    pub arrival_time: Option<String>,
    pub condition: Option<String>,
    pub hypocenter: Option<Hypocenter>,
    pub magnitude: Option<Magnitude>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Hypocenter {
    pub area: Option<HypocenterArea>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct HypocenterArea {
    pub name: Option<String>,
    pub code: Option<Coded>,
    #[serde(rename = "Coordinate", default)]
    pub coordinates: Vec<Coordinate>,
    pub reduce_name: Option<String>,
}

impl HypocenterArea {
    /// The decimal-degree coordinate; JMA may add a degree-minute variant next to it.
    pub fn coordinate(&self) -> Option<&Coordinate> {
        self.coordinates
            .iter()
            .find(|c| !c.kind.as_deref().unwrap_or_default().contains("度分"))
    }
}

/// Element carrying a code as text and its code table in `type`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Coded {
    #[serde(rename = "@type", default)]
    pub kind: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// `jmx_eb:Coordinate`, ISO 6709 text such as `+37.5+137.3-10000/`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Coordinate {
    #[serde(rename = "@type", default)]
    pub kind: Option<String>,
    #[serde(rename = "@description", default)]
    pub description: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// `jmx_eb:Magnitude`; the text is `NaN` when the magnitude is unknown.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Magnitude {
    #[serde(rename = "@type", default)]
    pub kind: Option<String>,
    #[serde(rename = "@condition", default)]
    pub condition: Option<String>,
    #[serde(rename = "@description", default)]
    pub description: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Intensity {
    pub observation: Option<Observation>,
    pub forecast: Option<IntensityForecast>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Observation {
    pub max_int: Option<String>,
    #[serde(rename = "Pref", default)]
    pub prefs: Vec<IntensityPref>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct IntensityForecast {
    pub forecast_int: Option<ForecastInt>,
    #[serde(rename = "Pref", default)]
    pub prefs: Vec<IntensityPref>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct IntensityPref {
    #[serde(default)]
    pub name: String,
    pub code: Option<String>,
    pub max_int: Option<String>,
    pub category: Option<Category>,
    pub forecast_int: Option<ForecastInt>,
    #[serde(rename = "Area", default)]
    pub areas: Vec<IntensityArea>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct IntensityArea {
    #[serde(default)]
    pub name: String,
    pub code: Option<String>,
    pub max_int: Option<String>,
    pub category: Option<Category>,
    pub forecast_int: Option<ForecastInt>,
    pub arrival_time: Option<String>,
    pub condition: Option<String>,
    #[serde(rename = "City", default)]
    pub cities: Vec<IntensityCity>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct IntensityCity {
    #[serde(default)]
    pub name: String,
    pub code: Option<String>,
    pub max_int: Option<String>,
    pub condition: Option<String>,
    #[serde(rename = "IntensityStation", default)]
    pub stations: Vec<IntensityStation>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct IntensityStation {
    #[serde(default)]
    pub name: String,
    pub code: Option<String>,
    pub int: Option<String>,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Category {
    pub kind: Option<Kind>,
    pub last_kind: Option<Kind>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Kind {
    pub name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ForecastInt {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Tsunami {
    pub forecast: Option<TsunamiForecast>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TsunamiForecast {
    #[serde(rename = "Item", default)]
    pub items: Vec<TsunamiItem>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TsunamiItem {
    pub area: Option<TsunamiArea>,
    pub category: Option<Category>,
    pub first_height: Option<FirstHeight>,
    pub max_height: Option<MaxHeight>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TsunamiArea {
    #[serde(default)]
    pub name: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct FirstHeight {
    pub arrival_time: Option<String>,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MaxHeight {
    pub tsunami_height: Option<TsunamiHeight>,
    pub condition: Option<String>,
}

/// `jmx_eb:TsunamiHeight`; text is `NaN` when only a qualitative description exists.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TsunamiHeight {
    #[serde(rename = "@type", default)]
    pub kind: Option<String>,
    #[serde(rename = "@unit", default)]
    pub unit: Option<String>,
    #[serde(rename = "@condition", default)]
    pub condition: Option<String>,
    #[serde(rename = "@description", default)]
    pub description: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Comments {
    pub forecast_comment: Option<CodedComment>,
    pub free_form_comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CodedComment {
    pub text: Option<String>,
    pub code: Option<String>,
}
