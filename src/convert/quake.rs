// src/convert/quake.rs
//! VXSE51 / VXSE52 / VXSE53 → EPSP `JMAQuake` (code 551).

use serde::Serialize;

use crate::classify::EventId;
use crate::convert::common::{
    parse_coordinate, parse_magnitude, required, required_scale, required_time, FieldError,
    FieldResult, Position, SCALE_5_LOWER_UNRECEIVED, UNKNOWN_MAGNITUDE, UNKNOWN_SCALE,
    UNRECEIVED_CONDITION,
};
use crate::report::{text, Observation, RawReport};

pub const CODE_QUAKE: u16 = 551;
const DEFAULT_SOURCE: &str = "気象庁";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JmaQuake {
    pub id: String,
    pub code: u16,
    pub time: String,
    pub issue: QuakeIssue,
    pub earthquake: QuakeEarthquake,
    pub points: Vec<QuakePoint>,
    pub comments: QuakeComments,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuakeIssue {
    pub source: String,
    pub time: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub correct: Correction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueType {
    /// 震度速報
    ScalePrompt,
    /// 震源に関する情報
    Destination,
    /// 震源・震度に関する情報
    DetailScale,
    /// 遠地地震に関する情報
    Foreign,
    Other,
}

impl IssueType {
    /// Derived from the report titles; the Head title is the only place a
    /// foreign earthquake is distinguished from a domestic one.
    pub fn of(raw: &RawReport) -> Self {
        let head = text(&raw.head.title).unwrap_or_default();
        if head.contains("遠地地震") {
            return IssueType::Foreign;
        }
        match text(&raw.control.title).unwrap_or(head) {
            "震度速報" => IssueType::ScalePrompt,
            "震源に関する情報" => IssueType::Destination,
            "震源・震度に関する情報" => IssueType::DetailScale,
            _ => IssueType::Other,
        }
    }

    /// How observation points are listed for this kind of report.
    pub fn point_layout(self) -> PointLayout {
        match self {
            IssueType::Destination => PointLayout::None,
            IssueType::ScalePrompt => PointLayout::Areas,
            IssueType::DetailScale | IssueType::Foreign | IssueType::Other => {
                PointLayout::Stations
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLayout {
    /// Hypocenter-only reports carry no points.
    None,
    /// One point per forecast area (`isArea=true`).
    Areas,
    /// One point per station, plus cities whose reading never arrived.
    Stations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Correction {
    None,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuakeEarthquake {
    pub time: String,
    pub hypocenter: QuakeHypocenter,
    pub max_scale: i32,
    pub domestic_tsunami: DomesticTsunami,
    pub foreign_tsunami: ForeignTsunami,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuakeHypocenter {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: i32,
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuakePoint {
    pub pref: String,
    pub addr: String,
    pub is_area: bool,
    pub scale: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuakeComments {
    pub free_form_comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DomesticTsunami {
    None,
    Unknown,
    Checking,
    NonEffective,
    Watch,
    Warning,
}

impl DomesticTsunami {
    /// First recognised fixed-comment code wins.
    pub fn from_codes(codes: &[&str]) -> Self {
        codes
            .iter()
            .find_map(|c| match *c {
                "0211" => Some(DomesticTsunami::Warning),
                "0212" | "0213" | "0214" => Some(DomesticTsunami::NonEffective),
                "0215" => Some(DomesticTsunami::None),
                "0216" | "0217" => Some(DomesticTsunami::Checking),
                _ => None,
            })
            .unwrap_or(DomesticTsunami::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ForeignTsunami {
    None,
    Unknown,
    Checking,
    NonEffectiveNearby,
    WarningNearby,
    WarningPacific,
    WarningPacificWide,
    WarningNorthwestPacific,
    WarningIndian,
    WarningIndianWide,
    Potential,
}

impl ForeignTsunami {
    pub fn from_codes(codes: &[&str]) -> Self {
        codes
            .iter()
            .find_map(|c| match *c {
                "0221" => Some(ForeignTsunami::WarningPacificWide),
                "0222" => Some(ForeignTsunami::WarningPacific),
                "0223" => Some(ForeignTsunami::WarningNorthwestPacific),
                "0224" => Some(ForeignTsunami::WarningIndianWide),
                "0225" => Some(ForeignTsunami::WarningIndian),
                "0226" => Some(ForeignTsunami::WarningNearby),
                "0227" => Some(ForeignTsunami::NonEffectiveNearby),
                "0228" => Some(ForeignTsunami::Potential),
                "0229" => Some(ForeignTsunami::Checking),
                "0230" => Some(ForeignTsunami::None),
                _ => None,
            })
            .unwrap_or(ForeignTsunami::Unknown)
    }
}

pub(crate) fn convert_quake(event_id: &EventId, raw: &RawReport) -> FieldResult<JmaQuake> {
    let issue_type = IssueType::of(raw);

    let issue = QuakeIssue {
        source: text(&raw.control.publishing_office)
            .unwrap_or(DEFAULT_SOURCE)
            .to_string(),
        time: required_time(&raw.head.report_date_time, "Head/ReportDateTime")?,
        issue_type,
        correct: if raw.is_correction() {
            Correction::Unknown
        } else {
            Correction::None
        },
    };

    let (time, hypocenter) = match raw.earthquake() {
        Some(eq) => {
            let time = required_time(&eq.origin_time, "Body/Earthquake/OriginTime")?;
            (time, hypocenter(raw)?)
        }
        // A flash is issued before the hypocenter is determined.
        None if issue_type == IssueType::ScalePrompt => {
            let time = required_time(&raw.head.target_date_time, "Head/TargetDateTime")?;
            (time, unknown_hypocenter())
        }
        None => return Err(FieldError::Missing("Body/Earthquake")),
    };

    let (max_scale, points) = match raw.observation() {
        Some(obs) => (
            required_scale(&obs.max_int, "Body/Intensity/Observation/MaxInt")?,
            points(obs, issue_type.point_layout())?,
        ),
        None => (UNKNOWN_SCALE, Vec::new()),
    };

    let codes = raw.forecast_comment_codes();

    Ok(JmaQuake {
        id: event_id.to_string(),
        code: CODE_QUAKE,
        time: required_time(&raw.control.date_time, "Control/DateTime")?,
        issue,
        earthquake: QuakeEarthquake {
            time,
            hypocenter,
            max_scale,
            domestic_tsunami: DomesticTsunami::from_codes(&codes),
            foreign_tsunami: ForeignTsunami::from_codes(&codes),
        },
        points,
        comments: QuakeComments {
            free_form_comment: raw
                .body
                .comments
                .as_ref()
                .and_then(|c| text(&c.free_form_comment))
                .unwrap_or_default()
                .to_string(),
        },
    })
}

fn hypocenter(raw: &RawReport) -> FieldResult<QuakeHypocenter> {
    let eq = raw
        .earthquake()
        .ok_or(FieldError::Missing("Body/Earthquake"))?;
    let area = eq
        .hypocenter
        .as_ref()
        .and_then(|h| h.area.as_ref())
        .ok_or(FieldError::Missing("Body/Earthquake/Hypocenter/Area"))?;
    let name = required(&area.name, "Body/Earthquake/Hypocenter/Area/Name")?;
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

    Ok(QuakeHypocenter {
        name: name.to_string(),
        latitude: position.latitude,
        longitude: position.longitude,
        depth: position.depth,
        magnitude: parse_magnitude(&magnitude.value, "Body/Earthquake/Magnitude")?,
    })
}

fn unknown_hypocenter() -> QuakeHypocenter {
    QuakeHypocenter {
        name: String::new(),
        latitude: Position::UNKNOWN.latitude,
        longitude: Position::UNKNOWN.longitude,
        depth: Position::UNKNOWN.depth,
        magnitude: UNKNOWN_MAGNITUDE,
    }
}

fn points(obs: &Observation, layout: PointLayout) -> FieldResult<Vec<QuakePoint>> {
    let mut out = Vec::new();
    match layout {
        PointLayout::None => {}
        PointLayout::Areas => {
            for pref in &obs.prefs {
                for area in &pref.areas {
                    out.push(QuakePoint {
                        pref: pref.name.trim().to_string(),
                        addr: area.name.trim().to_string(),
                        is_area: true,
                        scale: required_scale(
                            &area.max_int,
                            "Body/Intensity/Observation/Pref/Area/MaxInt",
                        )?,
                    });
                }
            }
        }
        PointLayout::Stations => {
            for pref in &obs.prefs {
                for city in pref.areas.iter().flat_map(|a| a.cities.iter()) {
                    if city.stations.is_empty()
                        && text(&city.condition) == Some(UNRECEIVED_CONDITION)
                    {
                        out.push(QuakePoint {
                            pref: pref.name.trim().to_string(),
                            addr: city.name.trim().to_string(),
                            is_area: false,
                            scale: SCALE_5_LOWER_UNRECEIVED,
                        });
                        continue;
                    }
                    for station in &city.stations {
                        out.push(QuakePoint {
                            pref: pref.name.trim().to_string(),
                            addr: station.name.trim().to_string(),
                            is_area: false,
                            scale: required_scale(
                                &station.int,
                                "Body/Intensity/Observation/Pref/Area/City/IntensityStation/Int",
                            )?,
                        });
                    }
                }
            }
        }
    }
    Ok(out)
}
