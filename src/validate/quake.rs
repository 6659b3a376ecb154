// src/validate/quake.rs
use crate::convert::quake::{DomesticTsunami, ForeignTsunami, IssueType, JmaQuake};
use crate::report::{text, RawReport};
use crate::validate::{
    check_close, describe, described_magnitude, expected_scale, time_drift, Finding,
};

const COORD_TOLERANCE: f64 = 0.05;
const MAGNITUDE_TOLERANCE: f64 = 0.05;
const UNRECEIVED: &str = "未入電";
const SCALE_UNRECEIVED: i32 = 46;

pub(super) fn check(raw: &RawReport, q: &JmaQuake) -> Vec<Finding> {
    let mut out = Vec::new();
    hypocenter(raw, q, &mut out);
    scales(raw, q, &mut out);

    if let Some(w) = time_drift("issue.time", &raw.head.report_date_time, &q.issue.time) {
        out.push(w);
    }
    let quake_time = match raw.earthquake() {
        Some(eq) => &eq.origin_time,
        None => &raw.head.target_date_time,
    };
    if let Some(w) = time_drift("earthquake.time", quake_time, &q.earthquake.time) {
        out.push(w);
    }

    let has_code = !raw.forecast_comment_codes().is_empty();
    if has_code
        && q.earthquake.domestic_tsunami == DomesticTsunami::Unknown
        && q.earthquake.foreign_tsunami == ForeignTsunami::Unknown
    {
        out.push(Finding::warning(format!(
            "unrecognized ForecastComment code(s) {:?}",
            raw.forecast_comment_codes()
        )));
    }
    if q.issue.issue_type == IssueType::Other {
        out.push(Finding::warning(format!(
            "issue type not recognized from title {:?}",
            product_title(raw)
        )));
    }
    for p in q.points.iter().filter(|p| p.pref.trim().is_empty()) {
        out.push(Finding::warning(format!("point {} has no prefecture", p.addr)));
    }
    out
}

fn hypocenter(raw: &RawReport, q: &JmaQuake, out: &mut Vec<Finding>) {
    let Some(eq) = raw.earthquake() else {
        return;
    };
    let h = &q.earthquake.hypocenter;
    let area = eq.hypocenter.as_ref().and_then(|h| h.area.as_ref());

    let raw_name = area.and_then(|a| text(&a.name)).unwrap_or_default();
    if raw_name != h.name {
        out.push(Finding::error(format!(
            "hypocenter name: expected {raw_name:?}, got {:?}",
            h.name
        )));
    }

    let described = area
        .and_then(|a| a.coordinate())
        .and_then(|c| c.description.as_deref())
        .map(describe::position)
        .unwrap_or_default();
    check_close(out, "hypocenter.latitude", described.latitude, h.latitude, COORD_TOLERANCE);
    check_close(out, "hypocenter.longitude", described.longitude, h.longitude, COORD_TOLERANCE);
    if let Some(depth) = described.depth {
        if depth != h.depth {
            out.push(Finding::error(format!(
                "hypocenter.depth: expected {depth}, got {}",
                h.depth
            )));
        }
    }

    let magnitude = eq
        .magnitude
        .as_ref()
        .and_then(described_magnitude);
    check_close(out, "hypocenter.magnitude", magnitude, h.magnitude, MAGNITUDE_TOLERANCE);
}

fn scales(raw: &RawReport, q: &JmaQuake, out: &mut Vec<Finding>) {
    let max_scale = q.earthquake.max_scale;
    let expected_max = match raw.observation() {
        Some(obs) => text(&obs.max_int).and_then(expected_scale),
        None => Some(-1),
    };
    if expected_max != Some(max_scale) {
        out.push(Finding::error(format!(
            "maxScale: expected {expected_max:?}, got {max_scale}"
        )));
    }

    for p in &q.points {
        if p.scale != SCALE_UNRECEIVED && p.scale > max_scale {
            out.push(Finding::error(format!(
                "point {} scale {} exceeds maxScale {max_scale}",
                p.addr, p.scale
            )));
        }
    }

    let expected_points = expected_point_count(raw);
    if expected_points != q.points.len() {
        out.push(Finding::error(format!(
            "points: expected {expected_points}, got {}",
            q.points.len()
        )));
    }
}

/// The title that names the product: Control/Title, else Head/Title.
fn product_title(raw: &RawReport) -> &str {
    text(&raw.control.title)
        .or_else(|| text(&raw.head.title))
        .unwrap_or_default()
}

// Flashes list areas, hypocenter-only reports list nothing, the rest (foreign
// reports included) list stations plus cities whose reading never arrived.
fn expected_point_count(raw: &RawReport) -> usize {
    let Some(obs) = raw.observation() else {
        return 0;
    };
    let foreign = text(&raw.head.title).is_some_and(|t| t.contains("遠地地震"));
    match product_title(raw) {
        "震度速報" if !foreign => obs.prefs.iter().map(|p| p.areas.len()).sum(),
        "震源に関する情報" if !foreign => 0,
        _ => obs
            .prefs
            .iter()
            .flat_map(|p| &p.areas)
            .flat_map(|a| &a.cities)
            .map(|c| {
                let unreceived = c
                    .condition
                    .as_deref()
                    .is_some_and(|cond| cond.contains(UNRECEIVED));
                if c.stations.is_empty() && unreceived {
                    1
                } else {
                    c.stations.len()
                }
            })
            .sum(),
    }
}
