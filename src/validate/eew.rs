// src/validate/eew.rs
use crate::convert::eew::JmaEew;
use crate::report::{text, RawReport, INFO_TYPE_CANCEL, STATUS_NORMAL};
use crate::validate::{
    check_close, describe, described_magnitude, expected_scale, time_drift, Finding,
};

pub(super) fn check(raw: &RawReport, e: &JmaEew) -> Vec<Finding> {
    let mut out = Vec::new();

    let cancelled = raw.head.info_type.as_deref().map(str::trim) == Some(INFO_TYPE_CANCEL);
    if cancelled != e.cancelled {
        out.push(Finding::error(format!(
            "cancelled: expected {cancelled}, got {}",
            e.cancelled
        )));
    }

    let test = raw.control.status.as_deref().map(str::trim) != Some(STATUS_NORMAL);
    if test != e.test {
        out.push(Finding::error(format!("test: expected {test}, got {}", e.test)));
    }

    let raw_event_id = text(&raw.head.event_id).unwrap_or_default();
    if raw_event_id != e.issue.event_id {
        out.push(Finding::error(format!(
            "issue.eventId: expected {raw_event_id:?}, got {:?}",
            e.issue.event_id
        )));
    }

    let raw_serial = text(&raw.head.serial).unwrap_or_default();
    if raw_serial != e.issue.serial {
        out.push(Finding::warning(format!(
            "issue.serial: expected {raw_serial:?}, got {:?}",
            e.issue.serial
        )));
    }

    if let Some(w) = time_drift("issue.time", &raw.head.report_date_time, &e.issue.time) {
        out.push(w);
    }

    if !cancelled {
        hypocenter(raw, e, &mut out);
        areas(raw, e, &mut out);
    }
    out
}

fn hypocenter(raw: &RawReport, e: &JmaEew, out: &mut Vec<Finding>) {
    let (Some(eq), Some(converted)) = (raw.earthquake(), e.earthquake.as_ref()) else {
        if raw.earthquake().is_some() != e.earthquake.is_some() {
            out.push(Finding::error("earthquake presence differs from the raw report"));
        }
        return;
    };
    let h = &converted.hypocenter;

    let described = eq
        .hypocenter
        .as_ref()
        .and_then(|h| h.area.as_ref())
        .and_then(|a| a.coordinate())
        .and_then(|c| c.description.as_deref())
        .map(describe::position)
        .unwrap_or_default();
    check_close(out, "hypocenter.latitude", described.latitude, h.latitude, 0.05);
    check_close(out, "hypocenter.longitude", described.longitude, h.longitude, 0.05);
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
    check_close(out, "hypocenter.magnitude", magnitude, h.magnitude, 0.05);
}

fn areas(raw: &RawReport, e: &JmaEew, out: &mut Vec<Finding>) {
    let expected: Vec<(&str, &str, Option<i32>)> = raw
        .intensity_forecast()
        .map(|f| {
            f.prefs
                .iter()
                .flat_map(|p| {
                    p.areas.iter().map(move |a| {
                        let from = a
                            .forecast_int
                            .as_ref()
                            .and_then(|r| text(&r.from))
                            .and_then(expected_scale);
                        (p.name.trim(), a.name.trim(), from)
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if expected.len() != e.areas.len() {
        out.push(Finding::error(format!(
            "areas: expected {}, got {}",
            expected.len(),
            e.areas.len()
        )));
    }

    for ((pref, name, from), area) in expected.iter().zip(&e.areas) {
        if *from != Some(area.scale_from) {
            out.push(Finding::error(format!(
                "{name}: scaleFrom expected {from:?}, got {}",
                area.scale_from
            )));
        }
        if *pref != area.pref {
            out.push(Finding::warning(format!(
                "{name}: pref expected {pref:?}, got {:?}",
                area.pref
            )));
        }
    }
}
