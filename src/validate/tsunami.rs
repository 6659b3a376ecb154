// src/validate/tsunami.rs
use crate::convert::tsunami::{JmaTsunami, TsunamiGrade};
use crate::report::{text, RawReport, TsunamiItem};
use crate::validate::{time_drift, Finding};

/// Grade implied by the Kind name, `None` for forecasts and releases.
fn grade_from_name(name: &str) -> Option<TsunamiGrade> {
    if name.contains("解除") || name.contains("予報") || name.contains("なし") {
        None
    } else if name.contains("大津波警報") {
        Some(TsunamiGrade::MajorWarning)
    } else if name.contains("津波警報") {
        Some(TsunamiGrade::Warning)
    } else if name.contains("津波注意報") {
        Some(TsunamiGrade::Watch)
    } else {
        Some(TsunamiGrade::Unknown)
    }
}

struct ExpectedArea<'a> {
    name: &'a str,
    grade: TsunamiGrade,
    immediate: bool,
    item: &'a TsunamiItem,
}

pub(super) fn check(raw: &RawReport, t: &JmaTsunami) -> Vec<Finding> {
    let mut out = Vec::new();
    let mut expected = Vec::new();

    for item in raw.tsunami_items() {
        let kind = item.category.as_ref().and_then(|c| c.kind.as_ref());
        let grade = match kind.and_then(|k| text(&k.name)) {
            Some(name) => grade_from_name(name),
            None => {
                out.push(Finding::warning("tsunami item without a Kind name"));
                match kind.and_then(|k| text(&k.code)) {
                    Some(code) => TsunamiGrade::from_kind_code(code),
                    None => continue,
                }
            }
        };
        let Some(grade) = grade else { continue };
        let immediate = item
            .first_height
            .as_ref()
            .and_then(|fh| fh.condition.as_deref())
            .is_some_and(|c| c.contains("ただちに"));
        expected.push(ExpectedArea {
            name: item.area.as_ref().map(|a| a.name.trim()).unwrap_or_default(),
            grade,
            immediate,
            item,
        });
    }

    let cancelled = raw.is_cancellation() || expected.is_empty();
    if cancelled != t.cancelled {
        out.push(Finding::error(format!(
            "cancelled: expected {cancelled}, got {}",
            t.cancelled
        )));
    }

    if expected.len() != t.areas.len() {
        out.push(Finding::error(format!(
            "areas: expected {}, got {}",
            expected.len(),
            t.areas.len()
        )));
    }

    for (exp, area) in expected.iter().zip(&t.areas) {
        if exp.name != area.name {
            out.push(Finding::error(format!(
                "area name: expected {:?}, got {:?}",
                exp.name, area.name
            )));
            continue;
        }
        if exp.grade != area.grade {
            out.push(Finding::error(format!(
                "{}: grade expected {:?}, got {:?}",
                area.name, exp.grade, area.grade
            )));
        }
        if exp.immediate != area.immediate {
            out.push(Finding::error(format!(
                "{}: immediate expected {}, got {}",
                area.name, exp.immediate, area.immediate
            )));
        }

        let raw_description = exp
            .item
            .max_height
            .as_ref()
            .and_then(|m| m.tsunami_height.as_ref())
            .and_then(|h| h.description.as_deref())
            .map(str::trim);
        let description = area.max_height.as_ref().map(|m| m.description.as_str());
        if raw_description.is_some() && raw_description != description {
            out.push(Finding::warning(format!(
                "{}: maxHeight description {:?} differs from {:?}",
                area.name, description, raw_description
            )));
        }

        if area.first_height.arrival_time.is_none() && area.first_height.condition.is_none() {
            out.push(Finding::warning(format!(
                "{}: first height has neither arrival time nor condition",
                area.name
            )));
        }
    }

    if let Some(w) = time_drift("issue.time", &raw.head.report_date_time, &t.issue.time) {
        out.push(w);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_names() {
        assert_eq!(grade_from_name("大津波警報：発表"), Some(TsunamiGrade::MajorWarning));
        assert_eq!(grade_from_name("津波警報"), Some(TsunamiGrade::Warning));
        assert_eq!(grade_from_name("津波注意報"), Some(TsunamiGrade::Watch));
        assert_eq!(grade_from_name("津波注意報解除"), None);
        assert_eq!(grade_from_name("津波予報（若干の海面変動）"), None);
    }
}
