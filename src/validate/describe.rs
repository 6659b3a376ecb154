// src/validate/describe.rs
//! Readers for the human-readable `description` attributes JMA puts next to
//! machine values, e.g. `北緯３７．５度　東経１３７．３度　深さ　１０ｋｍ` or `Ｍ７．６`.
//!
//! The validator compares these against the converted numbers, so nothing here
//! shares code with the ISO 6709 path in `convert::common`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Values recovered from a coordinate description. `None` means the text did
/// not mention the value; unknown depth (`深さ不明`) is `Some(-1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DescribedPosition {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub depth: Option<i32>,
}

/// Fold full-width ASCII variants (U+FF01..U+FF5E) and the ideographic space to ASCII.
pub fn to_half_width(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{3000}' => ' ',
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}

static RE_LAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(北緯|南緯)\s*(\d+(?:\.\d+)?)度").expect("latitude regex"));
static RE_LON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(東経|西経)\s*(\d+(?:\.\d+)?)度").expect("longitude regex"));
static RE_DEPTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"深さ\s*(?:(\d+)\s*km|(ごく浅い)|(不明))").expect("depth regex")
});
static RE_MAGNITUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"M\s*(?:(\d+(?:\.\d+)?)\s*(を超える)?|(不明))").expect("magnitude regex")
});

pub fn position(description: &str) -> DescribedPosition {
    let text = to_half_width(description);

    let signed = |re: &Regex, negative: &str| -> Option<f64> {
        let caps = re.captures(&text)?;
        let v: f64 = caps.get(2)?.as_str().parse().ok()?;
        Some(if &caps[1] == negative { -v } else { v })
    };

    let depth = RE_DEPTH.captures(&text).and_then(|caps| {
        if let Some(km) = caps.get(1) {
            km.as_str().parse().ok()
        } else if caps.get(2).is_some() {
            Some(0)
        } else {
            Some(-1)
        }
    });

    DescribedPosition {
        latitude: signed(&RE_LAT, "南緯"),
        longitude: signed(&RE_LON, "西経"),
        depth,
    }
}

/// `Ｍ７．６` → 7.6. `Ｍ不明` and lower bounds such as `Ｍ８を超える巨大地震`
/// leave the magnitude undetermined → -1.
pub fn magnitude(description: &str) -> Option<f64> {
    let text = to_half_width(description);
    let caps = RE_MAGNITUDE.captures(&text)?;
    match caps.get(1) {
        Some(_) if caps.get(2).is_some() => Some(-1.0),
        Some(m) => m.as_str().parse().ok(),
        None => Some(-1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_full_width() {
        assert_eq!(to_half_width("Ｍ７．６　ｋｍ"), "M7.6 km");
    }

    #[test]
    fn full_description() {
        let p = position("北緯３７．５度　東経１３７．３度　深さ　１０ｋｍ");
        assert_eq!(p.latitude, Some(37.5));
        assert_eq!(p.longitude, Some(137.3));
        assert_eq!(p.depth, Some(10));
    }

    #[test]
    fn southern_and_shallow() {
        let p = position("南緯２０．５度　西経１７５．２度　ごく浅い");
        assert_eq!(p.latitude, Some(-20.5));
        assert_eq!(p.longitude, Some(-175.2));
        assert_eq!(p.depth, None);

        let p = position("北緯３５．２度　東経１３９．１度　深さ　ごく浅い");
        assert_eq!(p.depth, Some(0));

        let p = position("北緯３５．２度　東経１３９．１度　深さ不明");
        assert_eq!(p.depth, Some(-1));
    }

    #[test]
    fn unknown_hypocenter_has_nothing() {
        assert_eq!(position("震源要素不明"), DescribedPosition::default());
    }

    #[test]
    fn magnitude_descriptions() {
        assert_eq!(magnitude("Ｍ７．６"), Some(7.6));
        assert_eq!(magnitude("Ｍ３"), Some(3.0));
        assert_eq!(magnitude("Ｍ不明"), Some(-1.0));
        assert_eq!(magnitude("Ｍ８を超える巨大地震"), Some(-1.0));
        assert_eq!(magnitude("Ｍ８．１"), Some(8.1));
        assert_eq!(magnitude(""), None);
    }
}
