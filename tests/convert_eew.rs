// tests/convert_eew.rs
//
// VXSE43 → JMAEEW (556).

use quake_relay::convert::{convert, FieldError, NormalizedEvent};
use quake_relay::report::decode;
use quake_relay::EventId;
use serde_json::Value;

const VXSE43: &str = include_str!("fixtures/vxse43.xml");
const ID: &str = "20240101071022_0_VXSE43_270000";

fn eew(xml: &str) -> quake_relay::convert::JmaEew {
    let id = EventId::parse(ID).unwrap();
    let raw = decode(xml.as_bytes()).expect("decode");
    match convert(&id, &raw).expect("convert") {
        NormalizedEvent::EarlyWarning(e) => e,
        other => panic!("expected an EEW record, got {:?}", other.kind()),
    }
}

#[test]
fn live_warning() {
    let e = eew(VXSE43);
    assert_eq!(e.code, 556);
    assert!(!e.test);
    assert!(!e.cancelled);
    assert_eq!(e.issue.event_id, "20240101161005");
    assert_eq!(e.issue.serial, "4");

    let eq = e.earthquake.as_ref().expect("earthquake");
    assert_eq!(eq.origin_time, "2024/01/01 16:10:09");
    assert_eq!(eq.arrival_time, "2024/01/01 16:10:10");
    assert_eq!(eq.hypocenter.reduce_name, "石川県");
    assert_eq!(eq.hypocenter.latitude, 37.6);
    assert_eq!(eq.hypocenter.magnitude, 7.4);

    let areas: Vec<_> = e
        .areas
        .iter()
        .map(|a| (a.pref.as_str(), a.name.as_str(), a.scale_from, a.scale_to))
        .collect();
    assert_eq!(
        areas,
        vec![
            ("石川県", "石川県能登", 55, 60),
            ("石川県", "石川県加賀", 45, 50),
            ("富山県", "富山県東部", 50, 99),
        ]
    );
    assert_eq!(e.areas[0].kind_code, "19");
    assert!(e.areas[0].arrival_time.is_none());
    assert_eq!(e.areas[2].arrival_time.as_deref(), Some("2024/01/01 16:10:28"));
}

#[test]
fn json_shape() {
    let v: Value = serde_json::to_value(NormalizedEvent::EarlyWarning(eew(VXSE43))).unwrap();
    assert_eq!(v["code"], 556);
    assert_eq!(v["issue"]["eventId"], "20240101161005");
    assert_eq!(v["earthquake"]["hypocenter"]["reduceName"], "石川県");
    assert_eq!(v["areas"][0]["scaleFrom"], 55);
    assert!(v["areas"][0].get("arrivalTime").is_none());
}

#[test]
fn drill_is_marked_test() {
    let xml = VXSE43.replace("<Status>通常</Status>", "<Status>訓練</Status>");
    assert!(eew(&xml).test);
}

#[test]
fn live_warning_needs_an_event_id() {
    let xml = VXSE43.replace("<EventID>20240101161005</EventID>", "");
    let id = EventId::parse(ID).unwrap();
    let raw = decode(xml.as_bytes()).unwrap();
    let err = convert(&id, &raw).unwrap_err();
    assert_eq!(err.source, FieldError::Missing("Head/EventID"));
}
