// tests/convert_tsunami.rs
//
// VTSE41 → JMATsunami (552).

use quake_relay::convert::tsunami::TsunamiGrade;
use quake_relay::convert::{convert, NormalizedEvent};
use quake_relay::report::decode;
use quake_relay::EventId;
use serde_json::Value;

const VTSE41: &str = include_str!("fixtures/vtse41.xml");
const ID: &str = "20240101072051_0_VTSE41_010000";

fn tsunami(xml: &str) -> quake_relay::convert::JmaTsunami {
    let id = EventId::parse(ID).unwrap();
    let raw = decode(xml.as_bytes()).expect("decode");
    match convert(&id, &raw).expect("convert") {
        NormalizedEvent::Tsunami(t) => t,
        other => panic!("expected a tsunami record, got {:?}", other.kind()),
    }
}

#[test]
fn warning_areas_are_graded_and_forecasts_dropped() {
    let t = tsunami(VTSE41);

    assert_eq!(t.code, 552);
    assert!(!t.cancelled);
    assert_eq!(t.issue.issue_type, "Focus");
    assert_eq!(t.issue.time, "2024/01/01 16:20:00");

    let grades: Vec<_> = t.areas.iter().map(|a| (a.name.as_str(), a.grade)).collect();
    assert_eq!(
        grades,
        vec![
            ("石川県能登", TsunamiGrade::MajorWarning),
            ("新潟県上中下越", TsunamiGrade::Warning),
            ("北海道日本海沿岸南部", TsunamiGrade::Watch),
        ]
    );

    assert!(t.areas[0].immediate);
    assert!(!t.areas[1].immediate);
    assert_eq!(
        t.areas[1].first_height.arrival_time.as_deref(),
        Some("2024/01/01 16:22:00")
    );
    assert_eq!(t.areas[0].max_height.as_ref().unwrap().value, Some(5.0));
    assert_eq!(t.areas[0].max_height.as_ref().unwrap().description, "５ｍ");
}

#[test]
fn json_omits_absent_heights() {
    let v: Value = serde_json::to_value(NormalizedEvent::Tsunami(tsunami(VTSE41))).unwrap();
    assert_eq!(v["code"], 552);
    assert_eq!(v["areas"][0]["grade"], "MajorWarning");
    assert_eq!(v["areas"][0]["firstHeight"]["condition"], "ただちに津波来襲と予測");
    assert!(v["areas"][0]["firstHeight"].get("arrivalTime").is_none());
    assert_eq!(v["areas"][1]["maxHeight"]["value"], 3.0);
}

#[test]
fn cancellation_is_flagged() {
    let xml = VTSE41.replace("<InfoType>発表</InfoType>", "<InfoType>取消</InfoType>");
    assert!(tsunami(&xml).cancelled);
}

#[test]
fn only_forecasts_means_cancelled() {
    let xml = VTSE41
        .replace("<Code>52</Code>", "<Code>72</Code>")
        .replace("<Code>51</Code>", "<Code>73</Code>")
        .replace("<Code>62</Code>", "<Code>60</Code>");
    let t = tsunami(&xml);
    assert!(t.cancelled);
    assert!(t.areas.is_empty());
}
