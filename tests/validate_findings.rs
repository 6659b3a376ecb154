// tests/validate_findings.rs
//
// The validator agrees with every clean fixture and flags deliberate disagreements
// between the coded values and their descriptions.

use quake_relay::convert::convert;
use quake_relay::report::decode;
use quake_relay::validate::{validate, Finding, FindingKind};
use quake_relay::EventId;

const VXSE53: &str = include_str!("fixtures/vxse53.xml");
const VXSE51: &str = include_str!("fixtures/vxse51.xml");
const VXSE52: &str = include_str!("fixtures/vxse52.xml");
const VTSE41: &str = include_str!("fixtures/vtse41.xml");
const VXSE43: &str = include_str!("fixtures/vxse43.xml");

fn findings(id: &str, xml: &str) -> Vec<Finding> {
    let id = EventId::parse(id).unwrap();
    let raw = decode(xml.as_bytes()).expect("decode");
    let event = convert(&id, &raw).expect("convert");
    validate(&id, &raw, &event)
}

fn errors(f: &[Finding]) -> Vec<&str> {
    f.iter()
        .filter(|f| f.kind == FindingKind::Error)
        .map(|f| f.message.as_str())
        .collect()
}

#[test]
fn clean_fixtures_have_no_findings() {
    for (id, xml) in [
        ("20240101072243_0_VXSE53_010000", VXSE53),
        ("20240101071153_0_VXSE51_010000", VXSE51),
        ("20240101070012_0_VXSE52_010000", VXSE52),
        ("20240101072051_0_VTSE41_010000", VTSE41),
        ("20240101071022_0_VXSE43_270000", VXSE43),
    ] {
        let f = findings(id, xml);
        assert!(f.is_empty(), "{id}: {f:?}");
    }
}

#[test]
fn magnitude_disagreeing_with_description_is_an_error() {
    let xml = VXSE53.replace(">7.6</jmx_eb:Magnitude>", ">6.1</jmx_eb:Magnitude>");
    let f = findings("20240101072243_0_VXSE53_010000", &xml);
    let e = errors(&f);
    assert_eq!(e.len(), 1, "{f:?}");
    assert!(e[0].contains("magnitude"));
}

#[test]
fn shifted_hypocenter_is_an_error() {
    let xml = VXSE53.replace("+37.5+137.3-10000/", "+36.5+137.3-30000/");
    let f = findings("20240101072243_0_VXSE53_010000", &xml);
    let e = errors(&f);
    assert_eq!(e.len(), 2, "{f:?}");
    assert!(e.iter().any(|m| m.contains("latitude")));
    assert!(e.iter().any(|m| m.contains("depth")));
}

#[test]
fn unknown_comment_code_is_only_a_warning() {
    let xml = VXSE53.replace("<Code>0211</Code>", "<Code>0299</Code>");
    let f = findings("20240101072243_0_VXSE53_010000", &xml);
    assert_eq!(f.len(), 1, "{f:?}");
    assert_eq!(f[0].kind, FindingKind::Warning);
}

#[test]
fn tsunami_grade_name_disagreeing_with_code_is_an_error() {
    let xml = VTSE41.replacen("<Name>大津波警報</Name>", "<Name>津波注意報</Name>", 1);
    let f = findings("20240101072051_0_VTSE41_010000", &xml);
    let e = errors(&f);
    assert_eq!(e.len(), 1, "{f:?}");
    assert!(e[0].contains("grade"));
}

#[test]
fn eew_magnitude_disagreeing_with_description_is_an_error() {
    let xml = VXSE43.replace(
        r#"description="Ｍ７．４">7.4<"#,
        r#"description="Ｍ５．０">7.4<"#,
    );
    let f = findings("20240101071022_0_VXSE43_270000", &xml);
    let e = errors(&f);
    assert_eq!(e.len(), 1, "{f:?}");
    assert!(e[0].contains("magnitude"));
}

#[test]
fn undetermined_great_magnitude_is_accepted() {
    let great = r#"<jmx_eb:Magnitude type="Mj" condition="不明" description="Ｍ８を超える巨大地震">NaN</jmx_eb:Magnitude>"#;

    let xml = VXSE53.replace(
        r#"<jmx_eb:Magnitude type="Mj" description="Ｍ７．６">7.6</jmx_eb:Magnitude>"#,
        great,
    );
    let f = findings("20240101072243_0_VXSE53_010000", &xml);
    assert!(f.is_empty(), "{f:?}");

    let xml = VXSE43.replace(
        r#"<jmx_eb:Magnitude type="Mj" description="Ｍ７．４">7.4</jmx_eb:Magnitude>"#,
        great,
    );
    let f = findings("20240101071022_0_VXSE43_270000", &xml);
    assert!(f.is_empty(), "{f:?}");
}

#[test]
fn magnitude_described_above_eight_without_condition_is_unknown() {
    let xml = VXSE53.replace(
        r#"description="Ｍ７．６">7.6<"#,
        r#"description="Ｍ８を超える巨大地震">NaN<"#,
    );
    let f = findings("20240101072243_0_VXSE53_010000", &xml);
    assert!(f.is_empty(), "{f:?}");
}

#[test]
fn flash_without_control_title_falls_back_to_head_title() {
    let xml = VXSE51.replacen("<Title>震度速報</Title>\n    <DateTime>", "<DateTime>", 1);
    assert_eq!(xml.matches("<Title>震度速報</Title>").count(), 1);
    let f = findings("20240101071153_0_VXSE51_010000", &xml);
    assert!(f.is_empty(), "{f:?}");
}
