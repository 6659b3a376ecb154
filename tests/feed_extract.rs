// tests/feed_extract.rs
//
// Feed parsing and EventID extraction over recorded eqvol / eqvol_l feeds.

use quake_relay::config::FeedSettings;
use quake_relay::ingest::feed::parse_feed;
use quake_relay::ingest::source::{FetchError, FixtureSource};
use quake_relay::ingest::{extract_events, fetch_events};
use quake_relay::{ReportKind, ReportType};

const REALTIME: &str = include_str!("fixtures/eqvol.xml");
const LONGTERM: &str = include_str!("fixtures/eqvol_l.xml");

fn ids(events: &[quake_relay::EventId]) -> Vec<&str> {
    events.iter().map(|e| e.as_str()).collect()
}

#[test]
fn merged_feeds_keep_order_and_drop_duplicates() {
    let settings = FeedSettings::default();
    let rt = parse_feed(&settings.realtime_url, REALTIME.as_bytes()).expect("realtime feed");
    let lt = parse_feed(&settings.longterm_url, LONGTERM.as_bytes()).expect("longterm feed");
    assert_eq!(rt.entries.len(), 5);
    assert_eq!(lt.entries.len(), 4);

    let events = extract_events(&rt, &lt, &settings);
    assert_eq!(
        ids(&events),
        vec![
            "20240101072243_0_VXSE53_010000",
            "20240101072051_0_VTSE41_010000",
            "20240101071153_0_VXSE51_010000",
            "20240101071022_0_VXSE43_270000",
            "20240101070012_0_VXSE52_010000",
        ]
    );

    let kinds: Vec<_> = events.iter().map(ReportKind::classify).collect();
    assert_eq!(
        kinds,
        vec![
            ReportKind::Quake,
            ReportKind::Tsunami,
            ReportKind::Quake,
            ReportKind::EarlyWarning,
            ReportKind::Quake,
        ]
    );
}

#[test]
fn every_extracted_id_keeps_its_token() {
    let settings = FeedSettings::default();
    let rt = parse_feed("rt", REALTIME.as_bytes()).unwrap();
    let lt = parse_feed("lt", LONGTERM.as_bytes()).unwrap();
    for id in extract_events(&rt, &lt, &settings) {
        assert!(
            ReportType::ALL.iter().any(|t| id.contains(t.token())),
            "{id} lost its report-type token"
        );
    }
}

#[test]
fn non_feed_documents_are_structural_errors() {
    let err = parse_feed("https://x/feed.xml", b"<html><body>maintenance</body></html>").unwrap_err();
    assert!(matches!(err, FetchError::MalformedFeed { .. }), "got {err:?}");

    let err = parse_feed("https://x/feed.xml", b"<feed><entry></feed>").unwrap_err();
    assert!(matches!(err, FetchError::MalformedFeed { .. }), "got {err:?}");
}

#[tokio::test]
async fn fetch_events_reads_both_feeds() {
    let settings = FeedSettings::default();
    let source = FixtureSource::new()
        .with(settings.realtime_url.clone(), REALTIME)
        .with(settings.longterm_url.clone(), LONGTERM);

    let events = fetch_events(&source, &settings).await.expect("events");
    assert_eq!(events.len(), 5);
}

#[tokio::test]
async fn one_missing_feed_fails_the_whole_extraction() {
    let settings = FeedSettings::default();
    let source = FixtureSource::new().with(settings.realtime_url.clone(), REALTIME);

    let err = fetch_events(&source, &settings).await.unwrap_err();
    assert!(
        matches!(err, FetchError::MissingFixture(ref url) if url == &settings.longterm_url),
        "got {err:?}"
    );
}
