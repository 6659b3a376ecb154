// src/ingest/mod.rs
pub mod feed;
pub mod source;
pub mod types;

use crate::classify::{EventId, ReportType};
use crate::config::FeedSettings;
use crate::ingest::source::FetchError;
use crate::ingest::types::{DocumentSource, ParsedFeed};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "quake_events_extracted_total",
            "EventIDs produced by feed extraction."
        );
        describe_counter!(
            "quake_events_duplicate_total",
            "Feed entries dropped because their EventID was already listed."
        );
        describe_counter!("quake_fetch_errors_total", "Feed/report fetch errors.");
        describe_counter!(
            "quake_conversions_total",
            "Reports converted, labelled by report kind."
        );
        describe_counter!(
            "quake_pipeline_failures_total",
            "Pipeline runs aborted, labelled by stage."
        );
        describe_counter!(
            "quake_findings_total",
            "Validation findings, labelled by severity."
        );
        describe_histogram!("quake_pipeline_ms", "End-to-end report processing time.");
    });
}

/// Merge both feeds into one ordered, duplicate-free list of EventIDs.
///
/// Realtime entries come first in feed order, then long-term entries in feed order.
/// Only links carrying one of `settings.report_types` tokens are kept, and only
/// when what remains after stripping the data base URL is a valid EventID.
pub fn extract_events(
    realtime: &ParsedFeed,
    longterm: &ParsedFeed,
    settings: &FeedSettings,
) -> Vec<EventId> {
    ensure_metrics_described();

    let mut seen: HashSet<EventId> = HashSet::new();
    let mut events = Vec::with_capacity(realtime.entries.len() + longterm.entries.len());
    let mut duplicates = 0u64;

    for entry in realtime.entries.iter().chain(longterm.entries.iter()) {
        if !ReportType::any_matches(&settings.report_types, &entry.link) {
            continue;
        }
        let id = EventId::from_link(&entry.link, &settings.data_base_url);
        // A link outside the data base URL leaves scheme and host in the id,
        // which /events/details would refuse.
        if EventId::parse(id.as_str()).as_ref() != Some(&id) {
            tracing::warn!(
                target: "ingest",
                link = %entry.link,
                "skipping link outside the data base URL"
            );
            continue;
        }
        if !seen.insert(id.clone()) {
            duplicates += 1;
            continue;
        }
        events.push(id);
    }

    counter!("quake_events_extracted_total").increment(events.len() as u64);
    counter!("quake_events_duplicate_total").increment(duplicates);
    events
}

/// Fetch and parse one feed.
pub async fn fetch_feed(source: &dyn DocumentSource, url: &str) -> Result<ParsedFeed, FetchError> {
    let body = source.fetch(url).await?;
    feed::parse_feed(url, &body)
}

/// Fetch both feeds concurrently and extract events. Either failure aborts the run.
pub async fn fetch_events(
    source: &dyn DocumentSource,
    settings: &FeedSettings,
) -> Result<Vec<EventId>, FetchError> {
    let (realtime, longterm) = tokio::try_join!(
        fetch_feed(source, &settings.realtime_url),
        fetch_feed(source, &settings.longterm_url)
    )
    .inspect_err(|e| tracing::warn!(error = %e, source = source.name(), "feed fetch failed"))?;

    let events = extract_events(&realtime, &longterm, settings);
    tracing::info!(
        target: "ingest",
        realtime = realtime.entries.len(),
        longterm = longterm.entries.len(),
        events = events.len(),
        "feeds merged"
    );
    Ok(events)
}
