//! Smoke probe: list the current events from both JMA feeds and convert the first one.
//!
//! Usage: `quake_probe [EventID]`. With no argument the newest listed event is converted.

use std::sync::Arc;

use anyhow::Context;
use quake_relay::ingest::source::HttpSource;
use quake_relay::{EventId, EventPipeline, QuakeConfig, ReportOrigin};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let config = QuakeConfig::load_default()?;
    let source = HttpSource::new(&config.http)?;
    let pipeline = EventPipeline::new(Arc::new(source), config.feeds.clone());

    let events = pipeline.events().await.context("listing events")?;
    println!("{} events", events.len());
    for id in &events {
        println!("  {id}");
    }

    let target = match std::env::args().nth(1) {
        Some(arg) => EventId::parse(&arg).context("invalid EventID argument")?,
        None => match events.first() {
            Some(id) => id.clone(),
            None => {
                println!("nothing to convert");
                return Ok(());
            }
        },
    };

    let json = pipeline
        .event_details(&target, config.policy, ReportOrigin::Production)
        .await
        .with_context(|| format!("converting {target}"))?;
    println!("{json}");
    Ok(())
}
