// src/ingest/feed.rs
//! Atom / RSS feed parsing. JMA publishes Atom; RSS is accepted for mirrors.

use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::ingest::source::FetchError;
use crate::ingest::types::{FeedEntry, ParsedFeed};

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: Option<String>,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    link: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum FeedFormat {
    Atom,
    Rss,
}

/// Parse a fetched feed document. `url` is only used for error context.
pub fn parse_feed(url: &str, body: &[u8]) -> Result<ParsedFeed, FetchError> {
    let malformed = |message: String| FetchError::MalformedFeed {
        url: url.to_string(),
        message,
    };

    let text = std::str::from_utf8(body).map_err(|e| malformed(e.to_string()))?;

    let entries = match detect_format(text).map_err(malformed)? {
        FeedFormat::Atom => {
            let feed: AtomFeed = from_str(text).map_err(|e| malformed(e.to_string()))?;
            feed.entries
                .into_iter()
                .filter_map(|e| pick_atom_link(e.links))
                .collect::<Vec<_>>()
        }
        FeedFormat::Rss => {
            let rss: Rss = from_str(text).map_err(|e| malformed(e.to_string()))?;
            rss.channel
                .item
                .into_iter()
                .filter_map(|it| it.link)
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect()
        }
    };

    Ok(ParsedFeed {
        entries: entries.into_iter().map(|link| FeedEntry { link }).collect(),
    })
}

// Atom entries may carry several links; prefer rel="alternate" (or no rel).
fn pick_atom_link(links: Vec<AtomLink>) -> Option<String> {
    let mut fallback = None;
    for l in links {
        let Some(href) = l.href.map(|h| h.trim().to_string()).filter(|h| !h.is_empty()) else {
            continue;
        };
        match l.rel.as_deref() {
            None | Some("alternate") => return Some(href),
            _ if fallback.is_none() => fallback = Some(href),
            _ => {}
        }
    }
    fallback
}

fn detect_format(text: &str) -> Result<FeedFormat, String> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return match e.local_name().as_ref() {
                    b"feed" => Ok(FeedFormat::Atom),
                    b"rss" => Ok(FeedFormat::Rss),
                    other => Err(format!(
                        "unexpected root element <{}>",
                        String::from_utf8_lossy(other)
                    )),
                };
            }
            Ok(Event::Eof) => return Err("empty document".to_string()),
            Ok(_) => continue,
            Err(e) => return Err(e.to_string()),
        }
    }
}
