// src/ingest/types.rs
use crate::ingest::source::FetchError;

/// One item of a fetched feed. Only the detail-document link matters downstream.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FeedEntry {
    pub link: String,
}

/// Feed entries in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub entries: Vec<FeedEntry>,
}

impl ParsedFeed {
    pub fn from_links<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: links
                .into_iter()
                .map(|l| FeedEntry { link: l.into() })
                .collect(),
        }
    }
}

/// Anything that can hand back the bytes behind a URL.
///
/// Implementations bound every request (time and size); callers never retry.
#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
    fn name(&self) -> &'static str;
}
