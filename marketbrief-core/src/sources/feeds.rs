//! News-feed adapter — RSS channels.
//!
//! Fetches each configured feed, extracts entries, and tags them with the
//! feed's display name. No capping happens here; trimming to a display
//! window is the feed transform's job. A dead or malformed feed is a
//! partial failure.

use super::http::HttpClient;
use super::{FetchError, FetchOutcome, PartialFailure, Source};
use crate::registry::FeedSpec;
use crate::rows::{FeedRow, RowBatch};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct FeedSource {
    http: Arc<HttpClient>,
    feeds: Vec<FeedSpec>,
}

impl FeedSource {
    pub fn new(http: Arc<HttpClient>, feeds: Vec<FeedSpec>) -> Self {
        Self { http, feeds }
    }
}

/// Parse one RSS document into rows tagged with the feed name.
fn parse_feed(name: &str, xml: &str) -> Result<Vec<FeedRow>, FetchError> {
    let channel = rss::Channel::read_from(xml.as_bytes())
        .map_err(|e| FetchError::ResponseFormatChanged(format!("{name}: {e}")))?;

    let rows = channel
        .items()
        .iter()
        .filter_map(|item| {
            // An entry without a link can't be deduped or displayed; skip it.
            let link = item.link()?.to_string();
            Some(FeedRow {
                title: item.title().unwrap_or("(untitled)").to_string(),
                link,
                // Undated entries sort behind everything with a real
                // timestamp, so they never displace recent articles from
                // the display window.
                published: parse_published(item.pub_date()).unwrap_or(DateTime::UNIX_EPOCH),
                source: name.to_string(),
                author: item.author().map(str::to_string),
            })
        })
        .collect();

    Ok(rows)
}

fn parse_published(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl Source for FeedSource {
    fn name(&self) -> &str {
        "rss"
    }

    fn fetch(&self) -> Result<FetchOutcome, FetchError> {
        let mut rows = Vec::new();
        let mut partial_failures = Vec::new();

        for feed in &self.feeds {
            let result = self
                .http
                .get_text(&feed.url)
                .and_then(|xml| parse_feed(&feed.name, &xml));

            match result {
                Ok(entries) => rows.extend(entries),
                Err(err) if err.is_credential() => return Err(err),
                Err(err) => partial_failures.push(PartialFailure {
                    item: feed.name.clone(),
                    reason: err.to_string(),
                }),
            }
        }

        Ok(FetchOutcome::new(RowBatch::Feed(rows), partial_failures))
    }
}
