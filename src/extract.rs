//! Profile extraction from fetched feed pages.
//!
//! Locates discrete message blocks in a page, pulls an optional message
//! timestamp, strips markup, and scans each line of text for recognized
//! protocol prefixes. No deduplication happens here; emission follows
//! document order.

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::models::{Protocol, RawCandidate};
use crate::scoring::{score_profile, ScoreWeights};

const MESSAGE_SELECTOR: &str = "div.tgme_widget_message";
const TEXT_SELECTOR: &str = ".tgme_widget_message_text";
const TIME_SELECTOR: &str = "time.datetime";

/// Extracts scored raw candidates from fetched documents.
pub struct ProfileExtractor {
    weights: ScoreWeights,
    message_sel: Selector,
    text_sel: Selector,
    time_sel: Selector,
    tag_re: Regex,
}

impl ProfileExtractor {
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            weights,
            message_sel: Selector::parse(MESSAGE_SELECTOR).expect("static selector"),
            text_sel: Selector::parse(TEXT_SELECTOR).expect("static selector"),
            time_sel: Selector::parse(TIME_SELECTOR).expect("static selector"),
            tag_re: Regex::new(r"<[^>]*>").expect("static regex"),
        }
    }

    /// Extract all candidates from one source's fetched pages, in order.
    pub fn extract(&self, pages: &[String], source_id: &str) -> Vec<RawCandidate> {
        let mut candidates = Vec::new();
        for page in pages {
            self.extract_page(page, source_id, &mut candidates);
        }
        if !candidates.is_empty() {
            debug!("Extracted {} candidates from {}", candidates.len(), source_id);
        }
        candidates
    }

    fn extract_page(&self, page: &str, source_id: &str, out: &mut Vec<RawCandidate>) {
        let document = Html::parse_document(page);
        for message in document.select(&self.message_sel) {
            let timestamp = self.message_timestamp(&message, source_id);
            for text_block in message.select(&self.text_sel) {
                // Message text uses <br> as line separator; split before
                // stripping the remaining markup.
                for segment in text_block.inner_html().split("<br>") {
                    let line = self.tag_re.replace_all(segment, "");
                    let line = unescape_entities(&line);
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if let Some(protocol) = recognized_protocol(line) {
                        out.push(RawCandidate {
                            source_id: source_id.to_string(),
                            uri: line.to_string(),
                            timestamp,
                            score: score_profile(line, &self.weights),
                        });
                        debug!("Found {} candidate in {}", protocol.scheme(), source_id);
                    }
                }
            }
        }
    }

    /// Parse the message timestamp, if present. Parse failures are routine
    /// and only drop the timestamp, never the message.
    fn message_timestamp(
        &self,
        message: &ElementRef<'_>,
        source_id: &str,
    ) -> Option<DateTime<Utc>> {
        let raw = message
            .select(&self.time_sel)
            .next()
            .and_then(|t| t.value().attr("datetime"))?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(_) => {
                debug!("Unparsable message datetime '{}' in {}", raw, source_id);
                None
            }
        }
    }
}

/// Undo the entities the serializer re-escapes inside text nodes.
fn unescape_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

/// The protocol whose `scheme://` prefix starts this line, if any.
fn recognized_protocol(line: &str) -> Option<Protocol> {
    Protocol::ALL
        .iter()
        .copied()
        .find(|p| line.starts_with(p.uri_prefix()))
}
