//! Article records, the TSV wire format, and processing statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-article attributes extracted from one page block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Article title (unique key in the graph)
    pub title: String,
    /// Redirect target if this page is a redirect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_target: Option<String>,
    /// Characters in the article text payload
    pub char_count: u64,
    /// Seconds between the dump's reference instant and the last edit
    /// (smaller = more recent)
    pub edit_recency: i64,
}

impl ArticleRecord {
    /// Create a record for a regular article
    pub fn new(title: impl Into<String>, char_count: u64, edit_recency: i64) -> Self {
        Self {
            title: title.into(),
            redirect_target: None,
            char_count,
            edit_recency,
        }
    }

    /// Create a record for a redirect page. Redirects carry no attributes of
    /// their own and contribute no outgoing edges.
    pub fn redirect(title: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            redirect_target: Some(target.into()),
            char_count: 0,
            edit_recency: 0,
        }
    }

    /// Check if this record is a redirect
    pub fn is_redirect(&self) -> bool {
        self.redirect_target.is_some()
    }

    /// Encode as one attribute-stream line:
    /// `title \t redirect_target \t char_count \t edit_recency`,
    /// with the count fields left empty on redirect rows.
    pub fn attribute_line(&self) -> String {
        match &self.redirect_target {
            Some(target) => format!("{}\t{}\t\t", self.title, target),
            None => format!("{}\t\t{}\t{}", self.title, self.char_count, self.edit_recency),
        }
    }

    /// Decode one attribute-stream line. Returns `None` when the line has no
    /// title; malformed count fields fall back to zero, matching the
    /// extraction defaults.
    pub fn from_attribute_line(line: &str) -> Option<Self> {
        let mut fields = line.split('\t');
        let title = fields.next()?;
        if title.trim().is_empty() {
            return None;
        }
        let redirect = fields.next().unwrap_or("");
        if !redirect.is_empty() {
            return Some(Self::redirect(title, redirect));
        }
        let char_count = fields.next().unwrap_or("").trim().parse().unwrap_or(0);
        let edit_recency = fields.next().unwrap_or("").trim().parse().unwrap_or(0);
        Some(Self::new(title, char_count, edit_recency))
    }
}

/// Encode one edge-stream line: the source title followed by its link
/// targets, tab separated. An article with no links is a bare title.
pub fn edge_line(title: &str, targets: &[String]) -> String {
    let mut line = String::from(title);
    for target in targets {
        line.push('\t');
        line.push_str(target);
    }
    line
}

/// Decode one edge-stream line into the source title and its targets.
/// Empty target fields are dropped.
pub fn parse_edge_line(line: &str) -> Option<(&str, Vec<&str>)> {
    let mut fields = line.split('\t');
    let title = fields.next()?;
    if title.trim().is_empty() {
        return None;
    }
    Some((title, fields.filter(|t| !t.is_empty()).collect()))
}

/// Statistics about one processing run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessStats {
    /// Regular articles written to the attribute stream
    pub articles: u64,
    /// Redirect pages written to the attribute stream
    pub redirects: u64,
    /// Link targets written to the edge stream
    pub links: u64,
    /// File/Image links filtered out of the edge stream
    pub media_links_dropped: u64,
    /// Page blocks skipped (no usable title)
    pub pages_skipped: u64,
    /// Shards processed
    pub shards: usize,
    /// Processing start time
    pub started_at: DateTime<Utc>,
    /// Processing end time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl ProcessStats {
    pub fn new(shards: usize) -> Self {
        Self {
            shards,
            started_at: Utc::now(),
            ..Default::default()
        }
    }

    /// Fold a per-shard tally into this one. Timing fields are left alone;
    /// only the run-level stats own those.
    pub fn absorb(&mut self, other: &ProcessStats) {
        self.articles += other.articles;
        self.redirects += other.redirects;
        self.links += other.links;
        self.media_links_dropped += other.media_links_dropped;
        self.pages_skipped += other.pages_skipped;
    }

    pub fn finish(&mut self) {
        let now = Utc::now();
        self.duration_secs = Some((now - self.started_at).num_milliseconds() as f64 / 1000.0);
        self.completed_at = Some(now);
    }

    /// Pages processed per second
    pub fn pages_per_second(&self) -> f64 {
        if let Some(duration) = self.duration_secs {
            if duration > 0.0 {
                return (self.articles + self.redirects + self.pages_skipped) as f64 / duration;
            }
        }
        0.0
    }
}
