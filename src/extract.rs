//! Per-article metadata extraction
//!
//! Pure functions over the raw markup block of one `<page>` element. Each
//! function locates its delimiters in the text actually present instead of
//! assuming fixed offsets; the one fixed-width piece, the boilerplate footer
//! after the article text, comes from [`Config`](crate::Config) because it is
//! tied to the dump schema version.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::article::ArticleRecord;
use crate::config::Config;

static TEXT_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<text[^>]*>").unwrap());

/// Title of the page block: the content of the first title tag.
///
/// Returns `None` when the tag is missing or the title is blank.
pub fn title(body: &str) -> Option<String> {
    let start = body.find("<title")?;
    let open_end = start + body[start..].find('>')? + 1;
    let rest = &body[open_end..];
    let line = match rest.find('\n') {
        Some(nl) => &rest[..nl],
        None => rest,
    };
    let text = match line.find("</title") {
        Some(close) => &line[..close],
        None => line,
    };
    if text.trim().is_empty() {
        return None;
    }
    Some(text.to_string())
}

/// Redirect target of the page block, or `None` if the page is not a
/// redirect. The target is the `title` attribute of the redirect marker.
pub fn redirect_target(body: &str) -> Option<String> {
    let start = body.find("<redirect")?;
    let rest = &body[start..];
    let line = match rest.find('\n') {
        Some(nl) => &rest[..nl],
        None => rest,
    };
    let value_start = line.find("title=\"")? + "title=\"".len();
    let value = &line[value_start..];
    let value_end = value.find('"')?;
    Some(value[..value_end].to_string())
}

/// Character count of the text payload: everything between the end of the
/// `<text ...>` open tag and the fixed-size trailing boilerplate.
pub fn char_count(body: &str, footer_len: usize) -> Option<u64> {
    let payload_start = TEXT_OPEN_RE.find(body)?.end();
    let payload_end = body.len().checked_sub(footer_len)?;
    let payload = body.get(payload_start..payload_end)?;
    Some(payload.chars().count() as u64)
}

/// Seconds between the reference instant and the page's first revision
/// timestamp. Larger means longer since the last edit; negative values (an
/// edit after the reference instant) still order correctly.
pub fn last_edit(body: &str, reference: DateTime<Utc>) -> Option<i64> {
    let start = body.find("<timestamp>")? + "<timestamp>".len();
    let rest = &body[start..];
    let end = rest.find("</timestamp")?;
    // the dump writes Z-suffixed UTC; parse the offset explicitly
    let stamp = DateTime::parse_from_rfc3339(rest[..end].trim()).ok()?;
    Some((reference - stamp.with_timezone(&Utc)).num_seconds())
}

/// Extract the full attribute record for one page block.
///
/// Redirect pages carry only their target. For regular pages a missing or
/// malformed field falls back to zero so one bad article never stops a
/// batch; only a title-less block yields `None`.
pub fn extract_article_record(body: &str, config: &Config) -> Option<ArticleRecord> {
    let title = title(body)?;

    if let Some(target) = redirect_target(body) {
        return Some(ArticleRecord::redirect(title, target));
    }

    let char_count = match char_count(body, config.footer_len) {
        Some(count) => count,
        None => {
            tracing::warn!("no text payload found in {:?}, counting 0 characters", title);
            0
        }
    };
    let edit_recency = match last_edit(body, config.reference_instant) {
        Some(seconds) => seconds,
        None => {
            tracing::warn!("missing or malformed timestamp in {:?}, recency 0", title);
            0
        }
    };

    Some(ArticleRecord::new(title, char_count, edit_recency))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOOTER: &str = "</text>\n      <sha1>phoiac9h4m842xq45sp7s6u21eteeq1</sha1>\n    </revision>\n  </page>\n";

    fn page_block(title: &str, stamp: &str, text: &str) -> String {
        format!(
            "  <page>\n    <title>{title}</title>\n    <ns>0</ns>\n    <id>9</id>\n    \
             <revision>\n      <id>10</id>\n      <timestamp>{stamp}</timestamp>\n      \
             <text bytes=\"{len}\" xml:space=\"preserve\">{text}{FOOTER}",
            len = text.len(),
        )
    }

    fn test_config() -> Config {
        Config::default().with_footer_len(FOOTER.len())
    }

    #[test]
    fn test_title() {
        let body = page_block("Anarchism", "2020-12-30T00:00:01Z", "text");
        assert_eq!(title(&body), Some("Anarchism".to_string()));
        assert_eq!(title("no tags here"), None);
    }

    #[test]
    fn test_redirect_target() {
        let body = "  <page>\n    <title>AccessibleComputing</title>\n    \
                    <redirect title=\"Computer accessibility\" />\n  </page>\n";
        assert_eq!(redirect_target(body), Some("Computer accessibility".to_string()));

        let body = page_block("Anarchism", "2020-12-30T00:00:01Z", "text");
        assert_eq!(redirect_target(&body), None);
    }

    #[test]
    fn test_char_count() {
        let body = page_block("Anarchism", "2020-12-30T00:00:01Z", "0123456789");
        assert_eq!(char_count(&body, FOOTER.len()), Some(10));
        // multibyte payload counts characters, not bytes
        let body = page_block("Café", "2020-12-30T00:00:01Z", "héllo");
        assert_eq!(char_count(&body, FOOTER.len()), Some(5));
        // footer longer than the block
        assert_eq!(char_count("<text>", 100), None);
    }

    #[test]
    fn test_last_edit_is_utc_and_total() {
        let reference = Config::default().reference_instant;
        let body = page_block("Anarchism", "2020-12-31T23:59:01Z", "text");
        assert_eq!(last_edit(&body, reference), Some(60));
        // more than a day is not truncated modulo 86400
        let body = page_block("Anarchism", "2020-12-30T00:00:01Z", "text");
        assert_eq!(last_edit(&body, reference), Some(2 * 86400));
        // an edit after the reference instant orders below everything else
        let body = page_block("Anarchism", "2021-01-02T00:00:01Z", "text");
        assert_eq!(last_edit(&body, reference), Some(-86400));
    }

    #[test]
    fn test_extract_article_record() {
        let config = test_config();
        let body = page_block("Anarchism", "2020-12-31T23:59:01Z", "0123456789");
        let record = extract_article_record(&body, &config).unwrap();
        assert_eq!(record.title, "Anarchism");
        assert_eq!(record.redirect_target, None);
        assert_eq!(record.char_count, 10);
        assert_eq!(record.edit_recency, 60);
    }

    #[test]
    fn test_extract_redirect_record() {
        let config = test_config();
        let body = "  <page>\n    <title>AccessibleComputing</title>\n    \
                    <redirect title=\"Computer accessibility\" />\n  </page>\n";
        let record = extract_article_record(body, &config).unwrap();
        assert!(record.is_redirect());
        assert_eq!(record.redirect_target.as_deref(), Some("Computer accessibility"));
        assert_eq!(record.char_count, 0);
        assert_eq!(record.edit_recency, 0);
    }

    #[test]
    fn test_extract_defaults_on_partial_failure() {
        let config = test_config();
        // no <text> and no <timestamp>: record still produced with zeros
        let body = "  <page>\n    <title>Stub</title>\n  </page>\n";
        let record = extract_article_record(body, &config).unwrap();
        assert_eq!(record.char_count, 0);
        assert_eq!(record.edit_recency, 0);
        // no title: no record
        assert!(extract_article_record("  <page>\n  </page>\n", &config).is_none());
    }
}
