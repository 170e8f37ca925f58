//! Wikitext link parser
//!
//! Finds every `[[...]]` span in an article body and resolves it to the
//! article titles it links to. Resolution handles plain links, piped renames,
//! section anchors (same-page anchors are dropped), and `File:`/`Image:`
//! embeds whose captions may carry nested links.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximal bracketed spans, shortest match first. Non-greedy so adjacent and
/// nested links each produce their own span, and `[\s\S]` so spans may cross
/// line breaks.
static LINK_SPAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[[\s\S]*?\]\]").unwrap());

/// Collect the linked article titles from one article body, in order of
/// appearance. Pure and deterministic; a malformed span contributes nothing
/// and never aborts the scan.
pub fn parse_links(body: &str) -> Vec<String> {
    let mut links = Vec::new();
    for span in LINK_SPAN_RE.find_iter(body) {
        let raw = span.as_str();
        // strip the enclosing [[ ]]
        links.extend(resolve_link(&raw[2..raw.len() - 2]));
    }
    links
}

/// Resolve the inner text of one bracket pair to zero or more titles.
///
/// Same-page section anchors (`#...`) resolve to nothing. `File:`/`Image:`
/// embeds resolve to the file title plus any links nested in the caption.
/// Otherwise the title is everything before the first `#` or `|`, whichever
/// rule applies.
pub fn resolve_link(link: &str) -> Vec<String> {
    if link.is_empty() {
        tracing::debug!("empty link span skipped");
        return Vec::new();
    }

    // Section on the same page
    if link.starts_with('#') {
        return Vec::new();
    }

    // File or image embed; the caption after the first pipe may itself
    // contain links
    if is_media_link(link) {
        let pipe = link.find('|');
        let nested = link.find("[[");

        let primary = match pipe {
            Some(p) => &link[..p],
            None => link,
        };

        let mut resolved = vec![primary.to_string()];
        if let Some(n) = nested {
            resolved.extend(resolve_link(&link[n + 2..]));
        }
        return resolved;
    }

    // Section on a different page. A pipe written before the hash renames
    // the link and wins over the section rule.
    if let Some(hash) = link.find('#') {
        if let Some(pipe) = link.find('|') {
            if pipe < hash {
                return vec![link[..pipe].to_string()];
            }
        }
        return vec![link[..hash].to_string()];
    }

    // Renamed, no section. The part before the pipe is the real title; the
    // display text (possibly empty) is discarded.
    if let Some(pipe) = link.find('|') {
        return vec![link[..pipe].to_string()];
    }

    // Not renamed
    vec![link.to_string()]
}

/// Whether a link target sits in the `File:` or `Image:` namespace.
///
/// Used by the edge-stream producer to keep media embeds out of the graph.
pub fn is_media_link(title: &str) -> bool {
    starts_with_ignore_case(title, "File:") || starts_with_ignore_case(title, "Image:")
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
