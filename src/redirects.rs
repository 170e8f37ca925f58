//! Redirect collapsing over the TSV streams
//!
//! Redirect pages carry no content; links pointing at them should land on
//! their targets instead. This pass reads the attribute stream, learns every
//! redirect, then rewrites both streams so redirect vertices disappear and
//! every link names a concrete article.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::article::{self, ArticleRecord};

/// Map from redirect title to redirect target
#[derive(Debug, Default)]
pub struct RedirectMap {
    targets: HashMap<String, String>,
}

impl RedirectMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.targets.insert(from.into(), to.into());
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn is_redirect(&self, title: &str) -> bool {
        self.targets.contains_key(title)
    }

    /// Build the map from attribute records, keeping only redirect rows
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ArticleRecord>) -> Self {
        let mut map = Self::new();
        for record in records {
            if let Some(target) = &record.redirect_target {
                map.insert(&record.title, target);
            }
        }
        map
    }

    /// Follow the redirect chain from `title` until it reaches a title that
    /// is not itself a redirect. A cyclic chain resolves back to the
    /// original title (the dangling link is dropped later, at graph build).
    pub fn resolve<'a>(&'a self, title: &'a str) -> &'a str {
        let mut current = title;
        let mut seen: HashSet<&str> = HashSet::new();
        while let Some(next) = self.targets.get(current) {
            if !seen.insert(current) {
                tracing::warn!("redirect cycle through {:?}", title);
                return title;
            }
            current = next;
        }
        current
    }
}

/// Counters from one collapse pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollapseStats {
    pub redirects_removed: u64,
    pub articles_kept: u64,
    pub links_rewritten: u64,
    pub self_links_dropped: u64,
    pub duplicate_links_dropped: u64,
}

/// Rewrite the attribute and edge streams with redirects collapsed.
///
/// Redirect rows are dropped from the attribute stream. Every link target is
/// resolved through the redirect map; links resolving back to their source
/// article are dropped (the graph rejects self-loops), and duplicate targets
/// on one line are dropped keeping first-seen order.
pub fn collapse_streams(
    info_in: &Path,
    links_in: &Path,
    info_out: &Path,
    links_out: &Path,
) -> Result<CollapseStats> {
    let mut stats = CollapseStats::default();

    // Pass 1: learn redirects, write the collapsed attribute stream
    let reader = open_lines(info_in)?;
    let mut writer = create_writer(info_out)?;
    let mut map = RedirectMap::new();
    let pb = pass_spinner("Collapsing attribute stream...");
    for line in reader {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let Some(record) = ArticleRecord::from_attribute_line(&line) else {
            continue;
        };
        if let Some(target) = &record.redirect_target {
            map.insert(&record.title, target);
            stats.redirects_removed += 1;
        } else {
            writeln!(writer, "{}", line)?;
            stats.articles_kept += 1;
        }
        if (stats.articles_kept + stats.redirects_removed) % 100_000 == 0 {
            pb.set_message(format!("{} redirects found", stats.redirects_removed));
        }
    }
    writer.flush()?;
    pb.finish_with_message(format!(
        "{} articles kept, {} redirects removed",
        stats.articles_kept, stats.redirects_removed
    ));

    // Pass 2: rewrite the edge stream through the map
    let reader = open_lines(links_in)?;
    let mut writer = create_writer(links_out)?;
    let pb = pass_spinner("Collapsing edge stream...");
    for line in reader {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let Some((title, targets)) = article::parse_edge_line(&line) else {
            continue;
        };
        // a redirect's own links die with its vertex
        if map.is_redirect(title) {
            continue;
        }
        let mut seen: HashSet<&str> = HashSet::new();
        let mut resolved: Vec<String> = Vec::with_capacity(targets.len());
        for target in targets {
            let concrete = map.resolve(target);
            if concrete == title {
                stats.self_links_dropped += 1;
                continue;
            }
            if !seen.insert(concrete) {
                stats.duplicate_links_dropped += 1;
                continue;
            }
            resolved.push(concrete.to_string());
        }
        stats.links_rewritten += resolved.len() as u64;
        writeln!(writer, "{}", article::edge_line(title, &resolved))?;
        if stats.links_rewritten % 500_000 == 0 {
            pb.set_message(format!("{} links", stats.links_rewritten));
        }
    }
    writer.flush()?;
    pb.finish_with_message(format!("{} links written", stats.links_rewritten));

    Ok(stats)
}

fn open_lines(path: &Path) -> Result<std::io::Lines<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    Ok(BufReader::new(file).lines())
}

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    Ok(BufWriter::new(file))
}

fn pass_spinner(msg: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message(msg);
    pb
}
