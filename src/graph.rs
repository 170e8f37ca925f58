//! Undirected graph over article titles
//!
//! Vertices live in an arena indexed by title; adjacency is stored as sets of
//! arena indices, so neighbour lookup is O(1) and the symmetric invariant is
//! maintained in one place. Construction is two-phase: every vertex from the
//! attribute stream first, then every edge from the edge stream.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use crate::article::{self, ArticleRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// An edge referenced a title never inserted as a vertex
    #[error("edge endpoint {0:?} is not a vertex in this graph")]
    MissingVertex(String),
    /// A query referenced a title never inserted as a vertex
    #[error("no vertex {0:?} in this graph")]
    UnknownVertex(String),
    /// Both edge endpoints were the same title
    #[error("self-loop on {0:?} rejected")]
    SelfLoop(String),
}

#[derive(Debug, Clone)]
struct Vertex {
    title: String,
    char_count: u64,
    edit_recency: i64,
    redirect: bool,
    neighbours: HashSet<usize>,
}

/// The article link graph
#[derive(Debug, Default)]
pub struct Graph {
    index: HashMap<String, usize>,
    vertices: Vec<Vertex>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex with the given attributes and no neighbours.
    /// Inserting an already-present title is a no-op: the first writer wins.
    pub fn add_vertex(&mut self, title: &str, char_count: u64, edit_recency: i64) {
        self.insert(title, char_count, edit_recency, false);
    }

    /// Add a redirect vertex. Redirects carry zero attributes and are
    /// expected to gain no edges.
    pub fn add_redirect_vertex(&mut self, title: &str) {
        self.insert(title, 0, 0, true);
    }

    /// Add the vertex described by one attribute record
    pub fn add_record(&mut self, record: &ArticleRecord) {
        if record.is_redirect() {
            self.add_redirect_vertex(&record.title);
        } else {
            self.add_vertex(&record.title, record.char_count, record.edit_recency);
        }
    }

    fn insert(&mut self, title: &str, char_count: u64, edit_recency: i64, redirect: bool) {
        if self.index.contains_key(title) {
            return;
        }
        self.index.insert(title.to_string(), self.vertices.len());
        self.vertices.push(Vertex {
            title: title.to_string(),
            char_count,
            edit_recency,
            redirect,
            neighbours: HashSet::new(),
        });
    }

    /// Add an undirected edge between two existing vertices.
    ///
    /// Fails with [`GraphError::MissingVertex`] if either endpoint was never
    /// inserted and [`GraphError::SelfLoop`] if the endpoints are equal; on
    /// failure no adjacency is touched.
    pub fn add_edge(&mut self, a: &str, b: &str) -> Result<(), GraphError> {
        if a == b {
            return Err(GraphError::SelfLoop(a.to_string()));
        }
        let ia = *self
            .index
            .get(a)
            .ok_or_else(|| GraphError::MissingVertex(a.to_string()))?;
        let ib = *self
            .index
            .get(b)
            .ok_or_else(|| GraphError::MissingVertex(b.to_string()))?;
        self.vertices[ia].neighbours.insert(ib);
        self.vertices[ib].neighbours.insert(ia);
        Ok(())
    }

    fn vertex(&self, title: &str) -> Result<&Vertex, GraphError> {
        self.index
            .get(title)
            .map(|&i| &self.vertices[i])
            .ok_or_else(|| GraphError::UnknownVertex(title.to_string()))
    }

    /// Degree of a vertex (number of distinct neighbours)
    pub fn degree(&self, title: &str) -> Result<usize, GraphError> {
        Ok(self.vertex(title)?.neighbours.len())
    }

    /// Character count attribute of a vertex
    pub fn char_count(&self, title: &str) -> Result<u64, GraphError> {
        Ok(self.vertex(title)?.char_count)
    }

    /// Edit-recency attribute of a vertex
    pub fn edit_recency(&self, title: &str) -> Result<i64, GraphError> {
        Ok(self.vertex(title)?.edit_recency)
    }

    /// Whether the vertex was inserted as a redirect
    pub fn is_redirect(&self, title: &str) -> Result<bool, GraphError> {
        Ok(self.vertex(title)?.redirect)
    }

    /// Titles adjacent to the given vertex
    pub fn neighbours(&self, title: &str) -> Result<HashSet<&str>, GraphError> {
        Ok(self
            .vertex(title)?
            .neighbours
            .iter()
            .map(|&i| self.vertices[i].title.as_str())
            .collect())
    }

    /// Whether two titles are adjacent. False when either is absent.
    pub fn adjacent(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&ia), Some(&ib)) => self.vertices[ia].neighbours.contains(&ib),
            _ => false,
        }
    }

    /// The set of all vertex titles, unordered
    pub fn all_titles(&self) -> HashSet<&str> {
        self.index.keys().map(String::as_str).collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.vertices.iter().map(|v| v.neighbours.len()).sum::<usize>() / 2
    }

    fn apply_attribute_line(&mut self, line: &str) -> bool {
        match ArticleRecord::from_attribute_line(line) {
            Some(record) => {
                self.add_record(&record);
                true
            }
            None => false,
        }
    }

    fn apply_edge_line(&mut self, line: &str, tally: &mut EdgeTally) {
        let Some((title, targets)) = article::parse_edge_line(line) else {
            tally.malformed += 1;
            return;
        };
        for target in targets {
            match self.add_edge(title, target) {
                Ok(()) => tally.applied += 1,
                Err(GraphError::SelfLoop(_)) => tally.self_links += 1,
                Err(_) => tally.dangling += 1,
            }
        }
    }

    /// Build a graph from the two record streams: every attribute line is
    /// applied before any edge line. Malformed lines, links to titles outside
    /// the streams, and self-links are counted and skipped; no single bad
    /// record stops the build.
    pub fn build_from_streams<A, E>(attribute_lines: A, edge_lines: E) -> Graph
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let mut graph = Graph::new();
        let mut bad_lines = 0u64;
        for line in attribute_lines {
            let line = line.as_ref().trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            if !graph.apply_attribute_line(line) {
                bad_lines += 1;
            }
        }

        let mut tally = EdgeTally::default();
        for line in edge_lines {
            let line = line.as_ref().trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            graph.apply_edge_line(line, &mut tally);
        }

        if bad_lines > 0 {
            tracing::warn!("skipped {} malformed attribute lines", bad_lines);
        }
        tracing::debug!(
            "built graph: {} vertices, {} edges ({} dangling links, {} self-links, {} malformed edge lines skipped)",
            graph.vertex_count(),
            graph.edge_count(),
            tally.dangling,
            tally.self_links,
            tally.malformed,
        );
        graph
    }

    /// Load a graph from attribute and edge stream files, one record per line
    pub fn load_from_files(info_path: &Path, links_path: &Path) -> Result<Graph> {
        let mut graph = Graph::new();

        let file = File::open(info_path)
            .with_context(|| format!("failed to open attribute stream {:?}", info_path))?;
        let pb = stream_spinner("Loading vertices...");
        let mut bad_lines = 0u64;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            if !graph.apply_attribute_line(&line) {
                bad_lines += 1;
            }
            if graph.vertex_count() % 100_000 == 0 {
                pb.set_message(format!("{} vertices", graph.vertex_count()));
            }
        }
        pb.finish_with_message(format!("{} vertices", graph.vertex_count()));

        let file = File::open(links_path)
            .with_context(|| format!("failed to open edge stream {:?}", links_path))?;
        let pb = stream_spinner("Loading edges...");
        let mut tally = EdgeTally::default();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            graph.apply_edge_line(&line, &mut tally);
            if tally.applied % 500_000 == 0 {
                pb.set_message(format!("{} links", tally.applied));
            }
        }
        pb.finish_with_message(format!(
            "{} edges ({} dangling links skipped)",
            graph.edge_count(),
            tally.dangling
        ));

        if bad_lines > 0 {
            tracing::warn!("skipped {} malformed attribute lines", bad_lines);
        }
        if tally.self_links > 0 || tally.malformed > 0 {
            tracing::debug!(
                "skipped {} self-links, {} malformed edge lines",
                tally.self_links,
                tally.malformed
            );
        }
        Ok(graph)
    }
}

#[derive(Debug, Default)]
struct EdgeTally {
    applied: u64,
    dangling: u64,
    self_links: u64,
    malformed: u64,
}

fn stream_spinner(msg: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message(msg);
    pb
}
