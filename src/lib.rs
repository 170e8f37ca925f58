//! # Wikigraph
//!
//! Build an undirected link graph over Wikipedia articles and rank them.
//!
//! This crate provides tools to:
//! - Parse wikitext link syntax (plain, piped, section, and file/image links)
//! - Extract per-article metadata (title, redirect target, size, edit recency)
//! - Assemble a title-keyed undirected graph from tab-separated record streams
//! - Answer order-statistic queries (k smallest/largest by a metric) without
//!   sorting the whole vertex set
//!
//! ## Quick Start
//!
//! ```bash
//! # Turn pre-partitioned dump shards into the attribute and edge streams
//! wikigraph-process shard-0001.xml shard-0002.xml --output data
//!
//! # Point links at concrete articles instead of redirects
//! wikigraph-process collapse --output data
//!
//! # Rank articles by degree, size, and edit recency
//! wikigraph-analyze --data data --top 25
//! ```

pub mod analysis;
pub mod article;
pub mod config;
pub mod extract;
pub mod graph;
pub mod parser;
pub mod redirects;

pub use analysis::{select_extreme, vertices_within_threshold, Direction};
pub use article::{ArticleRecord, ProcessStats};
pub use config::Config;
pub use extract::extract_article_record;
pub use graph::{Graph, GraphError};
pub use parser::parse_links;
pub use redirects::RedirectMap;
