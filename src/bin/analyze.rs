//! Wikigraph ranking reports
//!
//! Load the processed record streams into a graph and print the articles at
//! the extremes: least/most linked, shortest, and longest without an edit.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wikigraph::{analysis, Config, Graph};

#[derive(Parser)]
#[command(name = "wikigraph-analyze")]
#[command(author, version, about = "Rank articles in a processed wikigraph dataset")]
struct Cli {
    /// Directory containing the TSV streams
    #[arg(short, long, default_value = "data")]
    data: PathBuf,

    /// How many articles to show per ranking
    #[arg(short, long, default_value = "25")]
    top: usize,

    /// Degree threshold for the weakly-linked report
    #[arg(long, default_value = "2")]
    threshold: usize,

    /// Cap on the weakly-linked report size (0 = no cap)
    #[arg(long, default_value = "0")]
    cap: usize,

    /// Use the raw streams even when collapsed ones exist
    #[arg(long)]
    raw: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("wikigraph=debug,info")
    } else {
        EnvFilter::new("wikigraph=info,warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Config::default().with_data_dir(&cli.data);
    let collapsed = config.collapsed_info_path().exists() && !cli.raw;
    let (info_path, links_path) = if collapsed {
        (config.collapsed_info_path(), config.collapsed_links_path())
    } else {
        (config.info_path(), config.links_path())
    };
    if !info_path.exists() {
        anyhow::bail!("Attribute stream not found: {:?}. Run wikigraph-process first.", info_path);
    }

    println!("🔍 Loading graph from {:?}{}...\n", cli.data, if collapsed { " (collapsed)" } else { "" });
    let graph = Graph::load_from_files(&info_path, &links_path)?;

    println!("\n╔══════════════════════════════════════════════════════════════════╗");
    println!("║                      📊 GRAPH OVERVIEW                            ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║  Vertices:  {:>12}                                          ║", graph.vertex_count());
    println!("║  Edges:     {:>12}                                          ║", graph.edge_count());
    println!("╚══════════════════════════════════════════════════════════════════╝");

    let k = cli.top.min(graph.vertex_count());

    print_ranking("🔗 Fewest links", &analysis::fewest_links(&graph, k), |t| {
        format!("{} links", graph.degree(t).unwrap_or(0))
    });
    print_ranking("🔗 Most links", &analysis::most_links(&graph, k), |t| {
        format!("{} links", graph.degree(t).unwrap_or(0))
    });
    print_ranking("📄 Smallest articles", &analysis::smallest_articles(&graph, k), |t| {
        format!("{} chars", graph.char_count(t).unwrap_or(0))
    });
    print_ranking("🕰️  Oldest edits", &analysis::oldest_edits(&graph, k), |t| {
        format!("{} s before dump", graph.edit_recency(t).unwrap_or(0))
    });

    let cap = if cli.cap == 0 { None } else { Some(cli.cap) };
    let weak = analysis::fewest_links_threshold(&graph, cli.threshold, cap);
    println!("\n⚠️  {} articles with {} or fewer links", weak.len(), cli.threshold);
    if let Some(cap) = cap {
        println!("   (capped at {})", cap);
    }

    Ok(())
}

fn print_ranking(header: &str, titles: &[String], describe: impl Fn(&str) -> String) {
    println!("\n{}:", header);
    for (rank, title) in titles.iter().enumerate() {
        println!("   {:>3}. {:<50} {}", rank + 1, title, describe(title));
    }
}
