//! Wikigraph shard processor
//!
//! Turn pre-partitioned dump shards into the attribute and edge TSV streams
//! the graph builder consumes. Each shard is handled by its own worker; the
//! per-article work is pure, so workers share nothing and their output files
//! are concatenated afterwards.
//!
//! # Examples
//!
//! Process a set of shards:
//! ```bash
//! wikigraph-process shard-0001.xml shard-0002.xml --output data
//! ```
//!
//! Collapse redirects in previously written streams:
//! ```bash
//! wikigraph-process collapse --output data
//! ```

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use wikigraph::article::{self, ProcessStats};
use wikigraph::config::DEFAULT_FOOTER_LEN;
use wikigraph::redirects;
use wikigraph::{extract, parser, Config};

#[derive(Parser)]
#[command(name = "wikigraph-process")]
#[command(author, version, about = "Turn Wikipedia dump shards into graph record streams")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Dump shards to process (pre-partitioned on page boundaries)
    shards: Vec<PathBuf>,

    /// Output directory for the TSV streams
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// Trailing boilerplate length after the article text
    #[arg(long, default_value_t = DEFAULT_FOOTER_LEN)]
    footer_len: usize,

    /// Dump collection instant (RFC 3339), the reference for edit recency
    #[arg(long)]
    reference: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collapse redirects in previously written TSV streams
    Collapse {
        /// Directory containing wiki-info.tsv and wiki-links.tsv
        #[arg(short, long, default_value = "data")]
        output: PathBuf,
    },
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

    match &cli.command {
        Some(Commands::Collapse { output }) => collapse(output),
        None => process_shards(&cli),
    }
}

fn process_shards(cli: &Cli) -> Result<()> {
    if cli.shards.is_empty() {
        anyhow::bail!("no shards given. Pass one or more pre-partitioned dump files.");
    }

    let mut config = Config::default()
        .with_data_dir(&cli.output)
        .with_footer_len(cli.footer_len);
    if let Some(reference) = &cli.reference {
        let instant = DateTime::parse_from_rfc3339(reference)
            .with_context(|| format!("invalid --reference instant: {}", reference))?;
        config = config.with_reference_instant(instant.with_timezone(&Utc));
    }

    fs::create_dir_all(&cli.output).context("Failed to create output directory")?;

    tracing::info!("Processing {} shards...", cli.shards.len());
    let mut stats = ProcessStats::new(cli.shards.len());

    let pb = ProgressBar::new(cli.shards.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} shards ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    // one worker per shard; the per-article functions are pure so nothing is
    // shared beyond the config
    let outputs: Vec<ShardOutput> = cli
        .shards
        .par_iter()
        .enumerate()
        .progress_with(pb)
        .map(|(part, shard)| process_shard(shard, &config, part, &cli.output))
        .collect::<Result<Vec<_>>>()?;

    // concatenate per-shard streams in shard order
    concat_parts(&config.info_path(), outputs.iter().map(|o| o.info_part.as_path()))?;
    concat_parts(&config.links_path(), outputs.iter().map(|o| o.links_part.as_path()))?;
    for output in &outputs {
        stats.absorb(&output.stats);
        fs::remove_file(&output.info_part).ok();
        fs::remove_file(&output.links_part).ok();
    }

    stats.finish();
    fs::write(config.stats_path(), serde_json::to_string_pretty(&stats)?)?;
    config.save()?;

    println!("\n╔══════════════════════════════════════════════════════════════════╗");
    println!("║                     ✅ Processing Complete!                       ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║  Articles:            {:>10}                                 ║", stats.articles);
    println!("║  Redirects:           {:>10}                                 ║", stats.redirects);
    println!("║  Links:               {:>10}                                 ║", stats.links);
    println!("║  Media links dropped: {:>10}                                 ║", stats.media_links_dropped);
    println!("║  Pages skipped:       {:>10}                                 ║", stats.pages_skipped);
    if let Some(duration) = stats.duration_secs {
        println!("║  Duration:            {:>9.1}s                                 ║", duration);
    }
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!("\n📂 Streams written to: {:?}", cli.output);
    println!("\n🚀 Next steps:");
    println!("   wikigraph-process collapse --output {:?}", cli.output);
    println!("   wikigraph-analyze --data {:?}", cli.output);

    Ok(())
}

struct ShardOutput {
    info_part: PathBuf,
    links_part: PathBuf,
    stats: ProcessStats,
}

fn process_shard(shard: &Path, config: &Config, part: usize, out_dir: &Path) -> Result<ShardOutput> {
    let file = File::open(shard).with_context(|| format!("failed to open shard {:?}", shard))?;
    let reader = BufReader::with_capacity(1024 * 1024, file);

    let info_part = out_dir.join(format!("wiki-info.part{:04}.tsv", part));
    let links_part = out_dir.join(format!("wiki-links.part{:04}.tsv", part));
    let mut info_writer = BufWriter::new(File::create(&info_part)?);
    let mut links_writer = BufWriter::new(File::create(&links_part)?);

    let mut stats = ProcessStats::default();
    let mut page = String::new();
    let mut in_page = false;

    for line in reader.lines() {
        let line = line?;
        if !in_page && line.contains("<page") {
            in_page = true;
            page.clear();
        }
        if in_page {
            page.push_str(&line);
            page.push('\n');
            if line.contains("</page>") {
                in_page = false;
                handle_page(&page, config, &mut info_writer, &mut links_writer, &mut stats)?;
            }
        }
    }
    if in_page {
        tracing::warn!("shard {:?} ends inside a page block, last page dropped", shard);
    }

    info_writer.flush()?;
    links_writer.flush()?;

    Ok(ShardOutput { info_part, links_part, stats })
}

fn handle_page(
    page: &str,
    config: &Config,
    info_writer: &mut BufWriter<File>,
    links_writer: &mut BufWriter<File>,
    stats: &mut ProcessStats,
) -> Result<()> {
    let Some(record) = extract::extract_article_record(page, config) else {
        stats.pages_skipped += 1;
        return Ok(());
    };

    writeln!(info_writer, "{}", record.attribute_line())?;

    if record.is_redirect() {
        stats.redirects += 1;
        return Ok(());
    }
    stats.articles += 1;

    let mut targets = parser::parse_links(page);
    let before = targets.len();
    targets.retain(|t| !parser::is_media_link(t));
    stats.media_links_dropped += (before - targets.len()) as u64;
    stats.links += targets.len() as u64;
    writeln!(links_writer, "{}", article::edge_line(&record.title, &targets))?;

    Ok(())
}

fn concat_parts<'a>(dest: &Path, parts: impl Iterator<Item = &'a Path>) -> Result<()> {
    let mut writer = BufWriter::new(
        File::create(dest).with_context(|| format!("failed to create {:?}", dest))?,
    );
    for part in parts {
        let mut reader = File::open(part).with_context(|| format!("failed to open {:?}", part))?;
        std::io::copy(&mut reader, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

fn collapse(output: &Path) -> Result<()> {
    let config = Config::default().with_data_dir(output);
    let info_path = config.info_path();
    let links_path = config.links_path();
    if !info_path.exists() {
        anyhow::bail!("Attribute stream not found: {:?}. Run wikigraph-process first.", info_path);
    }

    let stats = redirects::collapse_streams(
        &info_path,
        &links_path,
        &config.collapsed_info_path(),
        &config.collapsed_links_path(),
    )?;

    println!("\n✂️  Redirects collapsed");
    println!("   Articles kept:          {}", stats.articles_kept);
    println!("   Redirects removed:      {}", stats.redirects_removed);
    println!("   Links written:          {}", stats.links_rewritten);
    println!("   Self-links dropped:     {}", stats.self_links_dropped);
    println!("   Duplicate links merged: {}", stats.duplicate_links_dropped);
    println!("\n📂 Collapsed streams written next to the originals in {:?}", output);

    Ok(())
}
