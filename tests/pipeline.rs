// tests/pipeline.rs
//! End-to-end: raw page blocks -> records + links -> TSV streams on disk ->
//! graph -> rankings.

use std::fs::{self, File};
use std::io::{BufWriter, Write};

use wikigraph::article::{self, ArticleRecord};
use wikigraph::{analysis, extract, parser, Config, Graph};

const FOOTER: &str =
    "</text>\n      <sha1>phoiac9h4m842xq45sp7s6u21eteeq1</sha1>\n    </revision>\n  </page>\n";

fn page_block(title: &str, stamp: &str, text: &str) -> String {
    format!(
        "  <page>\n    <title>{title}</title>\n    <ns>0</ns>\n    <id>1</id>\n    \
         <revision>\n      <id>2</id>\n      <timestamp>{stamp}</timestamp>\n      \
         <text bytes=\"{len}\" xml:space=\"preserve\">{text}{FOOTER}",
        len = text.len(),
    )
}

fn redirect_block(title: &str, target: &str) -> String {
    format!(
        "  <page>\n    <title>{title}</title>\n    <ns>0</ns>\n    <id>3</id>\n    \
         <redirect title=\"{target}\" />\n  </page>\n"
    )
}

#[test]
fn test_bodies_to_rankings() {
    let config = Config::default().with_footer_len(FOOTER.len());

    // two "shards" of article bodies, already split at page boundaries
    let bodies = vec![
        page_block(
            "Anarchism",
            "2020-12-29T00:00:01Z",
            "Anarchism rejects [[authority]] and [[hierarchy]]. See also \
             [[Political movement|movements]] and [[File:Anarchy-symbol.svg|thumb|the symbol]].",
        ),
        page_block("Authority", "2020-12-31T00:00:01Z", "[[Anarchism#Etymology]] text."),
        page_block("Hierarchy", "2020-12-30T00:00:01Z", "Short. [[Authority]]"),
        redirect_block("Anarchy", "Anarchism"),
    ];

    // produce the two streams the way the process driver does
    let dir = tempfile::tempdir().unwrap();
    let info_path = dir.path().join("wiki-info.tsv");
    let links_path = dir.path().join("wiki-links.tsv");
    let mut info = BufWriter::new(File::create(&info_path).unwrap());
    let mut links = BufWriter::new(File::create(&links_path).unwrap());

    for body in &bodies {
        let record = extract::extract_article_record(body, &config).unwrap();
        writeln!(info, "{}", record.attribute_line()).unwrap();
        if record.is_redirect() {
            continue;
        }
        let mut targets = parser::parse_links(body);
        targets.retain(|t| !parser::is_media_link(t));
        writeln!(links, "{}", article::edge_line(&record.title, &targets)).unwrap();
    }
    info.flush().unwrap();
    links.flush().unwrap();

    // the attribute stream round-trips through the record codec
    let first_line = fs::read_to_string(&info_path).unwrap();
    let first_record = ArticleRecord::from_attribute_line(first_line.lines().next().unwrap()).unwrap();
    assert_eq!(first_record.title, "Anarchism");
    assert!(first_record.char_count > 0);

    let graph = Graph::load_from_files(&info_path, &links_path).unwrap();

    assert_eq!(graph.vertex_count(), 4);
    assert!(graph.is_redirect("Anarchy").unwrap());
    // Anarchism -> authority is dangling (lowercase title not in the dump),
    // Anarchism <-> Hierarchy never linked, Anarchy link went through the
    // section rule back to Anarchism
    assert!(graph.adjacent("Authority", "Anarchism"));
    assert!(graph.adjacent("Hierarchy", "Authority"));
    assert!(!graph.adjacent("Anarchism", "Hierarchy"));
    assert_eq!(graph.degree("Authority").unwrap(), 2);

    // recency: Authority edited last (smallest), Anarchism first (largest)
    let stalest = analysis::oldest_edits(&graph, 2);
    assert_eq!(stalest[0], "Anarchism");

    let k = graph.vertex_count();
    let by_size = analysis::smallest_articles(&graph, k);
    assert_eq!(by_size[0], "Anarchy"); // redirects carry zero attributes

    let weak = analysis::fewest_links_threshold(&graph, 1, None);
    assert!(weak.contains("Anarchy"));
    assert!(weak.contains("Anarchism"));
    assert!(weak.contains("Hierarchy"));
    assert!(!weak.contains("Authority"));
}

#[test]
fn test_build_from_streams_matches_file_load() {
    let attributes = vec![
        "Anarchism\t\t120\t300".to_string(),
        "Authority\t\t80\t100".to_string(),
        "Anarchy\tAnarchism\t\t".to_string(),
    ];
    let edges = vec!["Anarchism\tAuthority".to_string(), "Authority\tAnarchism\tMissing".to_string()];

    let graph = Graph::build_from_streams(&attributes, &edges);

    let dir = tempfile::tempdir().unwrap();
    let info_path = dir.path().join("info.tsv");
    let links_path = dir.path().join("links.tsv");
    fs::write(&info_path, attributes.join("\n")).unwrap();
    fs::write(&links_path, edges.join("\n")).unwrap();
    let loaded = Graph::load_from_files(&info_path, &links_path).unwrap();

    assert_eq!(graph.vertex_count(), loaded.vertex_count());
    assert_eq!(graph.edge_count(), loaded.edge_count());
    assert_eq!(graph.degree("Anarchism").unwrap(), loaded.degree("Anarchism").unwrap());
}
