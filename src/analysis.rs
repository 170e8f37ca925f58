//! Order-statistic queries over graph vertices
//!
//! One generic selection routine answers every "k most extreme vertices by
//! some metric" question: a quickselect that fully sorts the surviving
//! partitions, so the k winners come back ordered without sorting the other
//! millions of vertices. Expected linear time for small k, n log n for a
//! full sort.

use std::collections::HashSet;

use rand::Rng;

use crate::graph::Graph;

/// Which end of the metric scale to select from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The k smallest, returned ascending
    Smallest,
    /// The k largest, returned descending
    Largest,
}

/// Return the `k` vertices with the most extreme metric values, fully
/// ordered most-extreme first (ascending for [`Direction::Smallest`],
/// descending for [`Direction::Largest`]).
///
/// The metric is evaluated once per vertex. `k` greater than the vertex
/// count is a programming error.
pub fn select_extreme<K, F>(graph: &Graph, metric: F, k: usize, direction: Direction) -> Vec<String>
where
    K: Ord,
    F: Fn(&str) -> K,
{
    let titles: Vec<&str> = graph.all_titles().into_iter().collect();
    assert!(
        k <= titles.len(),
        "requested {} extremes from a graph with {} vertices",
        k,
        titles.len()
    );

    let keys: Vec<K> = titles.iter().map(|t| metric(t)).collect();
    let items: Vec<usize> = (0..titles.len()).collect();
    let mut rng = rand::rng();

    select_sorted(&keys, items, k, direction, &mut rng)
        .into_iter()
        .map(|i| titles[i].to_string())
        .collect()
}

/// Select the `k` most extreme of `items`, sorted. Partitions around a
/// random pivot, then either discards the far partition (k fits in the near
/// one) or keeps the pivot and recurses into both sides.
fn select_sorted<K: Ord>(
    keys: &[K],
    mut items: Vec<usize>,
    k: usize,
    direction: Direction,
    rng: &mut impl Rng,
) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }
    if items.len() < 2 {
        return items;
    }

    // random pivot; a fixed first-element pivot degrades to quadratic on
    // sorted input, which redirect-collapsed streams routinely are
    let pivot_at = rng.random_range(0..items.len());
    items.swap(0, pivot_at);
    let pivot = items[0];

    // ties land with the pivot's side of the near partition, so equal-metric
    // vertices have no guaranteed relative order
    let (near, far): (Vec<usize>, Vec<usize>) = items[1..]
        .iter()
        .copied()
        .partition(|&item| nearer(&keys[item], &keys[pivot], direction));
    let near_len = near.len();

    if near_len == k - 1 {
        let mut ranked = select_sorted(keys, near, near_len, direction, rng);
        ranked.push(pivot);
        ranked
    } else if near_len < k - 1 {
        let mut ranked = select_sorted(keys, near, near_len, direction, rng);
        ranked.push(pivot);
        ranked.extend(select_sorted(keys, far, k - near_len - 1, direction, rng));
        ranked
    } else {
        select_sorted(keys, near, k, direction, rng)
    }
}

fn nearer<K: Ord>(key: &K, pivot: &K, direction: Direction) -> bool {
    match direction {
        Direction::Smallest => key <= pivot,
        Direction::Largest => key >= pivot,
    }
}

/// Return every vertex whose metric is at most `threshold`, as a set.
///
/// Vertices are considered in ascending metric order; with `cap` given,
/// collection stops after `cap` vertices even if more sit under the
/// threshold.
pub fn vertices_within_threshold<K, F>(
    graph: &Graph,
    metric: F,
    threshold: K,
    cap: Option<usize>,
) -> HashSet<String>
where
    K: Ord,
    F: Fn(&str) -> K,
{
    let ranked = select_extreme(graph, &metric, graph.vertex_count(), Direction::Smallest);

    let mut within = HashSet::new();
    for title in ranked {
        if metric(&title) > threshold {
            break;
        }
        if cap.is_some_and(|cap| within.len() >= cap) {
            break;
        }
        within.insert(title);
    }
    within
}

/// The k least-linked articles, fewest first
pub fn fewest_links(graph: &Graph, k: usize) -> Vec<String> {
    select_extreme(graph, |t| graph.degree(t).unwrap_or(0), k, Direction::Smallest)
}

/// The k most-linked articles, most first
pub fn most_links(graph: &Graph, k: usize) -> Vec<String> {
    select_extreme(graph, |t| graph.degree(t).unwrap_or(0), k, Direction::Largest)
}

/// The k shortest articles by character count, shortest first
pub fn smallest_articles(graph: &Graph, k: usize) -> Vec<String> {
    select_extreme(graph, |t| graph.char_count(t).unwrap_or(0), k, Direction::Smallest)
}

/// The k articles longest without an edit, stalest first
pub fn oldest_edits(graph: &Graph, k: usize) -> Vec<String> {
    select_extreme(graph, |t| graph.edit_recency(t).unwrap_or(0), k, Direction::Largest)
}

/// Articles with degree at most `threshold`; `cap` bounds the result size
pub fn fewest_links_threshold(
    graph: &Graph,
    threshold: usize,
    cap: Option<usize>,
) -> HashSet<String> {
    vertices_within_threshold(graph, |t| graph.degree(t).unwrap_or(0), threshold, cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit_graph() -> Graph {
        let mut g = Graph::new();
        g.add_vertex("first", 1, 111);
        g.add_vertex("second", 2, 32);
        g.add_vertex("third", 3, 38);
        g.add_vertex("fourth", 4, 411);
        g.add_vertex("fifth", 5, 50);
        g.add_edge("first", "second").unwrap();
        g.add_edge("first", "third").unwrap();
        g.add_edge("fourth", "fifth").unwrap();
        g
    }

    fn degree_graph() -> Graph {
        let mut g = Graph::new();
        for title in ["first", "second", "third", "fourth", "fifth"] {
            g.add_vertex(title, 20, 0);
        }
        g.add_edge("first", "second").unwrap();
        g.add_edge("first", "third").unwrap();
        g.add_edge("first", "fourth").unwrap();
        g.add_edge("first", "fifth").unwrap();
        g.add_edge("third", "fifth").unwrap();
        g.add_edge("fourth", "fifth").unwrap();
        g
    }

    #[test]
    fn test_oldest_edits_descending() {
        let g = edit_graph();
        assert_eq!(oldest_edits(&g, 3), vec!["fourth", "first", "fifth"]);
    }

    #[test]
    fn test_smallest_articles_with_ties() {
        let mut g = Graph::new();
        g.add_vertex("first", 100, 0);
        g.add_vertex("second", 100, 0);
        g.add_vertex("third", 30, 0);
        g.add_vertex("fourth", 400, 0);
        g.add_vertex("fifth", 500, 0);
        let ranked = smallest_articles(&g, 3);
        // ties carry no guaranteed relative order
        assert_eq!(ranked[0], "third");
        let tail: HashSet<_> = ranked[1..].iter().cloned().collect();
        assert_eq!(tail, ["first", "second"].map(String::from).into_iter().collect());
    }

    #[test]
    fn test_fewest_and_most_links() {
        let g = degree_graph();
        let fewest = fewest_links(&g, 3);
        assert_eq!(fewest[0], "second"); // degree 1
        let rest: HashSet<_> = fewest[1..].iter().cloned().collect();
        assert_eq!(rest, ["third", "fourth"].map(String::from).into_iter().collect());

        let most = most_links(&g, 2);
        assert_eq!(most[0], "first"); // degree 4
        assert_eq!(most[1], "fifth"); // degree 3
    }

    #[test]
    fn test_threshold_no_cap_is_exact() {
        let g = degree_graph();
        let within = fewest_links_threshold(&g, 2, None);
        let expected: HashSet<String> =
            ["second", "third", "fourth"].map(String::from).into_iter().collect();
        assert_eq!(within, expected);
    }

    #[test]
    fn test_threshold_cap_truncates_ascending() {
        let g = degree_graph();
        let within = fewest_links_threshold(&g, 1, Some(3));
        assert_eq!(within, ["second"].map(String::from).into_iter().collect());

        let capped = fewest_links_threshold(&g, 2, Some(1));
        assert_eq!(capped.len(), 1);
        assert!(capped.contains("second"));
    }

    #[test]
    fn test_select_extreme_full_sort_and_bounds() {
        let g = edit_graph();
        let n = g.vertex_count();

        assert!(select_extreme(&g, |t| g.degree(t).unwrap_or(0), 0, Direction::Smallest).is_empty());

        let full = select_extreme(&g, |t| g.edit_recency(t).unwrap_or(0), n, Direction::Smallest);
        assert_eq!(full, vec!["second", "third", "fifth", "first", "fourth"]);

        let full_desc = select_extreme(&g, |t| g.edit_recency(t).unwrap_or(0), n, Direction::Largest);
        assert_eq!(full_desc, vec!["fourth", "first", "fifth", "third", "second"]);
    }

    #[test]
    fn test_selected_dominate_the_rest() {
        let g = degree_graph();
        for k in 0..=g.vertex_count() {
            let picked = fewest_links(&g, k);
            assert_eq!(picked.len(), k);
            let picked_set: HashSet<_> = picked.iter().cloned().collect();
            let max_picked = picked.iter().map(|t| g.degree(t).unwrap()).max();
            for title in g.all_titles() {
                if !picked_set.contains(title) {
                    let outside = g.degree(title).unwrap();
                    assert!(max_picked.map_or(true, |m| m <= outside));
                }
            }
            // sorted ascending
            let degrees: Vec<_> = picked.iter().map(|t| g.degree(t).unwrap()).collect();
            assert!(degrees.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    #[should_panic]
    fn test_k_beyond_vertex_count_panics() {
        let g = edit_graph();
        fewest_links(&g, 6);
    }
}
