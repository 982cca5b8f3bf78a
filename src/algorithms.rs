//! Graph metrics over windowed views.
//!
//! Every function takes a [`WindowedGraph`] and answers for the data
//! visible in that window only. Degenerate inputs (empty views, missing
//! vertices, too few neighbours) return the documented limiting value,
//! never an error.
//!
//! Two degree conventions are in play and both are intentional:
//! degree-based metrics ([`average_degree`], the max/min extremes) count
//! temporal observations, while the combinatorial metrics
//! ([`local_triangle_count`], [`local_clustering_coefficient`], the
//! reciprocity family) work on distinct neighbours.

use crate::graph::IntoVertexId;
use crate::types::Direction;
use crate::view::WindowedGraph;
use rustc_hash::FxHashSet;

/// Distinct in-window neighbours of `id`, self excluded.
fn distinct_neighbours(view: &WindowedGraph, id: u64) -> Vec<u64> {
    view.neighbours_ids(id, Direction::BOTH)
        .into_iter()
        .filter(|&peer| peer != id)
        .collect()
}

/// Distinct in-window neighbours of `id` in one direction, self
/// excluded.
fn neighbour_set(view: &WindowedGraph, id: u64, direction: Direction) -> FxHashSet<u64> {
    view.neighbours_ids(id, direction)
        .into_iter()
        .filter(|&peer| peer != id)
        .collect()
}

/// Per-vertex reciprocity inputs: distinct out-neighbour count,
/// distinct in-neighbour count, and the size of their intersection.
fn reciprocal_counts(view: &WindowedGraph, id: u64) -> (usize, usize, usize) {
    let out = neighbour_set(view, id, Direction::OUT);
    let inbound = neighbour_set(view, id, Direction::IN);
    let reciprocated = out.intersection(&inbound).count();
    (out.len(), inbound.len(), reciprocated)
}

/// Number of triangles through `v`: unordered neighbour pairs connected
/// by an in-window edge in either direction. Self-loops never form a
/// triangle. A vertex absent from the window counts zero triangles.
pub fn local_triangle_count<V: IntoVertexId>(view: &WindowedGraph, v: V) -> usize {
    let id = v.into_id();
    if !view.has_vertex(id) {
        return 0;
    }
    let neighbours = distinct_neighbours(view, id);
    let mut triangles = 0;
    for (i, &a) in neighbours.iter().enumerate() {
        for &b in &neighbours[i + 1..] {
            if view.has_edge(a, b) || view.has_edge(b, a) {
                triangles += 1;
            }
        }
    }
    triangles
}

/// Mean observation-count degree (`BOTH`) over all in-window vertices.
/// An empty view yields `0.0`.
pub fn average_degree(view: &WindowedGraph) -> f64 {
    let n = view.len();
    if n == 0 {
        return 0.0;
    }
    let total: usize = view
        .vertex_ids()
        .into_iter()
        .map(|id| view.degree(id, Direction::BOTH))
        .sum();
    total as f64 / n as f64
}

/// Largest out-degree over in-window vertices, `0` for an empty view.
pub fn max_out_degree(view: &WindowedGraph) -> usize {
    degree_extreme(view, Direction::OUT, true)
}

/// Largest in-degree over in-window vertices, `0` for an empty view.
pub fn max_in_degree(view: &WindowedGraph) -> usize {
    degree_extreme(view, Direction::IN, true)
}

/// Smallest out-degree over in-window vertices, `0` for an empty view.
pub fn min_out_degree(view: &WindowedGraph) -> usize {
    degree_extreme(view, Direction::OUT, false)
}

/// Smallest in-degree over in-window vertices, `0` for an empty view.
pub fn min_in_degree(view: &WindowedGraph) -> usize {
    degree_extreme(view, Direction::IN, false)
}

fn degree_extreme(view: &WindowedGraph, direction: Direction, max: bool) -> usize {
    let degrees = view
        .vertex_ids()
        .into_iter()
        .map(|id| view.degree(id, direction));
    let extreme = if max {
        degrees.max()
    } else {
        degrees.min()
    };
    extreme.unwrap_or(0)
}

/// Ratio of distinct in-window edge pairs to the `n * (n - 1)` possible
/// directed pairs. Views with fewer than two vertices yield `0.0`.
pub fn directed_graph_density(view: &WindowedGraph) -> f64 {
    let n = view.len();
    if n < 2 {
        return 0.0;
    }
    view.edges_len() as f64 / (n * (n - 1)) as f64
}

/// Fraction of distinct directed relationships in the window that are
/// reciprocated: the sum over vertices of `|out ∩ in|` divided by the
/// sum of `|out|`, with neighbour sets deduplicated and self-loops
/// excluded. A view with no non-loop edges yields `0.0`.
pub fn global_reciprocity(view: &WindowedGraph) -> f64 {
    let mut total_out = 0usize;
    let mut total_reciprocated = 0usize;
    for id in view.vertex_ids() {
        let (out, _, reciprocated) = reciprocal_counts(view, id);
        total_out += out;
        total_reciprocated += reciprocated;
    }
    if total_out == 0 {
        return 0.0;
    }
    total_reciprocated as f64 / total_out as f64
}

/// Fraction of `v`'s distinct relationships that run in both
/// directions: `2 * |out ∩ in| / (|out| + |in|)`, self-loops excluded.
/// A missing or isolated vertex yields `0.0`.
pub fn local_reciprocity<V: IntoVertexId>(view: &WindowedGraph, v: V) -> f64 {
    let id = v.into_id();
    if !view.has_vertex(id) {
        return 0.0;
    }
    let (out, inbound, reciprocated) = reciprocal_counts(view, id);
    if out + inbound == 0 {
        return 0.0;
    }
    2.0 * reciprocated as f64 / (out + inbound) as f64
}

/// [`local_reciprocity`] for every in-window vertex, shard order.
pub fn all_local_reciprocity(view: &WindowedGraph) -> Vec<(u64, f64)> {
    view.vertex_ids()
        .into_iter()
        .map(|id| (id, local_reciprocity(view, id)))
        .collect()
}

/// Fraction of `v`'s distinct-neighbour pairs that are connected:
/// `2 * triangles / (d * (d - 1))` with `d` the distinct-neighbour
/// count. Vertices with fewer than two distinct neighbours yield `0.0`.
pub fn local_clustering_coefficient<V: IntoVertexId>(view: &WindowedGraph, v: V) -> f64 {
    let id = v.into_id();
    if !view.has_vertex(id) {
        return 0.0;
    }
    let d = distinct_neighbours(view, id).len();
    if d < 2 {
        return 0.0;
    }
    let triangles = local_triangle_count(view, id);
    2.0 * triangles as f64 / (d * (d - 1)) as f64
}
