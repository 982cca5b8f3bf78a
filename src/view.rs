//! Windowed views over the temporal store.
//!
//! A [`WindowedGraph`] restricts every query to the half-open interval
//! `[start, end)` without copying any data: each call truncates the
//! underlying logs at the window boundaries. Views are cheap to build
//! and clone, so perspective sweeps can materialize thousands of them.
//!
//! [`VertexView`] and [`EdgeView`] are per-entity handles bound to one
//! window; everything they answer is scoped to it.

use crate::graph::{Graph, IntoVertexId};
use crate::types::{Direction, Prop, TemporalEdge};
use rustc_hash::FxHashSet;
use std::collections::HashMap;

/// A read-only view of a [`Graph`] restricted to `[start, end)`.
///
/// The view holds a handle to the live store, so observations ingested
/// after the view was built are visible through it if they fall inside
/// the window. An empty or inverted interval is a valid view that
/// contains nothing.
#[derive(Clone)]
pub struct WindowedGraph {
    pub(crate) graph: Graph,
    start: i64,
    end: i64,
}

impl WindowedGraph {
    pub(crate) fn new(graph: Graph, start: i64, end: i64) -> Self {
        WindowedGraph { graph, start, end }
    }

    /// Inclusive lower bound of the window.
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Exclusive upper bound of the window.
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Vertices with at least one existence observation in the window.
    pub fn len(&self) -> usize {
        (0..self.graph.num_shards())
            .map(|i| self.graph.read_shard(i).len_window(self.start, self.end))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct (src, dst) pairs with at least one observation in the
    /// window.
    pub fn edges_len(&self) -> usize {
        (0..self.graph.num_shards())
            .map(|i| {
                self.graph
                    .read_shard(i)
                    .edges_len_window(self.start, self.end)
            })
            .sum()
    }

    pub fn has_vertex<V: IntoVertexId>(&self, v: V) -> bool {
        let id = v.into_id();
        self.graph
            .read_shard(self.graph.shard_id(id))
            .has_vertex_window(id, self.start, self.end)
    }

    pub fn has_edge<S: IntoVertexId, D: IntoVertexId>(&self, src: S, dst: D) -> bool {
        let src = src.into_id();
        let dst = dst.into_id();
        self.graph
            .read_shard(self.graph.shard_id(src))
            .has_edge_window(src, dst, self.start, self.end)
    }

    /// The vertex handle, or `None` if the vertex has no observation in
    /// the window.
    pub fn vertex<V: IntoVertexId>(&self, v: V) -> Option<VertexView> {
        let id = v.into_id();
        if self.has_vertex(id) {
            Some(VertexView {
                id,
                window: self.clone(),
            })
        } else {
            None
        }
    }

    /// The edge handle for the (src, dst) pair, or `None` if no
    /// observation of the pair falls in the window. `time` is unset on
    /// the returned view; it stands for the whole pair.
    pub fn edge<S: IntoVertexId, D: IntoVertexId>(&self, src: S, dst: D) -> Option<EdgeView> {
        let src = src.into_id();
        let dst = dst.into_id();
        if self.has_edge(src, dst) {
            Some(EdgeView {
                src,
                dst,
                time: None,
                is_remote: self.graph.is_remote_pair(src, dst),
                window: self.clone(),
            })
        } else {
            None
        }
    }

    /// All vertices active in the window, shard order. The order is
    /// stable for a fixed store instance but not globally sorted.
    pub fn vertices(&self) -> impl Iterator<Item = VertexView> + use<> {
        let window = self.clone();
        self.vertex_ids().into_iter().map(move |id| VertexView {
            id,
            window: window.clone(),
        })
    }

    /// Ids of all vertices active in the window, shard order.
    pub fn vertex_ids(&self) -> Vec<u64> {
        (0..self.graph.num_shards())
            .flat_map(|i| {
                self.graph
                    .read_shard(i)
                    .vertex_ids_window(self.start, self.end)
            })
            .collect()
    }

    /// Degree of `v` within the window. Counts temporal edge
    /// observations per direction; `BOTH` is the sum of `IN` and `OUT`,
    /// with a self-loop observation contributing once to each.
    pub fn degree<V: IntoVertexId>(&self, v: V, direction: Direction) -> usize {
        self.graph
            .degree_window(v.into_id(), direction, self.start, self.end)
    }

    /// Temporal edge observations incident to `v` within the window.
    /// For `BOTH`, incoming observations come first, then outgoing, each
    /// ascending by time.
    pub fn neighbours<V: IntoVertexId>(
        &self,
        v: V,
        direction: Direction,
    ) -> impl Iterator<Item = TemporalEdge> + use<V> {
        self.graph
            .neighbour_observations(v.into_id(), direction, self.start, self.end)
            .into_iter()
    }

    /// Distinct opposite-endpoint ids of `v`'s in-window observations,
    /// in order of first occurrence. A self-loop contributes `v` itself.
    pub fn neighbours_ids<V: IntoVertexId>(&self, v: V, direction: Direction) -> Vec<u64> {
        let id = v.into_id();
        let mut seen = FxHashSet::default();
        self.graph
            .neighbour_observations(id, direction, self.start, self.end)
            .into_iter()
            .map(|e| if e.src == id { e.dst } else { e.src })
            .filter(|peer| seen.insert(*peer))
            .collect()
    }
}

/// A vertex handle bound to one window.
#[derive(Clone)]
pub struct VertexView {
    id: u64,
    window: WindowedGraph,
}

impl VertexView {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn degree(&self, direction: Direction) -> usize {
        self.window.degree(self.id, direction)
    }

    pub fn in_degree(&self) -> usize {
        self.degree(Direction::IN)
    }

    pub fn out_degree(&self) -> usize {
        self.degree(Direction::OUT)
    }

    /// Distinct neighbouring vertices, in order of first in-window
    /// observation. A self-loop makes the vertex its own neighbour.
    pub fn neighbours(&self, direction: Direction) -> Vec<VertexView> {
        self.neighbours_ids(direction)
            .into_iter()
            .map(|id| VertexView {
                id,
                window: self.window.clone(),
            })
            .collect()
    }

    pub fn in_neighbours(&self) -> Vec<VertexView> {
        self.neighbours(Direction::IN)
    }

    pub fn out_neighbours(&self) -> Vec<VertexView> {
        self.neighbours(Direction::OUT)
    }

    pub fn neighbours_ids(&self, direction: Direction) -> Vec<u64> {
        self.window.neighbours_ids(self.id, direction)
    }

    pub fn in_neighbours_ids(&self) -> Vec<u64> {
        self.neighbours_ids(Direction::IN)
    }

    pub fn out_neighbours_ids(&self) -> Vec<u64> {
        self.neighbours_ids(Direction::OUT)
    }

    /// All in-window edge observations incident to this vertex, one
    /// [`EdgeView`] per observation, incoming before outgoing.
    pub fn edges(&self) -> Vec<EdgeView> {
        self.edges_dir(Direction::BOTH)
    }

    pub fn in_edges(&self) -> Vec<EdgeView> {
        self.edges_dir(Direction::IN)
    }

    pub fn out_edges(&self) -> Vec<EdgeView> {
        self.edges_dir(Direction::OUT)
    }

    fn edges_dir(&self, direction: Direction) -> Vec<EdgeView> {
        let window = self.window.clone();
        self.window
            .neighbour_observations_for(self.id, direction)
            .into_iter()
            .map(|e| EdgeView {
                src: e.src,
                dst: e.dst,
                time: e.time,
                is_remote: e.is_remote,
                window: window.clone(),
            })
            .collect()
    }

    /// History of one property within the window, ascending by time.
    pub fn prop(&self, name: &str) -> Vec<(i64, Prop)> {
        let shard = self.window.graph.read_shard(self.window.graph.shard_id(self.id));
        shard.vertex_prop(self.id, name, self.window.start, self.window.end)
    }

    /// Every property name mapped to its in-window history. Names with
    /// no in-window entries are omitted.
    pub fn props(&self) -> HashMap<String, Vec<(i64, Prop)>> {
        let shard = self.window.graph.read_shard(self.window.graph.shard_id(self.id));
        shard.vertex_props(self.id, self.window.start, self.window.end)
    }
}

impl WindowedGraph {
    fn neighbour_observations_for(&self, id: u64, direction: Direction) -> Vec<TemporalEdge> {
        self.graph
            .neighbour_observations(id, direction, self.start, self.end)
    }
}

/// An edge handle bound to one window.
///
/// When built from a vertex's observation list, `time` carries the
/// observation timestamp; when built from [`WindowedGraph::edge`] it is
/// `None` and the view stands for the whole (src, dst) pair.
#[derive(Clone)]
pub struct EdgeView {
    src: u64,
    dst: u64,
    time: Option<i64>,
    is_remote: bool,
    window: WindowedGraph,
}

impl EdgeView {
    pub fn src(&self) -> u64 {
        self.src
    }

    pub fn dst(&self) -> u64 {
        self.dst
    }

    pub fn time(&self) -> Option<i64> {
        self.time
    }

    /// True when the endpoints resolve to different shards.
    pub fn is_remote(&self) -> bool {
        self.is_remote
    }

    pub fn as_temporal(&self) -> TemporalEdge {
        TemporalEdge {
            src: self.src,
            dst: self.dst,
            time: self.time,
            is_remote: self.is_remote,
        }
    }

    /// History of one property of the (src, dst) pair within the window.
    /// Property state lives on the owning source shard.
    pub fn prop(&self, name: &str) -> Vec<(i64, Prop)> {
        let shard = self.window.graph.read_shard(self.window.graph.shard_id(self.src));
        shard.edge_prop(self.src, self.dst, name, self.window.start, self.window.end)
    }

    /// Every property name of the pair mapped to its in-window history.
    pub fn props(&self) -> HashMap<String, Vec<(i64, Prop)>> {
        let shard = self.window.graph.read_shard(self.window.graph.shard_id(self.src));
        shard.edge_props(self.src, self.dst, self.window.start, self.window.end)
    }
}
