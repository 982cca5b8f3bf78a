//! The sharded temporal graph store.
//!
//! This module defines the main [`Graph`] type: a partitioned,
//! append-only store of timestamped vertex and edge observations, plus
//! the entry points into the windowed view layer ([`Graph::window`],
//! [`Graph::at`], [`Graph::through`]).
//!
//! # Examples
//!
//! ```rust
//! use chronograph::{Graph, Prop};
//!
//! let g = Graph::new(2);
//! g.add_vertex(0, 1, &[("type".to_string(), Prop::from("wallet"))]);
//! g.add_edge(1, 1, 2, &[("weight".to_string(), Prop::from(9.8))]);
//!
//! assert_eq!(g.len(), 2);
//! assert_eq!(g.edges_len(), 1);
//! assert!(g.window(0, 2).has_edge(1, 2));
//! assert!(!g.window(2, 10).has_edge(1, 2));
//! ```

use crate::error::Result;
use crate::perspective::{GraphWindowSet, IntoPerspectives};
use crate::shard::GraphShard;
use crate::types::{Config, Direction, Prop, TemporalEdge};
use crate::view::{VertexView, WindowedGraph};
use parking_lot::{RwLock, RwLockReadGuard};
use std::hash::Hasher;
use std::path::Path;
use std::sync::Arc;

/// Conversion of caller-supplied vertex references into stable numeric
/// ids.
///
/// Numeric ids pass through unchanged. String names are interned through
/// a deterministic hash, so repeated references to the same name resolve
/// to the same vertex across calls, processes and save/load cycles.
pub trait IntoVertexId {
    fn into_id(self) -> u64;
}

impl IntoVertexId for u64 {
    fn into_id(self) -> u64 {
        self
    }
}

impl IntoVertexId for u32 {
    fn into_id(self) -> u64 {
        self as u64
    }
}

impl IntoVertexId for i64 {
    fn into_id(self) -> u64 {
        self as u64
    }
}

impl IntoVertexId for i32 {
    fn into_id(self) -> u64 {
        self as u64
    }
}

impl IntoVertexId for &str {
    fn into_id(self) -> u64 {
        let mut hasher = rustc_hash::FxHasher::default();
        hasher.write(self.as_bytes());
        hasher.finish()
    }
}

impl IntoVertexId for String {
    fn into_id(self) -> u64 {
        self.as_str().into_id()
    }
}

impl IntoVertexId for &String {
    fn into_id(self) -> u64 {
        self.as_str().into_id()
    }
}

#[derive(Debug)]
pub(crate) struct GraphInner {
    pub(crate) num_shards: usize,
    pub(crate) shards: Vec<RwLock<GraphShard>>,
}

/// Sharded temporal graph store.
///
/// Vertices (and the edges they originate) are partitioned across a
/// fixed number of shards by vertex id. All writes are append-only and
/// shard-local; once written, history is never mutated. The handle is
/// cheaply cloneable and shares the underlying store.
#[derive(Clone, Debug)]
pub struct Graph {
    pub(crate) inner: Arc<GraphInner>,
}

impl Graph {
    /// Creates an empty store partitioned across `num_shards` shards.
    ///
    /// # Panics
    ///
    /// Panics if `num_shards` is zero. Use [`Graph::with_config`] for a
    /// fallible construction path.
    pub fn new(num_shards: usize) -> Self {
        assert!(num_shards > 0, "num_shards must be greater than zero");
        Self::from_parts(num_shards, (0..num_shards).map(|_| GraphShard::default()))
    }

    /// Creates an empty store from a validated [`Config`].
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.num_shards))
    }

    pub(crate) fn from_parts(
        num_shards: usize,
        shards: impl IntoIterator<Item = GraphShard>,
    ) -> Self {
        Graph {
            inner: Arc::new(GraphInner {
                num_shards,
                shards: shards.into_iter().map(RwLock::new).collect(),
            }),
        }
    }

    /// Number of shards this store was built with.
    pub fn num_shards(&self) -> usize {
        self.inner.num_shards
    }

    /// Shard membership is a pure function of vertex id, fixed for the
    /// store's lifetime.
    #[inline]
    pub(crate) fn shard_id(&self, id: u64) -> usize {
        (id % self.inner.num_shards as u64) as usize
    }

    #[inline]
    pub(crate) fn read_shard(&self, idx: usize) -> RwLockReadGuard<'_, GraphShard> {
        self.inner.shards[idx].read()
    }

    pub(crate) fn is_remote_pair(&self, src: u64, dst: u64) -> bool {
        self.shard_id(src) != self.shard_id(dst)
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Asserts existence of vertex `v` at time `t` and appends `props`
    /// to its property history, creating the vertex if absent.
    pub fn add_vertex<V: IntoVertexId>(&self, t: i64, v: V, props: &[(String, Prop)]) {
        let id = v.into_id();
        let shard = self.shard_id(id);
        self.inner.shards[shard].write().add_vertex(t, id, props);
    }

    /// Like [`Graph::add_vertex`] with dynamic JSON property values.
    ///
    /// All values are validated against the supported primitive set
    /// before anything is written, so a rejected value leaves the vertex
    /// untouched.
    pub fn add_vertex_json<V: IntoVertexId>(
        &self,
        t: i64,
        v: V,
        props: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        let props = convert_json_props(props)?;
        self.add_vertex(t, v, &props);
        Ok(())
    }

    /// Appends an edge observation (src, dst, t) and appends `props` to
    /// the edge's property history. Missing endpoints are created
    /// implicitly, asserting their existence at `t`.
    pub fn add_edge<S: IntoVertexId, D: IntoVertexId>(
        &self,
        t: i64,
        src: S,
        dst: D,
        props: &[(String, Prop)],
    ) {
        let src = src.into_id();
        let dst = dst.into_id();
        let src_shard = self.shard_id(src);
        let dst_shard = self.shard_id(dst);

        if src_shard == dst_shard {
            self.inner.shards[src_shard]
                .write()
                .add_edge_local(t, src, dst, props);
        } else {
            // Two sequential shard-local writes: the authoritative half
            // on the source shard, the referencing half on the
            // destination shard.
            self.inner.shards[src_shard]
                .write()
                .add_edge_out(t, src, dst, props);
            self.inner.shards[dst_shard].write().add_edge_in(t, src, dst);
        }
    }

    /// Like [`Graph::add_edge`] with dynamic JSON property values,
    /// validated before anything is written.
    pub fn add_edge_json<S: IntoVertexId, D: IntoVertexId>(
        &self,
        t: i64,
        src: S,
        dst: D,
        props: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        let props = convert_json_props(props)?;
        self.add_edge(t, src, dst, &props);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Unwindowed queries (entire history)
    // ------------------------------------------------------------------

    /// Distinct vertex count over the entire history.
    pub fn len(&self) -> usize {
        (0..self.inner.num_shards)
            .map(|i| self.read_shard(i).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct (src, dst) edge-pair count over the entire history,
    /// independent of how many temporal observations exist per pair.
    pub fn edges_len(&self) -> usize {
        (0..self.inner.num_shards)
            .map(|i| self.read_shard(i).edges_len())
            .sum()
    }

    pub fn has_vertex<V: IntoVertexId>(&self, v: V) -> bool {
        let id = v.into_id();
        self.read_shard(self.shard_id(id)).has_vertex(id)
    }

    pub fn has_edge<S: IntoVertexId, D: IntoVertexId>(&self, src: S, dst: D) -> bool {
        let src = src.into_id();
        let dst = dst.into_id();
        self.read_shard(self.shard_id(src)).has_edge(src, dst)
    }

    /// The vertex view over the entire history, or `None` if the vertex
    /// was never observed.
    pub fn vertex<V: IntoVertexId>(&self, v: V) -> Option<VertexView> {
        self.full_view().vertex(v)
    }

    /// The edge view over the entire history, or `None` if no (src, dst)
    /// observation exists.
    pub fn edge<S: IntoVertexId, D: IntoVertexId>(
        &self,
        src: S,
        dst: D,
    ) -> Option<crate::view::EdgeView> {
        self.full_view().edge(src, dst)
    }

    /// All vertices over the entire history, shard order. The order is
    /// stable for a fixed store instance but not globally sorted.
    ///
    /// Iteration goes through the full view `[i64::MIN, i64::MAX)`, so
    /// a vertex whose only observation sits at exactly `i64::MAX` is
    /// counted by [`Graph::len`] but not yielded here.
    pub fn vertices(&self) -> impl Iterator<Item = VertexView> + use<> {
        self.full_view().vertices()
    }

    /// All vertex ids, shard order.
    pub fn vertex_ids(&self) -> Vec<u64> {
        (0..self.inner.num_shards)
            .flat_map(|i| self.read_shard(i).vertex_ids())
            .collect()
    }

    /// Degree of `v` over the entire history. Counts temporal edge
    /// observations per direction; `BOTH` is the sum of `IN` and `OUT`,
    /// with a self-loop observation contributing once to each.
    ///
    /// "Entire history" is the full view `[i64::MIN, i64::MAX)`; an
    /// observation at exactly `i64::MAX` does not contribute.
    pub fn degree<V: IntoVertexId>(&self, v: V, direction: Direction) -> usize {
        self.degree_window(v.into_id(), direction, i64::MIN, i64::MAX)
    }

    /// Temporal edge observations incident to `v` over the entire
    /// history.
    pub fn neighbours<V: IntoVertexId>(
        &self,
        v: V,
        direction: Direction,
    ) -> impl Iterator<Item = TemporalEdge> + use<V> {
        self.neighbour_observations(v.into_id(), direction, i64::MIN, i64::MAX)
            .into_iter()
    }

    // ------------------------------------------------------------------
    // Views and perspectives
    // ------------------------------------------------------------------

    /// A read-only view restricted to the half-open interval
    /// `[start, end)`. An empty or inverted interval yields an empty
    /// view, not an error.
    pub fn window(&self, start: i64, end: i64) -> WindowedGraph {
        WindowedGraph::new(self.clone(), start, end)
    }

    /// Cumulative state as of and including time `t`: equivalent to
    /// `window(i64::MIN, t + 1)`.
    pub fn at(&self, t: i64) -> WindowedGraph {
        self.window(i64::MIN, t.saturating_add(1))
    }

    pub(crate) fn full_view(&self) -> WindowedGraph {
        self.window(i64::MIN, i64::MAX)
    }

    /// Builds one windowed view per perspective, lazily and in order.
    ///
    /// Accepts an explicit sequence of [`Perspective`]s or a
    /// [`PerspectiveSet`]; unbounded set parameters are resolved against
    /// the store's [`Graph::timeline`] when iteration begins.
    ///
    /// [`Perspective`]: crate::perspective::Perspective
    /// [`PerspectiveSet`]: crate::perspective::PerspectiveSet
    pub fn through<P: IntoPerspectives>(&self, perspectives: P) -> GraphWindowSet {
        GraphWindowSet::new(
            self.clone(),
            perspectives.into_perspectives(self.timeline()),
        )
    }

    /// The (earliest, latest) timestamp pair over all ingested
    /// observations, or `None` for an empty store.
    pub fn timeline(&self) -> Option<(i64, i64)> {
        let earliest = self.earliest_time()?;
        let latest = self.latest_time()?;
        Some((earliest, latest))
    }

    pub fn earliest_time(&self) -> Option<i64> {
        (0..self.inner.num_shards)
            .filter_map(|i| self.read_shard(i).earliest_time())
            .min()
    }

    pub fn latest_time(&self) -> Option<i64> {
        (0..self.inner.num_shards)
            .filter_map(|i| self.read_shard(i).latest_time())
            .max()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serializes a consistent point-in-time image of the whole store.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::snapshot::save_to_file(self, path.as_ref())
    }

    /// Reconstructs an independent store from a snapshot, keeping the
    /// shard count the snapshot was written with.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Graph> {
        crate::snapshot::load_from_file(path.as_ref(), None)
    }

    /// Like [`Graph::load_from_file`], re-sharding deterministically to
    /// the shard count requested by `config`.
    pub fn load_from_file_with_config<P: AsRef<Path>>(path: P, config: Config) -> Result<Graph> {
        config.validate()?;
        crate::snapshot::load_from_file(path.as_ref(), Some(config.num_shards))
    }

    // ------------------------------------------------------------------
    // Windowed internals shared with the view layer
    // ------------------------------------------------------------------

    pub(crate) fn degree_window(
        &self,
        id: u64,
        direction: Direction,
        start: i64,
        end: i64,
    ) -> usize {
        let shard = self.read_shard(self.shard_id(id));
        match direction {
            Direction::OUT => shard.out_degree_window(id, start, end),
            Direction::IN => shard.in_degree_window(id, start, end),
            Direction::BOTH => {
                shard.in_degree_window(id, start, end) + shard.out_degree_window(id, start, end)
            }
        }
    }

    /// Incident observations of `id` in `[start, end)`: incoming first,
    /// then outgoing, each ascending by time.
    pub(crate) fn neighbour_observations(
        &self,
        id: u64,
        direction: Direction,
        start: i64,
        end: i64,
    ) -> Vec<TemporalEdge> {
        let shard = self.read_shard(self.shard_id(id));
        let mut result = Vec::new();

        if matches!(direction, Direction::IN | Direction::BOTH) {
            for (t, src) in shard.in_observations(id, start, end) {
                result.push(TemporalEdge {
                    src,
                    dst: id,
                    time: Some(t),
                    is_remote: self.is_remote_pair(src, id),
                });
            }
        }
        if matches!(direction, Direction::OUT | Direction::BOTH) {
            for (t, dst) in shard.out_observations(id, start, end) {
                result.push(TemporalEdge {
                    src: id,
                    dst,
                    time: Some(t),
                    is_remote: self.is_remote_pair(id, dst),
                });
            }
        }
        result
    }
}

fn convert_json_props(
    props: &serde_json::Map<String, serde_json::Value>,
) -> Result<Vec<(String, Prop)>> {
    props
        .iter()
        .map(|(name, value)| Ok((name.clone(), Prop::from_json(name, value)?)))
        .collect()
}
