//! Shard-local graph storage.
//!
//! A [`GraphShard`] owns the vertices assigned to it and the edges those
//! vertices originate (src-owned). Every mutation is shard-local and
//! append-only: vertex existence logs, adjacency observation logs and
//! property histories only ever grow. For an edge whose endpoints live in
//! different shards, the source shard holds the authoritative edge store
//! and the destination shard holds only referencing in-adjacency.

use crate::index::TemporalIndex;
use crate::props::PropertyStore;
use crate::types::Prop;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One directed adjacency observation scanned by degree and neighbour
/// queries. `peer` is the opposite endpoint of the observation.
pub(crate) type AdjacencyObs = (i64, u64);

/// Time-sorted log of adjacency observations for one direction of one
/// vertex. Window queries truncate at the boundaries like the
/// [`TemporalIndex`] does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct AdjacencyLog {
    obs: Vec<AdjacencyObs>,
}

impl AdjacencyLog {
    pub(crate) fn push(&mut self, t: i64, peer: u64) {
        let at = self.obs.partition_point(|&(x, _)| x <= t);
        self.obs.insert(at, (t, peer));
    }

    pub(crate) fn count_in(&self, start: i64, end: i64) -> usize {
        self.range(start, end).len()
    }

    pub(crate) fn range(&self, start: i64, end: i64) -> &[AdjacencyObs] {
        if start >= end {
            return &[];
        }
        let lo = self.obs.partition_point(|&(t, _)| t < start);
        let hi = self.obs.partition_point(|&(t, _)| t < end);
        &self.obs[lo..hi]
    }
}

/// Storage for one vertex: existence log, property history and the
/// in/out adjacency observation logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct VertexStore {
    pub(crate) timestamps: TemporalIndex,
    pub(crate) props: PropertyStore,
    pub(crate) out: AdjacencyLog,
    pub(crate) inbound: AdjacencyLog,
}

/// Authoritative storage for one distinct (src, dst) edge pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct EdgeStore {
    pub(crate) timestamps: TemporalIndex,
    pub(crate) props: PropertyStore,
    /// Set when src and dst resolve to different shards.
    pub(crate) remote: bool,
}

/// One shard of the partitioned store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct GraphShard {
    pub(crate) vertices: FxHashMap<u64, VertexStore>,
    /// Edges originating at a vertex owned by this shard, keyed by
    /// (src, dst). One entry per distinct pair regardless of how many
    /// observations exist.
    pub(crate) edges: FxHashMap<(u64, u64), EdgeStore>,
    earliest: Option<i64>,
    latest: Option<i64>,
}

impl GraphShard {
    pub(crate) fn observe_time(&mut self, t: i64) {
        self.earliest = Some(self.earliest.map_or(t, |e| e.min(t)));
        self.latest = Some(self.latest.map_or(t, |l| l.max(t)));
    }

    fn vertex_mut(&mut self, id: u64) -> &mut VertexStore {
        self.vertices.entry(id).or_default()
    }

    /// Asserts existence of `id` at `t` and appends its properties.
    pub(crate) fn add_vertex(&mut self, t: i64, id: u64, props: &[(String, Prop)]) {
        self.observe_time(t);
        let vertex = self.vertex_mut(id);
        vertex.timestamps.push(t);
        vertex.props.append_all(t, props);
    }

    /// Records an edge observation whose endpoints both live in this
    /// shard. Creates missing endpoints implicitly, asserting their
    /// existence at `t`.
    pub(crate) fn add_edge_local(&mut self, t: i64, src: u64, dst: u64, props: &[(String, Prop)]) {
        self.observe_time(t);
        {
            let v = self.vertex_mut(src);
            v.timestamps.push(t);
            v.out.push(t, dst);
        }
        {
            let v = self.vertex_mut(dst);
            v.timestamps.push(t);
            v.inbound.push(t, src);
        }
        let edge = self.edges.entry((src, dst)).or_default();
        edge.timestamps.push(t);
        edge.props.append_all(t, props);
    }

    /// Records the owning (source) half of a cross-shard edge.
    pub(crate) fn add_edge_out(&mut self, t: i64, src: u64, dst: u64, props: &[(String, Prop)]) {
        self.observe_time(t);
        let v = self.vertex_mut(src);
        v.timestamps.push(t);
        v.out.push(t, dst);

        let edge = self.edges.entry((src, dst)).or_default();
        edge.remote = true;
        edge.timestamps.push(t);
        edge.props.append_all(t, props);
    }

    /// Records the referencing (destination) half of a cross-shard edge.
    /// No authoritative edge state is kept on this side.
    pub(crate) fn add_edge_in(&mut self, t: i64, src: u64, dst: u64) {
        self.observe_time(t);
        let v = self.vertex_mut(dst);
        v.timestamps.push(t);
        v.inbound.push(t, src);
    }

    /// Distinct vertices owned by this shard.
    pub(crate) fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Vertices with at least one existence observation in `[start, end)`.
    pub(crate) fn len_window(&self, start: i64, end: i64) -> usize {
        self.vertices
            .values()
            .filter(|v| v.timestamps.active_in(start, end))
            .count()
    }

    /// Distinct (src, dst) pairs owned by this shard.
    pub(crate) fn edges_len(&self) -> usize {
        self.edges.len()
    }

    /// Distinct owned pairs with at least one observation in `[start, end)`.
    pub(crate) fn edges_len_window(&self, start: i64, end: i64) -> usize {
        self.edges
            .values()
            .filter(|e| e.timestamps.active_in(start, end))
            .count()
    }

    pub(crate) fn has_vertex(&self, id: u64) -> bool {
        self.vertices.contains_key(&id)
    }

    pub(crate) fn has_vertex_window(&self, id: u64, start: i64, end: i64) -> bool {
        self.vertices
            .get(&id)
            .is_some_and(|v| v.timestamps.active_in(start, end))
    }

    pub(crate) fn has_edge(&self, src: u64, dst: u64) -> bool {
        self.edges.contains_key(&(src, dst))
    }

    pub(crate) fn has_edge_window(&self, src: u64, dst: u64, start: i64, end: i64) -> bool {
        self.edges
            .get(&(src, dst))
            .is_some_and(|e| e.timestamps.active_in(start, end))
    }

    pub(crate) fn edge_is_remote(&self, src: u64, dst: u64) -> Option<bool> {
        self.edges.get(&(src, dst)).map(|e| e.remote)
    }

    /// Vertex ids owned by this shard, map iteration order.
    pub(crate) fn vertex_ids(&self) -> Vec<u64> {
        self.vertices.keys().copied().collect()
    }

    /// Vertex ids active in `[start, end)`, map iteration order.
    pub(crate) fn vertex_ids_window(&self, start: i64, end: i64) -> Vec<u64> {
        self.vertices
            .iter()
            .filter(|(_, v)| v.timestamps.active_in(start, end))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Observation counts per direction; the caller combines them for
    /// `Direction::BOTH`.
    pub(crate) fn out_degree_window(&self, id: u64, start: i64, end: i64) -> usize {
        self.vertices
            .get(&id)
            .map_or(0, |v| v.out.count_in(start, end))
    }

    pub(crate) fn in_degree_window(&self, id: u64, start: i64, end: i64) -> usize {
        self.vertices
            .get(&id)
            .map_or(0, |v| v.inbound.count_in(start, end))
    }

    /// Outgoing observations of `id` within the window: `(t, dst)`.
    pub(crate) fn out_observations(&self, id: u64, start: i64, end: i64) -> Vec<AdjacencyObs> {
        self.vertices
            .get(&id)
            .map_or_else(Vec::new, |v| v.out.range(start, end).to_vec())
    }

    /// Incoming observations of `id` within the window: `(t, src)`.
    pub(crate) fn in_observations(&self, id: u64, start: i64, end: i64) -> Vec<AdjacencyObs> {
        self.vertices
            .get(&id)
            .map_or_else(Vec::new, |v| v.inbound.range(start, end).to_vec())
    }

    pub(crate) fn vertex_prop(
        &self,
        id: u64,
        name: &str,
        start: i64,
        end: i64,
    ) -> Vec<(i64, Prop)> {
        self.vertices
            .get(&id)
            .map_or_else(Vec::new, |v| v.props.prop_window(name, start, end))
    }

    pub(crate) fn vertex_props(
        &self,
        id: u64,
        start: i64,
        end: i64,
    ) -> std::collections::HashMap<String, Vec<(i64, Prop)>> {
        self.vertices
            .get(&id)
            .map_or_else(Default::default, |v| v.props.props_window(start, end))
    }

    pub(crate) fn edge_prop(
        &self,
        src: u64,
        dst: u64,
        name: &str,
        start: i64,
        end: i64,
    ) -> Vec<(i64, Prop)> {
        self.edges
            .get(&(src, dst))
            .map_or_else(Vec::new, |e| e.props.prop_window(name, start, end))
    }

    pub(crate) fn edge_props(
        &self,
        src: u64,
        dst: u64,
        start: i64,
        end: i64,
    ) -> std::collections::HashMap<String, Vec<(i64, Prop)>> {
        self.edges
            .get(&(src, dst))
            .map_or_else(Default::default, |e| e.props.props_window(start, end))
    }

    pub(crate) fn earliest_time(&self) -> Option<i64> {
        self.earliest
    }

    pub(crate) fn latest_time(&self) -> Option<i64> {
        self.latest
    }

    /// Iterates owned vertices for snapshotting.
    pub(crate) fn vertices_iter(&self) -> impl Iterator<Item = (&u64, &VertexStore)> {
        self.vertices.iter()
    }

    /// Iterates owned edges for snapshotting.
    pub(crate) fn edges_iter(&self) -> impl Iterator<Item = (&(u64, u64), &EdgeStore)> {
        self.edges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_props() -> Vec<(String, Prop)> {
        Vec::new()
    }

    #[test]
    fn test_add_vertex_creates_and_grows() {
        let mut shard = GraphShard::default();
        shard.add_vertex(0, 1, &no_props());
        shard.add_vertex(5, 1, &no_props());

        assert_eq!(shard.len(), 1);
        assert!(shard.has_vertex(1));
        assert!(shard.has_vertex_window(1, 0, 1));
        assert!(shard.has_vertex_window(1, 5, 6));
        assert!(!shard.has_vertex_window(1, 1, 5));
    }

    #[test]
    fn test_local_edge_creates_endpoints() {
        let mut shard = GraphShard::default();
        shard.add_edge_local(2, 1, 3, &no_props());

        assert_eq!(shard.len(), 2);
        assert_eq!(shard.edges_len(), 1);
        assert!(shard.has_vertex_window(3, 2, 3));
        assert!(shard.has_edge(1, 3));
        assert_eq!(shard.edge_is_remote(1, 3), Some(false));
    }

    #[test]
    fn test_parallel_observations_count_once_in_edges_len() {
        let mut shard = GraphShard::default();
        shard.add_edge_local(0, 1, 1, &no_props());
        shard.add_edge_local(1, 1, 1, &no_props());

        assert_eq!(shard.edges_len(), 1);
        // but both observations are visible to degree queries
        assert_eq!(shard.out_degree_window(1, i64::MIN, i64::MAX), 2);
        assert_eq!(shard.in_degree_window(1, i64::MIN, i64::MAX), 2);
    }

    #[test]
    fn test_windowed_degree_truncates() {
        let mut shard = GraphShard::default();
        shard.add_edge_local(1, 1, 2, &no_props());
        shard.add_edge_local(4, 1, 2, &no_props());
        shard.add_edge_local(9, 1, 3, &no_props());

        assert_eq!(shard.out_degree_window(1, 0, 5), 2);
        assert_eq!(shard.out_degree_window(1, 0, 10), 3);
        assert_eq!(shard.out_degree_window(1, 5, 5), 0);
        assert_eq!(shard.in_degree_window(2, 0, 5), 2);
    }

    #[test]
    fn test_remote_halves() {
        let mut src_shard = GraphShard::default();
        let mut dst_shard = GraphShard::default();

        src_shard.add_edge_out(3, 1, 2, &no_props());
        dst_shard.add_edge_in(3, 1, 2);

        assert!(src_shard.has_edge(1, 2));
        assert_eq!(src_shard.edge_is_remote(1, 2), Some(true));
        assert_eq!(src_shard.edges_len(), 1);
        // referencing side owns no edge pair, only in-adjacency
        assert!(!dst_shard.has_edge(1, 2));
        assert_eq!(dst_shard.edges_len(), 0);
        assert_eq!(dst_shard.in_degree_window(2, i64::MIN, i64::MAX), 1);
    }

    #[test]
    fn test_edge_observations_in_window() {
        let mut shard = GraphShard::default();
        shard.add_edge_local(1, 1, 2, &no_props());
        shard.add_edge_local(7, 3, 2, &no_props());

        let incoming = shard.in_observations(2, 0, 10);
        assert_eq!(incoming, vec![(1, 1), (7, 3)]);
        let incoming = shard.in_observations(2, 0, 7);
        assert_eq!(incoming, vec![(1, 1)]);
    }

    #[test]
    fn test_shard_timeline() {
        let mut shard = GraphShard::default();
        assert_eq!(shard.earliest_time(), None);

        shard.add_vertex(4, 1, &no_props());
        shard.add_edge_local(-2, 1, 2, &no_props());
        assert_eq!(shard.earliest_time(), Some(-2));
        assert_eq!(shard.latest_time(), Some(4));
    }

    #[test]
    fn test_edge_props_window() {
        let mut shard = GraphShard::default();
        let props = vec![("prop1".to_string(), Prop::I64(1))];
        shard.add_edge_local(0, 1, 2, &props);
        shard.add_edge_local(1, 1, 2, &props);

        assert_eq!(
            shard.edge_prop(1, 2, "prop1", i64::MIN, i64::MAX),
            vec![(0, Prop::I64(1)), (1, Prop::I64(1))]
        );
        assert_eq!(
            shard.edge_prop(1, 2, "prop1", 1, 2),
            vec![(1, Prop::I64(1))]
        );
    }
}
