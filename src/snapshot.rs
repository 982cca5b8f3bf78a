//! Snapshot persistence.
//!
//! A snapshot is a single file: a fixed magic tag, a format version,
//! then a bincode payload of flat vertex and edge records carrying
//! global ids. Because records are global, a snapshot written with one
//! shard count loads cleanly into any other; shard membership is
//! recomputed from the ids on the way in.
//!
//! Loading never yields a partial store: any header or payload problem
//! maps to [`GraphError::CorruptSnapshot`] and the file's contents are
//! discarded.

use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::index::TemporalIndex;
use crate::props::PropertyStore;
use crate::shard::{EdgeStore, GraphShard, VertexStore};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: [u8; 4] = *b"CHRG";
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct VertexRecord {
    id: u64,
    timestamps: TemporalIndex,
    props: PropertyStore,
}

#[derive(Serialize, Deserialize)]
struct EdgeRecord {
    src: u64,
    dst: u64,
    timestamps: TemporalIndex,
    props: PropertyStore,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    num_shards: u32,
    vertices: Vec<VertexRecord>,
    edges: Vec<EdgeRecord>,
}

fn save_error(e: bincode::Error) -> GraphError {
    match *e {
        bincode::ErrorKind::Io(err) => GraphError::Io(err),
        other => GraphError::CorruptSnapshot(other.to_string()),
    }
}

/// Writes a consistent image of the whole store.
///
/// Read guards are taken on every shard up front and held for the
/// duration of the write, so concurrent writers wait and the image is a
/// single point in time.
pub(crate) fn save_to_file(graph: &Graph, path: &Path) -> Result<()> {
    let guards: Vec<_> = (0..graph.num_shards())
        .map(|i| graph.read_shard(i))
        .collect();

    let mut vertices = Vec::new();
    let mut edges = Vec::new();
    for guard in &guards {
        for (id, vertex) in guard.vertices_iter() {
            vertices.push(VertexRecord {
                id: *id,
                timestamps: vertex.timestamps.clone(),
                props: vertex.props.clone(),
            });
        }
        for ((src, dst), edge) in guard.edges_iter() {
            edges.push(EdgeRecord {
                src: *src,
                dst: *dst,
                timestamps: edge.timestamps.clone(),
                props: edge.props.clone(),
            });
        }
    }

    let snapshot = Snapshot {
        num_shards: graph.num_shards() as u32,
        vertices,
        edges,
    };

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&MAGIC)?;
    writer.write_all(&FORMAT_VERSION.to_be_bytes())?;
    bincode::serialize_into(&mut writer, &snapshot).map_err(save_error)?;
    writer.flush()?;

    log::info!(
        "saved snapshot to {}: {} vertices, {} edge pairs across {} shards",
        path.display(),
        snapshot.vertices.len(),
        snapshot.edges.len(),
        snapshot.num_shards
    );
    Ok(())
}

/// Reconstructs a store from a snapshot file.
///
/// `num_shards` overrides the recorded shard count; records carry
/// global ids, so re-sharding is a pure recomputation of membership.
pub(crate) fn load_from_file(path: &Path, num_shards: Option<usize>) -> Result<Graph> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    read_header(&mut reader, &mut magic)?;
    if magic != MAGIC {
        return Err(GraphError::CorruptSnapshot("bad magic tag".to_string()));
    }
    let mut version = [0u8; 4];
    read_header(&mut reader, &mut version)?;
    let version = u32::from_be_bytes(version);
    if version != FORMAT_VERSION {
        return Err(GraphError::CorruptSnapshot(format!(
            "unsupported format version {version}, expected {FORMAT_VERSION}"
        )));
    }

    let snapshot: Snapshot = bincode::deserialize_from(&mut reader)
        .map_err(|e| GraphError::CorruptSnapshot(e.to_string()))?;

    let n = num_shards.unwrap_or(snapshot.num_shards as usize);
    if n == 0 {
        return Err(GraphError::CorruptSnapshot(
            "snapshot records zero shards".to_string(),
        ));
    }

    let mut shards: Vec<GraphShard> = (0..n).map(|_| GraphShard::default()).collect();
    let shard_of = |id: u64| (id % n as u64) as usize;

    for record in snapshot.vertices {
        let shard = &mut shards[shard_of(record.id)];
        if let Some(t) = record.timestamps.earliest() {
            shard.observe_time(t);
        }
        if let Some(t) = record.timestamps.latest() {
            shard.observe_time(t);
        }
        shard.vertices.insert(
            record.id,
            VertexStore {
                timestamps: record.timestamps,
                props: record.props,
                out: Default::default(),
                inbound: Default::default(),
            },
        );
    }

    let (vertex_count, edge_count) = (
        shards.iter().map(|s| s.vertices.len()).sum::<usize>(),
        snapshot.edges.len(),
    );

    for record in snapshot.edges {
        let src_shard = shard_of(record.src);
        let dst_shard = shard_of(record.dst);

        // Adjacency logs are derived state: replay the pair's
        // observations into both endpoints.
        for t in record.timestamps.iter() {
            shards[src_shard]
                .vertices
                .entry(record.src)
                .or_default()
                .out
                .push(t, record.dst);
            shards[dst_shard]
                .vertices
                .entry(record.dst)
                .or_default()
                .inbound
                .push(t, record.src);
            shards[src_shard].observe_time(t);
            shards[dst_shard].observe_time(t);
        }

        shards[src_shard].edges.insert(
            (record.src, record.dst),
            EdgeStore {
                timestamps: record.timestamps,
                props: record.props,
                remote: src_shard != dst_shard,
            },
        );
    }

    log::info!(
        "loaded snapshot from {}: {} vertices, {} edge pairs into {} shards",
        path.display(),
        vertex_count,
        edge_count,
        n
    );
    Ok(Graph::from_parts(n, shards))
}

fn read_header<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            GraphError::CorruptSnapshot("truncated header".to_string())
        } else {
            GraphError::Io(e)
        }
    })
}
