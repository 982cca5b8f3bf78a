//! Embedded temporal graph store with sharded storage, windowed views,
//! and perspective sweeps.
//!
//! ```rust
//! use chronograph::{Graph, Prop, algorithms};
//!
//! let g = Graph::new(2);
//! g.add_edge(1, 1, 2, &[("weight".to_string(), Prop::from(1))]);
//! g.add_edge(2, 2, 3, &[]);
//! g.add_edge(3, 3, 1, &[]);
//!
//! let view = g.window(0, 4);
//! assert_eq!(algorithms::local_triangle_count(&view, 1), 1);
//! assert_eq!(algorithms::directed_graph_density(&view), 0.5);
//! ```

pub mod algorithms;
pub mod error;
pub mod graph;
pub mod index;
pub mod perspective;
pub mod props;
pub mod types;
pub mod view;

mod shard;
mod snapshot;

pub use error::{GraphError, Result};
pub use graph::{Graph, IntoVertexId};

pub use types::{Config, Direction, Prop, TemporalEdge};

pub use view::{EdgeView, VertexView, WindowedGraph};

pub use perspective::{GraphWindowSet, IntoPerspectives, Perspective, PerspectiveSet};

pub use index::TemporalIndex;

pub use props::PropertyStore;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Graph, GraphError, IntoVertexId, Result};

    pub use crate::{Config, Direction, Prop, TemporalEdge};

    pub use crate::{EdgeView, VertexView, WindowedGraph};

    pub use crate::{GraphWindowSet, Perspective, PerspectiveSet};

    pub use crate::algorithms::{
        average_degree, directed_graph_density, local_clustering_coefficient,
        local_triangle_count,
    };
}
