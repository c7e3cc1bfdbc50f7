//! bm-graph: the reservoir/flux store of a box model.
//!
//! Provides:
//! - Reservoirs (mass stocks) keyed by caller-assigned integers
//! - Directed fluxes carrying a caller-chosen flow payload
//! - Reference validation and key-to-column indexing for the integrator
//! - Graphviz DOT export
//!
//! # Example
//!
//! ```
//! use bm_graph::ModelGraph;
//!
//! let mut graph: ModelGraph<f64> = ModelGraph::new();
//! graph.add_reservoir(1, "ocean", 100.0).unwrap();
//! graph.add_reservoir(2, "sediment", 0.0).unwrap();
//! graph.add_flux(1, 2, 5.0, "burial").unwrap();
//! graph.validate().unwrap();
//!
//! // the external reservoir (key 0) is always present
//! assert_eq!(graph.reservoirs().len(), 3);
//! assert_eq!(graph.fluxes().len(), 1);
//! ```

pub mod dot;
pub mod error;
pub mod graph;
pub mod indexing;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use dot::to_dot;
pub use error::{GraphError, GraphResult};
pub use graph::{DEFAULT_INITIAL_MASS, EXTERNAL_NAME, Flux, ModelGraph, Reservoir};
pub use indexing::ColumnMap;
