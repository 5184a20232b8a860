//! genelink-common — Shared graph components, CURIE utilities, and errors
//! used across the genelink crates.

pub mod curie;
pub mod error;
pub mod graph;
pub mod http;

// Re-export commonly used types
pub use error::{GenelinkError, Result};
pub use graph::{Edge, Node, Relation};
