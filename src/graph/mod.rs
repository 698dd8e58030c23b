//! In-memory node/link model shared by the ingestor, the shell and the canvas.

mod builder;
mod types;

pub use builder::GraphBuilder;
pub use types::{Graph, Link, Node, NodeId, Point};
