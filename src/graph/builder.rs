use std::collections::HashSet;

use super::types::{Graph, Link, Node, NodeId, Point};

/// Accumulates nodes and links while a table is being read.
///
/// Nodes are unique by id; the first occurrence wins and later ones are
/// ignored, including their position.
#[derive(Debug, Default)]
pub struct GraphBuilder {
	nodes: Vec<Node>,
	seen: HashSet<NodeId>,
	links: Vec<Link>,
}

impl GraphBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Create `id` if it is new. `place` is only called for new nodes.
	pub fn ensure_node(&mut self, id: &NodeId, place: impl FnOnce() -> Point) -> bool {
		if self.seen.contains(id) {
			return false;
		}
		self.seen.insert(id.clone());
		self.nodes.push(Node::new(id.clone(), place()));
		true
	}

	/// Push `count` parallel copies of `link`.
	pub fn push_links(&mut self, link: Link, count: usize) {
		self.links.extend(std::iter::repeat_n(link, count));
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn build(self) -> Graph {
		Graph::from_parts(self.nodes, self.links)
	}
}
