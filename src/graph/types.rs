use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifier of a node, unique within a [`Graph`].
///
/// Spreadsheet cells may hold numbers where labels are expected; those are
/// normalized to their textual form before they become ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		Self(id.to_owned())
	}
}

impl From<String> for NodeId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<usize> for NodeId {
	fn from(id: usize) -> Self {
		Self(id.to_string())
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	/// Initial position handed to the layout engine.
	pub x: f64,
	pub y: f64,
	/// Pinned position; overrides the simulated one while set.
	pub fixed: Option<Point>,
}

impl Node {
	pub fn new(id: impl Into<NodeId>, at: Point) -> Self {
		Self {
			id: id.into(),
			x: at.x,
			y: at.y,
			fixed: None,
		}
	}

	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}
}

/// A directed link. Multiplicity is expressed by repeating links, the
/// optional weight only carries the scaled cell value of adjacency tables.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	pub source: NodeId,
	pub target: NodeId,
	pub weight: Option<f64>,
}

impl Link {
	pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			weight: None,
		}
	}

	pub fn with_weight(mut self, weight: f64) -> Self {
		self.weight = Some(weight);
		self
	}
}

/// Node and link collections held by the view shell.
///
/// `epoch` changes only on wholesale replacement, so views can tell a
/// freshly loaded graph apart from an incremental edit of the current one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	epoch: u64,
	nodes: Vec<Node>,
	links: Vec<Link>,
}

impl Graph {
	pub(super) fn from_parts(nodes: Vec<Node>, links: Vec<Link>) -> Self {
		Self {
			epoch: 0,
			nodes,
			links,
		}
	}

	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.links.is_empty()
	}

	pub fn contains(&self, id: &NodeId) -> bool {
		self.nodes.iter().any(|n| &n.id == id)
	}

	/// Swap in a whole new graph.
	pub fn replace(&mut self, next: Graph) {
		self.nodes = next.nodes;
		self.links = next.links;
		self.epoch = self.epoch.wrapping_add(1);
	}

	/// Append a node unless its id is already taken.
	pub fn append_node(&mut self, node: Node) -> bool {
		if self.contains(&node.id) {
			return false;
		}
		self.nodes.push(node);
		true
	}

	/// Append a link between two existing nodes.
	pub fn append_link(&mut self, link: Link) -> bool {
		if !self.contains(&link.source) || !self.contains(&link.target) {
			return false;
		}
		self.links.push(link);
		true
	}

	/// Numeric id for a manually added node: one past the node count,
	/// skipping ids already taken by ingested labels.
	pub fn next_numeric_id(&self) -> NodeId {
		let mut candidate = self.nodes.len() + 1;
		loop {
			let id = NodeId::from(candidate);
			if !self.contains(&id) {
				return id;
			}
			candidate += 1;
		}
	}

	pub fn node_ids(&self) -> BTreeSet<NodeId> {
		self.nodes.iter().map(|n| n.id.clone()).collect()
	}

	/// Count of links per ordered `(source, target)` pair.
	pub fn link_multiset(&self) -> BTreeMap<(NodeId, NodeId), usize> {
		let mut pairs = BTreeMap::new();
		for link in &self.links {
			*pairs
				.entry((link.source.clone(), link.target.clone()))
				.or_insert(0) += 1;
		}
		pairs
	}
}
