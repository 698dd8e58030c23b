use log::debug;

use super::config::{DragEndBehavior, LayoutConfig};
use super::simulation::Simulation;
use crate::graph::{Graph, NodeId, Point};

pub const NODE_RADIUS: f64 = 5.0;
pub const HIT_RADIUS: f64 = 12.0;
/// Pointer travel below which a press and release on a node is a click.
pub const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
	pub moved: bool,
}

/// One node as it should be drawn this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameNode<'a> {
	pub id: &'a NodeId,
	pub at: Point,
	pub pinned: bool,
}

/// Everything the renderer needs after a simulation step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame<'a> {
	pub nodes: Vec<FrameNode<'a>>,
	pub links: Vec<(Point, Point)>,
}

pub struct ForceGraphState {
	pub sim: Simulation,
	pub config: LayoutConfig,
	pub drag: DragState,
	pub width: f64,
	pub height: f64,
	epoch: u64,
}

impl ForceGraphState {
	pub fn new(data: &Graph, config: LayoutConfig, width: f64, height: f64) -> Self {
		Self {
			sim: Simulation::new(data, config.force_params(width, height)),
			config,
			drag: DragState::default(),
			width,
			height,
			epoch: data.epoch(),
		}
	}

	/// Follow a change of the shell's graph: an edit of the same graph keeps
	/// the current layout, a newly loaded graph starts over.
	pub fn load(&mut self, data: &Graph) {
		if data.epoch() == self.epoch {
			self.sim.sync(data);
		} else {
			debug!("new graph loaded, restarting layout");
			*self = Self::new(data, self.config.clone(), self.width, self.height);
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.sim.set_center(self.config.center(width, height));
	}

	pub fn tick(&mut self) -> bool {
		self.sim.tick()
	}

	/// Where a node is drawn: its layout position, kept inside the canvas
	/// when the presentation clamps to bounds.
	pub fn display_position(&self, idx: usize) -> Point {
		let p = self.sim.position(idx);
		if !self.config.clamp_to_bounds {
			return p;
		}
		Point::new(
			p.x.clamp(NODE_RADIUS, (self.width - NODE_RADIUS).max(NODE_RADIUS)),
			p.y.clamp(NODE_RADIUS, (self.height - NODE_RADIUS).max(NODE_RADIUS)),
		)
	}

	pub fn frame(&self) -> Frame<'_> {
		let nodes = (0..self.sim.len())
			.map(|idx| FrameNode {
				id: self.sim.id(idx),
				at: self.display_position(idx),
				pinned: self.sim.pin_of(idx).is_some(),
			})
			.collect::<Vec<_>>();
		let links = self
			.sim
			.links()
			.map(|(s, t)| (nodes[s].at, nodes[t].at))
			.collect();
		Frame { nodes, links }
	}

	/// Topmost node under the canvas point, if any.
	pub fn node_at_position(&self, x: f64, y: f64) -> Option<usize> {
		let pointer = Point::new(x, y);
		(0..self.sim.len())
			.rev()
			.find(|&idx| self.display_position(idx).distance(pointer) < HIT_RADIUS)
	}

	/// Reheat the layout and pin the node where it currently is.
	pub fn drag_start(&mut self, idx: usize, x: f64, y: f64) {
		self.sim.reheat(self.config.drag_reheat_target);
		let at = self.sim.position(idx);
		self.sim.pin(idx, at);
		self.drag = DragState {
			active: true,
			node_idx: Some(idx),
			start_x: x,
			start_y: y,
			node_start: at,
			moved: false,
		};
	}

	/// Move the pin along with the pointer.
	pub fn drag_move(&mut self, x: f64, y: f64) {
		let Some(idx) = self.drag.node_idx.filter(|_| self.drag.active) else {
			return;
		};
		let (dx, dy) = (x - self.drag.start_x, y - self.drag.start_y);
		if (dx * dx + dy * dy).sqrt() > CLICK_SLOP {
			self.drag.moved = true;
		}
		let at = Point::new(self.drag.node_start.x + dx, self.drag.node_start.y + dy);
		self.sim.pin(idx, at);
	}

	/// Finish a drag. Returns the node if the gesture was a click rather
	/// than a move.
	pub fn drag_end(&mut self, drag_end_enabled: bool) -> Option<usize> {
		let drag = std::mem::take(&mut self.drag);
		let idx = drag.node_idx.filter(|_| drag.active)?;

		match self.config.release_behavior(drag_end_enabled) {
			DragEndBehavior::Release => {
				self.sim.set_alpha_target(0.0);
				self.sim.unpin(idx);
			}
			DragEndBehavior::SlowCool { target, decay } => {
				self.sim.set_alpha_target(target);
				self.sim.set_alpha_decay(decay);
				self.sim.unpin(idx);
			}
			DragEndBehavior::PinForever => {}
		}
		(!drag.moved).then_some(idx)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::config::Presentation;
	use crate::graph::{GraphBuilder, Link};

	fn linked_pair() -> Graph {
		let mut builder = GraphBuilder::new();
		builder.ensure_node(&"A".into(), || Point::new(380.0, 300.0));
		builder.ensure_node(&"B".into(), || Point::new(420.0, 300.0));
		builder.push_links(Link::new("A", "B"), 1);
		builder.build()
	}

	fn state(presentation: Presentation) -> ForceGraphState {
		ForceGraphState::new(&linked_pair(), presentation.config(), 800.0, 600.0)
	}

	#[test]
	fn finds_node_under_pointer() {
		let s = state(Presentation::Standard);
		assert_eq!(s.node_at_position(382.0, 301.0), Some(0));
		assert_eq!(s.node_at_position(100.0, 100.0), None);
	}

	#[test]
	fn drag_start_reheats_and_pins() {
		let mut s = state(Presentation::Standard);
		while s.tick() {}
		let at = s.sim.position(0);

		s.drag_start(0, at.x, at.y);
		assert!(s.sim.is_running());
		assert_eq!(s.sim.alpha_target(), 0.2);
		assert_eq!(s.sim.pin_of(0), Some(at));
	}

	#[test]
	fn released_node_rejoins_the_layout() {
		let mut s = state(Presentation::Standard);
		let start = s.sim.position(0);
		s.drag_start(0, start.x, start.y);
		s.drag_move(start.x + 200.0, start.y + 150.0);
		let dropped = s.sim.pin_of(0).unwrap();
		for _ in 0..5 {
			s.tick();
		}
		assert_eq!(s.sim.position(0), dropped);

		assert_eq!(s.drag_end(true), None);
		assert_eq!(s.sim.pin_of(0), None);
		assert_eq!(s.sim.alpha_target(), 0.0);
		for _ in 0..10 {
			s.tick();
		}
		assert_ne!(s.sim.position(0), dropped);
	}

	#[test]
	fn disabled_drag_end_pins_indefinitely() {
		let mut s = state(Presentation::Standard);
		let start = s.sim.position(1);
		s.drag_start(1, start.x, start.y);
		s.drag_move(start.x - 120.0, start.y + 40.0);
		let dropped = Point::new(start.x - 120.0, start.y + 40.0);

		s.drag_end(false);
		assert_eq!(s.sim.alpha_target(), 0.2);
		for _ in 0..500 {
			s.tick();
			assert_eq!(s.sim.position(1), dropped);
		}
	}

	#[test]
	fn slow_cool_keeps_layout_alive() {
		let mut s = state(Presentation::Editable);
		let start = s.sim.position(0);
		s.drag_start(0, start.x, start.y);
		s.drag_move(start.x + 50.0, start.y);
		s.drag_end(true);

		assert_eq!(s.sim.pin_of(0), None);
		for _ in 0..2000 {
			s.tick();
		}
		assert!(s.sim.is_running());
		assert!(s.sim.alpha() > 0.05);
	}

	#[test]
	fn press_without_travel_is_a_click() {
		let mut s = state(Presentation::Editable);
		let at = s.sim.position(1);
		s.drag_start(1, at.x, at.y);
		s.drag_move(at.x + 1.0, at.y);
		assert_eq!(s.drag_end(true), Some(1));
		assert!(!s.drag.active);
		assert_eq!(s.drag_end(true), None);
	}

	#[test]
	fn clamps_display_but_not_layout() {
		let mut s = state(Presentation::Bounded);
		s.sim.pin(0, Point::new(-500.0, 9000.0));
		s.tick();
		assert_eq!(s.sim.position(0), Point::new(-500.0, 9000.0));
		assert_eq!(s.display_position(0), Point::new(NODE_RADIUS, 600.0 - NODE_RADIUS));

		let frame = s.frame();
		assert_eq!(frame.nodes[0].at, s.display_position(0));
		assert_eq!(frame.links, vec![(frame.nodes[0].at, frame.nodes[1].at)]);
		assert!(frame.nodes[0].pinned);
	}

	#[test]
	fn edits_keep_layout_but_new_graphs_restart() {
		let mut s = state(Presentation::Editable);
		let mut graph = linked_pair();
		for _ in 0..30 {
			s.tick();
		}
		let a = s.sim.position(0);

		graph.append_node(crate::graph::Node::new("C", Point::new(10.0, 10.0)));
		s.load(&graph);
		assert_eq!(s.sim.len(), 3);
		assert_eq!(s.sim.position(0), a);

		let mut reloaded = graph.clone();
		reloaded.replace(linked_pair());
		s.load(&reloaded);
		assert_eq!(s.sim.len(), 2);
		assert_eq!(s.sim.position(0), Point::new(380.0, 300.0));
	}

	#[test]
	fn edit_after_slow_cool_settles_again() {
		let mut s = state(Presentation::Editable);
		let mut graph = linked_pair();
		let at = s.sim.position(0);
		s.drag_start(0, at.x, at.y);
		s.drag_move(at.x + 40.0, at.y);
		s.drag_end(true);
		assert_eq!(s.sim.alpha_target(), 0.05);

		graph.append_node(crate::graph::Node::new("C", Point::new(10.0, 10.0)));
		s.load(&graph);
		for _ in 0..400 {
			s.tick();
		}
		assert!(s.sim.alpha() < crate::components::force_graph::simulation::ALPHA_MIN);
		assert!(!s.sim.is_running());
	}

	#[test]
	fn resize_moves_layout_center() {
		let mut s = state(Presentation::Standard);
		s.resize(1000.0, 1000.0);
		for _ in 0..3 {
			s.tick();
		}
		let (sx, sy) = s
			.sim
			.positions()
			.fold((0.0, 0.0), |(sx, sy), (_, p)| (sx + p.x, sy + p.y));
		assert!((sx / 2.0 - 500.0).abs() < 1.0);
		assert!((sy / 2.0 - 500.0).abs() < 1.0);
	}
}
