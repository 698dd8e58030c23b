//! Force-directed layout with an energy ("alpha") schedule.
//!
//! Each tick moves alpha toward its target, applies many-body repulsion,
//! centering and link springs to node velocities, then integrates. Pinned
//! nodes are held exactly at their pin. Once alpha drops below
//! [`ALPHA_MIN`] the simulation stops until it is reheated.

use std::collections::HashMap;

use log::debug;

use crate::graph::{Graph, NodeId, Point};

pub const ALPHA_MIN: f64 = 0.001;
pub const VELOCITY_DECAY: f64 = 0.4;
/// Closest distance considered by the many-body force.
const DISTANCE_MIN: f64 = 1.0;

/// Decay that takes alpha from 1 to [`ALPHA_MIN`] in about 300 ticks.
pub fn default_alpha_decay() -> f64 {
	1.0 - ALPHA_MIN.powf(1.0 / 300.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
	/// Negative values repel.
	pub charge: f64,
	/// Rest length of link springs.
	pub link_distance: f64,
	pub center: Point,
}

#[derive(Clone, Debug)]
struct Body {
	x: f64,
	y: f64,
	vx: f64,
	vy: f64,
	pin: Option<Point>,
}

#[derive(Clone, Copy, Debug)]
struct Spring {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

pub struct Simulation {
	ids: Vec<NodeId>,
	index: HashMap<NodeId, usize>,
	bodies: Vec<Body>,
	springs: Vec<Spring>,
	params: ForceParams,
	alpha: f64,
	alpha_target: f64,
	alpha_decay: f64,
	running: bool,
	seed: u64,
}

impl Simulation {
	pub fn new(graph: &Graph, params: ForceParams) -> Self {
		let mut sim = Self {
			ids: Vec::new(),
			index: HashMap::new(),
			bodies: Vec::new(),
			springs: Vec::new(),
			params,
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_decay: default_alpha_decay(),
			running: true,
			seed: 1,
		};
		sim.sync(graph);
		sim
	}

	/// Take over the nodes and links of `graph`. Nodes already known keep
	/// their position, velocity and pin; new ones start where the graph
	/// places them. The layout is restarted at full energy on the default
	/// schedule, dropping any target or decay left over from a drag.
	pub fn sync(&mut self, graph: &Graph) {
		let mut previous: HashMap<NodeId, Body> = self
			.ids
			.drain(..)
			.zip(self.bodies.drain(..))
			.collect();
		self.index.clear();

		for node in graph.nodes() {
			let body = previous.remove(&node.id).unwrap_or(Body {
				x: node.x,
				y: node.y,
				vx: 0.0,
				vy: 0.0,
				pin: node.fixed,
			});
			self.index.insert(node.id.clone(), self.ids.len());
			self.ids.push(node.id.clone());
			self.bodies.push(body);
		}

		let pairs: Vec<(usize, usize)> = graph
			.links()
			.iter()
			.filter_map(|l| Some((*self.index.get(&l.source)?, *self.index.get(&l.target)?)))
			.collect();
		let mut degree = vec![0usize; self.bodies.len()];
		for &(s, t) in &pairs {
			degree[s] += 1;
			degree[t] += 1;
		}
		self.springs = pairs
			.into_iter()
			.map(|(source, target)| Spring {
				source,
				target,
				strength: 1.0 / degree[source].min(degree[target]) as f64,
				bias: degree[source] as f64 / (degree[source] + degree[target]) as f64,
			})
			.collect();

		self.alpha = 1.0;
		self.alpha_target = 0.0;
		self.alpha_decay = default_alpha_decay();
		self.running = true;
	}

	pub fn len(&self) -> usize {
		self.bodies.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bodies.is_empty()
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	pub fn set_alpha_decay(&mut self, decay: f64) {
		self.alpha_decay = decay;
	}

	pub fn set_center(&mut self, center: Point) {
		self.params.center = center;
	}

	/// Set a new energy target and resume ticking.
	pub fn reheat(&mut self, target: f64) {
		self.alpha_target = target;
		if !self.running {
			debug!("simulation reheated toward alpha {target}");
		}
		self.running = true;
	}

	/// Advance one step if running. Returns whether positions changed.
	pub fn tick(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.step();
		if self.alpha < ALPHA_MIN {
			self.running = false;
			debug!("simulation settled");
		}
		true
	}

	pub fn index_of(&self, id: &NodeId) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn id(&self, idx: usize) -> &NodeId {
		&self.ids[idx]
	}

	pub fn position(&self, idx: usize) -> Point {
		let b = &self.bodies[idx];
		Point::new(b.x, b.y)
	}

	pub fn pin_of(&self, idx: usize) -> Option<Point> {
		self.bodies[idx].pin
	}

	pub fn pin(&mut self, idx: usize, at: Point) {
		self.bodies[idx].pin = Some(at);
	}

	pub fn unpin(&mut self, idx: usize) {
		self.bodies[idx].pin = None;
	}

	/// Current position of every node, in graph order.
	pub fn positions(&self) -> impl Iterator<Item = (&NodeId, Point)> + '_ {
		self.ids
			.iter()
			.zip(&self.bodies)
			.map(|(id, b)| (id, Point::new(b.x, b.y)))
	}

	/// Node indices of every link, in graph order.
	pub fn links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
		self.springs.iter().map(|s| (s.source, s.target))
	}

	fn step(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		let alpha = self.alpha;

		self.apply_charge(alpha);
		self.apply_center();
		self.apply_springs(alpha);

		for b in &mut self.bodies {
			match b.pin {
				Some(p) => {
					b.x = p.x;
					b.y = p.y;
					b.vx = 0.0;
					b.vy = 0.0;
				}
				None => {
					b.vx *= 1.0 - VELOCITY_DECAY;
					b.vy *= 1.0 - VELOCITY_DECAY;
					b.x += b.vx;
					b.y += b.vy;
				}
			}
		}
	}

	fn apply_charge(&mut self, alpha: f64) {
		let strength = self.params.charge;
		let n = self.bodies.len();
		for i in 0..n {
			let (mut fx, mut fy) = (0.0, 0.0);
			for j in 0..n {
				if i == j {
					continue;
				}
				let mut dx = self.bodies[j].x - self.bodies[i].x;
				let mut dy = self.bodies[j].y - self.bodies[i].y;
				if dx == 0.0 {
					dx = self.jiggle();
				}
				if dy == 0.0 {
					dy = self.jiggle();
				}
				let mut l = dx * dx + dy * dy;
				if l < DISTANCE_MIN * DISTANCE_MIN {
					l = (DISTANCE_MIN * DISTANCE_MIN * l).sqrt();
				}
				let w = strength * alpha / l;
				fx += dx * w;
				fy += dy * w;
			}
			self.bodies[i].vx += fx;
			self.bodies[i].vy += fy;
		}
	}

	/// Translate the layout so its centroid sits on the center point.
	fn apply_center(&mut self) {
		if self.bodies.is_empty() {
			return;
		}
		let n = self.bodies.len() as f64;
		let (sx, sy) = self
			.bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let (dx, dy) = (sx / n - self.params.center.x, sy / n - self.params.center.y);
		for b in &mut self.bodies {
			b.x -= dx;
			b.y -= dy;
		}
	}

	fn apply_springs(&mut self, alpha: f64) {
		for k in 0..self.springs.len() {
			let Spring {
				source,
				target,
				strength,
				bias,
			} = self.springs[k];
			let (s, t) = (&self.bodies[source], &self.bodies[target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 {
				dx = self.jiggle();
			}
			if dy == 0.0 {
				dy = self.jiggle();
			}
			let l = (dx * dx + dy * dy).sqrt();
			let l = (l - self.params.link_distance) / l * alpha * strength;
			let (dx, dy) = (dx * l, dy * l);

			let t = &mut self.bodies[target];
			t.vx -= dx * bias;
			t.vy -= dy * bias;
			let s = &mut self.bodies[source];
			s.vx += dx * (1.0 - bias);
			s.vy += dy * (1.0 - bias);
		}
	}

	/// Tiny deterministic offset that separates coincident nodes.
	fn jiggle(&mut self) -> f64 {
		self.seed = (self.seed * 1664525 + 1013904223) % 4294967296;
		(self.seed as f64 / 4294967296.0 - 0.5) * 1e-6
	}
}
