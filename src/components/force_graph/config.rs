use std::fmt;

use crate::graph::Point;

use super::simulation::ForceParams;

/// What happens to a dragged node once it is released.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragEndBehavior {
	/// Unpin the node and let the layout cool back to rest.
	Release,
	/// Leave the node pinned where it was dropped; the energy target is
	/// left as the drag set it.
	PinForever,
	/// Unpin the node but keep a residual energy that decays very slowly,
	/// so the layout stays gently animated.
	SlowCool { target: f64, decay: f64 },
}

/// Layout and interaction parameters of one canvas presentation.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	pub repulsion_strength: f64,
	pub link_distance: f64,
	/// Layout center as a fraction of the canvas size.
	pub center_target: Point,
	/// Canvas size as a fraction of the window size.
	pub viewport_fraction: Point,
	/// Draw nodes inside the canvas even when the layout drifts outside.
	pub clamp_to_bounds: bool,
	/// Energy target set when a drag starts.
	pub drag_reheat_target: f64,
	/// Applied on release while "enable drag end" is checked.
	pub drag_end: DragEndBehavior,
	/// Initial state of the "enable drag end" checkbox.
	pub drag_end_enabled: bool,
	/// Offers the add-node button and click-to-link.
	pub editable: bool,
	pub link_width: f64,
	pub arrows: bool,
}

impl LayoutConfig {
	pub fn force_params(&self, width: f64, height: f64) -> ForceParams {
		ForceParams {
			charge: self.repulsion_strength,
			link_distance: self.link_distance,
			center: self.center(width, height),
		}
	}

	pub fn center(&self, width: f64, height: f64) -> Point {
		Point::new(width * self.center_target.x, height * self.center_target.y)
	}

	pub fn canvas_size(&self, window_width: f64, window_height: f64) -> (f64, f64) {
		(
			window_width * self.viewport_fraction.x,
			window_height * self.viewport_fraction.y,
		)
	}

	/// Effective release behavior given the "enable drag end" checkbox.
	pub fn release_behavior(&self, drag_end_enabled: bool) -> DragEndBehavior {
		if drag_end_enabled {
			self.drag_end
		} else {
			DragEndBehavior::PinForever
		}
	}
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Presentation::Standard.config()
	}
}

/// The three selectable canvas presentations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Presentation {
	/// Wide spacing, released nodes rejoin the layout.
	#[default]
	Standard,
	/// Full window, tight links, nodes kept on screen and pinned on drop.
	Bounded,
	/// Compact layout with manual node and link creation.
	Editable,
}

impl Presentation {
	pub const ALL: [Presentation; 3] = [
		Presentation::Standard,
		Presentation::Bounded,
		Presentation::Editable,
	];

	pub fn config(self) -> LayoutConfig {
		let base = LayoutConfig {
			repulsion_strength: -50.0,
			link_distance: 250.0,
			center_target: Point::new(0.5, 0.5),
			viewport_fraction: Point::new(0.85, 0.8),
			clamp_to_bounds: false,
			drag_reheat_target: 0.2,
			drag_end: DragEndBehavior::Release,
			drag_end_enabled: true,
			editable: false,
			link_width: 0.5,
			arrows: true,
		};
		match self {
			Presentation::Standard => base,
			Presentation::Bounded => LayoutConfig {
				repulsion_strength: -1.0,
				link_distance: 100.0,
				viewport_fraction: Point::new(1.0, 1.0),
				clamp_to_bounds: true,
				drag_end_enabled: false,
				..base
			},
			Presentation::Editable => LayoutConfig {
				repulsion_strength: -10.0,
				link_distance: 50.0,
				drag_end: DragEndBehavior::SlowCool {
					target: 0.05,
					decay: 0.0001,
				},
				editable: true,
				link_width: 2.0,
				arrows: false,
				..base
			},
		}
	}
}

impl fmt::Display for Presentation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Presentation::Standard => "Graph Viewer 1",
			Presentation::Bounded => "Graph Viewer 2",
			Presentation::Editable => "Graph Viewer 3",
		})
	}
}
