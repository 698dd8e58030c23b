use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, Frame, NODE_RADIUS};

const BACKGROUND: &str = "#ffffff";
const LINK_COLOR: &str = "rgba(153, 153, 153, 0.6)";
const ARROW_COLOR: &str = "#999";
const LABEL_COLOR: &str = "#333";
const PIN_COLOR: &str = "rgba(0, 0, 0, 0.5)";
const ARROW_SIZE: f64 = 6.0;
/// Distance from the node center to the arrow tip.
const ARROW_OFFSET: f64 = 10.0;
const LABEL_DX: f64 = 12.0;

/// Cubehelix rainbow, `t` in `[0, 1]`. Returns a CSS `rgb()` color.
pub fn rainbow(t: f64) -> String {
	let t = if t.is_finite() { t - t.floor() } else { 0.0 };
	let ts = (t - 0.5).abs();
	let h = (360.0 * t - 100.0 + 120.0).to_radians();
	let s = 1.5 - 1.5 * ts;
	let l = 0.8 - 0.9 * ts;
	let a = s * l * (1.0 - l);
	let (cos_h, sin_h) = (h.cos(), h.sin());
	let channel = |v: f64| (255.0 * v).round().clamp(0.0, 255.0) as u8;
	format!(
		"rgb({}, {}, {})",
		channel(l + a * (-0.14861 * cos_h + 1.78277 * sin_h)),
		channel(l + a * (-0.29227 * cos_h - 0.90649 * sin_h)),
		channel(l + a * (1.97294 * cos_h)),
	)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	let frame = state.frame();
	draw_links(state, &frame, ctx);
	draw_nodes(&frame, ctx);
}

fn draw_links(state: &ForceGraphState, frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(LINK_COLOR);
	ctx.set_line_width(state.config.link_width);
	ctx.begin_path();
	for &(from, to) in &frame.links {
		ctx.move_to(from.x, from.y);
		ctx.line_to(to.x, to.y);
	}
	ctx.stroke();

	if !state.config.arrows {
		return;
	}
	ctx.set_fill_style_str(ARROW_COLOR);
	for &(from, to) in &frame.links {
		let (dx, dy) = (to.x - from.x, to.y - from.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < ARROW_OFFSET + ARROW_SIZE {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let (tip_x, tip_y) = (to.x - ux * ARROW_OFFSET, to.y - uy * ARROW_OFFSET);
		let (back_x, back_y) = (tip_x - ux * ARROW_SIZE, tip_y - uy * ARROW_SIZE);
		let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let n = frame.nodes.len().max(1) as f64;
	ctx.set_font("12px sans-serif");
	ctx.set_text_baseline("middle");

	for (i, node) in frame.nodes.iter().enumerate() {
		let (x, y) = (node.at.x, node.at.y);
		ctx.begin_path();
		let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&rainbow(i as f64 / n));
		ctx.fill();

		if node.pinned {
			ctx.set_stroke_style_str(PIN_COLOR);
			ctx.set_line_width(1.0);
			ctx.stroke();
		}

		ctx.set_fill_style_str(LABEL_COLOR);
		let _ = ctx.fill_text(node.id.as_str(), x + LABEL_DX, y);
	}
}
