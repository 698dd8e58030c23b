use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use rand::Rng;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::config::LayoutConfig;
use super::frame_loop::FrameLoop;
use super::render;
use super::state::ForceGraphState;
use crate::graph::{Graph, NodeId, Point};

fn window_canvas_size(window: &Window, config: &LayoutConfig) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	config.canvas_size(
		dim(window.inner_width(), 800.0),
		dim(window.inner_height(), 600.0),
	)
}

/// Canvas that lays out `data` with a force simulation and lets nodes be
/// dragged. In editable presentations a click on a node opens a list to link
/// it to another node, and an "Add Node" button appends a node at a random
/// spot; both go through the callbacks, the graph itself is never mutated
/// here.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<Graph>,
	config: LayoutConfig,
	#[prop(optional)] on_add_node: Option<Callback<Point>>,
	#[prop(optional)] on_add_link: Option<Callback<(NodeId, NodeId)>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let frames = FrameLoop::default();
	let drag_end_enabled = RwSignal::new(config.drag_end_enabled);
	let selected = RwSignal::new(None::<NodeId>);
	let editable = config.editable;

	// The frame loop and resize listener must not outlive the view.
	let frames_cleanup = SendWrapper::new(frames.clone());
	on_cleanup(move || frames_cleanup.stop());

	let state_init = state.clone();
	Effect::new(move |_| {
		let graph = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if let Some(ref mut s) = *state_init.borrow_mut() {
			s.load(&graph);
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = window_canvas_size(&window, &config);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};
		*state_init.borrow_mut() = Some(ForceGraphState::new(&graph, config.clone(), w, h));

		let (state_resize, config_resize) = (state_init.clone(), config.clone());
		frames.on_resize(&window, move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = window_canvas_size(&win, &config_resize);
			canvas.set_width(nw as u32);
			canvas.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		});

		let state_anim = state_init.clone();
		frames.start(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick();
				render::render(s, &ctx);
			}
		});
		debug!("force graph canvas mounted at {w}x{h}");
	});

	let pointer = move |ev: &MouseEvent| {
		let canvas = canvas_ref.get()?;
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Some(idx) = s.node_at_position(x, y) {
				s.drag_start(idx, x, y);
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.drag_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let clicked = state_mu.borrow_mut().as_mut().and_then(|s| {
			let idx = s.drag_end(drag_end_enabled.get_untracked())?;
			Some(s.sim.id(idx).clone())
		});
		if editable && clicked.is_some() {
			selected.set(clicked);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.drag_end(drag_end_enabled.get_untracked());
		}
	};

	let state_add = state.clone();
	let on_add = move |_: MouseEvent| {
		let Some(add) = on_add_node else {
			return;
		};
		let (w, h) = state_add
			.borrow()
			.as_ref()
			.map(|s| (s.width, s.height))
			.unwrap_or((800.0, 600.0));
		let mut rng = rand::thread_rng();
		add.run(Point::new(rng.r#gen::<f64>() * w, rng.r#gen::<f64>() * h));
	};

	let link_targets = move || {
		let from = selected.get();
		data.with(|g| {
			g.nodes()
				.iter()
				.filter(|n| Some(&n.id) != from.as_ref())
				.map(|n| n.id.clone())
				.collect::<Vec<_>>()
		})
	};

	view! {
		<div class="force-graph">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				style="display: block; cursor: grab;"
			/>
			<div class="graph-controls">
				<label>
					<input
						type="checkbox"
						prop:checked=move || drag_end_enabled.get()
						on:change=move |_| drag_end_enabled.update(|on| *on = !*on)
					/>
					"Enable Drag End"
				</label>
				{editable.then(|| view! { <button on:click=on_add>"Add Node"</button> })}
			</div>
			<Show when=move || selected.get().is_some()>
				<div class="modal">
					<div class="modal-content">
						<h2>"Select a node to link"</h2>
						{move || {
							link_targets()
								.into_iter()
								.map(|target| {
									let label = target.to_string();
									view! {
										<button on:click=move |_| {
											if let (Some(from), Some(add)) = (selected.get_untracked(), on_add_link) {
												add.run((from, target.clone()));
											}
											selected.set(None);
										}>{label}</button>
									}
								})
								.collect_view()
						}}
						<button class="modal-cancel" on:click=move |_| selected.set(None)>
							"Cancel"
						</button>
					</div>
				</div>
			</Show>
		</div>
	}
}
