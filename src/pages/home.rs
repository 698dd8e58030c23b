use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, File, HtmlInputElement};

use crate::components::force_graph::{ForceGraphCanvas, Presentation};
use crate::graph::{Graph, Link, Node, NodeId, Point};
use crate::ingest::{
	self, ACCEPT, AdjacencyMode, IngestError, IngestOptions, RequestTracker, SourceFormat,
};

async fn read_file(file: &File) -> Result<Vec<u8>, IngestError> {
	let buffer = JsFuture::from(file.array_buffer())
		.await
		.map_err(|e| IngestError::Read(format!("{e:?}")))?;
	Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Scatter new nodes over the canvas of the presentation they will land in.
fn ingest_options(presentation: Presentation, adjacency_mode: AdjacencyMode) -> IngestOptions {
	let (w, h) = web_sys::window()
		.and_then(|win| Some((win.inner_width().ok()?.as_f64()?, win.inner_height().ok()?.as_f64()?)))
		.unwrap_or((800.0, 600.0));
	let (w, h) = presentation.config().canvas_size(w, h);
	IngestOptions {
		bounds: Point::new(w, h),
		adjacency_mode,
		..IngestOptions::default()
	}
}

/// Graph viewer shell: file picker, presentation switcher, ingest warnings
/// and the active canvas. Owns the graph; canvases only see it.
#[component]
pub fn Home() -> impl IntoView {
	let graph = RwSignal::new(Graph::default());
	let warnings = RwSignal::new(Vec::<String>::new());
	let presentation = RwSignal::new(Presentation::default());
	let clustered = RwSignal::new(false);
	let requests = RequestTracker::new();

	let report = move |err: IngestError| {
		error!("{err}");
		warnings.set(vec![err.to_string()]);
	};

	let on_file = move |ev: Event| {
		let Some(file) = ev
			.target()
			.and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
			.and_then(|input| input.files())
			.and_then(|files| files.get(0))
		else {
			return;
		};
		// Any earlier read still in flight is now stale.
		let ticket = requests.begin();
		let mime = file.type_();
		if SourceFormat::from_mime(&mime).is_none() {
			report(IngestError::UnsupportedFormat { mime });
			return;
		}

		let mode = if clustered.get_untracked() {
			AdjacencyMode::Clustered
		} else {
			AdjacencyMode::Bipartite
		};
		let options = ingest_options(presentation.get_untracked(), mode);
		let requests = requests.clone();
		info!("Reading {} ({})", file.name(), mime);

		spawn_local(async move {
			let bytes = read_file(&file).await;
			if !requests.is_current(ticket) {
				debug!("Discarding stale read of {}", file.name());
				return;
			}
			match bytes.and_then(|b| ingest::ingest(&b, &mime, &options, &mut rand::thread_rng())) {
				Ok(ingested) => {
					info!("Loaded {} as {:?}", file.name(), ingested.layout);
					warnings.set(ingested.warnings.iter().map(ToString::to_string).collect());
					graph.update(|g| g.replace(ingested.graph));
				}
				Err(err) => report(err),
			}
		});
	};

	let add_node = Callback::new(move |at: Point| {
		graph.update(|g| {
			let id = g.next_numeric_id();
			debug!("Adding node {id}");
			g.append_node(Node::new(id, at));
		});
	});

	let add_link = Callback::new(move |(source, target): (NodeId, NodeId)| {
		graph.update(|g| {
			if !g.append_link(Link::new(source.clone(), target.clone())) {
				warn!("Cannot link {source} to {target}: unknown node");
			}
		});
	});

	view! {
		<div class="graph-shell">
			<h1>"File Reader"</h1>
			<input type="file" accept=ACCEPT on:change=on_file />
			<label>
				<input
					type="checkbox"
					prop:checked=move || clustered.get()
					on:change=move |_| clustered.update(|on| *on = !*on)
				/>
				"Cluster adjacency tables"
			</label>
			<div class="presentations">
				{Presentation::ALL
					.into_iter()
					.map(|p| {
						view! {
							<button
								class:active=move || presentation.get() == p
								on:click=move |_| {
									info!("Switching to {p}");
									presentation.set(p);
								}
							>
								{p.to_string()}
							</button>
						}
					})
					.collect_view()}
			</div>
			<Show when=move || warnings.with(|w| !w.is_empty())>
				<ul class="ingest-warnings">
					{move || {
						warnings.get().into_iter().map(|w| view! { <li>{w}</li> }).collect_view()
					}}
				</ul>
			</Show>
			{move || {
				let config = presentation.get().config();
				view! {
					<ForceGraphCanvas
						data=graph
						config=config
						on_add_node=add_node
						on_add_link=add_link
					/>
				}
			}}
		</div>
	}
}
