use std::cell::RefCell;
use std::rc::Rc;

use leptos::ev;
use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::JsValue;
use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent, Window};

use super::adapter::GraphDataAdapter;
use super::interaction::SelectedNode;
use super::render::{CanvasSurface, Surface, Viewport};
use super::scheduler;
use super::simulation::SimulationConfig;
use super::state::GraphView;
use super::types::GraphPayload;

const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);

/// CSS size of the surface: the window in fullscreen mode, otherwise the
/// explicit dimensions with the parent's box, then a fixed size, as fallback.
fn surface_size(
	fullscreen: bool,
	explicit: (Option<f64>, Option<f64>),
	window: (Option<f64>, Option<f64>),
	parent: (f64, f64),
) -> (f64, f64) {
	let positive = |value: f64| (value > 0.0).then_some(value);
	if fullscreen {
		return (
			window.0.unwrap_or(FALLBACK_SIZE.0),
			window.1.unwrap_or(FALLBACK_SIZE.1),
		);
	}
	(
		explicit
			.0
			.or_else(|| positive(parent.0))
			.unwrap_or(FALLBACK_SIZE.0),
		explicit
			.1
			.or_else(|| positive(parent.1))
			.unwrap_or(FALLBACK_SIZE.1),
	)
}

fn viewport_of(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> Viewport {
	let inner = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64());
	let parent = canvas
		.parent_element()
		.map_or((0.0, 0.0), |p| (p.client_width() as f64, p.client_height() as f64));
	let (width, height) = surface_size(
		fullscreen,
		(width, height),
		(inner(window.inner_width()), inner(window.inner_height())),
		parent,
	);
	Viewport {
		width,
		height,
		pixel_ratio: window.device_pixel_ratio().max(1.0),
	}
}

fn local_point(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(client_x - rect.left(), client_y - rect.top())
}

fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
	let _ = web_sys::HtmlElement::style(canvas).set_property("cursor", cursor);
}

/// Self-arranging scam network diagram on a `<canvas>`.
///
/// A new `data` value is adapted immediately and swapped in at the top of the
/// next frame. Window resizes and changes to `width`/`height` resize the
/// surface the same way. The animation loop and the resize listener go away
/// when the component unmounts.
#[component]
pub fn ScamNetworkGraph(
	#[prop(into)] data: Signal<GraphPayload>,
	/// Force constants; the network preset by default.
	#[prop(optional)]
	config: Option<SimulationConfig>,
	/// Fixed layout seed for reproducible layouts.
	#[prop(optional)]
	seed: Option<u64>,
	/// Called with the selected node, or `None` when the selection clears.
	#[prop(optional, into)]
	on_select: Option<Callback<Option<SelectedNode>>>,
	/// Called with the report total whenever a graph is built.
	#[prop(optional, into)]
	on_total_reports: Option<Callback<u64>>,
	#[prop(default = false)] fullscreen: bool,
	/// Surface width in CSS pixels; the parent's width when unset.
	#[prop(optional, into)]
	width: MaybeProp<f64>,
	/// Surface height in CSS pixels; the parent's height when unset.
	#[prop(optional, into)]
	height: MaybeProp<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<GraphView>>> = Rc::new(RefCell::new(None));
	let adapter = Rc::new(RefCell::new(match seed {
		Some(seed) => GraphDataAdapter::seeded(seed),
		None => GraphDataAdapter::from_clock(),
	}));
	let (state_init, adapter_init) = (state.clone(), adapter.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window, graph view disabled");
			return;
		};

		let mut surface = match CanvasSurface::new(canvas.clone()) {
			Ok(surface) => surface,
			Err(err) => {
				error!("{err}, graph view disabled");
				return;
			}
		};
		let viewport = viewport_of(
			&window,
			&canvas,
			fullscreen,
			width.get_untracked(),
			height.get_untracked(),
		);
		surface.resize(&viewport);

		let graph = adapter_init
			.borrow_mut()
			.adapt(&data.get_untracked(), viewport.center());
		if let Some(cb) = on_total_reports {
			cb.run(graph.total_reports);
		}
		let mut view = GraphView::new(graph, config.clone().unwrap_or_default(), viewport);
		if let Some(cb) = on_select {
			view.interaction
				.on_selection_change(move |selection| cb.run(selection));
		}
		*state_init.borrow_mut() = Some(view);
		info!(
			"graph view mounted at {}x{} (x{})",
			viewport.width, viewport.height, viewport.pixel_ratio
		);

		let handle = scheduler::start(state_init.clone(), surface);
		let state_resize = state_init.clone();
		let listener = window_event_listener(ev::resize, move |_| {
			let Some(window) = web_sys::window() else {
				return;
			};
			let viewport = viewport_of(
				&window,
				&canvas,
				fullscreen,
				width.get_untracked(),
				height.get_untracked(),
			);
			if let Some(view) = state_resize.borrow_mut().as_mut() {
				view.resize_to(viewport);
			}
		});
		handle.on_cancel(move || listener.remove());
		on_cleanup(move || handle.cancel());
	});

	let state_size = state.clone();
	Effect::new(move |prev: Option<()>| {
		let (w, h) = (width.get(), height.get());
		if prev.is_none() || fullscreen {
			return;
		}
		let (Some(canvas), Some(window)) = (canvas_ref.get_untracked(), web_sys::window()) else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let viewport = viewport_of(&window, &canvas, false, w, h);
		if let Some(view) = state_size.borrow_mut().as_mut() {
			view.resize_to(viewport);
		}
	});

	let (state_data, adapter_data) = (state.clone(), adapter.clone());
	Effect::new(move |prev: Option<()>| {
		let payload = data.get();
		if prev.is_none() {
			return;
		}
		if let Some(ref mut s) = *state_data.borrow_mut() {
			let graph = adapter_data
				.borrow_mut()
				.adapt(&payload, s.viewport.center());
			if let Some(cb) = on_total_reports {
				cb.run(graph.total_reports);
			}
			s.queue_graph(graph);
		}
	});

	let state_click = state.clone();
	let on_click = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, ev.client_x() as f64, ev.client_y() as f64);
		if let Some(ref mut s) = *state_click.borrow_mut() {
			s.click(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, ev.client_x() as f64, ev.client_y() as f64);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.hover(x, y) {
				let cursor = if s.interaction.hovered().is_some() {
					"pointer"
				} else {
					"default"
				};
				set_cursor(&canvas, cursor);
			}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.interaction.clear_hover();
		}
		if let Some(canvas) = canvas_ref.get() {
			let canvas: HtmlCanvasElement = canvas.into();
			set_cursor(&canvas, "default");
		}
	};

	let state_touch = state.clone();
	let on_touchstart = move |ev: TouchEvent| {
		let (Some(canvas), Some(touch)) = (canvas_ref.get(), ev.changed_touches().get(0)) else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, touch.client_x() as f64, touch.client_y() as f64);
		if let Some(ref mut s) = *state_touch.borrow_mut() {
			s.click(x, y);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="scam-network-canvas"
			on:click=on_click
			on:mousemove=on_mousemove
			on:mouseleave=on_mouseleave
			on:touchstart=on_touchstart
			style="display: block;"
		/>
	}
}
