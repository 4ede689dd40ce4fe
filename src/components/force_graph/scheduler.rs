//! Display-refresh driven simulate and render loop.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::render::Surface;
use super::state::GraphView;

type Teardown = Box<dyn FnOnce() + Send + Sync>;

/// Stops an animation loop and releases whatever was registered alongside it.
/// Cloneable and `Send` so it can live in cleanup hooks.
#[derive(Clone, Default)]
pub struct CancelHandle {
	cancelled: Arc<AtomicBool>,
	teardown: Arc<Mutex<Vec<Teardown>>>,
}

impl fmt::Debug for CancelHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CancelHandle")
			.field("cancelled", &self.is_cancelled())
			.finish_non_exhaustive()
	}
}

impl CancelHandle {
	/// No further frames are scheduled after this; a frame already running
	/// completes. Registered teardown hooks run once, on the first call.
	pub fn cancel(&self) {
		if self.cancelled.swap(true, Ordering::Relaxed) {
			return;
		}
		debug!("animation loop cancelled");
		let hooks = self
			.teardown
			.lock()
			.map(|mut hooks| std::mem::take(&mut *hooks))
			.unwrap_or_default();
		for hook in hooks {
			hook();
		}
	}

	/// Run `hook` when the loop is cancelled, e.g. to remove an event
	/// listener. Runs immediately on an already cancelled handle.
	pub fn on_cancel(&self, hook: impl FnOnce() + Send + Sync + 'static) {
		let Ok(mut hooks) = self.teardown.lock() else {
			return;
		};
		if self.is_cancelled() {
			drop(hooks);
			hook();
		} else {
			hooks.push(Box::new(hook));
		}
	}

	/// Whether `cancel` was called.
	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::Relaxed)
	}
}

/// Per-frame step shared by every scheduling backend.
pub struct FrameLoop<S> {
	view: Rc<RefCell<Option<GraphView>>>,
	surface: RefCell<S>,
	handle: CancelHandle,
}

impl<S: Surface> FrameLoop<S> {
	/// Loop over a shared view slot; an empty slot renders nothing.
	pub fn new(view: Rc<RefCell<Option<GraphView>>>, surface: S) -> Self {
		Self {
			view,
			surface: RefCell::new(surface),
			handle: CancelHandle::default(),
		}
	}

	/// Handle that stops this loop.
	pub fn handle(&self) -> CancelHandle {
		self.handle.clone()
	}

	/// Simulate and render one frame. Returns whether another frame should be
	/// scheduled.
	pub fn run_frame(&self) -> bool {
		if self.handle.is_cancelled() {
			return false;
		}
		if let Some(view) = self.view.borrow_mut().as_mut() {
			view.frame(&mut *self.surface.borrow_mut());
		}
		!self.handle.is_cancelled()
	}
}

/// Drive `view` once per display refresh until the returned handle is
/// cancelled.
pub fn start<S: Surface + 'static>(
	view: Rc<RefCell<Option<GraphView>>>,
	surface: S,
) -> CancelHandle {
	let frames = Rc::new(FrameLoop::new(view, surface));
	let handle = frames.handle();
	schedule(frames);
	handle
}

fn schedule<S: Surface + 'static>(frames: Rc<FrameLoop<S>>) {
	let Some(window) = web_sys::window() else {
		warn!("no window, animation loop not started");
		return;
	};
	let callback = Closure::once_into_js(move || {
		if frames.run_frame() {
			schedule(frames);
		}
	});
	if window
		.request_animation_frame(callback.unchecked_ref())
		.is_err()
	{
		warn!("requestAnimationFrame failed, animation loop stopped");
	}
}
