//! Browser callbacks owned by one mounted canvas: the animation frame loop
//! and the window resize listener.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::Window;

type Slot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Handles of the callbacks registered with the window. Nothing keeps
/// running once [`FrameLoop::stop`] returns.
#[derive(Clone, Default)]
pub struct FrameLoop {
	animate: Slot,
	resize: Slot,
	pending: Rc<Cell<Option<i32>>>,
}

fn request_frame(slot: &Slot, pending: &Cell<Option<i32>>) {
	let slot = slot.borrow();
	let Some(cb) = slot.as_ref() else {
		return;
	};
	let Some(window) = web_sys::window() else {
		return;
	};
	pending.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
}

impl FrameLoop {
	/// Run `frame` once per animation frame.
	pub fn start(&self, mut frame: impl FnMut() + 'static) {
		let (animate, pending) = (self.animate.clone(), self.pending.clone());
		*self.animate.borrow_mut() = Some(Closure::new(move || {
			pending.set(None);
			frame();
			request_frame(&animate, &pending);
		}));
		request_frame(&self.animate, &self.pending);
	}

	pub fn on_resize(&self, window: &Window, handler: impl FnMut() + 'static) {
		let cb = Closure::<dyn FnMut()>::new(handler);
		if window
			.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
			.is_err()
		{
			warn!("could not listen for window resize");
		}
		*self.resize.borrow_mut() = Some(cb);
	}

	/// Cancel the pending frame, remove the resize listener and release both
	/// closures along with everything they captured.
	pub fn stop(&self) {
		let window = web_sys::window();
		if let (Some(id), Some(win)) = (self.pending.take(), &window) {
			let _ = win.cancel_animation_frame(id);
		}
		if let (Some(cb), Some(win)) = (self.resize.borrow_mut().take(), &window) {
			let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		self.animate.borrow_mut().take();
		debug!("frame loop stopped");
	}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
	use wasm_bindgen_test::*;

	use super::*;

	wasm_bindgen_test_configure!(run_in_browser);

	#[wasm_bindgen_test]
	fn stop_releases_window_callbacks() {
		let window = web_sys::window().expect("browser window");
		let frames = FrameLoop::default();
		let state = Rc::new(());
		let captured = state.clone();
		frames.start(move || {
			let _ = &captured;
		});
		frames.on_resize(&window, || {});
		assert!(frames.pending.get().is_some());
		assert_eq!(Rc::strong_count(&state), 2);

		frames.stop();
		assert!(frames.pending.get().is_none());
		assert!(frames.animate.borrow().is_none());
		assert!(frames.resize.borrow().is_none());
		assert_eq!(Rc::strong_count(&frames.animate), 1);
		assert_eq!(Rc::strong_count(&state), 1);
	}

	#[wasm_bindgen_test]
	fn stop_is_idempotent() {
		let frames = FrameLoop::default();
		frames.stop();
		frames.start(|| {});
		frames.stop();
		frames.stop();
		assert!(frames.animate.borrow().is_none());
	}
}
