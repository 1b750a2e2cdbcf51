use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use crate::api::Task;
use crate::config::GraphConfig;

use super::render::{self, AvatarCache};
use super::simulation::{CancelToken, SimulationPhase, TickOutcome};
use super::state::ForceGraphState;

type Shared<T> = Rc<RefCell<Option<T>>>;
type Listener = Closure<dyn FnMut(MouseEvent)>;

/// Pointer position relative to the canvas element.
fn pointer_in(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn schedule(cb: &Closure<dyn FnMut()>, delay_ms: i32, pending: &AtomicI32) {
	let Some(window) = web_sys::window() else {
		return;
	};
	match window
		.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), delay_ms)
	{
		Ok(handle) => pending.store(handle, Ordering::Relaxed),
		Err(err) => warn!("could not schedule simulation tick: {err:?}"),
	}
}

/// Drop the scheduled tick, if any. Handle 0 means nothing is pending.
fn clear_pending(pending: &AtomicI32) {
	let handle = pending.swap(0, Ordering::Relaxed);
	if handle != 0 {
		if let Some(window) = web_sys::window() {
			window.clear_timeout_with_handle(handle);
		}
	}
}

/// Attach or detach the document-level drag listeners.
fn set_drag_listeners(listeners: &Shared<(Listener, Listener)>, attach: bool) {
	let Some(document) = web_sys::window().and_then(|w| w.document()) else {
		return;
	};
	if let Some((ref on_move, ref on_up)) = *listeners.borrow() {
		for (event, cb) in [("mousemove", on_move), ("mouseup", on_up)] {
			let f = cb.as_ref().unchecked_ref();
			let _ = if attach {
				document.add_event_listener_with_callback(event, f)
			} else {
				document.remove_event_listener_with_callback(event, f)
			};
		}
	}
}

/// Browser callbacks registered by the canvas, released on unmount.
struct Handles {
	animate: Shared<Closure<dyn FnMut()>>,
	frame: Rc<Cell<i32>>,
	resize: Shared<Closure<dyn FnMut()>>,
	tick: Shared<Closure<dyn FnMut()>>,
	drag: Shared<(Listener, Listener)>,
}

impl Handles {
	/// Unregister everything, then drop the closures. The animation and tick
	/// closures hold themselves, so dropping them here is what frees them.
	fn release(&self) {
		if let Some(window) = web_sys::window() {
			let _ = window.cancel_animation_frame(self.frame.get());
			if let Some(ref cb) = *self.resize.borrow() {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		set_drag_listeners(&self.drag, false);
		*self.animate.borrow_mut() = None;
		*self.resize.borrow_mut() = None;
		*self.tick.borrow_mut() = None;
		*self.drag.borrow_mut() = None;
	}
}

fn parent_size(canvas: &HtmlCanvasElement, config: &GraphConfig) -> (f64, f64) {
	let w = canvas
		.parent_element()
		.map(|p| p.client_width() as f64)
		.filter(|w| *w > 0.0)
		.unwrap_or(config.canvas.width);
	(w, w * config.canvas.height / config.canvas.width)
}

#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] tasks: Signal<Vec<Task>>,
	#[prop(into)] search: Signal<String>,
	#[prop(into)] task_filter: Signal<Option<i64>>,
	#[prop(into)] on_open_subtask: Callback<i64>,
	#[prop(default = GraphConfig::default())] config: GraphConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let phase = RwSignal::new(SimulationPhase::Idle);
	let state: Shared<ForceGraphState> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let tick_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let drag_listeners: Shared<(Listener, Listener)> = Rc::new(RefCell::new(None));
	let frame = Rc::new(Cell::new(0));
	let handles = StoredValue::new_local(Handles {
		animate: animate.clone(),
		frame: frame.clone(),
		resize: resize_cb.clone(),
		tick: tick_cb.clone(),
		drag: drag_listeners.clone(),
	});

	// Send + Sync so teardown can reach them
	let pending = Arc::new(AtomicI32::new(0));
	let run_token: Arc<Mutex<Option<CancelToken>>> = Arc::new(Mutex::new(None));
	let mounted = CancelToken::default();

	{
		let (pending, run_token, mounted) = (pending.clone(), run_token.clone(), mounted.clone());
		on_cleanup(move || {
			mounted.cancel();
			if let Some(token) = run_token.lock().ok().and_then(|mut t| t.take()) {
				token.cancel();
			}
			clear_pending(&pending);
			handles.try_with_value(Handles::release);
			debug!("graph canvas torn down");
		});
	}

	let (state_init, animate_init, resize_init, init_config, mounted_init, frame_init) = (
		state.clone(),
		animate.clone(),
		resize_cb.clone(),
		config.clone(),
		mounted.clone(),
		frame.clone(),
	);
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if state_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window): Option<Window> = web_sys::window() else {
			return;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("canvas 2d context unavailable");
			return;
		};

		let (w, h) = parent_size(&canvas, &init_config);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let mut graph_state = ForceGraphState::new(init_config.clone(), w, h);
		graph_state.set_source(
			tasks.get_untracked(),
			search.get_untracked(),
			task_filter.get_untracked(),
		);
		*state_init.borrow_mut() = Some(graph_state);

		let (state_resize, canvas_resize, resize_config) =
			(state_init.clone(), canvas.clone(), init_config.clone());
		*resize_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize, &resize_config);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, mounted_anim, frame_anim) = (
			state_init.clone(),
			animate_init.clone(),
			mounted_init.clone(),
			frame_init.clone(),
		);
		let mut avatars = AvatarCache::default();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if mounted_anim.is_cancelled() {
				return;
			}
			if let Some(ref s) = *state_anim.borrow() {
				render::render(s, &mut avatars, &ctx);
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
					frame_anim.set(id);
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				frame_init.set(id);
			}
		}
	});

	// any input change rebuilds the graph and cancels a running simulation
	let (state_rb, pending_rb) = (state.clone(), pending.clone());
	Effect::new(move |_| {
		let (list, needle, filter) = (tasks.get(), search.get(), task_filter.get());
		clear_pending(&pending_rb);
		if let Some(ref mut s) = *state_rb.borrow_mut() {
			s.set_source(list, needle, filter);
		}
		phase.set(SimulationPhase::Idle);
	});

	let (state_start, tick_start, pending_start, token_start, mounted_start) = (
		state.clone(),
		tick_cb.clone(),
		pending.clone(),
		run_token.clone(),
		mounted.clone(),
	);
	let interval = config.simulation.tick_interval_ms;
	let start = move || {
		clear_pending(&pending_start);
		let Some(token) = state_start
			.borrow_mut()
			.as_mut()
			.map(|s| s.start_simulation())
		else {
			return;
		};
		if let Ok(mut slot) = token_start.lock() {
			*slot = Some(token.clone());
		}
		phase.set(SimulationPhase::Running);

		let (state_t, tick_inner, pending_t, mounted_t) = (
			state_start.clone(),
			tick_start.clone(),
			pending_start.clone(),
			mounted_start.clone(),
		);
		*tick_start.borrow_mut() = Some(Closure::new(move || {
			pending_t.store(0, Ordering::Relaxed);
			if token.is_cancelled() || mounted_t.is_cancelled() {
				return;
			}
			let outcome = state_t.borrow_mut().as_mut().map(|s| s.tick());
			match outcome {
				Some(TickOutcome::Continue) if !token.is_cancelled() => {
					if let Some(ref cb) = *tick_inner.borrow() {
						schedule(cb, interval, &pending_t);
					}
				}
				Some(TickOutcome::Settled) => phase.set(SimulationPhase::Settled),
				_ => {}
			}
		}));
		if let Some(ref cb) = *tick_start.borrow() {
			schedule(cb, interval, &pending_start);
		}
	};

	let (state_stop, pending_stop) = (state.clone(), pending.clone());
	let on_toggle = move |_: MouseEvent| {
		if phase.get_untracked() == SimulationPhase::Running {
			clear_pending(&pending_stop);
			if let Some(ref mut s) = *state_stop.borrow_mut() {
				s.stop_simulation();
			}
			phase.set(SimulationPhase::Settled);
		} else {
			start();
		}
	};

	let (state_reset, pending_reset) = (state.clone(), pending.clone());
	let on_reset = move |_: MouseEvent| {
		clear_pending(&pending_reset);
		if let Some(ref mut s) = *state_reset.borrow_mut() {
			s.reset_layout();
		}
		phase.set(SimulationPhase::Idle);
	};

	let state_dm = state.clone();
	let on_doc_move: Listener = Closure::new(move |ev: MouseEvent| {
		let Some((x, y)) = pointer_in(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_dm.borrow_mut() {
			s.pointer_move(x, y);
		}
	});
	let (state_du, listeners_du) = (state.clone(), drag_listeners.clone());
	let on_doc_up: Listener = Closure::new(move |_: MouseEvent| {
		let click = state_du.borrow_mut().as_mut().and_then(|s| s.pointer_up());
		set_drag_listeners(&listeners_du, false);
		if let Some(target) = click {
			debug!("opening submission of subtask {}", target.subtask_id);
			on_open_subtask.run(target.subtask_id);
		}
	});
	*drag_listeners.borrow_mut() = Some((on_doc_move, on_doc_up));

	let (state_md, listeners_md) = (state.clone(), drag_listeners.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_in(canvas_ref, &ev) else {
			return;
		};
		let started = state_md
			.borrow_mut()
			.as_mut()
			.is_some_and(|s| s.pointer_down(x, y));
		if started {
			ev.prevent_default();
			set_drag_listeners(&listeners_md, true);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_in(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			// while dragging the document listener owns the pointer
			if !s.interaction.is_dragging() {
				s.pointer_move(x, y);
			}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			if !s.interaction.is_dragging() {
				s.set_hover(None);
			}
		}
	};

	view! {
		<div class="task-graph">
			<div class="task-graph-toolbar">
				<button on:click=on_toggle>
					{move || {
						if phase.get() == SimulationPhase::Running { "Hentikan" } else { "Simulasikan" }
					}}
				</button>
				<button on:click=on_reset>"Atur ulang tata letak"</button>
			</div>
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseleave=on_mouseleave
				style="display: block; cursor: grab;"
			/>
		</div>
	}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
	use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
	use web_sys::Event;

	use super::*;

	wasm_bindgen_test_configure!(run_in_browser);

	fn handles() -> Handles {
		Handles {
			animate: Rc::new(RefCell::new(None)),
			frame: Rc::new(Cell::new(0)),
			resize: Rc::new(RefCell::new(None)),
			tick: Rc::new(RefCell::new(None)),
			drag: Rc::new(RefCell::new(None)),
		}
	}

	#[wasm_bindgen_test]
	fn release_unregisters_window_and_document_listeners() {
		let window = web_sys::window().unwrap();
		let document = window.document().unwrap();
		let hits = Rc::new(Cell::new(0));
		let handles = handles();

		let h = hits.clone();
		*handles.resize.borrow_mut() = Some(Closure::new(move || h.set(h.get() + 1)));
		if let Some(ref cb) = *handles.resize.borrow() {
			window
				.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
				.unwrap();
		}
		let (on_move, on_up) = (hits.clone(), hits.clone());
		*handles.drag.borrow_mut() = Some((
			Closure::new(move |_: MouseEvent| on_move.set(on_move.get() + 1)),
			Closure::new(move |_: MouseEvent| on_up.set(on_up.get() + 1)),
		));
		set_drag_listeners(&handles.drag, true);

		window.dispatch_event(&Event::new("resize").unwrap()).unwrap();
		document
			.dispatch_event(&MouseEvent::new("mouseup").unwrap())
			.unwrap();
		assert_eq!(hits.get(), 2);

		handles.release();
		assert!(handles.resize.borrow().is_none());
		assert!(handles.drag.borrow().is_none());

		// a dropped closure still registered would throw here
		window.dispatch_event(&Event::new("resize").unwrap()).unwrap();
		document
			.dispatch_event(&MouseEvent::new("mousemove").unwrap())
			.unwrap();
		assert_eq!(hits.get(), 2);
	}
}
