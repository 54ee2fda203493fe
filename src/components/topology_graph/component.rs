//! Leptos component wrapping the topology graph canvas.
//!
//! The component owns one [`TopologyGraphState`], feeds it the reactive data
//! and filter signals, forwards mouse/wheel events, and draws the scene from a
//! `requestAnimationFrame` loop whenever the engine reports a change. A
//! `ResizeObserver` on the container keeps the engine's viewport current. On
//! unmount the loop is cancelled, the observer disconnected and the simulation
//! torn down.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, ResizeObserver, WheelEvent};

use super::filter::TopologyFilters;
use super::profile::ViewProfile;
use super::render;
use super::state::{Tooltip, TopologyGraphState};
use super::types::TopologyData;

type Engine = Rc<RefCell<TopologyGraphState>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Browser resources held by a mounted canvas, released on cleanup.
struct CanvasHandles {
	engine: Engine,
	animate: FrameCallback,
	frame_id: Rc<Cell<Option<i32>>>,
	resize_cb: FrameCallback,
	resize_observer: Rc<RefCell<Option<ResizeObserver>>>,
}

impl CanvasHandles {
	fn release(&self) {
		let window = web_sys::window();
		if let (Some(window), Some(id)) = (window.as_ref(), self.frame_id.take()) {
			let _ = window.cancel_animation_frame(id);
		}
		if let Some(observer) = self.resize_observer.borrow_mut().take() {
			observer.disconnect();
		}
		self.resize_cb.borrow_mut().take();
		// Dropping the closure breaks its self-reference.
		self.animate.borrow_mut().take();
		self.engine.borrow_mut().teardown();
	}
}

/// Sizes the canvas to its parent element and tells the engine.
fn fit_canvas(canvas: &HtmlCanvasElement, engine: &Engine) {
	let (width, height) = canvas
		.parent_element()
		.map(|parent| (parent.client_width() as f64, parent.client_height() as f64))
		.unwrap_or((0.0, 0.0));
	// Assigning the size clears the bitmap, so only touch it on a change.
	if canvas.width() != width as u32 || canvas.height() != height as u32 {
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);
	}
	engine.borrow_mut().resize(width, height);
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders an interactive topology graph on a canvas element.
///
/// The canvas fills its parent container and follows its size; layout waits
/// until the container has a non-zero size. `data` is replaced wholesale on
/// every refresh; `None` shows the loading placeholder. `filters` changes are
/// applied live. `show_zoom_controls` adds the zoom buttons and enables wheel
/// zoom; without it the wheel scrolls the page as usual.
#[component]
pub fn TopologyCanvas(
	#[prop(into)] data: Signal<Option<TopologyData>>,
	#[prop(into, optional)] filters: Option<Signal<TopologyFilters>>,
	#[prop(default = ViewProfile::topology())] profile: ViewProfile,
	#[prop(default = false)] show_zoom_controls: bool,
) -> impl IntoView {
	let filters = filters.unwrap_or_else(|| Signal::stored(TopologyFilters::default()));
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine: Engine = Rc::new(RefCell::new(
		TopologyGraphState::new(profile, filters.get_untracked()).with_wheel_zoom(show_zoom_controls),
	));
	let tooltip = RwSignal::new(None::<Tooltip>);

	let handles = CanvasHandles {
		engine: engine.clone(),
		animate: Rc::new(RefCell::new(None)),
		frame_id: Rc::new(Cell::new(None)),
		resize_cb: Rc::new(RefCell::new(None)),
		resize_observer: Rc::new(RefCell::new(None)),
	};
	let (animate_init, frame_id_init, resize_cb_init, resize_observer_init) = (
		handles.animate.clone(),
		handles.frame_id.clone(),
		handles.resize_cb.clone(),
		handles.resize_observer.clone(),
	);
	let handles = StoredValue::new_local(handles);
	on_cleanup(move || {
		handles.try_with_value(CanvasHandles::release);
	});

	let engine_data = engine.clone();
	Effect::new(move |_| {
		let payload = data.get();
		engine_data.borrow_mut().set_data(payload);
	});

	let engine_filters = engine.clone();
	Effect::new(move |_| {
		let current = filters.get();
		engine_filters.borrow_mut().set_filters(current);
	});

	let engine_init = engine.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let ctx = match canvas.get_context("2d") {
			Ok(Some(ctx)) => ctx,
			_ => {
				warn!("topology: canvas has no 2d context");
				return;
			}
		};
		let Ok(ctx) = ctx.dyn_into::<CanvasRenderingContext2d>() else {
			return;
		};

		fit_canvas(&canvas, &engine_init);

		let (engine_resize, canvas_resize) = (engine_init.clone(), canvas.clone());
		let on_resize: Closure<dyn FnMut()> = Closure::new(move || {
			fit_canvas(&canvas_resize, &engine_resize);
		});
		match (
			canvas.parent_element(),
			ResizeObserver::new(on_resize.as_ref().unchecked_ref()),
		) {
			(Some(parent), Ok(observer)) => {
				observer.observe(&parent);
				*resize_observer_init.borrow_mut() = Some(observer);
			}
			_ => warn!("topology: container size cannot be observed"),
		}
		*resize_cb_init.borrow_mut() = Some(on_resize);

		let (engine_anim, animate_inner, frame_id) =
			(engine_init.clone(), animate_init.clone(), frame_id_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let redraw = engine_anim.borrow_mut().frame();
			if redraw {
				let state = engine_anim.borrow();
				let (width, height) = state.size();
				render::render(&ctx, &state.scene(), &state.transform, state.hovered(), width, height);

				let next = state.tooltip();
				if tooltip.try_get_untracked().flatten() != next {
					let _ = tooltip.try_set(next);
				}
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				frame_id.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			frame_id_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	let engine_md = engine.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			engine_md.borrow_mut().pointer_down(x, y);
		}
	};

	let engine_mm = engine.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			engine_mm.borrow_mut().pointer_move(x, y);
		}
	};

	let engine_mu = engine.clone();
	let on_mouseup = move |_: MouseEvent| engine_mu.borrow_mut().pointer_up();

	let engine_ml = engine.clone();
	let on_mouseleave = move |_: MouseEvent| engine_ml.borrow_mut().pointer_leave();

	let engine_wh = engine.clone();
	let on_wheel = move |ev: WheelEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if engine_wh.borrow_mut().wheel(x, y, ev.delta_y()) {
			ev.prevent_default();
		}
	};

	let engine_zi = engine.clone();
	let engine_zo = engine.clone();
	let zoom_controls = show_zoom_controls.then(move || {
		view! {
			<div class="topology-zoom-controls">
				<button title="Zoom in" on:click=move |_| engine_zi.borrow_mut().zoom_in()>"+"</button>
				<button title="Zoom out" on:click=move |_| engine_zo.borrow_mut().zoom_out()>"−"</button>
			</div>
		}
	});

	let has_data = move || data.with(|payload| payload.as_ref().is_some_and(|d| !d.is_empty()));

	view! {
		<div class="topology-canvas-container" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="topology-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<Show when=move || !has_data()>
				<div class="topology-placeholder">"Loading topology visualization..."</div>
			</Show>
			{move || {
				tooltip
					.get()
					.map(|tip| {
						view! {
							<div
								class="topology-tooltip"
								style=format!(
									"position: absolute; left: {}px; top: {}px; pointer-events: none; white-space: pre;",
									tip.x + 12.0,
									tip.y - 28.0,
								)
							>
								{tip.text}
							</div>
						}
					})
			}}
			{zoom_controls}
		</div>
	}
}
