use std::cell::RefCell;
use std::rc::Rc;

use force_graph::DefaultNodeIdx;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::ForceGraphState;
use super::types::{GraphData, HoveredNode};

type SharedState = Rc<RefCell<Option<ForceGraphState>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);

/// Canvas size for an embedded graph: explicit props win, then the parent's
/// client box. A parent that has not been laid out yet reports zero.
fn canvas_size(width: Option<f64>, height: Option<f64>, parent: Option<(f64, f64)>) -> (f64, f64) {
	let (parent_w, parent_h) = parent.unwrap_or(FALLBACK_SIZE);
	let w = width.unwrap_or(if parent_w > 0.0 { parent_w } else { FALLBACK_SIZE.0 });
	let h = height.unwrap_or(if parent_h > 0.0 { parent_h } else { FALLBACK_SIZE.1 });
	(w, h)
}

/// Pointer position relative to the canvas' top-left corner.
fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn open_in_new_tab(url: &str) {
	let Some(window) = web_sys::window() else {
		return;
	};
	if window.open_with_url_and_target(url, "_blank").is_err() {
		warn!("Could not open {url}");
	}
}

#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	/// Called with the node under the pointer whenever it changes.
	#[prop(optional)]
	on_hover: Option<Callback<Option<HoveredNode>>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let data = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or(FALLBACK_SIZE)
		} else {
			let parent = canvas
				.parent_element()
				.map(|p| (p.client_width() as f64, p.client_height() as f64));
			canvas_size(width, height, parent)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let mut next = ForceGraphState::new(&data, w, h);
		render::load_avatars(&mut next);
		debug!(
			"Graph state rebuilt: {} nodes, {} edges",
			next.node_count(),
			next.edge_count()
		);
		*state_init.borrow_mut() = Some(next);

		// The loop reads whatever state is current, so it only starts once.
		if animate_init.borrow().is_some() {
			return;
		}

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => {
				warn!("2d canvas context unavailable");
				return;
			}
		};

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.animation_running {
					s.tick(0.016);
				}
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let report_hover = move |s: &ForceGraphState, idx: Option<DefaultNodeIdx>| {
		if let Some(cb) = on_hover {
			cb.run(idx.and_then(|i| s.hovered_node(i)));
		}
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			// Update hover state when not dragging
			if !s.drag.active {
				let hovered = s.node_at_position(x, y);
				if s.set_hover(hovered) {
					report_hover(s, hovered);
				}
			}
			s.drag_to(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let clicked_url = state_mu.borrow_mut().as_mut().and_then(|s| {
			let idx = s.release()?;
			s.hovered_node(idx)?.url
		});
		if let Some(url) = clicked_url {
			open_in_new_tab(&url);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.release();
			if s.set_hover(None) {
				report_hover(s, None);
			}
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_canvas_fills_parent() {
		assert_eq!(canvas_size(None, None, Some((540.0, 600.0))), (540.0, 600.0));
	}

	#[test]
	fn test_explicit_size_wins() {
		assert_eq!(canvas_size(Some(320.0), None, Some((540.0, 600.0))), (320.0, 600.0));
		assert_eq!(canvas_size(Some(320.0), Some(240.0), None), (320.0, 240.0));
	}

	#[test]
	fn test_unlaid_parent_falls_back() {
		assert_eq!(canvas_size(None, None, Some((0.0, 0.0))), FALLBACK_SIZE);
		assert_eq!(canvas_size(None, None, None), FALLBACK_SIZE);
	}
}
