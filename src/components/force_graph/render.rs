use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::interaction::Tooltip;
use super::state::ForceGraphState;
use super::types::GraphNode;

const TASK_COLOR: &str = "#1f77b4";
const DONE_COLOR: &str = "#2ca02c";
const PENDING_COLOR: &str = "#ff7f0e";
const PROGRESS_COLOR: &str = "#bcbd22";

/// Loaded assignee avatars keyed by URL.
#[derive(Default)]
pub struct AvatarCache {
	images: HashMap<String, HtmlImageElement>,
}

impl AvatarCache {
	/// Image for `url` once it has finished loading; starts the load otherwise.
	fn get(&mut self, url: &str) -> Option<&HtmlImageElement> {
		if !self.images.contains_key(url) {
			let img = HtmlImageElement::new().ok()?;
			img.set_src(url);
			self.images.insert(url.to_string(), img);
		}
		self.images
			.get(url)
			.filter(|img| img.complete() && img.natural_width() > 0)
	}
}

pub fn render(state: &ForceGraphState, avatars: &mut AvatarCache, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_links(state, ctx);
	draw_nodes(state, avatars, ctx);
	if let Some(tip) = state.tooltip() {
		draw_tooltip(&tip, ctx);
	}
	ctx.restore();
}

fn draw_links(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let graph = &state.graph;
	let dimmed = state.has_active_highlight();
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0),
		&JsValue::from_f64(4.0),
	));

	for link in &graph.links {
		let (Some(a), Some(b)) = (graph.node(&link.source), graph.node(&link.target)) else {
			continue;
		};
		let (dx, dy) = (b.pos.x - a.pos.x, b.pos.y - a.pos.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let lit = state.is_highlighted(&a.id) && state.is_highlighted(&b.id);
		let alpha = match (dimmed, lit) {
			(false, _) => 0.6,
			(true, true) => 0.9,
			(true, false) => 0.15,
		};

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {alpha})"));
		ctx.set_line_width(if lit { 2.0 } else { 1.5 });
		ctx.begin_path();
		ctx.move_to(a.pos.x + ux * a.radius, a.pos.y + uy * a.radius);
		ctx.line_to(b.pos.x - ux * b.radius, b.pos.y - uy * b.radius);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn node_color(node: &GraphNode) -> &'static str {
	match (node.is_task(), node.is_done) {
		(true, true) => DONE_COLOR,
		(true, false) => TASK_COLOR,
		(false, true) => DONE_COLOR,
		(false, false) => PENDING_COLOR,
	}
}

fn draw_nodes(state: &ForceGraphState, avatars: &mut AvatarCache, ctx: &CanvasRenderingContext2d) {
	let dimmed = state.has_active_highlight();

	for node in &state.graph.nodes {
		let (x, y, r) = (node.pos.x, node.pos.y, node.radius);
		let alpha = if dimmed && !state.is_highlighted(&node.id) {
			0.3
		} else {
			1.0
		};
		ctx.set_global_alpha(alpha);

		ctx.begin_path();
		let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node_color(node));
		ctx.fill();

		let avatar = match node.avatar.as_deref() {
			Some(url) => avatars.get(url),
			None => None,
		};
		if let Some(img) = avatar {
			ctx.save();
			ctx.begin_path();
			let _ = ctx.arc(x, y, r - 2.0, 0.0, 2.0 * PI);
			ctx.clip();
			let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
				img,
				x - r + 2.0,
				y - r + 2.0,
				2.0 * (r - 2.0),
				2.0 * (r - 2.0),
			);
			ctx.restore();
		}

		if node.is_task() && node.completion > 0.0 {
			// progress ring, clockwise from twelve o'clock
			let start = -PI / 2.0;
			ctx.begin_path();
			let _ = ctx.arc(x, y, r + 4.0, start, start + 2.0 * PI * node.completion);
			ctx.set_stroke_style_str(PROGRESS_COLOR);
			ctx.set_line_width(3.0);
			ctx.stroke();
		}

		if state.hover.node.as_deref() == Some(node.id.as_str()) {
			ctx.begin_path();
			let _ = ctx.arc(x, y, r + 2.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.7)");
			ctx.set_line_width(1.5);
			ctx.stroke();
		}

		if node.is_task() {
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.9));
			ctx.set_font("12px sans-serif");
			let _ = ctx.fill_text(&node.name, x + r + 6.0, y + 4.0);
		}
		ctx.set_global_alpha(1.0);
	}
}

fn draw_tooltip(tip: &Tooltip, ctx: &CanvasRenderingContext2d) {
	let mut lines = vec![tip.title.as_str()];
	if let Some(owner) = &tip.owner {
		lines.push(owner);
	}
	lines.push(&tip.detail);

	ctx.set_font("11px sans-serif");
	let width = lines
		.iter()
		.filter_map(|l| ctx.measure_text(l).ok())
		.map(|m| m.width())
		.fold(0.0, f64::max)
		+ 12.0;
	let height = lines.len() as f64 * 14.0 + 8.0;
	let (x, y) = (tip.anchor.x, tip.anchor.y);

	ctx.set_fill_style_str("rgba(0, 0, 0, 0.8)");
	ctx.fill_rect(x, y, width, height);
	ctx.set_fill_style_str("white");
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(line, x + 6.0, y + 16.0 + i as f64 * 14.0);
	}
}
