//! Canvas rendering of a [`Scene`].
//!
//! Drawing happens in world space under the view transform, in three passes
//! for correct z-ordering:
//! 1. Links, then their traffic markers
//! 2. Node glyphs (plus a ring around the hovered node)
//! 3. Labels on top

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::interaction::ViewTransform;
use super::scene::{Scene, SceneLink, SceneNode};
use super::theme::{LABEL_TEXT, LabelStyle, NodeShape};

/// Renders the complete scene, clearing the canvas first.
pub fn render(
	ctx: &CanvasRenderingContext2d,
	scene: &Scene,
	transform: &ViewTransform,
	hovered: Option<usize>,
	width: f64,
	height: f64,
) {
	ctx.clear_rect(0.0, 0.0, width, height);

	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	for link in &scene.links {
		draw_link(ctx, link);
	}
	for link in &scene.links {
		draw_marker(ctx, link);
	}
	for node in &scene.nodes {
		draw_node(ctx, node, hovered == Some(node.index));
	}
	for node in &scene.nodes {
		draw_label(ctx, node, &scene.label_style);
	}

	ctx.restore();
}

fn draw_link(ctx: &CanvasRenderingContext2d, link: &SceneLink) {
	ctx.set_global_alpha(link.style.opacity);
	ctx.set_stroke_style_str(&link.style.color.to_css());
	ctx.set_line_width(link.style.width);

	ctx.begin_path();
	ctx.move_to(link.from.0, link.from.1);
	ctx.line_to(link.to.0, link.to.1);
	ctx.stroke();

	ctx.set_global_alpha(1.0);
}

fn draw_marker(ctx: &CanvasRenderingContext2d, link: &SceneLink) {
	let Some(marker) = &link.marker else {
		return;
	};
	ctx.set_global_alpha(marker.style.opacity);
	ctx.set_fill_style_str(&marker.style.color.to_css());

	ctx.begin_path();
	let _ = ctx.arc(marker.x, marker.y, marker.style.radius, 0.0, 2.0 * PI);
	ctx.fill();

	ctx.set_global_alpha(1.0);
}

fn trace_shape(ctx: &CanvasRenderingContext2d, shape: NodeShape, x: f64, y: f64) {
	ctx.begin_path();
	match shape {
		NodeShape::Circle { radius } => {
			let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		}
		NodeShape::RoundedSquare {
			size,
			corner_radius: r,
		} => {
			let (left, top) = (x - size / 2.0, y - size / 2.0);
			let (right, bottom) = (left + size, top + size);
			ctx.move_to(left + r, top);
			let _ = ctx.arc_to(right, top, right, bottom, r);
			let _ = ctx.arc_to(right, bottom, left, bottom, r);
			let _ = ctx.arc_to(left, bottom, left, top, r);
			let _ = ctx.arc_to(left, top, right, top, r);
		}
		NodeShape::Triangle { points } => {
			let [(ax, ay), (bx, by), (cx, cy)] = points;
			ctx.move_to(x + ax, y + ay);
			ctx.line_to(x + bx, y + by);
			ctx.line_to(x + cx, y + cy);
		}
	}
	ctx.close_path();
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &SceneNode, hovered: bool) {
	let style = &node.style;

	trace_shape(ctx, style.shape, node.x, node.y);
	ctx.set_fill_style_str(&style.fill.to_css());
	ctx.fill();
	ctx.set_stroke_style_str(&style.stroke.to_css());
	ctx.set_line_width(style.stroke_width);
	ctx.stroke();

	if hovered {
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, style.shape.hit_radius() + 4.0, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&LABEL_TEXT.with_alpha(0.6).to_css());
		ctx.set_line_width(1.0);
		ctx.stroke();
	}
}

fn draw_label(ctx: &CanvasRenderingContext2d, node: &SceneNode, style: &LabelStyle) {
	let Some(label) = &node.label else {
		return;
	};
	ctx.set_fill_style_str(&style.color.to_css());
	ctx.set_font(&style.css_font());
	let _ = ctx.fill_text(label, node.x + style.offset.0, node.y + style.offset.1);
}
