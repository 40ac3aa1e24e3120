//! Canvas rendering for the force graph.
//!
//! Draws in three passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Links, then arrowheads on import links (world space)
//! 3. Nodes in insertion order, then labels on top
//!
//! Drawing calls that can only fail on invalid arguments have their results ignored,
//! as a dropped frame is preferable to tearing down the animation loop.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::ForceGraphState;
use super::theme::Theme;

fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders the complete graph to the canvas.
pub fn render(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let transform = state.viewport.transform;
	let scale = ScaledValues::new(config, transform.k);

	if let Err(e) = draw_background(state, ctx, theme) {
		log::debug!("codebase-graph: background gradient failed: {e:?}");
		ctx.set_fill_style_str(&theme.background.color.to_css());
		ctx.fill_rect(0.0, 0.0, state.width, state.height);
	}

	if state.data.nodes.is_empty() {
		return;
	}

	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	draw_links(state, ctx, &scale, theme);
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();
}

fn draw_background(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
) -> Result<(), JsValue> {
	let Some(center) = theme.background.gradient_center else {
		ctx.set_fill_style_str(&theme.background.color.to_css());
		ctx.fill_rect(0.0, 0.0, state.width, state.height);
		return Ok(());
	};

	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let gradient =
		ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, state.width.max(state.height) * 0.8)?;
	gradient.add_color_stop(0.0, &center.to_css())?;
	gradient.add_color_stop(1.0, &theme.background.color.to_css())?;

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	Ok(())
}

/// Opacity multiplier for a link given the current hover state.
fn link_alpha(state: &ForceGraphState, theme: &Theme, source: usize, target: usize) -> f64 {
	let lit = smooth_step(state.highlight.edge_intensity(source, target));
	let max = smooth_step(state.highlight.max_intensity());
	let dimmed = 1.0 + (theme.link.dimmed_alpha - 1.0) * max;
	dimmed + (theme.link.highlight_alpha - dimmed) * lit
}

fn draw_links(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let bodies = state.sim.bodies();
	let color = theme.link.color;

	for (link, s, t) in state.indexed_links() {
		let (Some(a), Some(b)) = (bodies.get(s), bodies.get(t)) else {
			continue;
		};
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let alpha = link_alpha(state, theme, s, t);
		let arrow = theme.has_arrow(link.kind) && scale.arrow_alpha > 0.0;

		// Stop at the target's rim, leaving room for the arrowhead.
		let target_r = scale.radius(state.data.nodes[t].kind);
		let inset = if arrow {
			target_r + scale.arrow_size
		} else {
			target_r
		};

		ctx.set_stroke_style_str(&color.with_alpha(color.a * alpha).to_css());
		ctx.set_line_width(scale.link_width(link.weight));
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x - ux * inset, b.y - uy * inset);
		ctx.stroke();

		if arrow {
			draw_arrowhead(ctx, scale, (b.x, b.y), (ux, uy), target_r);
			ctx.set_fill_style_str(
				&color
					.with_alpha(color.a * alpha * scale.arrow_alpha)
					.to_css(),
			);
			ctx.fill();
		}
	}
}

fn draw_arrowhead(
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	(x, y): (f64, f64),
	(ux, uy): (f64, f64),
	target_r: f64,
) {
	let (tip_x, tip_y) = (x - ux * target_r, y - uy * target_r);
	let (back_x, back_y) = (tip_x - ux * scale.arrow_size, tip_y - uy * scale.arrow_size);
	let (px, py) = (-uy * scale.arrow_size * 0.5, ux * scale.arrow_size * 0.5);

	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
}

fn draw_nodes(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let max = smooth_step(state.highlight.max_intensity());
	let selected = state.selected();

	for (i, (node, body)) in state.data.nodes.iter().zip(state.sim.bodies()).enumerate() {
		let lit = smooth_step(state.highlight.node_intensity(i));
		let grow = 1.0 + (scale.hover_growth - 1.0) * smooth_step(state.highlight.growth(i));
		let radius = scale.radius(node.kind) * grow;
		let dim = 1.0 - 0.6 * max;
		let alpha = dim + (1.0 - dim) * lit;

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(body.x, body.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&theme.node_color(node.kind).to_css());
		ctx.fill();

		ctx.set_stroke_style_str(&theme.node.border_color.to_css());
		ctx.set_line_width(scale.border_width);
		ctx.stroke();

		if selected == Some(i) {
			ctx.begin_path();
			let _ = ctx.arc(body.x, body.y, radius + scale.border_width * 2.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.node_color(node.kind).lighten(0.4).to_css());
			ctx.set_line_width(scale.border_width);
			ctx.stroke();
		}
		ctx.set_global_alpha(1.0);
	}

	if scale.label_alpha <= 0.0 {
		return;
	}
	ctx.set_font(&scale.label_font);
	ctx.set_text_baseline("middle");
	let label = theme.node.label_color;
	for (i, (node, body)) in state.data.nodes.iter().zip(state.sim.bodies()).enumerate() {
		let lit = smooth_step(state.highlight.node_intensity(i));
		let dim = 1.0 - 0.6 * max;
		let alpha = (dim + (1.0 - dim) * lit) * scale.label_alpha;
		ctx.set_fill_style_str(&label.with_alpha(label.a * alpha).to_css());
		let _ = ctx.fill_text(&node.name, body.x + scale.label_offset, body.y);
	}
}
