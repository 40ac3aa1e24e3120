//! Zoom-dependent sizing of graph visuals.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: the simulation's coordinates. Sizes given in world units grow
//!   and shrink with the zoom level `k`.
//! - **Screen-space**: canvas pixels. Sizes given in screen units look the same at
//!   every zoom level, so they are divided by `k` before drawing under the view
//!   transform.
//!
//! Every value in [`ScaledValues`] is already converted to world-space.

use super::types::NodeKind;

/// How a size reacts to zoom.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Fixed in screen pixels.
	Screen,
	/// World units, but never smaller or larger than the given screen sizes.
	Clamped {
		/// Smallest drawn size in pixels.
		min_screen: f64,
		/// Largest drawn size in pixels.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// The world-space size to draw for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Opacity as a function of zoom: zero at or below `hidden_k`, full at or above
/// `visible_k`, linear in between.
#[derive(Clone, Debug)]
pub struct ZoomFade {
	/// Zoom at or below which the element is invisible.
	pub hidden_k: f64,
	/// Zoom at or above which the element is fully opaque.
	pub visible_k: f64,
}

impl ZoomFade {
	/// Opacity at zoom `k`.
	pub fn alpha(&self, k: f64) -> f64 {
		if self.visible_k <= self.hidden_k {
			return 1.0;
		}
		((k - self.hidden_k) / (self.visible_k - self.hidden_k)).clamp(0.0, 1.0)
	}
}

/// Node sizes.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Radius of file nodes in world units.
	pub file_radius: f64,
	/// Radius of directory nodes in world units.
	pub directory_radius: f64,
	/// How radii react to zoom.
	pub radius_behavior: ScaleBehavior,
	/// Radius multiplier for a fully hovered node.
	pub hover_growth: f64,
	/// Extra screen pixels around the drawn radius that still count as a hit.
	pub hit_padding: f64,
	/// Outline width in world units.
	pub border_width: f64,
	/// Label font size in world units.
	pub label_size: f64,
	/// Horizontal label offset from the node centre.
	pub label_offset: f64,
	/// Labels fade out when zoomed far out.
	pub label_fade: ZoomFade,
}

/// Link widths.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Line width per unit of `sqrt(weight)`.
	pub width_per_weight: f64,
	/// How widths react to zoom.
	pub width_behavior: ScaleBehavior,
}

/// Arrowheads on import links.
#[derive(Clone, Debug)]
pub struct ArrowScaleConfig {
	/// Arrowhead length in world units.
	pub size: f64,
	/// Arrowheads fade out when zoomed far out.
	pub fade: ZoomFade,
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Node sizes.
	pub node: NodeScaleConfig,
	/// Link widths.
	pub edge: EdgeScaleConfig,
	/// Arrowheads.
	pub arrow: ArrowScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				file_radius: 8.0,
				directory_radius: 12.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 2.0,
					max_screen: f64::INFINITY,
				},
				hover_growth: 1.25,
				hit_padding: 2.0,
				border_width: 2.0,
				label_size: 12.0,
				label_offset: 16.0,
				label_fade: ZoomFade {
					hidden_k: 0.25,
					visible_k: 0.5,
				},
			},
			edge: EdgeScaleConfig {
				width_per_weight: 1.0,
				width_behavior: ScaleBehavior::Clamped {
					min_screen: 0.5,
					max_screen: f64::INFINITY,
				},
			},
			arrow: ArrowScaleConfig {
				size: 6.0,
				fade: ZoomFade {
					hidden_k: 0.15,
					visible_k: 0.4,
				},
			},
		}
	}
}

/// Sizes for one frame at a fixed zoom level.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom these values were computed for.
	pub k: f64,
	/// Drawn file radius.
	pub file_radius: f64,
	/// Drawn directory radius.
	pub directory_radius: f64,
	pub hover_growth: f64,
	pub hit_padding: f64,
	pub border_width: f64,
	/// CSS font string, e.g. "12px sans-serif".
	pub label_font: String,
	pub label_offset: f64,
	/// Label opacity at this zoom.
	pub label_alpha: f64,
	/// Line width for a link of weight 1.
	pub edge_width: f64,
	/// Arrowhead length.
	pub arrow_size: f64,
	/// Arrowhead opacity at this zoom.
	pub arrow_alpha: f64,
}

impl ScaledValues {
	/// Resolves `config` at zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let node = &config.node;
		Self {
			k,
			file_radius: node.radius_behavior.apply(node.file_radius, k),
			directory_radius: node.radius_behavior.apply(node.directory_radius, k),
			hover_growth: node.hover_growth,
			hit_padding: ScaleBehavior::Screen.apply(node.hit_padding, k),
			border_width: node.border_width,
			label_font: format!("{}px sans-serif", node.label_size),
			label_offset: node.label_offset,
			label_alpha: node.label_fade.alpha(k),
			edge_width: config
				.edge
				.width_behavior
				.apply(config.edge.width_per_weight, k),
			arrow_size: config.arrow.size,
			arrow_alpha: config.arrow.fade.alpha(k),
		}
	}

	/// Drawn radius for a node of `kind`, before hover growth.
	pub fn radius(&self, kind: NodeKind) -> f64 {
		match kind {
			NodeKind::File => self.file_radius,
			NodeKind::Directory => self.directory_radius,
		}
	}

	/// Drawn width of a link with the given weight.
	pub fn link_width(&self, weight: f64) -> f64 {
		self.edge_width * weight.max(0.0).sqrt()
	}
}
