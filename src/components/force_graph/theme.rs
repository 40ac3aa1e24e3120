//! Colors and visual style of the force graph.

use super::types::{LinkKind, NodeKind};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// An opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// A color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// The same color at a different opacity.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Mixes towards white; 0.0 leaves the color unchanged.
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		let mix = |c: u8| (f64::from(c) + (255.0 - f64::from(c)) * f).round() as u8;
		Self {
			r: mix(self.r),
			g: mix(self.g),
			b: mix(self.b),
			a: self.a,
		}
	}

	/// CSS color string: hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Canvas background fill.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Base fill, also the outer gradient stop.
	pub color: Color,
	/// Centre color of the radial gradient, if any.
	pub gradient_center: Option<Color>,
}

/// Link stroke and hover dimming.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	/// Stroke color at rest.
	pub color: Color,
	/// Opacity of links touching a hovered node.
	pub highlight_alpha: f64,
	/// Opacity of the remaining links while something is hovered.
	pub dimmed_alpha: f64,
}

/// Node fills, outline and labels.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Fill for file nodes.
	pub file_color: Color,
	/// Fill for directory nodes.
	pub directory_color: Color,
	/// Outline around every node.
	pub border_color: Color,
	/// Label text.
	pub label_color: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Short identifier for logs.
	pub name: &'static str,
	/// Background fill.
	pub background: BackgroundStyle,
	/// Link styling.
	pub link: LinkStyle,
	/// Node styling.
	pub node: NodeStyle,
}

impl Theme {
	/// Dark canvas with the classic orange directories and blue files.
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				gradient_center: Some(Color::rgb(30, 35, 42)),
			},
			link: LinkStyle {
				color: Color::rgba(153, 153, 153, 0.6),
				highlight_alpha: 0.95,
				dimmed_alpha: 0.2,
			},
			node: NodeStyle {
				file_color: Color::rgb(31, 119, 180),
				directory_color: Color::rgb(255, 127, 14),
				border_color: Color::rgb(255, 255, 255),
				label_color: Color::rgba(230, 237, 243, 0.9),
			},
		}
	}

	/// Fill color for a node of `kind`.
	pub fn node_color(&self, kind: NodeKind) -> Color {
		match kind {
			NodeKind::File => self.node.file_color,
			NodeKind::Directory => self.node.directory_color,
		}
	}

	/// Only import links carry an arrowhead.
	pub fn has_arrow(&self, kind: LinkKind) -> bool {
		kind == LinkKind::Imports
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
