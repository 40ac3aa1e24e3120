//! Force-directed graph visualization component.
//!
//! Renders an interactive force-directed graph on an HTML canvas with:
//! - A d3-style force simulation (links, Barnes–Hut repulsion, centering, collision)
//! - Pan, zoom, and node dragging that pins nodes in the simulation
//! - Click selection and smooth hover highlighting
//! - Configurable theming and visual scaling
//!
//! Everything except [`ForceGraphCanvas`] and the renderer is plain Rust and runs
//! headless.
//!
//! # Example
//!
//! ```ignore
//! use codebase_graph::{ForceGraphCanvas, GraphData, GraphLink, GraphNode, LinkKind};
//!
//! let data = GraphData {
//!     nodes: vec![dir_node, file_node],
//!     links: vec![GraphLink::new("1", "2", LinkKind::Contains)],
//! };
//!
//! view! {
//!     <ForceGraphCanvas
//!         data=Signal::derive(move || data.clone())
//!         on_select=move |node| set_selected.set(node)
//!         fullscreen=true
//!     />
//! }
//! ```

mod component;
/// Click selection.
pub mod interaction;
mod quadtree;
mod render;
/// Zoom-dependent sizes.
pub mod scale;
/// Force layout.
pub mod simulation;
/// Per-graph state driven by the canvas.
pub mod state;
/// Colors.
pub mod theme;
mod types;
/// Pan, zoom and gestures.
pub mod viewport;

pub use component::ForceGraphCanvas;
pub use interaction::InteractionRouter;
pub use scale::ScaleConfig;
pub use simulation::{Body, Simulation, SimulationParameters};
pub use state::ForceGraphState;
pub use theme::Theme;
pub use types::{GraphData, GraphLink, GraphNode, LinkKind, NodeKind, NodePosition};
pub use viewport::{PointerOutcome, ViewTransform, Viewport, ViewportConfig};
