//! UI components: the graph canvas and the host panels around it.

/// Details panel for the selected node.
pub mod file_info;
/// Directory and archive pickers.
pub mod file_upload;
/// The force-directed canvas.
pub mod force_graph;
