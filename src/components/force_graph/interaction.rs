//! Selection routing.
//!
//! Turns finished pointer gestures into selection changes for the host. Only clicks
//! select: a node click selects that node, a background click clears the selection,
//! drags and pans leave it alone.

use super::viewport::PointerOutcome;

/// The current selection, by node index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionRouter {
	selected: Option<usize>,
}

impl InteractionRouter {
	/// Index of the selected node.
	pub fn selected(&self) -> Option<usize> {
		self.selected
	}

	/// Applies a gesture outcome. Returns `Some(selection)` when the host should be
	/// notified, including repeated clicks on the already-selected node.
	pub fn route(&mut self, outcome: PointerOutcome) -> Option<Option<usize>> {
		let selection = match outcome {
			PointerOutcome::NodeClick(index) => Some(index),
			PointerOutcome::BackgroundClick => None,
			PointerOutcome::Dragged(_) | PointerOutcome::Panned | PointerOutcome::Nothing => {
				return None;
			}
		};
		self.selected = selection;
		Some(selection)
	}

	/// Forgets the selection without notifying, used when the graph is replaced.
	pub fn reset(&mut self) {
		self.selected = None;
	}
}
