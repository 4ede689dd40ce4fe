//! Pointer picking and selection state.

use super::types::{Graph, Node, NodeType, Verdict};

/// Pointer distance below which a node is picked.
pub const PICK_RADIUS: f64 = 16.0;

/// Details of the selected node handed to the host.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedNode {
	/// Node id.
	pub id: String,
	/// Full, untruncated label.
	pub label: String,
	/// Entity type.
	pub node_type: NodeType,
	/// Neighbor ids in sorted order.
	pub connections: Vec<String>,
	/// Report count, when known.
	pub report_count: Option<u32>,
	/// Verdict of a report node.
	pub verdict: Option<Verdict>,
}

impl From<&Node> for SelectedNode {
	fn from(node: &Node) -> Self {
		Self {
			id: node.id.clone(),
			label: node.label.clone(),
			node_type: node.node_type,
			connections: node.connections.iter().cloned().collect(),
			report_count: node.report_count,
			verdict: node.verdict,
		}
	}
}

/// First node, in list order, within the pick radius of the pointer.
pub fn hit_test(graph: &Graph, x: f64, y: f64) -> Option<&Node> {
	graph
		.nodes()
		.iter()
		.find(|node| node.distance_to(x, y) < PICK_RADIUS)
}

type SelectionListener = Box<dyn FnMut(Option<SelectedNode>)>;

/// Selection and hover state between ticks.
#[derive(Default)]
pub struct InteractionLayer {
	selected: Option<String>,
	hovered: Option<String>,
	listener: Option<SelectionListener>,
}

impl InteractionLayer {
	/// Register the selection-changed listener.
	pub fn on_selection_change(&mut self, listener: impl FnMut(Option<SelectedNode>) + 'static) {
		self.listener = Some(Box::new(listener));
	}

	/// Id of the selected node.
	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	/// Id of the node under the pointer.
	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	/// Select the node under the pointer, or clear the selection on empty
	/// space. Returns whether the selection changed.
	pub fn select_at(&mut self, graph: &Graph, x: f64, y: f64) -> bool {
		let hit = hit_test(graph, x, y);
		if hit.map(|node| node.id.as_str()) == self.selected.as_deref() {
			return false;
		}
		self.selected = hit.map(|node| node.id.clone());
		self.notify(hit.map(SelectedNode::from));
		true
	}

	/// Track the node under the pointer. Returns whether it changed.
	pub fn hover_at(&mut self, graph: &Graph, x: f64, y: f64) -> bool {
		let hit = hit_test(graph, x, y).map(|node| node.id.clone());
		if hit == self.hovered {
			return false;
		}
		self.hovered = hit;
		true
	}

	/// Forget the hovered node, e.g. when the pointer leaves the surface.
	pub fn clear_hover(&mut self) {
		self.hovered = None;
	}

	/// Bring selection state in line with a replaced graph: a selection whose
	/// node vanished is cleared, a surviving one is re-announced with fresh
	/// details.
	pub fn reconcile(&mut self, graph: &Graph) {
		if self.hovered.as_deref().is_some_and(|id| graph.node(id).is_none()) {
			self.hovered = None;
		}
		let Some(id) = self.selected.take() else {
			return;
		};
		let details = graph.node(&id).map(SelectedNode::from);
		if details.is_some() {
			self.selected = Some(id);
		}
		self.notify(details);
	}

	fn notify(&mut self, selection: Option<SelectedNode>) {
		if let Some(listener) = self.listener.as_mut() {
			listener(selection);
		}
	}
}
