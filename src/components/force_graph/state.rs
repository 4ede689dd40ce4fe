//! Per-view state shared by the frame loop and the pointer handlers.

use std::collections::VecDeque;

use log::debug;

use super::interaction::InteractionLayer;
use super::render::{self, Highlight, NodeSizing, Surface, Viewport};
use super::simulation::{self, SimulationConfig};
use super::types::Graph;

/// Host-driven change applied at the top of the next frame.
#[derive(Debug)]
pub enum PendingUpdate {
	/// Swap in a freshly adapted graph.
	Replace(Graph),
	/// Resize the backing buffer and re-center the layout.
	Resize(Viewport),
}

/// Everything one mounted graph view owns between frames.
pub struct GraphView {
	/// Graph being laid out.
	pub graph: Graph,
	/// Force constants.
	pub config: SimulationConfig,
	/// Radius tiers used for drawing.
	pub sizing: NodeSizing,
	/// Selection and hover state.
	pub interaction: InteractionLayer,
	/// Current surface size.
	pub viewport: Viewport,
	pending: VecDeque<PendingUpdate>,
	ticks: u64,
}

impl GraphView {
	/// New view; the config is fitted to the viewport.
	pub fn new(graph: Graph, mut config: SimulationConfig, viewport: Viewport) -> Self {
		config.fit_to(viewport.width, viewport.height);
		Self {
			graph,
			config,
			sizing: NodeSizing::default(),
			interaction: InteractionLayer::default(),
			viewport,
			pending: VecDeque::new(),
			ticks: 0,
		}
	}

	/// Queue a graph replacement for the next frame.
	pub fn queue_graph(&mut self, graph: Graph) {
		self.pending.push_back(PendingUpdate::Replace(graph));
	}

	/// Queue a resize for the next frame.
	pub fn queue_resize(&mut self, viewport: Viewport) {
		self.pending.push_back(PendingUpdate::Resize(viewport));
	}

	/// Queue a resize unless the surface already has, or is about to get, this
	/// size. Returns whether one was queued.
	pub fn resize_to(&mut self, viewport: Viewport) -> bool {
		let latest = self
			.pending
			.iter()
			.rev()
			.find_map(|update| match update {
				PendingUpdate::Resize(queued) => Some(*queued),
				PendingUpdate::Replace(_) => None,
			})
			.unwrap_or(self.viewport);
		if latest == viewport {
			return false;
		}
		self.queue_resize(viewport);
		true
	}

	/// Number of queued updates.
	pub fn pending_updates(&self) -> usize {
		self.pending.len()
	}

	/// Ticks simulated so far.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// One frame: drain queued updates, simulate, repaint.
	pub fn frame(&mut self, surface: &mut impl Surface) {
		self.apply_pending(surface);
		simulation::tick(&mut self.graph, &self.config);
		self.ticks += 1;
		if self.ticks % 60 == 0 {
			debug!(
				"tick {}: kinetic energy {:.3}",
				self.ticks,
				simulation::kinetic_energy(&self.graph)
			);
		}
		self.paint(&*surface);
	}

	/// Repaint without advancing the simulation.
	pub fn paint(&self, surface: &impl Surface) {
		render::render(
			surface,
			&self.graph,
			&self.viewport,
			&self.sizing,
			Highlight {
				selected: self.interaction.selected(),
				hovered: self.interaction.hovered(),
			},
		);
	}

	/// Selection at a surface-local pointer position.
	pub fn click(&mut self, x: f64, y: f64) -> bool {
		self.interaction.select_at(&self.graph, x, y)
	}

	/// Hover at a surface-local pointer position.
	pub fn hover(&mut self, x: f64, y: f64) -> bool {
		self.interaction.hover_at(&self.graph, x, y)
	}

	fn apply_pending(&mut self, surface: &mut impl Surface) {
		while let Some(update) = self.pending.pop_front() {
			match update {
				PendingUpdate::Replace(graph) => {
					self.graph = graph;
					self.interaction.reconcile(&self.graph);
				}
				PendingUpdate::Resize(viewport) => {
					surface.resize(&viewport);
					self.config.fit_to(viewport.width, viewport.height);
					self.viewport = viewport;
				}
			}
		}
	}
}
