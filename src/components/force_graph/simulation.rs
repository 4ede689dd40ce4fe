//! Force-directed layout step.
//!
//! Nodes repel each other pairwise, edges act as springs around a rest length,
//! and every node is pulled toward a fixed center before velocity is damped and
//! integrated. The step never settles exactly, so the layout keeps a faint
//! motion for as long as the view runs.

use std::f64::consts::TAU;

use super::types::Graph;

/// Rectangle nodes are kept inside after integration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Surface width.
	pub width: f64,
	/// Surface height.
	pub height: f64,
	/// Inset from every side.
	pub margin: f64,
}

impl Bounds {
	/// Clamp a point into the inset rectangle. A surface smaller than twice the
	/// margin collapses to its center line.
	pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
		let axis = |value: f64, extent: f64| {
			let low = self.margin.min(extent / 2.0);
			let high = (extent - self.margin).max(low);
			value.clamp(low, high)
		};
		(axis(x, self.width), axis(y, self.height))
	}
}

/// Force constants for one engine instance.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
	/// Pairwise repulsion numerator (`K_rep / d²`).
	pub repulsion: f64,
	/// Spring stiffness per unit of stretch.
	pub spring: f64,
	/// Edge length at which the spring is relaxed.
	pub rest_length: f64,
	/// Pull toward `center` per unit of displacement.
	pub gravity: f64,
	/// Velocity multiplier per tick, below one.
	pub damping: f64,
	/// Gravity target.
	pub center: (f64, f64),
	/// Optional viewport clamp applied after integration.
	pub bounds: Option<Bounds>,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self::network()
	}
}

impl SimulationConfig {
	/// Free-floating layout used by the network view.
	pub fn network() -> Self {
		Self {
			repulsion: 3000.0,
			spring: 0.01,
			rest_length: 120.0,
			gravity: 0.005,
			damping: 0.85,
			center: (0.0, 0.0),
			bounds: None,
		}
	}

	/// Tighter layout that keeps every node inside a `width` x `height` surface.
	pub fn contained(width: f64, height: f64) -> Self {
		Self {
			repulsion: 2000.0,
			spring: 0.02,
			rest_length: 100.0,
			gravity: 0.01,
			damping: 0.9,
			center: (width / 2.0, height / 2.0),
			bounds: Some(Bounds {
				width,
				height,
				margin: 40.0,
			}),
		}
	}

	/// Re-center on a resized surface, keeping the clamp margin.
	pub fn fit_to(&mut self, width: f64, height: f64) {
		self.center = (width / 2.0, height / 2.0);
		if let Some(bounds) = self.bounds.as_mut() {
			bounds.width = width;
			bounds.height = height;
		}
	}
}

/// Advance every node by one discrete step.
pub fn tick(graph: &mut Graph, config: &SimulationConfig) {
	let count = graph.nodes().len();
	if count == 0 {
		return;
	}
	let mut impulse = vec![(0.0_f64, 0.0_f64); count];

	for a in 0..count {
		for b in (a + 1)..count {
			let (ax, ay) = (graph.nodes()[a].x, graph.nodes()[a].y);
			let (bx, by) = (graph.nodes()[b].x, graph.nodes()[b].y);
			let (ux, uy, distance) = direction(ax, ay, bx, by, a, b);
			let force = config.repulsion / (distance * distance);
			let (fx, fy) = (ux * force, uy * force);
			if fx.is_finite() && fy.is_finite() {
				impulse[a].0 -= fx;
				impulse[a].1 -= fy;
				impulse[b].0 += fx;
				impulse[b].1 += fy;
			}
		}
	}

	for edge in graph.edges() {
		if edge.is_self_loop() {
			continue;
		}
		let (s, t) = edge.endpoints();
		let (sx, sy) = (graph.nodes()[s].x, graph.nodes()[s].y);
		let (tx, ty) = (graph.nodes()[t].x, graph.nodes()[t].y);
		let (ux, uy, distance) = direction(sx, sy, tx, ty, s, t);
		let force = (distance - config.rest_length) * config.spring;
		let (fx, fy) = (ux * force, uy * force);
		if fx.is_finite() && fy.is_finite() {
			impulse[s].0 += fx;
			impulse[s].1 += fy;
			impulse[t].0 -= fx;
			impulse[t].1 -= fy;
		}
	}

	let (cx, cy) = config.center;
	for (node, (ix, iy)) in graph.nodes_mut().iter_mut().zip(impulse) {
		let (gx, gy) = ((cx - node.x) * config.gravity, (cy - node.y) * config.gravity);
		let vx = (node.vx + ix + finite_or_zero(gx)) * config.damping;
		let vy = (node.vy + iy + finite_or_zero(gy)) * config.damping;
		let (x, y) = (node.x + vx, node.y + vy);
		if !(vx.is_finite() && vy.is_finite() && x.is_finite() && y.is_finite()) {
			node.vx = 0.0;
			node.vy = 0.0;
			continue;
		}
		node.vx = vx;
		node.vy = vy;
		(node.x, node.y) = match config.bounds {
			Some(bounds) => bounds.clamp(x, y),
			None => (x, y),
		};
	}
}

/// Total kinetic energy, `Σ|v|²`.
pub fn kinetic_energy(graph: &Graph) -> f64 {
	graph
		.nodes()
		.iter()
		.map(|node| node.vx * node.vx + node.vy * node.vy)
		.sum()
}

/// Unit vector from the first point to the second and their distance floored
/// at one. Coincident points get a fixed direction derived from their indices.
fn direction(x1: f64, y1: f64, x2: f64, y2: f64, i: usize, j: usize) -> (f64, f64, f64) {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let raw = dx.hypot(dy);
	let distance = raw.max(1.0);
	if raw > 1e-9 {
		return (dx / raw, dy / raw, distance);
	}
	let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214) * TAU;
	(angle.cos(), angle.sin(), distance)
}

fn finite_or_zero(value: f64) -> f64 {
	if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::adapter::GraphDataAdapter;
	use crate::components::force_graph::types::{
		GraphPayload, PayloadEdge, PayloadNode, test_node,
	};

	fn pair(distance: f64) -> Graph {
		let mut graph = Graph::default();
		graph.push_node(test_node("a", -distance / 2.0, 0.0));
		graph.push_node(test_node("b", distance / 2.0, 0.0));
		graph
	}

	fn random_payload(nodes: usize, edges: &[(usize, usize)]) -> GraphPayload {
		GraphPayload {
			nodes: (0..nodes)
				.map(|i| PayloadNode {
					id: format!("n{i}"),
					kind: Some("phone".into()),
					..PayloadNode::default()
				})
				.collect(),
			edges: edges
				.iter()
				.map(|(from, to)| PayloadEdge {
					from: format!("n{from}"),
					to: format!("n{to}"),
					label: "LINKED".into(),
				})
				.collect(),
			total_reports: None,
		}
	}

	#[test]
	fn repulsion_pushes_unconnected_nodes_apart() {
		let mut graph = pair(50.0);
		let config = SimulationConfig {
			gravity: 0.0,
			..SimulationConfig::network()
		};
		tick(&mut graph, &config);

		assert!(graph.nodes()[0].vx < 0.0);
		assert!(graph.nodes()[1].vx > 0.0);
		assert!((graph.nodes()[0].vx + graph.nodes()[1].vx).abs() < 1e-12);
		assert!(graph.nodes()[1].x - graph.nodes()[0].x > 50.0);
	}

	#[test]
	fn spring_pulls_long_edges_and_pushes_short_ones() {
		let config = SimulationConfig {
			repulsion: 0.0,
			gravity: 0.0,
			..SimulationConfig::network()
		};

		let mut long = pair(300.0);
		long.connect("a", "b", "LINKED");
		tick(&mut long, &config);
		assert!(long.nodes()[1].x - long.nodes()[0].x < 300.0);

		let mut short = pair(60.0);
		short.connect("a", "b", "LINKED");
		tick(&mut short, &config);
		assert!(short.nodes()[1].x - short.nodes()[0].x > 60.0);
	}

	#[test]
	fn scenario_one_tick_moves_toward_rest_length() {
		let payload = GraphPayload::from_json(
			r#"{"nodes":[{"id":"a","label":"555-0100","type":"phone"},
			{"id":"b","label":"scam.biz","type":"url"}],
			"edges":[{"from":"a","to":"b","label":"mentioned_in"}],"total_reports":5}"#,
		)
		.unwrap();
		let config = SimulationConfig {
			center: (400.0, 300.0),
			..SimulationConfig::network()
		};
		let mut graph = GraphDataAdapter::seeded(11).adapt(&payload, config.center);
		let before = graph.nodes()[0].distance_to(graph.nodes()[1].x, graph.nodes()[1].y);

		tick(&mut graph, &config);

		let after = graph.nodes()[0].distance_to(graph.nodes()[1].x, graph.nodes()[1].y);
		assert!(graph.nodes().iter().all(|n| n.x.is_finite() && n.y.is_finite()));
		assert!(after < before);
		assert!((after - config.rest_length).abs() > 1e-9);
	}

	#[test]
	fn isolated_node_settles_near_center() {
		let mut graph = Graph::default();
		graph.push_node(test_node("lonely", 900.0, -700.0));
		let config = SimulationConfig {
			center: (400.0, 300.0),
			..SimulationConfig::network()
		};
		for _ in 0..2000 {
			tick(&mut graph, &config);
		}
		assert!(graph.nodes()[0].distance_to(400.0, 300.0) < 1.0);
	}

	#[test]
	fn coincident_nodes_separate() {
		let mut graph = Graph::default();
		graph.push_node(test_node("a", 10.0, 10.0));
		graph.push_node(test_node("b", 10.0, 10.0));
		tick(&mut graph, &SimulationConfig::network());

		let (a, b) = (&graph.nodes()[0], &graph.nodes()[1]);
		assert!(a.distance_to(b.x, b.y) > 1.0);
		assert!(a.x.is_finite() && b.y.is_finite());
	}

	#[test]
	fn extreme_positions_stay_finite() {
		let mut graph = Graph::default();
		graph.push_node(test_node("a", -1e308, 0.0));
		graph.push_node(test_node("b", 1e308, 0.0));
		graph.connect("a", "b", "LINKED");
		for _ in 0..10 {
			tick(&mut graph, &SimulationConfig::network());
		}

		for node in graph.nodes() {
			assert!(node.x.is_finite() && node.y.is_finite());
			assert!(node.vx.is_finite() && node.vy.is_finite());
		}
	}

	#[test]
	fn non_finite_constants_leave_nodes_finite() {
		let mut graph = Graph::default();
		graph.push_node(test_node("a", 0.0, 0.0));
		graph.push_node(test_node("b", 30.0, 0.0));
		graph.connect("a", "b", "LINKED");
		let config = SimulationConfig {
			repulsion: f64::INFINITY,
			spring: f64::NAN,
			..SimulationConfig::network()
		};
		for _ in 0..10 {
			tick(&mut graph, &config);
		}

		for node in graph.nodes() {
			assert!(node.x.is_finite() && node.y.is_finite());
			assert!(node.vx.is_finite() && node.vy.is_finite());
		}
	}

	#[test]
	fn self_loops_are_ignored() {
		let mut graph = Graph::default();
		graph.push_node(test_node("a", 0.0, 0.0));
		graph.connect("a", "a", "SELF");
		tick(&mut graph, &SimulationConfig::network());

		assert_eq!((graph.nodes()[0].x, graph.nodes()[0].y), (0.0, 0.0));
		assert_eq!(kinetic_energy(&graph), 0.0);
	}

	#[test]
	fn energy_stays_bounded_over_many_ticks() {
		let edges: Vec<(usize, usize)> = (1..60).map(|i| (i, (i * 7) % 60)).collect();
		let payload = random_payload(60, &edges);
		for config in [
			SimulationConfig {
				center: (500.0, 400.0),
				..SimulationConfig::network()
			},
			SimulationConfig::contained(1000.0, 800.0),
		] {
			let mut graph = GraphDataAdapter::seeded(5).adapt(&payload, config.center);
			for _ in 0..500 {
				tick(&mut graph, &config);
			}
			let energy = kinetic_energy(&graph);
			assert!(energy.is_finite());
			assert!(energy < 1.0e4, "energy diverged: {energy}");
			assert!(
				graph
					.nodes()
					.iter()
					.all(|n| n.x.is_finite() && n.y.is_finite())
			);
		}
	}

	#[test]
	fn contained_layout_clamps_after_integration() {
		let mut graph = Graph::default();
		graph.push_node(test_node("far", 5000.0, -5000.0));
		let config = SimulationConfig::contained(800.0, 600.0);
		tick(&mut graph, &config);

		let node = &graph.nodes()[0];
		assert_eq!((node.x, node.y), (760.0, 40.0));
		assert!(node.vx < 0.0 && node.vy > 0.0);
	}

	#[test]
	fn bounds_collapse_on_tiny_surfaces() {
		let bounds = Bounds {
			width: 50.0,
			height: 200.0,
			margin: 40.0,
		};
		assert_eq!(bounds.clamp(0.0, 0.0), (25.0, 40.0));
		assert_eq!(bounds.clamp(100.0, 500.0), (25.0, 160.0));
	}

	#[test]
	fn fit_to_recenters_and_rescales() {
		let mut config = SimulationConfig::contained(800.0, 600.0);
		config.fit_to(1200.0, 900.0);
		assert_eq!(config.center, (600.0, 450.0));
		assert_eq!(config.bounds.map(|b| (b.width, b.height)), Some((1200.0, 900.0)));
	}

	#[test]
	fn empty_graph_ticks() {
		let mut graph = Graph::default();
		tick(&mut graph, &SimulationConfig::network());
		assert!(graph.is_empty());
	}
}
