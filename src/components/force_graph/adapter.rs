//! Backend payload to canonical graph conversion.

use std::collections::{BTreeSet, HashSet};
use std::f64::consts::PI;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::types::{Graph, GraphPayload, Node, NodeType, Verdict};

/// Radius of the initial circle.
pub const SEED_RADIUS: f64 = 200.0;
/// Per-axis jitter bound, keeps the total offset under 40 units.
pub const SEED_JITTER: f64 = 20.0;

/// Payload that could not be decoded at all.
#[derive(Debug, Error)]
pub enum PayloadError {
	/// The body is not valid graph JSON.
	#[error("malformed graph payload: {0}")]
	Malformed(#[from] serde_json::Error),
}

impl GraphPayload {
	/// Decode a payload from JSON.
	pub fn from_json(json: &str) -> Result<Self, PayloadError> {
		Ok(serde_json::from_str(json)?)
	}

	/// Decode a payload, degrading to an empty one on malformed input.
	pub fn from_json_lossy(json: &str) -> Self {
		Self::from_json(json).unwrap_or_else(|err| {
			warn!("{err}; showing an empty graph");
			Self::default()
		})
	}
}

/// Builds graphs from payloads, placing nodes on a jittered circle.
pub struct GraphDataAdapter<R = StdRng> {
	rng: R,
}

impl GraphDataAdapter<StdRng> {
	/// Deterministic jitter for a fixed seed.
	pub fn seeded(seed: u64) -> Self {
		Self::with_rng(StdRng::seed_from_u64(seed))
	}

	/// Jitter seeded from the current time.
	pub fn from_clock() -> Self {
		Self::seeded(clock_seed())
	}
}

impl<R: Rng> GraphDataAdapter<R> {
	/// Use any random source for the jitter.
	pub fn with_rng(rng: R) -> Self {
		Self { rng }
	}

	/// Convert a payload into a graph seeded around `center`.
	pub fn adapt(&mut self, payload: &GraphPayload, center: (f64, f64)) -> Graph {
		let total_reports = payload
			.total_reports
			.filter(|total| total.is_finite())
			.map_or(0, |total| total.max(0.0) as u64);
		let mut graph = Graph::with_total_reports(total_reports);

		let mut seen = HashSet::new();
		let mut unique = Vec::with_capacity(payload.nodes.len());
		for raw in &payload.nodes {
			if seen.insert(raw.id.as_str()) {
				unique.push(raw);
			} else {
				debug!("duplicate node id {:?}, keeping the first", raw.id);
			}
		}
		let total = unique.len();

		for (i, raw) in unique.into_iter().enumerate() {
			let angle = 2.0 * PI * i as f64 / total as f64;
			let (jx, jy) = (
				self.rng.gen_range(-SEED_JITTER..=SEED_JITTER),
				self.rng.gen_range(-SEED_JITTER..=SEED_JITTER),
			);
			let node = Node {
				id: raw.id.clone(),
				label: raw.label.clone().unwrap_or_else(|| raw.id.clone()),
				node_type: raw
					.kind
					.as_deref()
					.map_or(NodeType::Report, NodeType::from_label),
				x: center.0 + SEED_RADIUS * angle.cos() + jx,
				y: center.1 + SEED_RADIUS * angle.sin() + jy,
				vx: 0.0,
				vy: 0.0,
				report_count: raw
					.report_count
					.filter(|count| count.is_finite())
					.map(|count| count.max(0.0).min(u32::MAX as f64) as u32),
				verdict: raw.verdict.as_deref().and_then(Verdict::parse),
				connections: BTreeSet::new(),
			};
			graph.push_node(node);
		}

		let mut dropped = 0;
		for edge in &payload.edges {
			if !graph.connect(&edge.from, &edge.to, edge.label.as_str()) {
				debug!("dropping edge {} -> {}: unknown endpoint", edge.from, edge.to);
				dropped += 1;
			}
		}

		info!(
			"adapted graph: {} nodes, {} edges ({} dropped), {} reports",
			graph.nodes().len(),
			graph.edges().len(),
			dropped,
			graph.total_reports
		);
		graph
	}
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
	js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|elapsed| elapsed.as_nanos() as u64)
		.unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::PayloadNode;

	const SCENARIO: &str = r#"{
		"nodes": [
			{"id": "a", "label": "555-0100", "type": "phone"},
			{"id": "b", "label": "scam.biz", "type": "url"}
		],
		"edges": [{"from": "a", "to": "b", "label": "mentioned_in"}],
		"total_reports": 5
	}"#;

	fn sample_payload() -> GraphPayload {
		GraphPayload::from_json(
			r#"{
			"nodes": [
				{"id": "scan-1", "label": "Scan: text", "verdict": "RED"},
				{"id": "ent-555", "label": "555-0199", "type": "phone_number", "reportCount": 12},
				{"id": "ent-url", "label": "paypa1-secure.com", "type": "URL", "reportCount": 2},
				{"id": "ent-co", "label": "PayPal", "type": "CompanyImpersonated"},
				{"id": "ent-555", "label": "duplicate", "type": "url"},
				{"id": "scan-2", "label": "Scan: voice", "type": "report", "verdict": "pending"}
			],
			"edges": [
				{"from": "scan-1", "to": "ent-555", "label": "CONTAINS"},
				{"from": "scan-1", "to": "ent-url", "label": "CONTAINS"},
				{"from": "scan-1", "to": "ent-co", "label": "CONTAINS"},
				{"from": "scan-2", "to": "ent-555", "label": "CONTAINS"},
				{"from": "scan-2", "to": "ent-555", "label": "CONTAINS"},
				{"from": "ghost", "to": "ent-co", "label": "LINKED"}
			],
			"total_reports": 14
		}"#,
		)
		.unwrap()
	}

	#[test]
	fn scenario_two_connected_entities() {
		let payload = GraphPayload::from_json(SCENARIO).unwrap();
		let graph = GraphDataAdapter::seeded(7).adapt(&payload, (400.0, 300.0));

		assert_eq!(graph.nodes().len(), 2);
		assert_eq!(graph.total_reports, 5);
		assert_eq!(graph.node("a").unwrap().node_type, NodeType::Phone);
		assert_eq!(graph.node("b").unwrap().node_type, NodeType::Url);
		assert!(graph.node("a").unwrap().connections.contains("b"));
		assert!(graph.node("b").unwrap().connections.contains("a"));
		assert_eq!(graph.node("a").unwrap().connections.len(), 1);
	}

	#[test]
	fn unknown_endpoints_are_dropped() {
		let payload = GraphPayload::from_json(
			r#"{"nodes":[{"id":"b","label":"scam.biz","type":"url"}],
			"edges":[{"from":"x","to":"b","label":"mentioned_in"}]}"#,
		)
		.unwrap();
		let graph = GraphDataAdapter::seeded(1).adapt(&payload, (0.0, 0.0));

		assert!(graph.edges().is_empty());
		assert!(!graph.node("b").unwrap().connections.contains("x"));
	}

	#[test]
	fn adjacency_is_symmetric_and_edges_resolve() {
		let graph = GraphDataAdapter::seeded(3).adapt(&sample_payload(), (0.0, 0.0));

		for node in graph.nodes() {
			for neighbor in &node.connections {
				let other = graph.node(neighbor).expect("neighbor exists");
				assert!(other.connections.contains(&node.id));
			}
		}
		for edge in graph.edges() {
			assert!(graph.node(&edge.from).is_some());
			assert!(graph.node(&edge.to).is_some());
		}
		assert_eq!(graph.edges().len(), 5);
		assert_eq!(graph.node("ent-555").unwrap().connections.len(), 2);
	}

	#[test]
	fn first_duplicate_wins_and_fields_are_mapped() {
		let graph = GraphDataAdapter::seeded(3).adapt(&sample_payload(), (0.0, 0.0));

		assert_eq!(graph.nodes().len(), 5);
		let phone = graph.node("ent-555").unwrap();
		assert_eq!(phone.label, "555-0199");
		assert_eq!(phone.node_type, NodeType::Phone);
		assert_eq!(phone.report_count, Some(12));

		let scan = graph.node("scan-1").unwrap();
		assert_eq!(scan.node_type, NodeType::Report);
		assert_eq!(scan.verdict, Some(Verdict::Red));
		assert_eq!(graph.node("scan-2").unwrap().verdict, None);
		assert_eq!(graph.node("ent-co").unwrap().node_type, NodeType::Company);
		assert_eq!(graph.total_reports, 14);
	}

	#[test]
	fn seed_layout_is_deterministic_per_seed() {
		let payload = sample_payload();
		let first = GraphDataAdapter::seeded(42).adapt(&payload, (400.0, 300.0));
		let second = GraphDataAdapter::seeded(42).adapt(&payload, (400.0, 300.0));
		let other = GraphDataAdapter::seeded(43).adapt(&payload, (400.0, 300.0));

		let positions = |graph: &Graph| -> Vec<(f64, f64)> {
			graph.nodes().iter().map(|node| (node.x, node.y)).collect()
		};
		assert_eq!(positions(&first), positions(&second));
		assert_ne!(positions(&first), positions(&other));
	}

	#[test]
	fn seed_layout_stays_near_the_circle() {
		let payload = GraphPayload {
			nodes: (0..8)
				.map(|i| PayloadNode {
					id: format!("n{i}"),
					..PayloadNode::default()
				})
				.collect(),
			..GraphPayload::default()
		};
		let graph = GraphDataAdapter::seeded(9).adapt(&payload, (400.0, 300.0));

		for (i, node) in graph.nodes().iter().enumerate() {
			let angle = 2.0 * PI * i as f64 / 8.0;
			let (ideal_x, ideal_y) = (
				400.0 + SEED_RADIUS * angle.cos(),
				300.0 + SEED_RADIUS * angle.sin(),
			);
			assert!(node.distance_to(ideal_x, ideal_y) <= 40.0);
			assert_eq!((node.vx, node.vy), (0.0, 0.0));
		}
	}

	#[test]
	fn duplicates_leave_no_gap_in_the_circle() {
		let mut nodes: Vec<PayloadNode> = (0..4)
			.map(|i| PayloadNode {
				id: format!("n{i}"),
				..PayloadNode::default()
			})
			.collect();
		let (first, second) = (nodes[0].clone(), nodes[1].clone());
		nodes.insert(1, first);
		nodes.insert(3, second);
		let payload = GraphPayload {
			nodes,
			..GraphPayload::default()
		};
		let graph = GraphDataAdapter::seeded(5).adapt(&payload, (0.0, 0.0));

		assert_eq!(graph.nodes().len(), 4);
		for (i, node) in graph.nodes().iter().enumerate() {
			let angle = 2.0 * PI * i as f64 / 4.0;
			let ideal = (SEED_RADIUS * angle.cos(), SEED_RADIUS * angle.sin());
			assert!(node.distance_to(ideal.0, ideal.1) <= 40.0);
		}
	}

	#[test]
	fn odd_report_totals_do_not_blank_the_graph() {
		for (raw, expected) in [("5.0", 5), ("-1", 0), ("7.9", 7), ("null", 0)] {
			let payload = GraphPayload::from_json(&format!(
				r#"{{"nodes":[{{"id":"a"}}],"totalReports":{raw}}}"#
			))
			.unwrap();
			let graph = GraphDataAdapter::seeded(0).adapt(&payload, (0.0, 0.0));
			assert_eq!(graph.nodes().len(), 1);
			assert_eq!(graph.total_reports, expected);
		}
	}

	#[test]
	fn empty_and_malformed_payloads_degrade() {
		let graph = GraphDataAdapter::seeded(0).adapt(&GraphPayload::default(), (0.0, 0.0));
		assert!(graph.is_empty());
		assert_eq!(graph.total_reports, 0);

		assert!(GraphPayload::from_json("not json").is_err());
		let payload = GraphPayload::from_json_lossy("{\"nodes\": 3}");
		assert!(payload.nodes.is_empty());
	}

	#[test]
	fn report_counts_are_clamped() {
		let payload = GraphPayload::from_json(
			r#"{"nodes":[{"id":"a","reportCount":-3},{"id":"b","reportCount":2.7}]}"#,
		)
		.unwrap();
		let graph = GraphDataAdapter::seeded(0).adapt(&payload, (0.0, 0.0));
		assert_eq!(graph.nodes()[0].report_count, Some(0));
		assert_eq!(graph.nodes()[1].report_count, Some(2));
		assert_eq!(graph.nodes()[0].label, "a");
	}
}
