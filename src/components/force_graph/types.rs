//! Payload and canonical graph model.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Deserializer};

/// Raw node entry as produced by the analysis backend.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PayloadNode {
	/// Backend identifier.
	#[serde(default)]
	pub id: String,
	/// Display string; falls back to the id when absent.
	#[serde(default)]
	pub label: Option<String>,
	/// Producer-specific entity type spelling.
	#[serde(rename = "type", default)]
	pub kind: Option<String>,
	/// Number of scam reports that mention this entity.
	#[serde(rename = "reportCount", alias = "report_count", default)]
	pub report_count: Option<f64>,
	/// Verdict tag of a report node (`RED`, `YELLOW`, `GREEN`, `pending`).
	#[serde(default)]
	pub verdict: Option<String>,
}

/// Raw directed edge entry.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PayloadEdge {
	/// Source node id.
	#[serde(default)]
	pub from: String,
	/// Target node id.
	#[serde(default)]
	pub to: String,
	/// Relationship description, e.g. `CONTAINS`.
	#[serde(default)]
	pub label: String,
}

/// Graph payload as fetched from the backend.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphPayload {
	/// Node entries; `null` or absent decodes as empty.
	#[serde(default, deserialize_with = "null_as_default")]
	pub nodes: Vec<PayloadNode>,
	/// Edge entries; `null` or absent decodes as empty.
	#[serde(default, deserialize_with = "null_as_default")]
	pub edges: Vec<PayloadEdge>,
	/// Informational total for the summary line; clamped to a whole,
	/// non-negative count when adapted.
	#[serde(alias = "totalReports", default)]
	pub total_reports: Option<f64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Canonical entity type of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
	/// A phone number.
	Phone,
	/// A URL or e-mail address.
	Url,
	/// An impersonated company.
	Company,
	/// A scam report, also the fallback for unknown spellings.
	Report,
}

impl NodeType {
	/// Collapse a producer-specific spelling into the canonical type.
	pub fn from_label(raw: &str) -> Self {
		let normalized: String = raw
			.chars()
			.filter(|c| !matches!(c, '_' | '-' | ' '))
			.flat_map(char::to_lowercase)
			.collect();
		match normalized.as_str() {
			"phone" | "phonenumber" | "tel" | "telephone" => Self::Phone,
			"url" | "link" | "domain" | "website" | "email" | "emailaddress" => Self::Url,
			"company" | "companyname" | "companyimpersonated" | "organization" | "brand" => {
				Self::Company
			}
			_ => Self::Report,
		}
	}

	/// Lower-case name used in detail panels.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Phone => "phone",
			Self::Url => "url",
			Self::Company => "company",
			Self::Report => "report",
		}
	}
}

/// Verdict attached to a report node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
	/// Confirmed scam.
	Red,
	/// Suspicious.
	Yellow,
	/// Looks safe.
	Green,
}

impl Verdict {
	/// Parse a verdict tag; `pending` and unknown tags yield `None`.
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"red" => Some(Self::Red),
			"yellow" => Some(Self::Yellow),
			"green" => Some(Self::Green),
			_ => None,
		}
	}
}

/// A positioned entity in the simulation.
#[derive(Clone, Debug)]
pub struct Node {
	/// Unique id within the graph.
	pub id: String,
	/// Display string.
	pub label: String,
	/// Canonical entity type.
	pub node_type: NodeType,
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Horizontal velocity.
	pub vx: f64,
	/// Vertical velocity.
	pub vy: f64,
	/// Number of reports mentioning this entity.
	pub report_count: Option<u32>,
	/// Verdict of a report node.
	pub verdict: Option<Verdict>,
	/// Neighbor ids, derived from edges.
	pub connections: BTreeSet<String>,
}

impl Node {
	/// Distance from the node center to a point.
	pub fn distance_to(&self, x: f64, y: f64) -> f64 {
		(self.x - x).hypot(self.y - y)
	}
}

/// A relationship between two existing nodes.
#[derive(Clone, Debug)]
pub struct Edge {
	/// Source node id.
	pub from: String,
	/// Target node id.
	pub to: String,
	/// Relationship description.
	pub label: String,
	pub(crate) source: usize,
	pub(crate) target: usize,
}

impl Edge {
	/// Node indices of both endpoints.
	pub fn endpoints(&self) -> (usize, usize) {
		(self.source, self.target)
	}

	/// Whether the edge starts and ends at the same node.
	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}
}

/// Canonical graph snapshot owned by a view.
///
/// Nodes and edges only grow through [`Graph::push_node`] and
/// [`Graph::connect`], which keeps the id index and edge endpoints valid.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	/// Informational report total.
	pub total_reports: u64,
	index: HashMap<String, usize>,
}

impl Graph {
	/// Empty graph with a report total.
	pub fn with_total_reports(total_reports: u64) -> Self {
		Self {
			total_reports,
			..Self::default()
		}
	}

	/// Append a node unless its id is taken. Returns whether it was inserted.
	pub fn push_node(&mut self, node: Node) -> bool {
		if self.index.contains_key(&node.id) {
			return false;
		}
		self.index.insert(node.id.clone(), self.nodes.len());
		self.nodes.push(node);
		true
	}

	/// Append an edge between existing nodes and update adjacency.
	/// Returns `false` and drops the edge when an endpoint is unknown.
	pub fn connect(&mut self, from: &str, to: &str, label: impl Into<String>) -> bool {
		let (Some(source), Some(target)) = (self.index_of(from), self.index_of(to)) else {
			return false;
		};
		if source != target {
			self.nodes[source].connections.insert(to.to_owned());
			self.nodes[target].connections.insert(from.to_owned());
		}
		self.edges.push(Edge {
			from: from.to_owned(),
			to: to.to_owned(),
			label: label.into(),
			source,
			target,
		});
		true
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Nodes for in-place position and velocity updates.
	pub fn nodes_mut(&mut self) -> &mut [Node] {
		&mut self.nodes
	}

	/// Edges whose endpoints all exist.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Index of a node id.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index_of(id).map(|idx| &self.nodes[idx])
	}

	/// Whether the graph holds no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

#[cfg(test)]
pub(crate) fn test_node(id: &str, x: f64, y: f64) -> Node {
	Node {
		id: id.to_owned(),
		label: id.to_owned(),
		node_type: NodeType::Phone,
		x,
		y,
		vx: 0.0,
		vy: 0.0,
		report_count: None,
		verdict: None,
		connections: BTreeSet::new(),
	}
}
