use leptos::prelude::*;

use crate::components::force_graph::{
	GraphPayload, NodeType, PayloadEdge, PayloadNode, ScamNetworkGraph, SelectedNode, Verdict,
};

const PHONES: &[&str] = &["+1 (555) 010-0199", "+1 (555) 013-4477", "+44 20 7946 0321"];
const URLS: &[&str] = &[
	"paypa1-secure-login.com",
	"irs-refund-center.net",
	"usps-redelivery-fee.info",
	"support@amaz0n-billing.co",
];
const COMPANIES: &[&str] = &["PayPal", "IRS", "USPS", "Amazon"];
const VERDICTS: &[&str] = &["RED", "RED", "YELLOW", "GREEN", "pending"];

/// Sample scam network: reports linking shared phones, URLs and brands.
fn generate_sample_data(reports: usize) -> GraphPayload {
	let mut nodes = Vec::new();
	let mut edges = Vec::new();
	let mut counts = vec![0u32; PHONES.len() + URLS.len() + COMPANIES.len()];

	for i in 0..reports {
		let scan_id = format!("scan-{i}");
		nodes.push(PayloadNode {
			id: scan_id.clone(),
			label: Some(format!("Scan #{i}: {}", ["text", "image", "voice"][i % 3])),
			kind: Some("report".into()),
			report_count: None,
			verdict: Some(VERDICTS[i % VERDICTS.len()].into()),
		});
		for pick in 0..2 {
			let entity = (rand_simple(i * 3 + pick) * counts.len() as f64) as usize;
			counts[entity] += 1;
			edges.push(PayloadEdge {
				from: scan_id.clone(),
				to: format!("ent-{entity}"),
				label: "CONTAINS".into(),
			});
		}
	}

	let entities = PHONES
		.iter()
		.map(|v| (v, "PhoneNumber"))
		.chain(URLS.iter().map(|v| (v, "URL")))
		.chain(COMPANIES.iter().map(|v| (v, "CompanyImpersonated")));
	for (entity, (value, kind)) in entities.enumerate() {
		if counts[entity] == 0 {
			continue;
		}
		nodes.push(PayloadNode {
			id: format!("ent-{entity}"),
			label: Some((*value).into()),
			kind: Some(kind.into()),
			report_count: Some(counts[entity] as f64 * 2.0),
			verdict: None,
		});
	}

	GraphPayload {
		nodes,
		edges,
		total_reports: Some(reports as f64),
	}
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn verdict_text(verdict: Option<Verdict>) -> &'static str {
	match verdict {
		Some(Verdict::Red) => "scam",
		Some(Verdict::Yellow) => "suspicious",
		Some(Verdict::Green) => "safe",
		None => "pending",
	}
}

#[component]
fn DetailPanel(node: SelectedNode) -> impl IntoView {
	let reports = node
		.report_count
		.map(|count| format!("Seen in {count} reports"));
	let verdict = (node.node_type == NodeType::Report).then(|| verdict_text(node.verdict));

	view! {
		<aside class="detail-panel">
			<h2>{node.label}</h2>
			<p class="entity-type">{node.node_type.as_str()}</p>
			{reports.map(|text| view! { <p>{text}</p> })}
			{verdict.map(|text| view! { <p class="verdict">"Verdict: " {text}</p> })}
			<h3>{format!("{} connections", node.connections.len())}</h3>
			<ul>
				{node.connections.into_iter().map(|id| view! { <li>{id}</li> }).collect_view()}
			</ul>
		</aside>
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(move || generate_sample_data(24));
	let (selected, set_selected) = signal(None::<SelectedNode>);
	let (total_reports, set_total_reports) = signal(0u64);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ScamNetworkGraph
					data=graph_data
					fullscreen=true
					on_select=Callback::new(move |node: Option<SelectedNode>| set_selected.set(node))
					on_total_reports=Callback::new(move |total: u64| set_total_reports.set(total))
				/>
				<div class="graph-overlay">
					<h1>"Scam Network"</h1>
					<p class="subtitle">
						{move || format!("{} reports linked across shared entities", total_reports.get())}
					</p>
				</div>
				{move || selected.get().map(|node| view! { <DetailPanel node=node /> })}
			</div>
		</ErrorBoundary>
	}
}
