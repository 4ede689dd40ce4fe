//! Drawing the graph onto a raster surface.

use std::f64::consts::PI;

use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::types::{Graph, Node, NodeType, Verdict};

/// Surface fill behind the graph.
pub const BACKGROUND: &str = "#1a1a2e";
const EDGE_COLOR: &str = "rgba(100, 180, 255, 0.35)";
const LABEL_COLOR: &str = "rgba(255, 255, 255, 0.8)";
const LABEL_FONT: &str = "11px sans-serif";

/// Labels longer than this many characters are truncated.
pub const LABEL_MAX_CHARS: usize = 20;
/// Characters kept in front of the ellipsis of a truncated label.
pub const LABEL_KEEP_CHARS: usize = 18;
const ELLIPSIS: &str = "...";

/// CSS size of the drawing surface and its device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Width in CSS pixels.
	pub width: f64,
	/// Height in CSS pixels.
	pub height: f64,
	/// Backing pixels per CSS pixel.
	pub pixel_ratio: f64,
}

impl Viewport {
	/// Viewport with a pixel ratio of one.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			pixel_ratio: 1.0,
		}
	}

	/// Center point in CSS pixels.
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

/// An opaque RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
	/// CSS `rgba()` string with the given opacity.
	pub fn with_alpha(self, alpha: f64) -> String {
		format!("rgba({}, {}, {}, {})", self.0, self.1, self.2, alpha)
	}

	/// CSS hex string.
	pub fn css(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
	}
}

/// Raster target the renderer paints into. Coordinates are CSS pixels.
pub trait Surface {
	/// Resize the backing buffer.
	fn resize(&mut self, viewport: &Viewport);
	/// Fill the whole surface.
	fn clear(&self, viewport: &Viewport, color: &str);
	/// Stroke a straight line.
	fn line(&self, from: (f64, f64), to: (f64, f64), color: &str, width: f64);
	/// Fill a circle.
	fn circle(&self, x: f64, y: f64, radius: f64, color: &str);
	/// Stroke a circle outline.
	fn ring(&self, x: f64, y: f64, radius: f64, color: &str, width: f64);
	/// Soft radial glow fading out between the two radii.
	fn halo(&self, x: f64, y: f64, inner: f64, outer: f64, color: Rgb);
	/// Draw text horizontally centered on `x`.
	fn text(&self, text: &str, x: f64, y: f64, color: &str, font: &str);
}

/// Radius tiers and halo threshold, keyed by report count.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSizing {
	/// Counts above this get the large radius.
	pub large_above: u32,
	/// Counts above this get the medium radius.
	pub medium_above: u32,
	/// Counts above this get a halo.
	pub halo_above: u32,
	/// Large tier radius.
	pub large: f64,
	/// Medium tier radius.
	pub medium: f64,
	/// Default radius of entity nodes.
	pub small: f64,
	/// Radius of report nodes.
	pub report: f64,
	/// Halo radius relative to the node radius.
	pub halo_scale: f64,
}

impl Default for NodeSizing {
	fn default() -> Self {
		Self {
			large_above: 10,
			medium_above: 3,
			halo_above: 5,
			large: 16.0,
			medium: 12.0,
			small: 9.0,
			report: 7.0,
			halo_scale: 2.2,
		}
	}
}

impl NodeSizing {
	/// Body radius of a node.
	pub fn radius(&self, node: &Node) -> f64 {
		if node.node_type == NodeType::Report {
			return self.report;
		}
		match node.report_count.unwrap_or(0) {
			count if count > self.large_above => self.large,
			count if count > self.medium_above => self.medium,
			_ => self.small,
		}
	}

	/// Whether the node gets a halo.
	pub fn has_halo(&self, node: &Node) -> bool {
		node.report_count.is_some_and(|count| count > self.halo_above)
	}
}

/// Fill color of a node.
pub fn node_color(node: &Node) -> Rgb {
	match (node.node_type, node.verdict) {
		(NodeType::Phone, _) => Rgb(0x3b, 0x82, 0xf6),
		(NodeType::Url, _) => Rgb(0xa8, 0x55, 0xf7),
		(NodeType::Company, _) => Rgb(0xf9, 0x73, 0x16),
		(NodeType::Report, Some(Verdict::Red)) => Rgb(0xef, 0x44, 0x44),
		(NodeType::Report, Some(Verdict::Yellow)) => Rgb(0xea, 0xb3, 0x08),
		(NodeType::Report, Some(Verdict::Green)) => Rgb(0x22, 0xc5, 0x5e),
		(NodeType::Report, None) => Rgb(0x64, 0x74, 0x8b),
	}
}

/// Truncate a label to the fixed display length.
pub fn truncate_label(label: &str) -> String {
	if label.chars().count() <= LABEL_MAX_CHARS {
		return label.to_owned();
	}
	let mut short: String = label.chars().take(LABEL_KEEP_CHARS).collect();
	short.push_str(ELLIPSIS);
	short
}

/// Node ids drawn with an outline ring.
#[derive(Clone, Copy, Debug, Default)]
pub struct Highlight<'a> {
	/// Currently selected node.
	pub selected: Option<&'a str>,
	/// Node under the pointer.
	pub hovered: Option<&'a str>,
}

/// Repaint the whole surface from the graph.
pub fn render(
	surface: &impl Surface,
	graph: &Graph,
	viewport: &Viewport,
	sizing: &NodeSizing,
	highlight: Highlight<'_>,
) {
	surface.clear(viewport, BACKGROUND);
	draw_edges(surface, graph);
	draw_nodes(surface, graph, sizing, highlight);
	draw_labels(surface, graph, sizing);
}

fn draw_edges(surface: &impl Surface, graph: &Graph) {
	for edge in graph.edges() {
		let (s, t) = edge.endpoints();
		let (Some(from), Some(to)) = (graph.nodes().get(s), graph.nodes().get(t)) else {
			continue;
		};
		surface.line((from.x, from.y), (to.x, to.y), EDGE_COLOR, 1.5);
	}
}

fn draw_nodes(
	surface: &impl Surface,
	graph: &Graph,
	sizing: &NodeSizing,
	highlight: Highlight<'_>,
) {
	for node in graph.nodes() {
		let (x, y) = (node.x, node.y);
		let radius = sizing.radius(node);
		let color = node_color(node);

		if sizing.has_halo(node) {
			surface.halo(x, y, radius * 0.5, radius * sizing.halo_scale, color);
		}
		surface.circle(x, y, radius, &color.css());

		if highlight.selected == Some(node.id.as_str()) {
			surface.ring(x, y, radius + 3.0, "rgba(255, 255, 255, 0.9)", 2.0);
		} else if highlight.hovered == Some(node.id.as_str()) {
			surface.ring(x, y, radius + 2.0, "rgba(255, 255, 255, 0.45)", 1.5);
		}
	}
}

// Labels go last so no node body covers another node's text.
fn draw_labels(surface: &impl Surface, graph: &Graph, sizing: &NodeSizing) {
	for node in graph.nodes() {
		let label = truncate_label(&node.label);
		let y = node.y + sizing.radius(node) + 12.0;
		surface.text(&label, node.x, y, LABEL_COLOR, LABEL_FONT);
	}
}

/// The canvas element or its 2d context could not be obtained.
#[derive(Debug, Error)]
pub enum SurfaceError {
	/// `getContext("2d")` threw or returned null.
	#[error("2d context not available")]
	NoContext,
}

/// HTML canvas surface drawing in CSS pixels on a device-pixel backing buffer.
pub struct CanvasSurface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
	/// Wrap a canvas and acquire its 2d context.
	pub fn new(canvas: HtmlCanvasElement) -> Result<Self, SurfaceError> {
		let ctx = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
			.ok_or(SurfaceError::NoContext)?;
		Ok(Self { canvas, ctx })
	}
}

impl Surface for CanvasSurface {
	fn resize(&mut self, viewport: &Viewport) {
		self.canvas
			.set_width((viewport.width * viewport.pixel_ratio).round() as u32);
		self.canvas
			.set_height((viewport.height * viewport.pixel_ratio).round() as u32);
		let style = self.canvas.style();
		let _ = style.set_property("width", &format!("{}px", viewport.width));
		let _ = style.set_property("height", &format!("{}px", viewport.height));
	}

	fn clear(&self, viewport: &Viewport, color: &str) {
		let ratio = viewport.pixel_ratio;
		let _ = self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0);
		self.ctx.set_fill_style_str(color);
		self.ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);
	}

	fn line(&self, from: (f64, f64), to: (f64, f64), color: &str, width: f64) {
		self.ctx.set_stroke_style_str(color);
		self.ctx.set_line_width(width);
		self.ctx.begin_path();
		self.ctx.move_to(from.0, from.1);
		self.ctx.line_to(to.0, to.1);
		self.ctx.stroke();
	}

	fn circle(&self, x: f64, y: f64, radius: f64, color: &str) {
		self.ctx.begin_path();
		let _ = self.ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		self.ctx.set_fill_style_str(color);
		self.ctx.fill();
	}

	fn ring(&self, x: f64, y: f64, radius: f64, color: &str, width: f64) {
		self.ctx.begin_path();
		let _ = self.ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		self.ctx.set_stroke_style_str(color);
		self.ctx.set_line_width(width);
		self.ctx.stroke();
	}

	fn halo(&self, x: f64, y: f64, inner: f64, outer: f64, color: Rgb) {
		let Ok(gradient) = self.ctx.create_radial_gradient(x, y, inner, x, y, outer) else {
			return;
		};
		let _ = gradient.add_color_stop(0.0, &color.with_alpha(0.35));
		let _ = gradient.add_color_stop(0.6, &color.with_alpha(0.12));
		let _ = gradient.add_color_stop(1.0, &color.with_alpha(0.0));
		self.ctx.begin_path();
		let _ = self.ctx.arc(x, y, outer, 0.0, 2.0 * PI);
		#[allow(deprecated)]
		self.ctx.set_fill_style(&gradient);
		self.ctx.fill();
	}

	fn text(&self, text: &str, x: f64, y: f64, color: &str, font: &str) {
		self.ctx.set_fill_style_str(color);
		self.ctx.set_font(font);
		self.ctx.set_text_align("center");
		let _ = self.ctx.fill_text(text, x, y);
	}
}

#[cfg(test)]
pub(crate) mod recording {
	use std::cell::RefCell;

	use super::{Rgb, Surface, Viewport};

	/// One recorded draw call.
	#[derive(Clone, Debug, PartialEq)]
	pub enum Call {
		Resize(Viewport),
		Clear(String),
		Line((f64, f64), (f64, f64)),
		Circle(f64, f64, f64, String),
		Ring(f64, f64, f64),
		Halo(f64, f64, f64, Rgb),
		Text(String, f64, f64),
	}

	#[derive(Default)]
	pub struct RecordingSurface {
		pub calls: RefCell<Vec<Call>>,
	}

	impl RecordingSurface {
		pub fn take(&self) -> Vec<Call> {
			self.calls.take()
		}
	}

	impl Surface for RecordingSurface {
		fn resize(&mut self, viewport: &Viewport) {
			self.calls.get_mut().push(Call::Resize(*viewport));
		}

		fn clear(&self, _viewport: &Viewport, color: &str) {
			self.calls.borrow_mut().push(Call::Clear(color.to_owned()));
		}

		fn line(&self, from: (f64, f64), to: (f64, f64), _color: &str, _width: f64) {
			self.calls.borrow_mut().push(Call::Line(from, to));
		}

		fn circle(&self, x: f64, y: f64, radius: f64, color: &str) {
			self.calls
				.borrow_mut()
				.push(Call::Circle(x, y, radius, color.to_owned()));
		}

		fn ring(&self, x: f64, y: f64, radius: f64, _color: &str, _width: f64) {
			self.calls.borrow_mut().push(Call::Ring(x, y, radius));
		}

		fn halo(&self, x: f64, y: f64, _inner: f64, outer: f64, color: Rgb) {
			self.calls.borrow_mut().push(Call::Halo(x, y, outer, color));
		}

		fn text(&self, text: &str, x: f64, y: f64, _color: &str, _font: &str) {
			self.calls.borrow_mut().push(Call::Text(text.to_owned(), x, y));
		}
	}
}
