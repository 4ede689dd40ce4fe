//! Force-directed scam network view: payload adaptation, layout simulation,
//! canvas rendering, pointer selection and the frame loop tying them together.

pub mod adapter;
mod component;
pub mod interaction;
pub mod render;
pub mod scheduler;
pub mod simulation;
pub mod state;
pub mod types;

pub use adapter::{GraphDataAdapter, PayloadError};
pub use component::ScamNetworkGraph;
pub use interaction::{InteractionLayer, SelectedNode, hit_test};
pub use render::{CanvasSurface, NodeSizing, Surface, Viewport};
pub use scheduler::{CancelHandle, FrameLoop};
pub use simulation::{Bounds, SimulationConfig, kinetic_energy, tick};
pub use state::GraphView;
pub use types::{Edge, Graph, GraphPayload, Node, NodeType, PayloadEdge, PayloadNode, Verdict};
