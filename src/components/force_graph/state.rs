use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use web_sys::HtmlImageElement;

use super::types::{GraphData, HoveredNode};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

const EDGE_COLOR: &str = "#999999";

pub const NODE_RADIUS: f64 = 12.0;
pub const HIT_RADIUS: f64 = 16.0;
/// Pointer travel, in screen pixels, below which a press-release is a click.
pub const CLICK_TOLERANCE: f64 = 3.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
const INITIAL_ZOOM: f64 = 0.8;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: Option<String>,
	pub color: String,
	pub avatar_url: Option<String>,
	pub url: Option<String>,
	/// Set by the component once the avatar request is issued.
	pub avatar: Option<HtmlImageElement>,
}

#[derive(Clone, Debug, Default)]
pub struct EdgeInfo {
	pub color: String,
	pub bidirectional: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, EdgeInfo>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
}

impl ForceGraphState {
	pub fn new(data: &GraphData, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 300.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut id_to_idx = HashMap::new();
		let mut edges = Vec::new();
		let ring = 100.0_f64.max(data.nodes.len() as f64 * 4.0);

		for (i, node) in data.nodes.iter().enumerate() {
			if id_to_idx.contains_key(&node.id) {
				continue;
			}
			let color = node.color.clone().unwrap_or_else(|| {
				node.group
					.map(|g| COLORS[g as usize % COLORS.len()].into())
					.unwrap_or(COLORS[0].into())
			});
			// Graph space is centred on the origin; the view transform moves it
			// to the middle of the canvas.
			let angle = (i as f64) * 2.0 * PI / data.nodes.len() as f64;
			let (x, y) = ((ring * angle.cos()) as f32, (ring * angle.sin()) as f32);

			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					color,
					avatar_url: node.avatar.clone(),
					url: node.url.clone(),
					avatar: None,
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		for link in &data.links {
			if let (Some(&src), Some(&tgt)) =
				(id_to_idx.get(&link.source), id_to_idx.get(&link.target))
			{
				graph.add_edge(
					src,
					tgt,
					EdgeData {
						user_data: EdgeInfo {
							color: link.color.clone().unwrap_or_else(|| EDGE_COLOR.into()),
							bidirectional: link.bidirectional,
						},
					},
				);
				edges.push((src, tgt));
			}
		}

		Self {
			graph,
			edges,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: INITIAL_ZOOM,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
		}
	}

	pub fn node_count(&self) -> usize {
		let mut count = 0;
		self.graph.visit_nodes(|_| count += 1);
		count
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn node_position(&self, idx: DefaultNodeIdx) -> Option<(f32, f32)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x(), node.y()));
			}
		});
		found
	}

	pub fn hovered_node(&self, idx: DefaultNodeIdx) -> Option<HoveredNode> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(HoveredNode {
					id: node.data.user_data.id.clone(),
					url: node.data.user_data.url.clone(),
				});
			}
		});
		found
	}

	/// Starts a node drag if a node is under the pointer, else a pan.
	pub fn press(&mut self, x: f64, y: f64) {
		if let Some(idx) = self.node_at_position(x, y) {
			let (nx, ny) = self.node_position(idx).unwrap_or_default();
			self.drag = DragState {
				active: true,
				moved: false,
				node_idx: Some(idx),
				start_x: x,
				start_y: y,
				node_start_x: nx,
				node_start_y: ny,
			};
			self.set_anchor(idx, true);
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn drag_to(&mut self, x: f64, y: f64) {
		if self.drag.active {
			let Some(idx) = self.drag.node_idx else {
				return;
			};
			if (x - self.drag.start_x).hypot(y - self.drag.start_y) > CLICK_TOLERANCE {
				self.drag.moved = true;
			}
			let (dx, dy) = (
				(x - self.drag.start_x) / self.transform.k,
				(y - self.drag.start_y) / self.transform.k,
			);
			let (nx, ny) = (
				self.drag.node_start_x + dx as f32,
				self.drag.node_start_y + dy as f32,
			);
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = nx;
					node.data.y = ny;
				}
			});
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// Ends any drag or pan. Returns the node that was clicked, if the
	/// pointer went down and up on a node without moving it.
	pub fn release(&mut self) -> Option<DefaultNodeIdx> {
		let clicked = match (self.drag.active, self.drag.moved, self.drag.node_idx) {
			(true, false, Some(idx)) => Some(idx),
			_ => None,
		};
		if let Some(idx) = self.drag.node_idx {
			self.set_anchor(idx, false);
		}
		self.drag = DragState::default();
		self.pan.active = false;
		clicked
	}

	/// Zooms by `factor` keeping the screen point (`x`, `y`) fixed.
	pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	fn set_anchor(&mut self, idx: DefaultNodeIdx, anchored: bool) {
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = anchored;
			}
		});
	}

	/// Updates the hovered node. Returns `true` if it changed.
	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) -> bool {
		if self.hover.node == node {
			return false;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for &(src, tgt) in &self.edges {
				if src == idx {
					self.hover.neighbors.insert(tgt);
				} else if tgt == idx {
					self.hover.neighbors.insert(src);
				}
			}
		}
		true
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn node(id: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: Some(id.into()),
			color: None,
			group: None,
			avatar: None,
			url: Some(format!("https://github.com/{id}")),
		}
	}

	fn link(source: &str, target: &str) -> GraphLink {
		GraphLink {
			source: source.into(),
			target: target.into(),
			color: None,
			bidirectional: false,
		}
	}

	fn sample() -> ForceGraphState {
		let data = GraphData {
			nodes: vec![node("alice"), node("bob"), node("carol")],
			links: vec![link("bob", "alice"), link("alice", "carol"), link("alice", "nobody")],
		};
		ForceGraphState::new(&data, 800.0, 600.0)
	}

	fn screen_position(state: &ForceGraphState, idx: DefaultNodeIdx) -> (f64, f64) {
		let (x, y) = state.node_position(idx).unwrap();
		(
			x as f64 * state.transform.k + state.transform.x,
			y as f64 * state.transform.k + state.transform.y,
		)
	}

	fn index_of(state: &ForceGraphState, id: &str) -> DefaultNodeIdx {
		let mut found = None;
		state.graph.visit_nodes(|n| {
			if n.data.user_data.id == id {
				found = Some(n.index());
			}
		});
		found.unwrap()
	}

	#[test]
	fn test_links_to_unknown_nodes_are_dropped() {
		let state = sample();
		assert_eq!(state.node_count(), 3);
		assert_eq!(state.edge_count(), 2);
	}

	#[test]
	fn test_screen_to_graph_inverts_transform() {
		let mut state = sample();
		state.transform = ViewTransform { x: 100.0, y: 50.0, k: 2.0 };
		assert_eq!(state.screen_to_graph(100.0, 50.0), (0.0, 0.0));
		assert_eq!(state.screen_to_graph(120.0, 70.0), (10.0, 10.0));
	}

	#[test]
	fn test_hit_testing() {
		let state = sample();
		let alice = index_of(&state, "alice");
		let (sx, sy) = screen_position(&state, alice);

		assert_eq!(state.node_at_position(sx, sy), Some(alice));
		assert_eq!(state.node_at_position(state.width / 2.0, state.height / 2.0), None);
	}

	#[test]
	fn test_hover_collects_neighbors() {
		let mut state = sample();
		let (alice, bob, carol) = (
			index_of(&state, "alice"),
			index_of(&state, "bob"),
			index_of(&state, "carol"),
		);

		assert!(state.set_hover(Some(bob)));
		assert!(!state.set_hover(Some(bob)));
		assert!(state.is_highlighted(alice));
		assert!(!state.is_highlighted(carol));

		assert!(state.set_hover(None));
		assert!(state.is_hovered(bob));
		assert!(state.has_active_highlight());
	}

	#[test]
	fn test_press_release_without_motion_is_click() {
		let mut state = sample();
		let carol = index_of(&state, "carol");
		let (sx, sy) = screen_position(&state, carol);

		state.press(sx, sy);
		state.drag_to(sx + 1.0, sy);
		assert_eq!(state.release(), Some(carol));
		assert_eq!(
			state.hovered_node(carol).and_then(|n| n.url),
			Some("https://github.com/carol".to_string())
		);
	}

	#[test]
	fn test_drag_moves_node_and_is_not_click() {
		let mut state = sample();
		let carol = index_of(&state, "carol");
		let (sx, sy) = screen_position(&state, carol);
		let (x0, y0) = state.node_position(carol).unwrap();

		state.press(sx, sy);
		state.drag_to(sx + 40.0, sy);
		let (x1, y1) = state.node_position(carol).unwrap();
		assert!((x1 - x0 - 40.0 / INITIAL_ZOOM as f32).abs() < 1e-3);
		assert_eq!(y1, y0);
		assert_eq!(state.release(), None);
		assert!(!state.drag.active);
	}

	#[test]
	fn test_background_drag_pans() {
		let mut state = sample();
		let (tx, ty) = (state.transform.x, state.transform.y);

		state.press(5.0, 5.0);
		state.drag_to(25.0, 15.0);
		assert_eq!(state.transform.x, tx + 20.0);
		assert_eq!(state.transform.y, ty + 10.0);
		assert_eq!(state.release(), None);
		assert!(!state.pan.active);
	}

	#[test]
	fn test_zoom_is_clamped_and_anchored() {
		let mut state = sample();
		let before = state.screen_to_graph(300.0, 200.0);
		state.zoom_at(300.0, 200.0, 1.1);
		let after = state.screen_to_graph(300.0, 200.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);

		for _ in 0..100 {
			state.zoom_at(0.0, 0.0, 0.5);
		}
		assert_eq!(state.transform.k, MIN_ZOOM);
	}
}
