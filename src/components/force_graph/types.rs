use crate::network::{Graph, RelationshipKind};

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub label: Option<String>,
	pub color: Option<String>,
	pub group: Option<u32>,
	/// Image drawn inside the node once loaded.
	pub avatar: Option<String>,
	/// Opened in a new tab when the node is clicked.
	pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	pub color: Option<String>,
	/// Draw an arrowhead at both ends.
	pub bidirectional: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

/// Node currently under the pointer, as reported to the hover callback.
#[derive(Clone, Debug, PartialEq)]
pub struct HoveredNode {
	pub id: String,
	pub url: Option<String>,
}

pub fn relationship_color(kind: RelationshipKind) -> &'static str {
	match kind {
		RelationshipKind::Follower => "#ff9800",
		RelationshipKind::Following => "#2196f3",
		RelationshipKind::Both => "#4caf50",
	}
}

impl From<&Graph> for GraphData {
	fn from(graph: &Graph) -> Self {
		let nodes = graph
			.nodes
			.iter()
			.map(|node| GraphNode {
				id: node.id.clone(),
				label: Some(node.id.clone()),
				color: None,
				group: None,
				avatar: Some(node.avatar.clone()).filter(|a| !a.is_empty()),
				url: Some(node.url.clone()).filter(|u| !u.is_empty()),
			})
			.collect();

		let links = graph
			.edges
			.iter()
			.map(|edge| GraphLink {
				source: edge.source.clone(),
				target: edge.target.clone(),
				color: Some(relationship_color(edge.kind).to_string()),
				bidirectional: edge.kind == RelationshipKind::Both,
			})
			.collect();

		GraphData { nodes, links }
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::network::{Edge, Node};

	#[test]
	fn test_graph_conversion() {
		let graph = Graph {
			nodes: vec![
				Node {
					id: "alice".into(),
					avatar: "https://avatars.example.com/alice.png".into(),
					url: "https://github.com/alice".into(),
				},
				Node {
					id: "bob".into(),
					avatar: String::new(),
					url: "https://github.com/bob".into(),
				},
			],
			edges: vec![
				Edge::new("bob", "alice", RelationshipKind::Both),
				Edge::new("alice", "bob", RelationshipKind::Following),
			],
		};

		let data = GraphData::from(&graph);

		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.nodes[0].label.as_deref(), Some("alice"));
		assert_eq!(data.nodes[0].avatar.as_deref(), Some("https://avatars.example.com/alice.png"));
		assert_eq!(data.nodes[1].avatar, None);
		assert_eq!(data.nodes[1].url.as_deref(), Some("https://github.com/bob"));
		assert_eq!(
			data.links,
			vec![
				GraphLink {
					source: "bob".into(),
					target: "alice".into(),
					color: Some("#4caf50".into()),
					bidirectional: true,
				},
				GraphLink {
					source: "alice".into(),
					target: "bob".into(),
					color: Some("#2196f3".into()),
					bidirectional: false,
				},
			]
		);
	}
}
