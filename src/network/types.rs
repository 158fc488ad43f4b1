use serde::{Deserialize, Serialize};

/// Profile data returned by the directory for a single account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
	/// Unique handle of the account.
	#[serde(rename = "login")]
	pub identity: String,
	/// Avatar image URL.
	#[serde(rename = "avatar_url")]
	pub avatar: String,
	/// Public profile page URL.
	#[serde(rename = "html_url")]
	pub url: String,
}

impl ProfileSummary {
	/// Creates a profile summary from its parts.
	pub fn new(
		identity: impl Into<String>,
		avatar: impl Into<String>,
		url: impl Into<String>,
	) -> Self {
		Self {
			identity: identity.into(),
			avatar: avatar.into(),
			url: url.into(),
		}
	}
}

/// A unique account in the graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
	/// Account handle; unique within a [`Graph`].
	pub id: String,
	/// Avatar image URL.
	pub avatar: String,
	/// Public profile page URL.
	pub url: String,
}

impl From<&ProfileSummary> for Node {
	fn from(profile: &ProfileSummary) -> Self {
		Self {
			id: profile.identity.clone(),
			avatar: profile.avatar.clone(),
			url: profile.url.clone(),
		}
	}
}

/// How the two endpoints of an [`Edge`] relate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
	/// Source follows target, target does not follow back.
	Follower,
	/// Seed follows target, target does not follow back.
	Following,
	/// Mutual follow.
	Both,
}

impl RelationshipKind {
	/// Lowercase name, as used in serialized graphs.
	pub fn as_str(&self) -> &'static str {
		match self {
			RelationshipKind::Follower => "follower",
			RelationshipKind::Following => "following",
			RelationshipKind::Both => "both",
		}
	}
}

impl std::fmt::Display for RelationshipKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A directed, typed relationship between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
	/// Identity the relationship points from.
	pub source: String,
	/// Identity the relationship points to.
	pub target: String,
	/// Relationship classification.
	pub kind: RelationshipKind,
}

impl Edge {
	/// Creates an edge from `source` to `target`.
	pub fn new(source: impl Into<String>, target: impl Into<String>, kind: RelationshipKind) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			kind,
		}
	}
}

/// Nodes in first-insertion order plus edges in append order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
	/// Unique nodes, in the order they were first seen.
	pub nodes: Vec<Node>,
	/// Edges, in the order they were produced.
	pub edges: Vec<Edge>,
}

impl Graph {
	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// `true` when no node was produced.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_profile_from_github_user_json() {
		let json = r#"{
			"login": "octocat",
			"id": 583231,
			"avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
			"html_url": "https://github.com/octocat",
			"type": "User",
			"site_admin": false
		}"#;

		let profile: ProfileSummary = serde_json::from_str(json).unwrap();
		assert_eq!(profile.identity, "octocat");
		assert_eq!(profile.avatar, "https://avatars.githubusercontent.com/u/583231?v=4");
		assert_eq!(profile.url, "https://github.com/octocat");
	}

	#[test]
	fn test_relationship_kind_serializes_lowercase() {
		let edge = Edge::new("bob", "alice", RelationshipKind::Both);
		let json = serde_json::to_value(&edge).unwrap();
		assert_eq!(json["kind"], "both");
		assert_eq!(RelationshipKind::Following.to_string(), "following");
	}

	#[test]
	fn test_graph_counts() {
		let graph = Graph {
			nodes: vec![Node::from(&ProfileSummary::new("alice", "a.png", "https://github.com/alice"))],
			edges: Vec::new(),
		};
		assert_eq!(graph.nodes[0].url, "https://github.com/alice");
		assert_eq!(graph.node_count(), 1);
		assert_eq!(graph.edge_count(), 0);
		assert!(!graph.is_empty());
		assert!(Graph::default().is_empty());
	}
}
