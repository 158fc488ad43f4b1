use std::collections::HashSet;

use log::{debug, info, warn};

use super::directory::IdentityDirectory;
use super::types::{Edge, Graph, Node, ProfileSummary, RelationshipKind};

/// Accumulates nodes and edges across seeds.
///
/// Nodes are first-writer-wins: once an identity is present it is never
/// replaced. Edges are appended in processing order.
#[derive(Debug, Default)]
pub struct GraphBuilder {
	nodes: Vec<Node>,
	known: HashSet<String>,
	edges: Vec<Edge>,
}

impl GraphBuilder {
	/// Creates an empty accumulator.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a node for `profile` unless its identity is already present.
	/// Returns `true` if a node was added.
	pub fn add_node(&mut self, profile: &ProfileSummary) -> bool {
		if !self.known.insert(profile.identity.clone()) {
			return false;
		}
		self.nodes.push(Node::from(profile));
		true
	}

	/// `true` if a node for `identity` is already present.
	pub fn contains(&self, identity: &str) -> bool {
		self.known.contains(identity)
	}

	/// Resolves `seed` and folds its follower/following lists into the graph.
	///
	/// A seed that fails to resolve contributes nothing. A relation list that
	/// fails to load is treated as empty.
	pub async fn add_seed<D: IdentityDirectory>(&mut self, directory: &D, seed: &str) {
		let user = match directory.profile(seed).await {
			Ok(user) => user,
			Err(e) => {
				warn!("Skipping {seed}: {e}");
				return;
			}
		};
		self.add_node(&user);

		let followers = match directory.followers(&user.identity).await {
			Ok(list) => list,
			Err(e) => {
				warn!("Error fetching followers for {}: {e}", user.identity);
				Vec::new()
			}
		};
		let following = match directory.following(&user.identity).await {
			Ok(list) => list,
			Err(e) => {
				warn!("Error fetching following for {}: {e}", user.identity);
				Vec::new()
			}
		};
		debug!(
			"{}: {} followers, {} following",
			user.identity,
			followers.len(),
			following.len()
		);

		let follower_set: HashSet<&str> = followers.iter().map(|f| f.identity.as_str()).collect();
		let following_set: HashSet<&str> = following.iter().map(|f| f.identity.as_str()).collect();

		for follower in &followers {
			self.add_node(follower);
			let kind = if following_set.contains(follower.identity.as_str()) {
				RelationshipKind::Both
			} else {
				RelationshipKind::Follower
			};
			self.edges
				.push(Edge::new(&follower.identity, &user.identity, kind));
		}

		for followed in &following {
			self.add_node(followed);
			// mutual follows were already emitted as `Both` from the follower side
			if follower_set.contains(followed.identity.as_str()) {
				continue;
			}
			self.edges.push(Edge::new(
				&user.identity,
				&followed.identity,
				RelationshipKind::Following,
			));
		}
	}

	/// Returns the accumulated graph.
	pub fn finish(self) -> Graph {
		Graph {
			nodes: self.nodes,
			edges: self.edges,
		}
	}
}

/// Builds the follower/following network of `seeds`, one seed at a time.
///
/// Never fails; an empty graph means nothing could be resolved.
pub async fn build_graph<D, S>(directory: &D, seeds: &[S]) -> Graph
where
	D: IdentityDirectory,
	S: AsRef<str>,
{
	let mut builder = GraphBuilder::new();
	for seed in seeds {
		builder.add_seed(directory, seed.as_ref()).await;
	}
	let graph = builder.finish();
	info!(
		"Built network for {} seeds: {} users, {} connections",
		seeds.len(),
		graph.node_count(),
		graph.edge_count()
	);
	graph
}
