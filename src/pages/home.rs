use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info};

use crate::components::force_graph::{ForceGraphCanvas, GraphData, HoveredNode, relationship_color};
use crate::components::users_form::UsersForm;
use crate::network::{GitHubDirectory, Graph, RelationshipKind, build_graph};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
	Success(String),
	Error(String),
}

/// Outcome message shown once a build finishes.
pub fn result_notice(graph: &Graph) -> Notice {
	if graph.is_empty() {
		Notice::Error("No data found for the provided usernames".to_string())
	} else {
		Notice::Success(format!(
			"Network graph generated with {} users and {} connections",
			graph.node_count(),
			graph.edge_count()
		))
	}
}

#[component]
fn Legend() -> impl IntoView {
	let entries = [
		(RelationshipKind::Follower, "Follower"),
		(RelationshipKind::Following, "Following"),
		(RelationshipKind::Both, "Both"),
	];
	view! {
		<div class="graph-legend">
			{entries
				.into_iter()
				.map(|(kind, label)| {
					view! {
						<div class="legend-item">
							<span
								class="legend-swatch"
								style=format!("background-color: {}", relationship_color(kind))
							></span>
							<span>{label}</span>
						</div>
					}
				})
				.collect_view()}
		</div>
	}
}

/// GitHub network page: username form, statistics and the graph.
#[component]
pub fn Home() -> impl IntoView {
	let loading = RwSignal::new(false);
	let graph = RwSignal::new(Graph::default());
	let seed_count = RwSignal::new(0_usize);
	let notice = RwSignal::new(None::<Notice>);
	let hovered = RwSignal::new(None::<HoveredNode>);

	let graph_data = Signal::derive(move || graph.with(|g| GraphData::from(g)));

	let on_submit = Callback::new(move |usernames: Vec<String>| {
		loading.set(true);
		notice.set(None);
		hovered.set(None);
		seed_count.set(usernames.len());
		info!("Building network for {usernames:?}");

		spawn_local(async move {
			let directory = GitHubDirectory::default();
			let result = build_graph(&directory, &usernames).await;
			let message = result_notice(&result);
			if let Notice::Error(ref e) = message {
				error!("{e}");
			}
			notice.set(Some(message));
			graph.set(result);
			loading.set(false);
		});
	});

	view! {
		<div class="network-page">
			<header class="page-header">
				<h1>"GitHub Network Visualizer"</h1>
				<p class="subtitle">
					"Visualize the follower and following relationships between GitHub users"
				</p>
			</header>

			<div class="page-grid">
				<section class="panel form-panel">
					<h2>"Enter GitHub Usernames"</h2>
					<UsersForm on_submit=on_submit is_loading=loading />

					{move || {
						notice
							.get()
							.map(|n| {
								let (class, msg) = match n {
									Notice::Success(msg) => ("notice success", msg),
									Notice::Error(msg) => ("notice error", msg),
								};
								view! { <p class=class>{msg}</p> }
							})
					}}

					<Show when=move || graph.with(|g| !g.is_empty())>
						<div class="network-stats">
							<h3>"Network Statistics"</h3>
							<ul>
								<li>"Users: " {move || graph.with(Graph::node_count)}</li>
								<li>"Connections: " {move || graph.with(Graph::edge_count)}</li>
								<li>"Seed Users: " {move || seed_count.get()}</li>
							</ul>
						</div>
					</Show>
				</section>

				<section class="panel graph-panel">
					<div class="graph-container">
						<ForceGraphCanvas
							data=graph_data
							on_hover=Callback::new(move |node| hovered.set(node))
						/>

						<Show when=move || loading.get()>
							<div class="graph-loading">
								<div class="spinner"></div>
							</div>
						</Show>

						<Show when=move || graph.with(Graph::is_empty) && !loading.get()>
							<div class="graph-empty">
								<h3>"No Network Data"</h3>
								<p>
									"Enter GitHub usernames and click \"Generate Network Graph\" to visualize the network"
								</p>
							</div>
						</Show>

						{move || {
							hovered
								.get()
								.map(|node| {
									view! {
										<div class="graph-tooltip">
											<p class="tooltip-title">{node.id}</p>
											{node
												.url
												.map(|url| {
													view! {
														<a href=url target="_blank" rel="noopener noreferrer">
															"View Profile"
														</a>
													}
												})}
										</div>
									}
								})
						}}
					</div>
					<Legend />
				</section>
			</div>

			<footer class="page-footer">
				<p>
					"Note: GitHub API has rate limits. For unauthenticated requests, the rate limit is 60 requests per hour."
				</p>
			</footer>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::network::{Edge, Node};

	#[test]
	fn test_empty_graph_notice() {
		assert_eq!(
			result_notice(&Graph::default()),
			Notice::Error("No data found for the provided usernames".to_string())
		);
	}

	#[test]
	fn test_success_notice_counts() {
		let node = |id: &str| Node {
			id: id.into(),
			avatar: String::new(),
			url: format!("https://github.com/{id}"),
		};
		let graph = Graph {
			nodes: vec![node("alice"), node("bob")],
			edges: vec![Edge::new("bob", "alice", RelationshipKind::Both)],
		};
		assert_eq!(
			result_notice(&graph),
			Notice::Success("Network graph generated with 2 users and 1 connections".to_string())
		);
	}
}
