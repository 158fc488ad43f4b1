//! Follower/following network construction.
//!
//! [`build_graph`] walks a list of seed identities through an
//! [`IdentityDirectory`] and folds the answers into a deduplicated [`Graph`].

mod builder;
mod directory;
mod error;
pub mod github;
pub mod mock;
mod types;

pub use builder::{GraphBuilder, build_graph};
pub use directory::IdentityDirectory;
pub use error::{DirectoryError, DirectoryResult};
pub use github::GitHubDirectory;
pub use types::{Edge, Graph, Node, ProfileSummary, RelationshipKind};
