//! In-memory directory for tests and offline demos.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::directory::IdentityDirectory;
use super::error::{DirectoryError, DirectoryResult};
use super::types::ProfileSummary;

/// Directory backed by hash maps.
///
/// Profiles are registered with [`with_user`](Self::with_user), relations with
/// [`with_followers`](Self::with_followers) and
/// [`with_following`](Self::with_following). Lists can be made to fail per
/// identity to exercise the degrade-to-empty path. Every call is recorded.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
	profiles: HashMap<String, ProfileSummary>,
	followers: HashMap<String, Vec<ProfileSummary>>,
	following: HashMap<String, Vec<ProfileSummary>>,
	failing_lists: HashSet<String>,
	calls: RefCell<Vec<String>>,
}

/// Profile for `identity` with predictable avatar and profile URLs.
pub fn profile(identity: &str) -> ProfileSummary {
	ProfileSummary::new(
		identity,
		format!("https://avatars.example.com/{identity}.png"),
		format!("https://github.com/{identity}"),
	)
}

impl MemoryDirectory {
	/// Creates an empty directory; every lookup fails with `NotFound`.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a resolvable profile.
	pub fn with_user(mut self, identity: &str) -> Self {
		self.profiles.insert(identity.to_string(), profile(identity));
		self
	}

	/// Registers a profile that resolves under a different canonical identity.
	pub fn with_alias(mut self, handle: &str, canonical: &str) -> Self {
		self.profiles.insert(handle.to_string(), profile(canonical));
		self
	}

	/// Sets the followers list of `identity`.
	pub fn with_followers(mut self, identity: &str, followers: &[&str]) -> Self {
		self.followers
			.insert(identity.to_string(), followers.iter().map(|f| profile(f)).collect());
		self
	}

	/// Sets the following list of `identity`.
	pub fn with_following(mut self, identity: &str, following: &[&str]) -> Self {
		self.following
			.insert(identity.to_string(), following.iter().map(|f| profile(f)).collect());
		self
	}

	/// Makes both relation lists of `identity` fail.
	pub fn with_failing_lists(mut self, identity: &str) -> Self {
		self.failing_lists.insert(identity.to_string());
		self
	}

	/// Calls made so far, as `"<operation>:<identity>"`.
	pub fn calls(&self) -> Vec<String> {
		self.calls.borrow().clone()
	}

	fn record(&self, operation: &str, identity: &str) {
		self.calls.borrow_mut().push(format!("{operation}:{identity}"));
	}

	fn list(
		&self,
		lists: &HashMap<String, Vec<ProfileSummary>>,
		identity: &str,
	) -> DirectoryResult<Vec<ProfileSummary>> {
		if self.failing_lists.contains(identity) {
			return Err(DirectoryError::Transport(format!("connection reset for {identity}")));
		}
		Ok(lists.get(identity).cloned().unwrap_or_default())
	}
}

impl IdentityDirectory for MemoryDirectory {
	async fn profile(&self, identity: &str) -> DirectoryResult<ProfileSummary> {
		self.record("profile", identity);
		self.profiles
			.get(identity)
			.cloned()
			.ok_or_else(|| DirectoryError::NotFound(identity.to_string()))
	}

	async fn followers(&self, identity: &str) -> DirectoryResult<Vec<ProfileSummary>> {
		self.record("followers", identity);
		self.list(&self.followers, identity)
	}

	async fn following(&self, identity: &str) -> DirectoryResult<Vec<ProfileSummary>> {
		self.record("following", identity);
		self.list(&self.following, identity)
	}
}
