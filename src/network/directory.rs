use super::error::DirectoryResult;
use super::types::ProfileSummary;

/// Source of profile and relation data for the graph builder.
///
/// Implementations own network I/O and decide what counts as a failure. The
/// builder never retries; it only distinguishes success from failure.
#[allow(async_fn_in_trait)]
pub trait IdentityDirectory {
	/// Looks up the profile of `identity`.
	async fn profile(&self, identity: &str) -> DirectoryResult<ProfileSummary>;

	/// Lists the accounts following `identity` (first page only).
	async fn followers(&self, identity: &str) -> DirectoryResult<Vec<ProfileSummary>>;

	/// Lists the accounts `identity` follows (first page only).
	async fn following(&self, identity: &str) -> DirectoryResult<Vec<ProfileSummary>>;
}
