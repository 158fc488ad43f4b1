//! Directory backed by the GitHub REST API.

use std::time::Duration;

use gloo_timers::future::sleep;
use log::{debug, warn};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use super::directory::IdentityDirectory;
use super::error::{DirectoryError, DirectoryResult};
use super::types::ProfileSummary;
use crate::config::{DirectoryConfig, RetryPolicy};

/// Relation list endpoints under `/users/{identity}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
	/// `/users/{identity}/followers`
	Followers,
	/// `/users/{identity}/following`
	Following,
}

impl Relation {
	fn as_str(&self) -> &'static str {
		match self {
			Relation::Followers => "followers",
			Relation::Following => "following",
		}
	}
}

/// Unauthenticated client for the public users API.
#[derive(Clone, Debug)]
pub struct GitHubDirectory {
	client: Client,
	config: DirectoryConfig,
}

impl Default for GitHubDirectory {
	fn default() -> Self {
		Self::new(DirectoryConfig::default())
	}
}

impl GitHubDirectory {
	/// Creates a directory client for `config`.
	pub fn new(config: DirectoryConfig) -> Self {
		Self {
			client: Client::new(),
			config,
		}
	}

	/// URL of the profile (`relation == None`) or a relation list of `identity`.
	///
	/// The identity always lands in a single escaped path segment.
	pub fn endpoint(&self, identity: &str, relation: Option<Relation>) -> DirectoryResult<Url> {
		let base = &self.config.base_url;
		let mut url =
			Url::parse(base).map_err(|e| DirectoryError::InvalidBaseUrl(format!("{base}: {e}")))?;
		{
			let mut segments = url
				.path_segments_mut()
				.map_err(|_| DirectoryError::InvalidBaseUrl(base.clone()))?;
			segments.pop_if_empty().push("users").push(identity);
			if let Some(relation) = relation {
				segments.push(relation.as_str());
			}
		}
		if relation.is_some() {
			url.query_pairs_mut()
				.append_pair("per_page", &self.config.per_page.to_string());
		}
		Ok(url)
	}

	/// Issues the request, retrying transient failures per the retry policy.
	async fn get<T: DeserializeOwned>(&self, url: Url, identity: &str) -> DirectoryResult<T> {
		let mut attempt = 0;
		loop {
			let (result, retry_after) = self.attempt(url.clone(), identity).await;
			let err = match result {
				Ok(value) => return Ok(value),
				Err(err) => err,
			};
			let Some(delay) = retry_delay(&self.config.retry, attempt, &err, retry_after) else {
				return Err(err);
			};
			attempt += 1;
			warn!("{err}; retry {attempt} for {identity} in {delay:?}");
			sleep(delay).await;
		}
	}

	/// One request. Also returns the `Retry-After` seconds the server sent, if any.
	async fn attempt<T: DeserializeOwned>(
		&self,
		url: Url,
		identity: &str,
	) -> (DirectoryResult<T>, Option<u64>) {
		debug!("GET {url}");
		let response = match self
			.client
			.get(url)
			.header("Accept", "application/vnd.github+json")
			.header("X-GitHub-Api-Version", &self.config.api_version)
			.send()
			.await
		{
			Ok(response) => response,
			Err(e) => return (Err(DirectoryError::Transport(e.to_string())), None),
		};

		let headers = response.headers();
		let retry_after = headers
			.get("retry-after")
			.and_then(|v| v.to_str().ok())
			.and_then(|v| v.trim().parse::<u64>().ok());
		let remaining = headers
			.get("x-ratelimit-remaining")
			.and_then(|v| v.to_str().ok());
		if let Err(e) = check_status(response.status().as_u16(), remaining, identity) {
			return (Err(e), retry_after);
		}

		let body = response
			.json::<T>()
			.await
			.map_err(|e| DirectoryError::Decode(e.to_string()));
		(body, None)
	}

	async fn relation(&self, identity: &str, relation: Relation) -> DirectoryResult<Vec<ProfileSummary>> {
		let url = self.endpoint(identity, Some(relation))?;
		self.get(url, identity).await
	}
}

/// Maps a response status to a directory error, if it is one.
pub fn check_status(status: u16, rate_limit_remaining: Option<&str>, identity: &str) -> DirectoryResult<()> {
	match status {
		200..=299 => Ok(()),
		404 => Err(DirectoryError::NotFound(identity.to_string())),
		429 => Err(DirectoryError::RateLimited),
		403 if rate_limit_remaining.map(str::trim) == Some("0") => Err(DirectoryError::RateLimited),
		status => Err(DirectoryError::Status {
			status,
			identity: identity.to_string(),
		}),
	}
}

/// How long to wait before retrying after `err` on the given (0-based)
/// attempt, or `None` to give up.
///
/// Transport errors and 5xx back off exponentially. A rate limit is only
/// retried when the server said how long to wait and that wait fits under
/// `max_backoff`. Everything else fails immediately.
pub fn retry_delay(
	policy: &RetryPolicy,
	attempt: u32,
	err: &DirectoryError,
	retry_after_secs: Option<u64>,
) -> Option<Duration> {
	if attempt >= policy.max_retries {
		return None;
	}
	match err {
		DirectoryError::Transport(_) | DirectoryError::Status { status: 500..=599, .. } => {
			let factor = 1_u32 << attempt.min(16);
			Some(policy.initial_backoff.saturating_mul(factor).min(policy.max_backoff))
		}
		DirectoryError::RateLimited => retry_after_secs
			.map(Duration::from_secs)
			.filter(|wait| *wait <= policy.max_backoff),
		_ => None,
	}
}

impl IdentityDirectory for GitHubDirectory {
	async fn profile(&self, identity: &str) -> DirectoryResult<ProfileSummary> {
		let url = self.endpoint(identity, None)?;
		self.get(url, identity).await
	}

	async fn followers(&self, identity: &str) -> DirectoryResult<Vec<ProfileSummary>> {
		self.relation(identity, Relation::Followers).await
	}

	async fn following(&self, identity: &str) -> DirectoryResult<Vec<ProfileSummary>> {
		self.relation(identity, Relation::Following).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_profile_endpoint() {
		let directory = GitHubDirectory::new(DirectoryConfig::default().with_base_url("https://api.github.com"));
		let url = directory.endpoint("octocat", None).unwrap();
		assert_eq!(url.as_str(), "https://api.github.com/users/octocat");
	}

	#[test]
	fn test_relation_endpoints_request_single_page() {
		let directory = GitHubDirectory::new(DirectoryConfig::default().with_base_url("https://api.github.com"));

		let url = directory.endpoint("octocat", Some(Relation::Followers)).unwrap();
		assert_eq!(url.as_str(), "https://api.github.com/users/octocat/followers?per_page=100");

		let url = directory.endpoint("octocat", Some(Relation::Following)).unwrap();
		assert_eq!(url.as_str(), "https://api.github.com/users/octocat/following?per_page=100");
	}

	#[test]
	fn test_endpoint_keeps_base_path_and_escapes_identity() {
		let config = DirectoryConfig::default()
			.with_base_url("https://ghe.example.com/api/v3/")
			.with_per_page(30);
		let directory = GitHubDirectory::new(config);

		let url = directory.endpoint("a/b c", Some(Relation::Followers)).unwrap();
		assert_eq!(
			url.as_str(),
			"https://ghe.example.com/api/v3/users/a%2Fb%20c/followers?per_page=30"
		);
	}

	#[test]
	fn test_endpoint_rejects_unusable_base_url() {
		let directory = GitHubDirectory::new(DirectoryConfig::default().with_base_url("not a url"));
		assert!(matches!(
			directory.endpoint("octocat", None),
			Err(DirectoryError::InvalidBaseUrl(_))
		));

		let directory = GitHubDirectory::new(DirectoryConfig::default().with_base_url("mailto:ops@example.com"));
		assert!(matches!(
			directory.endpoint("octocat", None),
			Err(DirectoryError::InvalidBaseUrl(_))
		));
	}

	#[test]
	fn test_check_status() {
		assert_eq!(check_status(200, Some("59"), "octocat"), Ok(()));
		assert_eq!(
			check_status(404, None, "ghost"),
			Err(DirectoryError::NotFound("ghost".to_string()))
		);
		assert_eq!(check_status(403, Some("0"), "octocat"), Err(DirectoryError::RateLimited));
		assert_eq!(check_status(429, None, "octocat"), Err(DirectoryError::RateLimited));
		assert_eq!(
			check_status(403, Some("12"), "octocat"),
			Err(DirectoryError::Status {
				status: 403,
				identity: "octocat".to_string(),
			})
		);
		assert!(matches!(
			check_status(500, None, "octocat"),
			Err(DirectoryError::Status { status: 500, .. })
		));
	}

	fn policy() -> RetryPolicy {
		RetryPolicy {
			max_retries: 3,
			initial_backoff: Duration::from_millis(100),
			max_backoff: Duration::from_secs(1),
		}
	}

	#[test]
	fn test_transient_errors_back_off_exponentially() {
		let err = DirectoryError::Transport("connection reset".to_string());
		assert_eq!(retry_delay(&policy(), 0, &err, None), Some(Duration::from_millis(100)));
		assert_eq!(retry_delay(&policy(), 1, &err, None), Some(Duration::from_millis(200)));
		assert_eq!(retry_delay(&policy(), 2, &err, None), Some(Duration::from_millis(400)));
		assert_eq!(retry_delay(&policy(), 3, &err, None), None);

		let err = DirectoryError::Status {
			status: 502,
			identity: "octocat".to_string(),
		};
		assert_eq!(retry_delay(&policy(), 0, &err, None), Some(Duration::from_millis(100)));
	}

	#[test]
	fn test_backoff_is_capped() {
		let policy = RetryPolicy {
			max_retries: 40,
			..policy()
		};
		let err = DirectoryError::Transport("timeout".to_string());
		assert_eq!(retry_delay(&policy, 5, &err, None), Some(Duration::from_secs(1)));
		assert_eq!(retry_delay(&policy, 39, &err, None), Some(Duration::from_secs(1)));
	}

	#[test]
	fn test_permanent_errors_are_not_retried() {
		let not_found = DirectoryError::NotFound("ghost".to_string());
		assert_eq!(retry_delay(&policy(), 0, &not_found, Some(1)), None);

		let forbidden = DirectoryError::Status {
			status: 403,
			identity: "octocat".to_string(),
		};
		assert_eq!(retry_delay(&policy(), 0, &forbidden, None), None);

		let decode = DirectoryError::Decode("expected value".to_string());
		assert_eq!(retry_delay(&policy(), 0, &decode, None), None);
	}

	#[test]
	fn test_rate_limit_waits_for_retry_after() {
		let err = DirectoryError::RateLimited;
		assert_eq!(retry_delay(&policy(), 0, &err, None), None);
		assert_eq!(retry_delay(&policy(), 0, &err, Some(1)), Some(Duration::from_secs(1)));
		assert_eq!(retry_delay(&policy(), 0, &err, Some(60)), None);
		assert_eq!(retry_delay(&policy(), 3, &err, Some(1)), None);
	}

	#[test]
	fn test_retries_disabled() {
		let policy = RetryPolicy {
			max_retries: 0,
			..policy()
		};
		let err = DirectoryError::Transport("connection reset".to_string());
		assert_eq!(retry_delay(&policy, 0, &err, None), None);
	}

	#[test]
	fn test_relation_list_decodes() {
		let json = r#"[
			{"login": "bob", "id": 2, "avatar_url": "https://avatars.example.com/2", "html_url": "https://github.com/bob"},
			{"login": "carol", "id": 3, "avatar_url": "https://avatars.example.com/3", "html_url": "https://github.com/carol"}
		]"#;
		let list: Vec<ProfileSummary> = serde_json::from_str(json).unwrap();
		assert_eq!(list.len(), 2);
		assert_eq!(list[1], ProfileSummary::new("carol", "https://avatars.example.com/3", "https://github.com/carol"));
	}
}
