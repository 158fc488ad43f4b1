//! Directory configuration.

use std::time::Duration;

/// Public GitHub REST API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Largest page the API serves; only the first page is ever requested.
pub const DEFAULT_PER_PAGE: u8 = 100;

/// Retry behaviour for failed directory requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Retries after the first attempt; `0` disables retrying.
	pub max_retries: u32,
	/// Delay before the first retry; doubled for each further one.
	pub initial_backoff: Duration,
	/// Upper bound for any single wait, including `Retry-After`.
	pub max_backoff: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_retries: 3,
			initial_backoff: Duration::from_millis(250),
			max_backoff: Duration::from_secs(10),
		}
	}
}

/// Settings for [`GitHubDirectory`](crate::network::GitHubDirectory).
///
/// The base URL can be overridden at build time with the
/// `GITHUB_API_BASE_URL` environment variable, e.g. to point at a proxy or a
/// GitHub Enterprise instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryConfig {
	/// API root, e.g. `https://api.github.com`.
	pub base_url: String,
	/// Page size for relation lists.
	pub per_page: u8,
	/// Value of the `X-GitHub-Api-Version` header.
	pub api_version: String,
	/// Retry behaviour for transport errors, 5xx and rate limits.
	pub retry: RetryPolicy,
}

impl Default for DirectoryConfig {
	fn default() -> Self {
		Self {
			base_url: option_env!("GITHUB_API_BASE_URL")
				.unwrap_or(DEFAULT_API_BASE_URL)
				.to_string(),
			per_page: DEFAULT_PER_PAGE,
			api_version: "2022-11-28".to_string(),
			retry: RetryPolicy::default(),
		}
	}
}

impl DirectoryConfig {
	/// Replaces the API root.
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	/// Sets the page size, clamped to `1..=100`.
	pub fn with_per_page(mut self, per_page: u8) -> Self {
		self.per_page = per_page.clamp(1, DEFAULT_PER_PAGE);
		self
	}

	/// Replaces the retry policy.
	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}
}
