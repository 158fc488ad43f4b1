//! Directory error types.

use thiserror::Error;

/// Errors an [`IdentityDirectory`](super::IdentityDirectory) lookup can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
	/// The identity does not exist.
	#[error("User not found: {0}")]
	NotFound(String),

	/// The directory refused the request because the rate limit is exhausted.
	#[error("Rate limit exceeded")]
	RateLimited,

	/// The directory answered with an unexpected status code.
	#[error("Unexpected status {status} for {identity}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Identity the request was about.
		identity: String,
	},

	/// The request never produced a response.
	#[error("Transport error: {0}")]
	Transport(String),

	/// The response body could not be decoded.
	#[error("Decode error: {0}")]
	Decode(String),

	/// The configured base URL cannot carry path segments.
	#[error("Invalid base URL: {0}")]
	InvalidBaseUrl(String),
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_directory_error_display() {
		let err = DirectoryError::NotFound("ghost".to_string());
		assert!(err.to_string().contains("ghost"));

		let err = DirectoryError::Status {
			status: 502,
			identity: "octocat".to_string(),
		};
		assert!(err.to_string().contains("502"));
		assert!(err.to_string().contains("octocat"));

		let err = DirectoryError::InvalidBaseUrl("mailto:x".to_string());
		assert!(err.to_string().contains("mailto:x"));
	}
}
