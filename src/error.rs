//! Client-level error types shared across the transport, session store, and endpoint catalog.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Session store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// No refresh token is stored, so the session cannot be recovered without signing in.
	#[error("Session is not authenticated; sign in again.")]
	Unauthenticated,
	/// The token refresh call failed; stored credentials have been cleared.
	#[error("Token refresh failed.")]
	RefreshFailed(#[source] RefreshFailure),
	/// The API answered with a non-success status that the client does not handle itself.
	#[error("API responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Retry-After hint from the server, if supplied.
		retry_after: Option<Duration>,
		/// Response body, decoded lossily as UTF-8.
		body: String,
	},
	/// The API responded with a body that does not match the expected shape.
	#[error("API returned a malformed JSON body.")]
	Decode {
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
impl Error {
	/// Returns the HTTP status associated with the error, when one exists.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } | Self::Decode { status, .. } => Some(*status),
			Self::RefreshFailed(failure) => failure.status,
			_ => None,
		}
	}

	/// Whether the caller has to sign in again before further authenticated calls can succeed.
	pub fn requires_sign_in(&self) -> bool {
		matches!(self, Self::Unauthenticated | Self::RefreshFailed(_))
	}
}

/// Settled failure of a refresh call, shared by every request waiting on that refresh.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct RefreshFailure {
	/// HTTP status returned by the refresh endpoint, when the call reached the server.
	pub status: Option<u16>,
	/// Human-readable description of the failure.
	pub message: String,
}
impl RefreshFailure {
	/// Builds a failure from an arbitrary error raised while refreshing.
	pub fn from_error(err: &Error) -> Self {
		let message = match err {
			Error::Status { status, body, .. } if !body.is_empty() =>
				format!("Refresh endpoint responded with HTTP {status}: {body}"),
			other => other.to_string(),
		};

		Self { status: err.status(), message }
	}
}

/// Configuration and request construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Client configuration failed validation.
	#[error(transparent)]
	Build(#[from] crate::config::ConfigBuildError),
	/// A request path cannot be joined onto the base URL.
	#[error("Request path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A request path resolves outside the configured API base URL.
	#[error("Request path `{path}` resolves outside the API base URL.")]
	PathOutsideBase {
		/// Offending path.
		path: String,
	},
	/// Header name or value is not valid HTTP.
	#[error("Header `{name}` is not a valid HTTP header.")]
	InvalidHeader {
		/// Header name as supplied by the caller.
		name: String,
	},
	/// Request body could not be encoded as JSON.
	#[error("Request body could not be encoded as JSON.")]
	Encode(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn refresh_failure_keeps_status_and_body() {
		let err = Error::Status {
			status: 401,
			retry_after: None,
			body: "{\"detail\":\"Token is invalid or expired\"}".into(),
		};
		let failure = RefreshFailure::from_error(&err);

		assert_eq!(failure.status, Some(401));
		assert!(failure.message.contains("Token is invalid or expired"));
	}

	#[test]
	fn sign_in_classification() {
		let failure = RefreshFailure { status: None, message: "connection reset".into() };

		assert!(Error::Unauthenticated.requires_sign_in());
		assert!(Error::RefreshFailed(failure).requires_sign_in());
		assert!(
			!Error::Status { status: 500, retry_after: None, body: String::new() }
				.requires_sign_in()
		);
	}

	#[test]
	fn refresh_failed_exposes_source() {
		let failure = RefreshFailure { status: Some(400), message: "bad refresh".into() };
		let err = Error::RefreshFailed(failure);
		let source =
			StdError::source(&err).expect("RefreshFailed should expose the refresh failure.");

		assert_eq!(source.to_string(), "bad refresh");
		assert_eq!(err.status(), Some(400));
	}
}
