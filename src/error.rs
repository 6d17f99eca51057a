//! Pipeline-level error types shared across the factory, authority, and middleware.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical pipeline error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Mandatory credential fields are missing; raised before any network call.
	#[error(transparent)]
	NotConfigured(#[from] NotConfiguredError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint rejected a grant or returned an unusable payload.
	#[error(transparent)]
	Grant(#[from] GrantError),
	/// Transport failure (DNS, TCP, TLS); propagated unchanged.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token persistence strategy failure.
	#[error("{0}")]
	Persistence(
		#[from]
		#[source]
		crate::persist::PersistenceError,
	),
}
impl From<reqwest::Error> for Error {
	fn from(e: reqwest::Error) -> Self {
		// Builder failures are local misconfiguration; everything else is the transport's.
		if e.is_builder() {
			ConfigError::from(e).into()
		} else {
			TransportError::from(e).into()
		}
	}
}

/// Credential validation failure raised synchronously by the factory.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum NotConfiguredError {
	/// One of the four mandatory credential fields is empty or blank.
	#[error("Credential field `{field}` is missing or blank.")]
	MissingField {
		/// Name of the offending credential field.
		field: &'static str,
	},
}

/// Configuration and validation failures raised while wiring a pipeline.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Token endpoint URL cannot be parsed.
	#[error("Token URL is invalid.")]
	InvalidTokenUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Access token cannot be rendered into a request header.
	#[error("Access token produces an invalid header value.")]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures reported by the token endpoint during authorization or refresh.
#[derive(Debug, ThisError)]
pub enum GrantError {
	/// Token endpoint returned a non-2xx status.
	#[error("Token endpoint returned status {status}: {body}.")]
	Endpoint {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Response body, truncated for diagnostics.
		body: String,
	},
	/// Token endpoint responded with a payload that could not be parsed.
	#[error("Token endpoint returned a malformed token payload.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A previous grant failed and the pipeline has not been reset.
	#[error("Token pipeline previously failed: {reason}")]
	PipelineFailed {
		/// Rendered error from the failed grant.
		reason: String,
	},
}

/// Transport-level failures (network, IO); owned by the underlying HTTP stack.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		Self::network(e)
	}
}
