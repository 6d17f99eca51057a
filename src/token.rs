//! Token model, redacting secret wrapper, and the token endpoint wire format.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Access/refresh token pair issued by the token endpoint.
///
/// Owned by the middleware for the lifetime of its pipeline; replaced wholesale on every
/// successful grant or refresh.
#[derive(Clone, Serialize, Deserialize)]
pub struct Token {
	/// Access token secret attached to protected requests.
	pub access_token: TokenSecret,
	/// Refresh token secret, if the endpoint issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the token was obtained.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from `expires_in`; `None` means the endpoint supplied no expiry
	/// and the token is never considered locally expired.
	pub expires_at: Option<OffsetDateTime>,
}
impl Token {
	/// Builds a token from the wire payload, stamping `issued_at` with the provided instant.
	pub fn from_payload(payload: TokenPayload, issued_at: OffsetDateTime) -> Self {
		let expires_at = payload.expires_in.map(|secs| issued_at + Duration::seconds(secs));

		Self {
			access_token: TokenSecret::new(payload.access_token),
			refresh_token: payload.refresh_token.map(TokenSecret::new),
			issued_at,
			expires_at,
		}
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		match self.expires_at {
			Some(expires_at) => instant >= expires_at,
			None => false,
		}
	}

	/// Checks expiry against the current UTC instant.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// JSON payload returned by the token endpoint for both grants.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenPayload {
	/// Access token value.
	pub access_token: String,
	/// Refresh token value, when issued.
	#[serde(default)]
	pub refresh_token: Option<String>,
	/// Lifetime in seconds, when supplied.
	#[serde(default)]
	pub expires_in: Option<i64>,
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn payload_maps_expiry_relative_to_issue_instant() {
		let issued = macros::datetime!(2025-06-01 12:00 UTC);
		let payload = TokenPayload {
			access_token: "A".into(),
			refresh_token: Some("R".into()),
			expires_in: Some(3_600),
		};
		let token = Token::from_payload(payload, issued);

		assert_eq!(token.expires_at, Some(macros::datetime!(2025-06-01 13:00 UTC)));
		assert!(!token.is_expired_at(macros::datetime!(2025-06-01 12:59 UTC)));
		assert!(token.is_expired_at(macros::datetime!(2025-06-01 13:00 UTC)));
	}

	#[test]
	fn missing_expiry_never_expires_locally() {
		let payload =
			TokenPayload { access_token: "A".into(), refresh_token: None, expires_in: None };
		let token = Token::from_payload(payload, macros::datetime!(2020-01-01 00:00 UTC));

		assert!(!token.is_expired_at(macros::datetime!(2099-01-01 00:00 UTC)));
	}

	#[test]
	fn token_debug_redacts_both_secrets() {
		let payload = TokenPayload {
			access_token: "sekrit-access".into(),
			refresh_token: Some("sekrit-refresh".into()),
			expires_in: Some(60),
		};
		let rendered = format!("{:?}", Token::from_payload(payload, OffsetDateTime::now_utc()));

		assert!(!rendered.contains("sekrit"));
		assert!(rendered.contains("<redacted>"));
	}
}
