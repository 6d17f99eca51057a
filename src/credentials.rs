//! OAuth 2.0 client credential sets and the mandatory-field validator.

// self
use crate::{_prelude::*, error::NotConfiguredError};

/// Immutable identity of an OAuth 2.0 client.
///
/// The four mandatory fields identify the client and its endpoints; the optional fields replace
/// the capability facets of the original interface design with explicit presence checks. A
/// credential set never changes once it has been handed to the factory.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	/// Unique client identifier; also the pipeline cache key.
	pub client_id: String,
	/// Client secret presented during grants.
	pub client_secret: String,
	/// Authorization endpoint the end user is sent to.
	pub authorization_url: String,
	/// Token endpoint grants are exchanged against.
	pub token_url: String,
	/// Requested scope, when the provider expects one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// Redirect URI registered with the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub redirect_uri: Option<String>,
	/// Authorization code obtained out of band, when available.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
}
impl Credentials {
	/// Creates a credential set from the four mandatory fields.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		authorization_url: impl Into<String>,
		token_url: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			authorization_url: authorization_url.into(),
			token_url: token_url.into(),
			scope: None,
			redirect_uri: None,
			code: None,
		}
	}

	/// Attaches a requested scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Attaches a redirect URI.
	pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(redirect_uri.into());

		self
	}

	/// Attaches an authorization code obtained out of band.
	pub fn with_code(mut self, code: impl Into<String>) -> Self {
		self.code = Some(code.into());

		self
	}

	/// Returns the first mandatory field that is empty or blank, if any.
	pub fn missing_field(&self) -> Option<&'static str> {
		if self.authorization_url.trim().is_empty() {
			return Some("authorization_url");
		}
		if self.token_url.trim().is_empty() {
			return Some("token_url");
		}
		if self.client_id.trim().is_empty() {
			return Some("client_id");
		}
		if self.client_secret.trim().is_empty() {
			return Some("client_secret");
		}

		None
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("authorization_url", &self.authorization_url)
			.field("token_url", &self.token_url)
			.field("scope", &self.scope)
			.field("redirect_uri", &self.redirect_uri)
			.field("code", &self.code.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

/// Checks that a credential set carries the four mandatory fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct CredentialValidator;
impl CredentialValidator {
	/// Returns `true` when every mandatory field is present and non-blank. No side effects.
	pub fn is_configured(credentials: &Credentials) -> bool {
		credentials.missing_field().is_none()
	}

	/// Fails with [`NotConfiguredError`] naming the first missing field.
	pub fn ensure_configured(credentials: &Credentials) -> Result<(), NotConfiguredError> {
		match credentials.missing_field() {
			Some(field) => Err(NotConfiguredError::MissingField { field }),
			None => Ok(()),
		}
	}
}
