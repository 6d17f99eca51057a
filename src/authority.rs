//! Grant execution against a credential set's token endpoint.

// crates.io
use reqwest::redirect::Policy;
// self
use crate::{
	_prelude::*,
	credentials::Credentials,
	error::{ConfigError, GrantError},
	obs::{GrantKind, GrantSpan},
	strategy::{CredentialsSigner, GrantForm},
	token::{Token, TokenPayload},
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Executes OAuth 2.0 grants against the credential set's token endpoint.
///
/// The authority owns a dedicated transport client scoped to the token URL. The client is built
/// lazily on the first grant and reused for the lifetime of the parent pipeline; it is never
/// rebuilt once created. Token requests do not follow redirects, matching OAuth 2.0 guidance that
/// token endpoints return results directly instead of delegating to another URI.
pub struct TokenAuthority {
	credentials: Credentials,
	credentials_signer: Option<Arc<dyn CredentialsSigner>>,
	endpoint: Mutex<Option<Endpoint>>,
}
impl TokenAuthority {
	/// Creates an authority bound to the credential set, with an optional grant payload signer.
	pub fn new(
		credentials: Credentials,
		credentials_signer: Option<Arc<dyn CredentialsSigner>>,
	) -> Self {
		Self { credentials, credentials_signer, endpoint: Mutex::new(None) }
	}

	/// Returns the credential set this authority is bound to.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Builds the authorization-code grant form.
	///
	/// Construction order matters: the literal `code` placeholder is always inserted first, then
	/// scope, then redirect_uri, and an explicit authorization code replaces the placeholder last.
	/// The placeholder is therefore always present on the wire when no code was furnished.
	pub fn authorization_form(&self) -> GrantForm {
		let mut form = GrantForm::new();

		form.insert("client_id".into(), self.credentials.client_id.clone());
		form.insert("client_secret".into(), self.credentials.client_secret.clone());
		form.insert("code".into(), "code".into());

		if let Some(scope) = &self.credentials.scope {
			form.insert("scope".into(), scope.clone());
		}
		if let Some(redirect_uri) = &self.credentials.redirect_uri {
			form.insert("redirect_uri".into(), redirect_uri.clone());
		}
		if let Some(code) = &self.credentials.code {
			form.insert("code".into(), code.clone());
		}

		form
	}

	/// Exchanges the authorization code (or the literal placeholder) for a token.
	pub async fn authorization_code_grant(&self) -> Result<Token> {
		let span = GrantSpan::new(GrantKind::AuthorizationCode, "authorization_code_grant");

		span.instrument(async move {
			let mut form = self.authorization_form();

			form.insert("grant_type".into(), GrantKind::AuthorizationCode.as_str().into());

			self.post_grant(GrantKind::AuthorizationCode, form).await
		})
		.await
	}

	/// Exchanges a refresh token for a new access token.
	pub async fn refresh_grant(&self, refresh_token: &str) -> Result<Token> {
		let span = GrantSpan::new(GrantKind::Refresh, "refresh_grant");

		span.instrument(async move {
			let mut form = GrantForm::new();

			form.insert("client_id".into(), self.credentials.client_id.clone());
			form.insert("client_secret".into(), self.credentials.client_secret.clone());
			form.insert("refresh_token".into(), refresh_token.to_owned());
			form.insert("grant_type".into(), GrantKind::Refresh.as_str().into());

			self.post_grant(GrantKind::Refresh, form).await
		})
		.await
	}

	async fn post_grant(&self, kind: GrantKind, mut form: GrantForm) -> Result<Token> {
		if let Some(signer) = &self.credentials_signer {
			signer.sign_form(kind, &mut form)?;
		}

		let endpoint = self.endpoint()?;
		let response = endpoint.client.post(endpoint.token_url).form(&form).send().await?;
		let status = response.status();
		let bytes = response.bytes().await?;

		if !status.is_success() {
			return Err(GrantError::Endpoint {
				status: status.as_u16(),
				body: body_preview(&bytes),
			}
			.into());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
		let payload: TokenPayload = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| GrantError::ResponseParse { source })?;

		Ok(Token::from_payload(payload, OffsetDateTime::now_utc()))
	}

	fn endpoint(&self) -> Result<Endpoint> {
		let mut guard = self.endpoint.lock();

		if let Some(endpoint) = guard.as_ref() {
			return Ok(endpoint.clone());
		}

		let token_url = Url::parse(&self.credentials.token_url)
			.map_err(|source| ConfigError::InvalidTokenUrl { source })?;
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.build()
			.map_err(ConfigError::from)?;
		let endpoint = Endpoint { client, token_url };

		*guard = Some(endpoint.clone());

		Ok(endpoint)
	}
}
impl Debug for TokenAuthority {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenAuthority")
			.field("credentials", &self.credentials)
			.field("credentials_signer_set", &self.credentials_signer.is_some())
			.field("endpoint_built", &self.endpoint.lock().is_some())
			.finish()
	}
}

#[derive(Clone, Debug)]
struct Endpoint {
	client: ReqwestClient,
	token_url: Url,
}

fn body_preview(bytes: &[u8]) -> String {
	String::from_utf8_lossy(bytes).chars().take(BODY_PREVIEW_LIMIT).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn credentials() -> Credentials {
		Credentials::new(
			"id-123",
			"secret-456",
			"https://example.com/authorize",
			"https://example.com/token",
		)
	}

	#[test]
	fn form_always_carries_the_code_placeholder() {
		let authority = TokenAuthority::new(credentials(), None);
		let form = authority.authorization_form();

		assert_eq!(form.get("client_id").map(String::as_str), Some("id-123"));
		assert_eq!(form.get("client_secret").map(String::as_str), Some("secret-456"));
		assert_eq!(form.get("code").map(String::as_str), Some("code"));
		assert!(!form.contains_key("scope"));
		assert!(!form.contains_key("redirect_uri"));
	}

	#[test]
	fn explicit_code_overrides_the_placeholder_after_scope_and_redirect() {
		let authority = TokenAuthority::new(
			credentials()
				.with_scope("read write")
				.with_redirect_uri("https://example.com/cb")
				.with_code("real-code"),
			None,
		);
		let form = authority.authorization_form();

		assert_eq!(form.get("scope").map(String::as_str), Some("read write"));
		assert_eq!(form.get("redirect_uri").map(String::as_str), Some("https://example.com/cb"));
		assert_eq!(form.get("code").map(String::as_str), Some("real-code"));
	}

	#[test]
	fn invalid_token_url_is_a_config_error() {
		let authority = TokenAuthority::new(
			Credentials::new("id", "secret", "https://example.com/authorize", "not a url"),
			None,
		);
		let err = authority.endpoint().expect_err("An unparsable token URL should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidTokenUrl { .. })));
	}
}
