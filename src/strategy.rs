//! Pluggable strategy facets wired into a pipeline at construction time.
//!
//! [`AuthConfig`] bundles three optional strategies: a [`CredentialsSigner`] that transforms the
//! grant form before every token-endpoint POST, a [`TokenPersistence`] backend that carries the
//! current token across calls or process restarts, and an [`AccessTokenSigner`] that controls how
//! the bearer token is attached to protected requests. Absent facets mean default behavior: the
//! form is sent as built, nothing is persisted, and the token rides in `Authorization: Bearer`.
//! Facets are fixed once the pipeline exists; there is no mid-flight reconfiguration.

// crates.io
use reqwest::{Request, header::{AUTHORIZATION, HeaderValue}};
// self
use crate::{_prelude::*, obs::GrantKind, persist::PersistenceError, token::Token};

/// Grant form sent to the token endpoint as `application/x-www-form-urlencoded`.
///
/// An ordered map so repeated insertions of the same field overwrite earlier values, which the
/// authority's construction order relies on.
pub type GrantForm = BTreeMap<String, String>;

/// Boxed future returned by [`TokenPersistence`] operations.
pub type PersistFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PersistenceError>> + 'a + Send>>;

/// Transforms the outgoing grant payload before each token-endpoint call.
pub trait CredentialsSigner
where
	Self: Send + Sync,
{
	/// Mutates the form in place (e.g., adds a computed signature field).
	fn sign_form(&self, grant: GrantKind, form: &mut GrantForm) -> Result<()>;
}

/// Loads and stores the current token so pipelines can resume across restarts.
///
/// The middleware reads once on first use and writes after every successful grant or refresh.
pub trait TokenPersistence
where
	Self: Send + Sync,
{
	/// Fetches the previously stored token, if any.
	fn load(&self) -> PersistFuture<'_, Option<Token>>;

	/// Persists or replaces the current token.
	fn store<'a>(&'a self, token: &'a Token) -> PersistFuture<'a, ()>;
}

/// Attaches the access token to a protected-resource request.
pub trait AccessTokenSigner
where
	Self: Send + Sync,
{
	/// Injects authorization state derived from the token into the request.
	fn sign_request(&self, request: &mut Request, token: &Token) -> Result<()>;
}

/// Default [`AccessTokenSigner`] emitting the standard `Authorization: Bearer` header.
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerSigner;
impl AccessTokenSigner for BearerSigner {
	fn sign_request(&self, request: &mut Request, token: &Token) -> Result<()> {
		let value = HeaderValue::from_str(&format!("Bearer {}", token.access_token.expose()))
			.map_err(crate::error::ConfigError::from)?;

		request.headers_mut().insert(AUTHORIZATION, value);

		Ok(())
	}
}

/// Optional strategy bundle handed to the factory alongside the credentials.
#[derive(Clone, Default)]
pub struct AuthConfig {
	pub(crate) credentials_signer: Option<Arc<dyn CredentialsSigner>>,
	pub(crate) token_persistence: Option<Arc<dyn TokenPersistence>>,
	pub(crate) access_token_signer: Option<Arc<dyn AccessTokenSigner>>,
}
impl AuthConfig {
	/// Creates an empty bundle; every stage falls back to its default behavior.
	pub fn new() -> Self {
		Self::default()
	}

	/// Installs a grant payload signer.
	pub fn with_credentials_signer(mut self, signer: Arc<dyn CredentialsSigner>) -> Self {
		self.credentials_signer = Some(signer);

		self
	}

	/// Installs a token persistence backend.
	pub fn with_token_persistence(mut self, persistence: Arc<dyn TokenPersistence>) -> Self {
		self.token_persistence = Some(persistence);

		self
	}

	/// Installs a custom access token signer replacing the bearer header default.
	pub fn with_access_token_signer(mut self, signer: Arc<dyn AccessTokenSigner>) -> Self {
		self.access_token_signer = Some(signer);

		self
	}
}
impl Debug for AuthConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthConfig")
			.field("credentials_signer", &self.credentials_signer.is_some())
			.field("token_persistence", &self.token_persistence.is_some())
			.field("access_token_signer", &self.access_token_signer.is_some())
			.finish()
	}
}
