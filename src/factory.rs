//! The factory entry point and its per-identity client cache.

// self
use crate::{
	_prelude::*,
	authority::TokenAuthority,
	client::SignedClient,
	credentials::{CredentialValidator, Credentials},
	error::ConfigError,
	middleware::TokenMiddleware,
	strategy::AuthConfig,
};

/// Builds and caches signed HTTP clients, one per credential identity.
///
/// The cache is keyed by `client_id` and lives as long as the factory: entries are never evicted
/// and never rebuilt. The first call for an identity wins; a later call with the same identity
/// returns the cached client unconditionally, even if it carries a different [`AuthConfig`].
/// Get-or-create runs under a single lock (pipeline construction performs no I/O), so concurrent
/// callers racing on the same identity still produce exactly one pipeline.
#[derive(Clone, Debug, Default)]
pub struct ClientFactory {
	clients: Arc<Mutex<HashMap<String, SignedClient>>>,
}
impl ClientFactory {
	/// Creates a factory with an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a ready-to-use signed client for the credential set.
	///
	/// Fails with [`NotConfiguredError`](crate::error::NotConfiguredError) before any network
	/// call when a mandatory credential field is blank.
	pub fn get_client(&self, credentials: Credentials, config: AuthConfig) -> Result<SignedClient> {
		CredentialValidator::ensure_configured(&credentials)?;

		let mut clients = self.clients.lock();

		if let Some(existing) = clients.get(&credentials.client_id) {
			return Ok(existing.clone());
		}

		let client_id = credentials.client_id.clone();
		let client = Self::build_pipeline(credentials, config)?;

		clients.insert(client_id, client.clone());

		Ok(client)
	}

	fn build_pipeline(credentials: Credentials, config: AuthConfig) -> Result<SignedClient> {
		let transport = ReqwestClient::builder().build().map_err(ConfigError::from)?;
		let authority = TokenAuthority::new(credentials, config.credentials_signer.clone());
		let middleware = TokenMiddleware::new(authority, transport.clone(), &config);

		Ok(SignedClient::new(transport, Arc::new(middleware)))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn credentials(id: &str) -> Credentials {
		Credentials::new(
			id,
			"secret",
			"https://example.com/authorize",
			"https://example.com/token",
		)
	}

	#[test]
	fn missing_fields_fail_before_any_pipeline_is_built() {
		let factory = ClientFactory::new();
		let incomplete = Credentials { client_secret: String::new(), ..credentials("id") };
		let err = factory
			.get_client(incomplete, AuthConfig::new())
			.expect_err("Incomplete credentials should be rejected.");

		assert!(matches!(err, Error::NotConfigured(_)));
		assert!(factory.clients.lock().is_empty());
	}

	#[test]
	fn same_identity_returns_the_same_pipeline() {
		let factory = ClientFactory::new();
		let first = factory
			.get_client(credentials("shared"), AuthConfig::new())
			.expect("First build should succeed.");
		let second = factory
			.get_client(credentials("shared").with_scope("ignored"), AuthConfig::new())
			.expect("Cache hit should succeed.");

		assert!(Arc::ptr_eq(first.middleware(), second.middleware()));
	}

	#[test]
	fn distinct_identities_get_distinct_pipelines() {
		let factory = ClientFactory::new();
		let a = factory
			.get_client(credentials("a"), AuthConfig::new())
			.expect("Building the first identity should succeed.");
		let b = factory
			.get_client(credentials("b"), AuthConfig::new())
			.expect("Building the second identity should succeed.");

		assert!(!Arc::ptr_eq(a.middleware(), b.middleware()));
	}

	#[test]
	fn concurrent_callers_share_one_pipeline_per_identity() {
		let factory = ClientFactory::new();
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let factory = factory.clone();

				std::thread::spawn(move || {
					factory
						.get_client(credentials("raced"), AuthConfig::new())
						.expect("Racing build should succeed.")
				})
			})
			.collect();
		let clients: Vec<_> = handles
			.into_iter()
			.map(|handle| handle.join().expect("Racing thread should not panic."))
			.collect();

		for client in &clients[1..] {
			assert!(Arc::ptr_eq(clients[0].middleware(), client.middleware()));
		}
		assert_eq!(factory.clients.lock().len(), 1);
	}
}
