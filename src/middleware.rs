//! Request interception, bearer injection, and the token lifecycle state machine.

// crates.io
use reqwest::{Request, Response, StatusCode};
// self
use crate::{
	_prelude::*,
	authority::TokenAuthority,
	error::GrantError,
	strategy::{AccessTokenSigner, AuthConfig, BearerSigner, TokenPersistence},
	token::Token,
};

/// Intercepts outbound requests and keeps them signed with a current access token.
///
/// The per-pipeline state machine is NoToken → Authorized → Failed. NoToken resolves by loading a
/// persisted token (first use only) or running the authorization-code grant. Authorized attaches
/// the token to the request; a 401 response or a locally detected expiry triggers a refresh grant
/// when a refresh token is present, with the original request retried once. Failed is terminal:
/// every subsequent call surfaces the grant error until [`TokenMiddleware::reset`] is called.
///
/// Token acquisition is serialized behind an async mutex and rotations are generation-stamped, so
/// N concurrent 401s trigger one refresh and the other N-1 in-flight requests reuse its result.
pub struct TokenMiddleware {
	authority: TokenAuthority,
	transport: ReqwestClient,
	token_signer: Arc<dyn AccessTokenSigner>,
	persistence: Option<Arc<dyn TokenPersistence>>,
	state: AsyncMutex<TokenState>,
}
impl TokenMiddleware {
	/// Wires a middleware to its authority, transport, and strategy facets.
	///
	/// Facets come from the [`AuthConfig`] and are fixed for the pipeline's lifetime; an absent
	/// access token signer falls back to [`BearerSigner`].
	pub fn new(authority: TokenAuthority, transport: ReqwestClient, config: &AuthConfig) -> Self {
		let token_signer = config
			.access_token_signer
			.clone()
			.unwrap_or_else(|| Arc::new(BearerSigner) as Arc<dyn AccessTokenSigner>);

		Self {
			authority,
			transport,
			token_signer,
			persistence: config.token_persistence.clone(),
			state: AsyncMutex::new(TokenState::default()),
		}
	}

	/// Returns the authority driving this middleware's grants.
	pub fn authority(&self) -> &TokenAuthority {
		&self.authority
	}

	/// Signs and sends a request, refreshing and retrying once on 401.
	pub async fn execute(&self, request: Request) -> Result<Response> {
		let (token, generation) = self.ensure_token().await?;
		let retry = request.try_clone();
		let mut request = request;

		self.token_signer.sign_request(&mut request, &token)?;

		let response = self.transport.execute(request).await?;

		if response.status() != StatusCode::UNAUTHORIZED {
			return Ok(response);
		}

		// Streaming bodies cannot be cloned; surface the 401 rather than retry.
		let Some(mut retry) = retry else {
			return Ok(response);
		};
		let Some((token, _)) = self.recover_unauthorized(generation).await? else {
			return Ok(response);
		};

		self.token_signer.sign_request(&mut retry, &token)?;

		Ok(self.transport.execute(retry).await?)
	}

	/// Clears a terminal failure (or any cached token), allowing re-authorization.
	///
	/// The persisted token, if any, is consulted again on the next request.
	pub async fn reset(&self) {
		let mut state = self.state.lock().await;

		state.phase = Phase::NoToken;
		state.persistence_checked = false;
		state.generation += 1;
	}

	/// Resolves a current token, granting or refreshing as the state machine dictates.
	async fn ensure_token(&self) -> Result<(Token, u64)> {
		let mut state = self.state.lock().await;

		if let Phase::Failed(reason) = &state.phase {
			return Err(GrantError::PipelineFailed { reason: reason.clone() }.into());
		}

		if !state.persistence_checked {
			state.persistence_checked = true;

			if let Some(persistence) = &self.persistence {
				if let Some(token) = persistence.load().await? {
					state.phase = Phase::Authorized(token);
				}
			}
		}

		let now = OffsetDateTime::now_utc();

		if let Phase::Authorized(token) = &state.phase {
			if !token.is_expired_at(now) {
				return Ok((token.clone(), state.generation));
			}
		}

		// Expired or absent: refresh when possible, otherwise run the code grant.
		let refresh_token = match &state.phase {
			Phase::Authorized(token) => token.refresh_token.clone(),
			_ => None,
		};
		let granted = match &refresh_token {
			Some(secret) => self.authority.refresh_grant(secret.expose()).await,
			None => self.authority.authorization_code_grant().await,
		};

		self.adopt_grant(&mut state, granted).await
	}

	/// Handles a 401 observed with a token of the given generation.
	///
	/// Returns the replacement token for the retry, or `None` when no retry should happen (no
	/// refresh token available). If another in-flight request already rotated the token, its
	/// result is reused without a second refresh call.
	async fn recover_unauthorized(&self, stale_generation: u64) -> Result<Option<(Token, u64)>> {
		let mut state = self.state.lock().await;

		if let Phase::Failed(reason) = &state.phase {
			return Err(GrantError::PipelineFailed { reason: reason.clone() }.into());
		}
		if state.generation != stale_generation {
			if let Phase::Authorized(token) = &state.phase {
				return Ok(Some((token.clone(), state.generation)));
			}

			return Ok(None);
		}

		let refresh_token = match &state.phase {
			Phase::Authorized(token) => token.refresh_token.clone(),
			_ => None,
		};
		let Some(secret) = refresh_token else {
			return Ok(None);
		};
		let granted = self.authority.refresh_grant(secret.expose()).await;

		self.adopt_grant(&mut state, granted).await.map(Some)
	}

	/// Adopts a grant outcome: rotate and persist on success, poison the pipeline on rejection.
	async fn adopt_grant(
		&self,
		state: &mut TokenState,
		granted: Result<Token>,
	) -> Result<(Token, u64)> {
		match granted {
			Ok(token) => {
				state.phase = Phase::Authorized(token.clone());
				state.generation += 1;

				// A store failure propagates unchanged but keeps the freshly granted token.
				if let Some(persistence) = &self.persistence {
					persistence.store(&token).await?;
				}

				Ok((token, state.generation))
			},
			Err(err) => {
				// Transport blips are the transport's to retry; only grant rejections are terminal.
				if matches!(err, Error::Grant(_)) {
					state.phase = Phase::Failed(err.to_string());
				}

				Err(err)
			},
		}
	}
}
impl Debug for TokenMiddleware {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenMiddleware")
			.field("authority", &self.authority)
			.field("persistence_set", &self.persistence.is_some())
			.finish()
	}
}

#[derive(Debug, Default)]
struct TokenState {
	phase: Phase,
	generation: u64,
	persistence_checked: bool,
}

#[derive(Debug, Default)]
enum Phase {
	#[default]
	NoToken,
	Authorized(Token),
	Failed(String),
}
