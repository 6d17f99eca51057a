//! The signed HTTP client handed back to callers.

// crates.io
use reqwest::{IntoUrl, Method, Request, RequestBuilder, Response};
// self
use crate::{_prelude::*, middleware::TokenMiddleware};

/// HTTP client whose requests are transparently signed with OAuth 2.0 bearer tokens.
///
/// Cloning is cheap and every clone shares the same pipeline: one token state, one authority, one
/// cache entry. This is the only artifact the factory exposes to the rest of the system.
#[derive(Clone)]
pub struct SignedClient {
	transport: ReqwestClient,
	middleware: Arc<TokenMiddleware>,
}
impl SignedClient {
	pub(crate) fn new(transport: ReqwestClient, middleware: Arc<TokenMiddleware>) -> Self {
		Self { transport, middleware }
	}

	/// Starts building a request for the given method and URL.
	pub fn request(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
		self.transport.request(method, url)
	}

	/// Starts building a GET request.
	pub fn get(&self, url: impl IntoUrl) -> RequestBuilder {
		self.request(Method::GET, url)
	}

	/// Starts building a POST request.
	pub fn post(&self, url: impl IntoUrl) -> RequestBuilder {
		self.request(Method::POST, url)
	}

	/// Finishes a builder and sends it through the signing pipeline.
	pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
		let request = builder.build()?;

		self.execute(request).await
	}

	/// Sends an already built request through the signing pipeline.
	pub async fn execute(&self, request: Request) -> Result<Response> {
		self.middleware.execute(request).await
	}

	/// Returns the middleware driving this client, e.g. for an explicit [`TokenMiddleware::reset`].
	pub fn middleware(&self) -> &Arc<TokenMiddleware> {
		&self.middleware
	}
}
impl Debug for SignedClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignedClient").field("middleware", &self.middleware).finish()
	}
}
