//! Optional observability helpers for grant flows.
//!
//! Enable the `tracing` feature to emit structured spans named `oauth2_signer.grant` with the
//! `grant` (kind) and `stage` (call site) fields. Without the feature every helper compiles to a
//! no-op.

// self
use crate::_prelude::*;

/// Grant kinds executed by the token authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantKind {
	/// Authorization-code grant.
	AuthorizationCode,
	/// Refresh-token grant.
	Refresh,
}
impl GrantKind {
	/// Returns a stable label suitable for span fields and wire `grant_type` values.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantKind::AuthorizationCode => "authorization_code",
			GrantKind::Refresh => "refresh_token",
		}
	}
}
impl Display for GrantKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedGrant<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedGrant<F> = F;

/// A span builder used around token-endpoint exchanges.
#[derive(Clone, Debug)]
pub struct GrantSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl GrantSpan {
	/// Creates a new span tagged with the provided grant kind + stage.
	pub fn new(kind: GrantKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_signer.grant", grant = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedGrant<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn grant_kind_labels_match_wire_grant_types() {
		assert_eq!(GrantKind::AuthorizationCode.as_str(), "authorization_code");
		assert_eq!(GrantKind::Refresh.as_str(), "refresh_token");
		assert_eq!(GrantKind::Refresh.to_string(), "refresh_token");
	}

	#[tokio::test]
	async fn instrument_passes_the_future_through() {
		let span = GrantSpan::new(GrantKind::Refresh, "instrument_passes_the_future_through");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
