//! Thread-safe in-memory token persistence for local development and tests.

// self
use crate::{
	_prelude::*,
	strategy::{PersistFuture, TokenPersistence},
	token::Token,
};

type Slot = Arc<RwLock<Option<Token>>>;

/// Keeps the current token in-process; useful for tests, demos, and seeded pipelines.
#[derive(Clone, Debug, Default)]
pub struct MemoryPersistence(Slot);
impl MemoryPersistence {
	/// Creates a backend pre-seeded with a token, as if a prior run had stored it.
	pub fn seeded(token: Token) -> Self {
		Self(Arc::new(RwLock::new(Some(token))))
	}

	/// Returns a clone of the currently stored token, if any.
	pub fn snapshot(&self) -> Option<Token> {
		self.0.read().clone()
	}
}
impl TokenPersistence for MemoryPersistence {
	fn load(&self) -> PersistFuture<'_, Option<Token>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn store<'a>(&'a self, token: &'a Token) -> PersistFuture<'a, ()> {
		let slot = self.0.clone();
		let token = token.clone();

		Box::pin(async move {
			*slot.write() = Some(token);

			Ok(())
		})
	}
}
