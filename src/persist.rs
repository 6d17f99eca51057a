//! Built-in token persistence backends.

pub mod file;
pub mod memory;

pub use file::FilePersistence;
pub use memory::MemoryPersistence;

// self
use crate::_prelude::*;

/// Error type produced by [`TokenPersistence`](crate::strategy::TokenPersistence) backends.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PersistenceError {
	/// Serialization failure surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
