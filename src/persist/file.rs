//! File-backed token persistence for lightweight deployments and bots.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	persist::PersistenceError,
	strategy::{PersistFuture, TokenPersistence},
	token::Token,
};

/// Persists the current token to a JSON file after each store.
#[derive(Clone, Debug)]
pub struct FilePersistence {
	path: PathBuf,
	inner: Arc<RwLock<Option<Token>>>,
}
impl FilePersistence {
	/// Opens (or creates) a backend at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { None };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<Option<Token>, PersistenceError> {
		let metadata = path.metadata().map_err(|e| PersistenceError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(None);
		}

		let bytes = fs::read(path).map_err(|e| PersistenceError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let token = serde_json::from_slice(&bytes).map_err(|e| PersistenceError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})?;

		Ok(Some(token))
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), PersistenceError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| PersistenceError::Backend {
				message: format!("Failed to create token directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist(&self, token: &Token) -> Result<(), PersistenceError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(token).map_err(|e| PersistenceError::Serialization {
				message: format!("Failed to serialize token: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| PersistenceError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| PersistenceError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| PersistenceError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| PersistenceError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl TokenPersistence for FilePersistence {
	fn load(&self) -> PersistFuture<'_, Option<Token>> {
		Box::pin(async move { Ok(self.inner.read().clone()) })
	}

	fn store<'a>(&'a self, token: &'a Token) -> PersistFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			self.persist(token)?;
			*guard = Some(token.clone());

			Ok(())
		})
	}
}
