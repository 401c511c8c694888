//! Simple file-backed [`SessionStore`] so CLI and desktop callers keep their session across runs.

// std
use std::{
	collections::BTreeMap,
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	session::SessionKey,
	store::{SessionChange, SessionStore, StoreError, StoreFuture},
};

type Snapshot = BTreeMap<SessionKey, String>;

/// Persists the session record to a JSON object after each mutation.
///
/// The file holds a flat object keyed by the persisted key names (`access`, `refresh`, `role`,
/// `is_seller`, `username`, `userId`).
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Snapshot>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
		if !path.exists() {
			return Ok(Snapshot::new());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(Snapshot::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		let entries: BTreeMap<String, String> =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		// Entries written by other tooling under unknown names are ignored.
		Ok(entries
			.into_iter()
			.filter_map(|(key, value)| key.parse::<SessionKey>().ok().map(|key| (key, value)))
			.collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &Snapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let named: BTreeMap<&str, &str> =
			contents.iter().map(|(key, value)| (key.as_str(), value.as_str())).collect();
		let serialized =
			serde_json::to_vec_pretty(&named).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize session snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn apply_now(&self, changes: Vec<SessionChange>) -> Result<(), StoreError> {
		let mut guard = self.inner.write();
		let mut dirty = false;

		for (key, value) in changes {
			dirty |= match value {
				Some(value) => guard.insert(key, value.clone()).as_ref() != Some(&value),
				None => guard.remove(&key).is_some(),
			};
		}

		if dirty {
			self.persist_locked(&guard)?;
		}

		Ok(())
	}
}
impl SessionStore for FileStore {
	fn get(&self, key: SessionKey) -> StoreFuture<'_, Option<String>> {
		Box::pin(async move { Ok(self.inner.read().get(&key).cloned()) })
	}

	fn set(&self, key: SessionKey, value: String) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.apply_now(vec![(key, Some(value))]) })
	}

	fn remove(&self, key: SessionKey) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.apply_now(vec![(key, None)]) })
	}

	fn apply(&self, changes: Vec<SessionChange>) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.apply_now(changes) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::session::{TokenPair, TokenSecret};

	fn temp_path() -> PathBuf {
		let unique = format!(
			"gigmarket_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let pair = TokenPair::new("access-token", Some("refresh-token"));

		rt.block_on(<dyn SessionStore>::save_tokens(&store, &pair))
			.expect("Failed to save tokens to file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let access = rt
			.block_on(<dyn SessionStore>::access_token(&reopened))
			.expect("Failed to read access token from file store.");
		let raw = fs::read_to_string(&path).expect("Snapshot file should be readable.");

		assert_eq!(access.as_ref().map(TokenSecret::expose), Some("access-token"));
		assert!(raw.contains("\"refresh\": \"refresh-token\""));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn clear_all_empties_snapshot() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.set(SessionKey::Username, "ada".into()))
			.expect("Failed to write username.");
		rt.block_on(<dyn SessionStore>::clear_all(&store)).expect("Failed to clear store.");

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");

		assert_eq!(
			rt.block_on(reopened.get(SessionKey::Username)).expect("Read should succeed."),
			None
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_snapshot_is_reported() {
		let path = temp_path();

		fs::write(&path, b"not json").expect("Failed to write corrupt snapshot.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshot should fail to load.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
