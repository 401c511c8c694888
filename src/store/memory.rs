//! Thread-safe in-memory [`SessionStore`] implementation for headless callers and tests.

// self
use crate::{
	_prelude::*,
	session::SessionKey,
	store::{SessionChange, SessionStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<SessionKey, String>>>;

/// Thread-safe storage backend that keeps the session in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns a copy of every stored entry, mainly for assertions.
	pub fn snapshot(&self) -> HashMap<SessionKey, String> {
		self.0.read().clone()
	}

	fn apply_now(map: StoreMap, changes: Vec<SessionChange>) -> Result<(), StoreError> {
		let mut guard = map.write();

		for (key, value) in changes {
			match value {
				Some(value) => {
					guard.insert(key, value);
				},
				None => {
					guard.remove(&key);
				},
			}
		}

		Ok(())
	}
}
impl SessionStore for MemoryStore {
	fn get(&self, key: SessionKey) -> StoreFuture<'_, Option<String>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(&key).cloned()) })
	}

	fn set(&self, key: SessionKey, value: String) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::apply_now(map, vec![(key, Some(value))]) })
	}

	fn remove(&self, key: SessionKey) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::apply_now(map, vec![(key, None)]) })
	}

	fn apply(&self, changes: Vec<SessionChange>) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::apply_now(map, changes) })
	}
}
