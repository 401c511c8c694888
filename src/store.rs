//! Storage contracts and built-in implementations for the persisted session record.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	session::{SessionHints, SessionKey, TokenPair, TokenSecret},
};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// A pending change to one session entry: `Some` writes the value, `None` removes the entry.
pub type SessionChange = (SessionKey, Option<String>);

/// Storage backend contract for the persisted session record.
///
/// Every operation is individually atomic. The client reads the access token before each request
/// and only writes during refresh, sign-in, and sign-out.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Reads a single entry.
	fn get(&self, key: SessionKey) -> StoreFuture<'_, Option<String>>;

	/// Writes a single entry, replacing any previous value.
	fn set(&self, key: SessionKey, value: String) -> StoreFuture<'_, ()>;

	/// Removes a single entry; removing an absent entry succeeds.
	fn remove(&self, key: SessionKey) -> StoreFuture<'_, ()>;

	/// Applies a batch of changes. Backends that persist snapshots should override this so the
	/// batch lands in a single write.
	fn apply(&self, changes: Vec<SessionChange>) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			for (key, value) in changes {
				match value {
					Some(value) => self.set(key, value).await?,
					None => self.remove(key).await?,
				}
			}

			Ok(())
		})
	}
}
impl dyn SessionStore {
	/// Returns the stored access token; empty values count as absent.
	pub async fn access_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		self.secret(SessionKey::Access).await
	}

	/// Returns the stored refresh token; empty values count as absent.
	pub async fn refresh_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		self.secret(SessionKey::Refresh).await
	}

	/// Persists a freshly issued token pair. A pair without a refresh token leaves the stored
	/// refresh token untouched.
	pub async fn save_tokens(&self, pair: &TokenPair) -> Result<(), StoreError> {
		let mut changes = vec![(SessionKey::Access, Some(pair.access.expose().to_owned()))];

		if let Some(refresh) = &pair.refresh {
			changes.push((SessionKey::Refresh, Some(refresh.expose().to_owned())));
		}

		self.apply(changes).await
	}

	/// Reads the persisted profile hints.
	pub async fn hints(&self) -> Result<SessionHints, StoreError> {
		let role = self.get(SessionKey::Role).await?.and_then(|raw| raw.parse().ok());
		let is_seller = self.get(SessionKey::IsSeller).await?.is_some_and(|raw| raw == "true");
		let username = self.get(SessionKey::Username).await?;
		let user_id = self.get(SessionKey::UserId).await?;

		Ok(SessionHints { role, is_seller, username, user_id })
	}

	/// Persists profile hints; absent hints leave their entries untouched.
	pub async fn save_hints(&self, hints: &SessionHints) -> Result<(), StoreError> {
		let changes = hints.entries().into_iter().map(|(key, value)| (key, Some(value))).collect();

		self.apply(changes).await
	}

	/// Removes both credentials, leaving profile hints in place.
	pub async fn clear_credentials(&self) -> Result<(), StoreError> {
		self.apply(SessionKey::CREDENTIALS.into_iter().map(|key| (key, None)).collect()).await
	}

	/// Removes every session entry.
	pub async fn clear_all(&self) -> Result<(), StoreError> {
		self.apply(SessionKey::ALL.into_iter().map(|key| (key, None)).collect()).await
	}

	async fn secret(&self, key: SessionKey) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.get(key).await?.filter(|value| !value.is_empty()).map(TokenSecret::new))
	}
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
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

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("disk unavailable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[tokio::test]
	async fn empty_secrets_read_as_absent() {
		let store = MemoryStore::default();
		let store: &dyn SessionStore = &store;

		store.set(SessionKey::Refresh, String::new()).await.expect("Set should succeed.");

		assert_eq!(store.refresh_token().await.expect("Read should succeed."), None);
	}

	#[tokio::test]
	async fn saving_access_only_keeps_refresh() {
		let store = MemoryStore::default();
		let store: &dyn SessionStore = &store;

		store
			.save_tokens(&TokenPair::new("A1", Some("R1")))
			.await
			.expect("Initial save should succeed.");
		store
			.save_tokens(&TokenPair::new("A2", None::<String>))
			.await
			.expect("Access-only save should succeed.");

		let access = store.access_token().await.expect("Read should succeed.");
		let refresh = store.refresh_token().await.expect("Read should succeed.");

		assert_eq!(access.as_ref().map(TokenSecret::expose), Some("A2"));
		assert_eq!(refresh.as_ref().map(TokenSecret::expose), Some("R1"));
	}
}
