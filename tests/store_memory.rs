// std
use std::sync::Arc;
// self
use gigmarket_client::{
	session::{Role, SessionHints, SessionKey, TokenPair, TokenSecret},
	store::{MemoryStore, SessionStore},
};

fn seller_hints() -> SessionHints {
	SessionHints {
		role: Some(Role::Seller),
		is_seller: true,
		username: Some("ada".into()),
		user_id: Some("7".into()),
	}
}

#[tokio::test]
async fn hints_round_trip_through_store() {
	let store = MemoryStore::default();
	let session: &dyn SessionStore = &store;

	session.save_hints(&seller_hints()).await.expect("Saving hints should succeed.");

	let hints = session.hints().await.expect("Loading hints should succeed.");

	assert_eq!(hints, seller_hints());
	assert_eq!(store.snapshot().get(&SessionKey::UserId).map(String::as_str), Some("7"));
}

#[tokio::test]
async fn clear_credentials_keeps_profile_hints() {
	let store = MemoryStore::default();
	let session: &dyn SessionStore = &store;

	session
		.save_tokens(&TokenPair::new("A1", Some("R1")))
		.await
		.expect("Saving tokens should succeed.");
	session.save_hints(&seller_hints()).await.expect("Saving hints should succeed.");
	session.clear_credentials().await.expect("Clearing credentials should succeed.");

	assert_eq!(session.access_token().await.expect("Read should succeed."), None);
	assert_eq!(session.refresh_token().await.expect("Read should succeed."), None);
	assert_eq!(session.hints().await.expect("Read should succeed."), seller_hints());

	session.clear_all().await.expect("Clearing the session should succeed.");

	assert!(store.snapshot().is_empty());
	assert!(session.hints().await.expect("Read should succeed.").is_empty());
}

#[tokio::test]
async fn unknown_role_entries_read_as_missing() {
	let store = MemoryStore::default();
	let session: &dyn SessionStore = &store;

	session.set(SessionKey::Role, "admin".into()).await.expect("Raw write should succeed.");

	assert_eq!(session.hints().await.expect("Read should succeed.").role, None);
}

#[tokio::test]
async fn concurrent_writers_leave_a_consistent_pair() {
	let store = Arc::new(MemoryStore::default());
	let mut handles = Vec::new();

	for i in 0..16 {
		let store = store.clone();

		handles.push(tokio::spawn(async move {
			let pair = TokenPair::new(format!("A{i}"), Some(format!("R{i}")));

			<dyn SessionStore>::save_tokens(store.as_ref(), &pair)
				.await
				.expect("Concurrent save should succeed.");
		}));
	}
	for handle in handles {
		handle.await.expect("Writer task should not panic.");
	}

	let snapshot = store.snapshot();
	let access = snapshot.get(&SessionKey::Access).expect("Access token should be stored.");
	let refresh = snapshot.get(&SessionKey::Refresh).expect("Refresh token should be stored.");

	// Each pair is written as one batch, so the survivors come from the same writer.
	assert_eq!(access.trim_start_matches('A'), refresh.trim_start_matches('R'));

	let secret = TokenSecret::new(access.clone());

	assert_eq!(format!("{secret}"), "<redacted>");
}
