//! Async client for the gig marketplace REST API: bearer-authenticated requests, singleflight
//! token refresh with transparent replay, persisted sessions, and a typed endpoint catalog.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod refresh;
pub mod session;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{ApiClient, RecordingRedirect},
		config::ClientConfig,
		http::ReqwestTransport,
		session::TokenPair,
		store::{MemoryStore, SessionStore},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ApiClient<ReqwestTransport>;

	/// Everything an integration test needs to drive and inspect a client.
	pub struct TestHarness {
		/// Client under test.
		pub client: ReqwestTestClient,
		/// Store backing the client, shared so tests can seed and inspect it.
		pub store: Arc<MemoryStore>,
		/// Redirect hook that records every sign-in redirect.
		pub redirect: Arc<RecordingRedirect>,
	}

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Builds a client pointed at `base_url` (usually an `httpmock` server) with an in-memory
	/// store and a recording redirect hook.
	pub fn build_reqwest_test_client(base_url: &str) -> TestHarness {
		let config = ClientConfig::builder()
			.base_url(Url::parse(base_url).expect("Mock server URL should parse."))
			.build()
			.expect("Test client configuration should build.");
		let store = Arc::new(MemoryStore::default());
		let redirect = Arc::new(RecordingRedirect::default());
		let client = ApiClient::with_transport(
			config,
			test_reqwest_transport(),
			store.clone() as Arc<dyn SessionStore>,
		)
		.with_redirect(redirect.clone());

		TestHarness { client, store, redirect }
	}

	/// Seeds the store with an access/refresh pair.
	pub async fn seed_tokens(store: &MemoryStore, access: &str, refresh: Option<&str>) {
		let pair = TokenPair::new(access, refresh);

		<dyn SessionStore>::save_tokens(store, &pair)
			.await
			.expect("Failed to seed tokens into the memory store.");
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use ::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
