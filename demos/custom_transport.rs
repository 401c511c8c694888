//! Plugs a non-reqwest transport into the client.
//!
//! 1. Implement [`ApiTransport`] and return the raw response for every status.
//! 2. Pass the transport to [`ApiClient::with_transport`].
//! 3. The client keeps handling bearer injection and 401 recovery on top of it.

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use color_eyre::Result;
use serde_json::Value;
use url::Url;
// self
use gigmarket_client::{
	client::{ApiClient, RecordingRedirect},
	config::ClientConfig,
	error::Error,
	http::{ApiRequest, ApiResponse, ApiTransport, TransportFuture},
	http_types::{HeaderMap, StatusCode},
	session::TokenPair,
	store::{MemoryStore, SessionStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store = Arc::new(MemoryStore::default());

	<dyn SessionStore>::save_tokens(store.as_ref(), &TokenPair::new("expired", Some("revoked")))
		.await?;

	let transport = Arc::new(CannedTransport::default());
	let redirect = Arc::new(RecordingRedirect::default());
	let client: ApiClient<CannedTransport> =
		ApiClient::with_transport(ClientConfig::default(), transport.clone(), store.clone())
			.with_redirect(redirect.clone());

	match client.list_notifications::<Value>().await {
		Ok(_) => println!("Canned transport unexpectedly accepted the expired token."),
		Err(e @ Error::RefreshFailed(_)) => println!("Refresh rejected, user must sign in: {e}."),
		Err(e) => println!("Unexpected failure: {e}."),
	}

	println!(
		"Transport saw {} call(s); redirects recorded: {:?}; store now: {:?}.",
		transport.calls.load(Ordering::SeqCst),
		redirect.redirects(),
		store.snapshot(),
	);

	Ok(())
}

/// Answers every call with HTTP 401, as if both the access and the refresh token were revoked.
#[derive(Default)]
struct CannedTransport {
	calls: AtomicUsize,
}
impl ApiTransport for CannedTransport {
	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			println!("{} {url}", request.method);

			Ok(ApiResponse::new(StatusCode::UNAUTHORIZED, HeaderMap::new(), Vec::new()))
		})
	}
}
