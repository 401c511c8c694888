//! Signs in against a mock marketplace API, lets the access token expire, and shows the client
//! refreshing it once and replaying the rejected request.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::Value;
use url::Url;
// self
use gigmarket_client::{
	api::Credentials,
	client::{ReqwestApiClient, SignInReason},
	config::ClientConfig,
	http::ReqwestTransport,
	reqwest::{Client, redirect::Policy},
	store::{MemoryStore, SessionStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"demo-access-1\",\"refresh\":\"demo-refresh\"}");
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":1,\"username\":\"demo\",\"role\":\"buyer\",\"is_seller\":false}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/orders/").header("authorization", "Bearer demo-access-1");
			then.status(401);
		})
		.await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/token/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"demo-access-2\"}");
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/orders/").header("authorization", "Bearer demo-access-2");
			then.status(200).header("content-type", "application/json").body("[{\"id\":42}]");
		})
		.await;

	let config = ClientConfig::builder().base_url(Url::parse(&server.base_url())?).build()?;
	let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::default());
	// The mock server presents a self-signed certificate.
	let http = Client::builder()
		.redirect(Policy::none())
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()?;
	let transport = ReqwestTransport::with_client(http);
	let client = ReqwestApiClient::with_transport(config, transport, store).with_redirect(Arc::new(
		|path: &str, reason: SignInReason| println!("Redirecting to {path} ({reason})."),
	));
	let profile = client.sign_in(&Credentials::new("demo@example.com", "demo-password")).await?;

	println!("Signed in as {}.", profile.username);

	let orders: Vec<Value> = client.list_orders().await?;

	println!("Orders after transparent refresh: {orders:?}.");
	println!("Refresh metrics: {:?}.", client.coordinator.metrics());

	login.assert_async().await;
	refresh.assert_async().await;

	Ok(())
}
