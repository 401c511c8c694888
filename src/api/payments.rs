//! Hosted checkout sessions.
//!
//! The checkout provider redirects the browser back to the front-end when the payment finishes, so
//! every checkout request carries `success_url` and `cancel_url` built from
//! [`ClientConfig::frontend_url`](crate::config::ClientConfig::frontend_url).

// crates.io
use serde::ser::Error as _;
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	client::ApiClient,
	config::ClientConfig,
	error::ConfigError,
	http::{ApiRequest, ApiTransport},
};

/// Placeholder the checkout provider substitutes with the real session id on redirect.
pub const CHECKOUT_SESSION_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

const SUCCESS_PAGE: &str = "payment-success";
const CANCEL_PAGE: &str = "payment-cancel";

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Starts a checkout session. `payload` must serialize to a JSON object (typically the order
	/// id); the return URLs are added to it.
	pub async fn create_checkout_session<P, R>(&self, payload: &P) -> Result<R>
	where
		P: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let body = checkout_body(&self.config, payload)?;

		self.send_json(ApiRequest::post("payments/create-checkout-session/").json(&body)?).await
	}

	/// Confirms a finished checkout session.
	pub async fn verify_payment<R>(&self, session_id: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get("payments/verify/").query("session_id", session_id)).await
	}
}

/// Returns the `(success_url, cancel_url)` pair for the configured front-end.
pub fn return_urls(config: &ClientConfig) -> Result<(String, String)> {
	let page = |path: &str| {
		config
			.frontend_page(path)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })
	};
	let mut success = page(SUCCESS_PAGE)?;

	// Set the raw query so the placeholder braces reach the provider untouched.
	success.set_query(Some(&format!("session_id={CHECKOUT_SESSION_PLACEHOLDER}")));

	Ok((success.into(), page(CANCEL_PAGE)?.into()))
}

fn checkout_body<P>(config: &ClientConfig, payload: &P) -> Result<Map<String, Value>>
where
	P: ?Sized + Serialize,
{
	let mut body = match serde_json::to_value(payload).map_err(ConfigError::Encode)? {
		Value::Object(map) => map,
		_ =>
			return Err(ConfigError::Encode(serde_json::Error::custom(
				"checkout payload must serialize to a JSON object",
			))
			.into()),
	};
	let (success_url, cancel_url) = return_urls(config)?;

	body.insert("success_url".into(), Value::String(success_url));
	body.insert("cancel_url".into(), Value::String(cancel_url));

	Ok(body)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config() -> ClientConfig {
		ClientConfig::builder()
			.frontend_url(Url::parse("https://market.example").expect("Front-end URL should parse."))
			.build()
			.expect("Configuration should build.")
	}

	#[test]
	fn return_urls_keep_placeholder_verbatim() {
		let (success, cancel) = return_urls(&config()).expect("Return URLs should build.");

		assert_eq!(success, "https://market.example/payment-success?session_id={CHECKOUT_SESSION_ID}");
		assert_eq!(cancel, "https://market.example/payment-cancel");
	}

	#[test]
	fn checkout_body_merges_payload_with_return_urls() {
		let body = checkout_body(&config(), &serde_json::json!({ "order_id": 12 }))
			.expect("Checkout body should build.");

		assert_eq!(body["order_id"], 12);
		assert_eq!(body["cancel_url"], "https://market.example/payment-cancel");
		assert!(body["success_url"].as_str().is_some_and(|url| url.ends_with("{CHECKOUT_SESSION_ID}")));
	}

	#[test]
	fn non_object_payload_is_rejected() {
		let err = checkout_body(&config(), &[1, 2, 3]).expect_err("Arrays should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::Encode(_))));
	}
}
