//! Typed endpoint catalog for the marketplace REST API.
//!
//! Every area is an `impl` block on [`ApiClient`](crate::client::ApiClient), so each call runs
//! through the same bearer injection and 401 recovery as [`ApiClient::send`]. The crate ships the
//! auth models; other endpoints decode into whatever `DeserializeOwned` type the caller picks.
//!
//! [`ApiClient::send`]: crate::client::ApiClient::send

pub mod auth;
pub mod chat;
pub mod gigs;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod reviews;

pub use auth::*;
pub use orders::OrderAction;
pub use payments::{CHECKOUT_SESSION_PLACEHOLDER, return_urls};

// self
use crate::_prelude::*;

/// Builds an item path with a trailing slash: `item_path("gigs", "logo")` → `gigs/logo/`.
///
/// The id is percent-encoded as a single segment, so a slug can never address another endpoint.
pub(crate) fn item_path(collection: &str, id: impl Display) -> String {
	format!("{collection}/{}/", segment(id))
}

/// Builds an action path beneath an item: `action_path("orders", 4, "deliver")` →
/// `orders/4/deliver/`.
pub(crate) fn action_path(collection: &str, id: impl Display, action: &str) -> String {
	format!("{collection}/{}/{action}/", segment(id))
}

fn segment(id: impl Display) -> String {
	urlencoding::encode(&id.to_string()).into_owned()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{config::ClientConfig, error::ConfigError};

	#[test]
	fn paths_keep_trailing_slash() {
		assert_eq!(item_path("gigs", "logo-design"), "gigs/logo-design/");
		assert_eq!(action_path("orders", 4, "deliver"), "orders/4/deliver/");
	}

	#[test]
	fn ids_stay_within_one_segment() {
		let config = ClientConfig::default();

		assert_eq!(item_path("gigs", "../orders"), "gigs/..%2Forders/");
		assert_eq!(action_path("gigs", "a/b?c#d", "reviews"), "gigs/a%2Fb%3Fc%23d/reviews/");

		let url = config
			.endpoint(&item_path("gigs", "../orders"))
			.expect("Encoded slug should resolve.");

		assert_eq!(url.path(), "/api/gigs/..%2Forders/");

		let err = config.endpoint(&item_path("gigs", "..")).expect_err("Dot slugs should be refused.");

		assert!(matches!(err, ConfigError::PathOutsideBase { .. }));
	}
}
