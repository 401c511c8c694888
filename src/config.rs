//! Client configuration: API base URL, refresh endpoint, sign-in entry point, and the front-end
//! origin used to build payment return URLs.
//!
//! Values come from [`ClientConfig::builder`] or [`ClientConfig::from_env`]. The base URL always
//! ends with a slash so relative endpoint paths such as `gigs/` resolve beneath it.

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError};

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "GIGMARKET_API_URL";
/// Environment variable holding the front-end origin used for payment return URLs.
pub const FRONTEND_URL_ENV: &str = "GIGMARKET_FRONTEND_URL";

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_REFRESH_PATH: &str = "auth/token/refresh/";
const DEFAULT_SIGN_IN_PATH: &str = "/login";

/// Errors raised while building or validating a [`ClientConfig`].
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigBuildError {
	/// Base URL could not be parsed.
	#[error("API base URL `{url}` is invalid: {reason}.")]
	InvalidBaseUrl {
		/// Raw value that failed to parse.
		url: String,
		/// Parser message.
		reason: String,
	},
	/// Base URL cannot have relative paths joined onto it (e.g. `mailto:`).
	#[error("API base URL `{url}` cannot be used as a base for endpoint paths.")]
	BaseUrlCannotBeABase {
		/// Offending URL.
		url: String,
	},
	/// Front-end origin could not be parsed.
	#[error("Front-end URL `{url}` is invalid: {reason}.")]
	InvalidFrontendUrl {
		/// Raw value that failed to parse.
		url: String,
		/// Parser message.
		reason: String,
	},
	/// Refresh path must be relative so it resolves beneath the base URL.
	#[error("Refresh path `{path}` must be relative to the API base URL.")]
	AbsoluteRefreshPath {
		/// Offending path.
		path: String,
	},
}

/// Immutable client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// API base URL; always ends with `/`.
	pub base_url: Url,
	/// Refresh endpoint path relative to [`ClientConfig::base_url`].
	pub refresh_path: String,
	/// Sign-in entry point handed to the redirect hook.
	pub sign_in_path: String,
	/// Front-end origin used to build payment success/cancel URLs.
	pub frontend_url: Url,
}
impl ClientConfig {
	/// Creates a builder seeded with the local development defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Builds a configuration from [`API_URL_ENV`] and [`FRONTEND_URL_ENV`], falling back to the
	/// local development defaults for unset variables.
	pub fn from_env() -> Result<Self, ConfigBuildError> {
		let mut builder = Self::builder();

		if let Ok(raw) = env::var(API_URL_ENV) {
			builder = builder.base_url(parse_base_url(&raw)?);
		}
		if let Ok(raw) = env::var(FRONTEND_URL_ENV) {
			let url = Url::parse(raw.trim()).map_err(|e| ConfigBuildError::InvalidFrontendUrl {
				url: raw.clone(),
				reason: e.to_string(),
			})?;

			builder = builder.frontend_url(url);
		}

		builder.build()
	}

	/// Resolves an endpoint path beneath the base URL.
	///
	/// Absolute URLs, dot segments, and anything else that would land outside the base URL's
	/// origin and path prefix are rejected, so bearer credentials never leave the API.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let relative = path.trim_start_matches('/');
		let outside = || ConfigError::PathOutsideBase { path: path.to_owned() };
		let path_part = relative.split(['?', '#']).next().unwrap_or(relative);

		if path_part.split(['/', '\\']).any(is_dot_segment) {
			return Err(outside());
		}

		let url = self
			.base_url
			.join(relative)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })?;

		if url.origin() != self.base_url.origin() || !url.path().starts_with(self.base_url.path()) {
			return Err(outside());
		}

		Ok(url)
	}

	/// Absolute URL of the refresh endpoint.
	pub fn refresh_url(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.refresh_path)
	}

	/// Builds a front-end URL (e.g. a payment return page) beneath the configured origin.
	pub fn frontend_page(&self, path: &str) -> Result<Url, url::ParseError> {
		self.frontend_url.join(path)
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: default_url(DEFAULT_API_URL),
			refresh_path: DEFAULT_REFRESH_PATH.into(),
			sign_in_path: DEFAULT_SIGN_IN_PATH.into(),
			frontend_url: default_url(DEFAULT_FRONTEND_URL),
		}
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// API base URL.
	pub base_url: Url,
	/// Refresh endpoint path.
	pub refresh_path: String,
	/// Sign-in entry point.
	pub sign_in_path: String,
	/// Front-end origin.
	pub frontend_url: Url,
}
impl ClientConfigBuilder {
	/// Sets the API base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = url;

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the sign-in entry point.
	pub fn sign_in_path(mut self, path: impl Into<String>) -> Self {
		self.sign_in_path = path.into();

		self
	}

	/// Sets the front-end origin.
	pub fn frontend_url(mut self, url: Url) -> Self {
		self.frontend_url = url;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigBuildError> {
		let mut base_url = self.base_url;

		if base_url.cannot_be_a_base() {
			return Err(ConfigBuildError::BaseUrlCannotBeABase { url: base_url.to_string() });
		}
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}
		if Url::parse(&self.refresh_path).is_ok() || self.refresh_path.starts_with("//") {
			return Err(ConfigBuildError::AbsoluteRefreshPath { path: self.refresh_path });
		}

		Ok(ClientConfig {
			base_url,
			refresh_path: self.refresh_path,
			sign_in_path: self.sign_in_path,
			frontend_url: self.frontend_url,
		})
	}
}
impl Default for ClientConfigBuilder {
	fn default() -> Self {
		let defaults = ClientConfig::default();

		Self {
			base_url: defaults.base_url,
			refresh_path: defaults.refresh_path,
			sign_in_path: defaults.sign_in_path,
			frontend_url: defaults.frontend_url,
		}
	}
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigBuildError> {
	Url::parse(raw.trim()).map_err(|e| ConfigBuildError::InvalidBaseUrl {
		url: raw.to_owned(),
		reason: e.to_string(),
	})
}

fn is_dot_segment(segment: &str) -> bool {
	let segment = segment.to_ascii_lowercase().replace("%2e", ".");

	segment == "." || segment == ".."
}

fn default_url(raw: &'static str) -> Url {
	// The defaults are compile-time constants known to parse.
	Url::parse(raw).unwrap_or_else(|e| panic!("Default URL `{raw}` failed to parse: {e}"))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_point_at_local_backend() {
		let config = ClientConfig::default();

		assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8000/api/");
		assert_eq!(
			config.refresh_url().expect("Default refresh URL should resolve.").as_str(),
			"http://127.0.0.1:8000/api/auth/token/refresh/"
		);
		assert_eq!(config.sign_in_path, "/login");
	}

	#[test]
	fn builder_appends_trailing_slash() {
		let config = ClientConfig::builder()
			.base_url(Url::parse("https://market.example.com/api").expect("URL should parse."))
			.build()
			.expect("Config should build.");

		assert_eq!(config.base_url.as_str(), "https://market.example.com/api/");
		assert_eq!(
			config.endpoint("/gigs/").expect("Endpoint should resolve.").as_str(),
			"https://market.example.com/api/gigs/"
		);
	}

	#[test]
	fn endpoints_never_leave_the_base_url() {
		let config = ClientConfig::builder()
			.base_url(Url::parse("https://market.example.com/api/").expect("URL should parse."))
			.build()
			.expect("Config should build.");

		for path in [
			"https://attacker.example/collect",
			"\\\\attacker.example/collect",
			"gigs/../../admin/",
			"orders/%2E%2E/users/",
			"..",
		] {
			let err = config.endpoint(path).expect_err("Escaping paths should be rejected.");

			assert!(matches!(err, ConfigError::PathOutsideBase { .. }), "{path}: {err:?}");
		}

		assert_eq!(
			config.endpoint("gigs/logo..design/").expect("Endpoint should resolve.").as_str(),
			"https://market.example.com/api/gigs/logo..design/"
		);
	}

	#[test]
	fn builder_rejects_absolute_refresh_path() {
		let err = ClientConfig::builder()
			.refresh_path("https://evil.example.com/refresh/")
			.build()
			.expect_err("Absolute refresh paths should be rejected.");

		assert!(matches!(err, ConfigBuildError::AbsoluteRefreshPath { .. }));
	}

	#[test]
	fn builder_rejects_non_base_urls() {
		let err = ClientConfig::builder()
			.base_url(Url::parse("mailto:ops@example.com").expect("URL should parse."))
			.build()
			.expect_err("Non-base URLs should be rejected.");

		assert!(matches!(err, ConfigBuildError::BaseUrlCannotBeABase { .. }));
	}

	#[test]
	fn frontend_pages_resolve_under_origin() {
		let config = ClientConfig::default();

		assert_eq!(
			config.frontend_page("/payment-cancel").expect("Page should resolve.").as_str(),
			"http://localhost:5173/payment-cancel"
		);
	}
}
