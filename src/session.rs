//! Session-domain models: persisted keys, redacted token secrets, token pairs, and the signed-in
//! user's profile hints.

pub mod key;
pub mod profile;
pub mod secret;

pub use key::*;
pub use profile::*;
pub use secret::*;

// self
use crate::_prelude::*;

/// Access/refresh credential pair as issued by the login endpoint.
///
/// The refresh endpoint answers with only `access`, so `refresh` is optional on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	/// Short-lived bearer credential.
	pub access: TokenSecret,
	/// Longer-lived credential exchanged for new access tokens.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh: Option<TokenSecret>,
}
impl TokenPair {
	/// Builds a pair from raw strings.
	pub fn new(access: impl Into<String>, refresh: Option<impl Into<String>>) -> Self {
		Self { access: TokenSecret::new(access), refresh: refresh.map(TokenSecret::new) }
	}
}
