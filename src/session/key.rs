//! Keys of the persisted session record.

// self
use crate::_prelude::*;

/// Entry names of the persisted session record.
///
/// The string forms match the key/value layout the marketplace front-end has always used, so a
/// [`FileStore`](crate::store::FileStore) snapshot stays readable by other tooling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionKey {
	/// Short-lived bearer credential.
	#[serde(rename = "access")]
	Access,
	/// Refresh credential.
	#[serde(rename = "refresh")]
	Refresh,
	/// Active role (`buyer` or `seller`).
	#[serde(rename = "role")]
	Role,
	/// Whether the account has seller capability (`"true"`/`"false"`).
	#[serde(rename = "is_seller")]
	IsSeller,
	/// Display username.
	#[serde(rename = "username")]
	Username,
	/// Numeric user identifier, stored as a string.
	#[serde(rename = "userId")]
	UserId,
}
impl SessionKey {
	/// Every key, in a stable order.
	pub const ALL: [SessionKey; 6] =
		[Self::Access, Self::Refresh, Self::Role, Self::IsSeller, Self::Username, Self::UserId];
	/// Keys holding credentials.
	pub const CREDENTIALS: [SessionKey; 2] = [Self::Access, Self::Refresh];

	/// Returns the persisted key name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Access => "access",
			Self::Refresh => "refresh",
			Self::Role => "role",
			Self::IsSeller => "is_seller",
			Self::Username => "username",
			Self::UserId => "userId",
		}
	}
}
impl Display for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for SessionKey {
	type Err = UnknownSessionKey;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|key| key.as_str() == s)
			.ok_or_else(|| UnknownSessionKey(s.to_owned()))
	}
}

/// Error returned when parsing a string that is not a session key.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("`{0}` is not a session key.")]
pub struct UnknownSessionKey(pub String);
