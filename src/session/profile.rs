//! Signed-in user profile and the hints persisted next to the credentials.

// self
use crate::{_prelude::*, session::SessionKey};

/// Marketplace role the account is currently acting as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// Browses gigs and places orders.
	#[default]
	Buyer,
	/// Publishes gigs and fulfills orders.
	Seller,
}
impl Role {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Buyer => "buyer",
			Self::Seller => "seller",
		}
	}
}
impl Display for Role {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Role {
	type Err = UnknownRole;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"buyer" => Ok(Self::Buyer),
			"seller" => Ok(Self::Seller),
			other => Err(UnknownRole(other.to_owned())),
		}
	}
}

/// Error returned when a stored or received role label is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("`{0}` is not a marketplace role.")]
pub struct UnknownRole(pub String);

/// Profile returned by `auth/me/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
	/// Numeric user identifier.
	pub id: u64,
	/// Display username.
	pub username: String,
	/// Account email, when the server includes it.
	#[serde(default)]
	pub email: Option<String>,
	/// Active role.
	#[serde(default)]
	pub role: Role,
	/// Whether the account may act as a seller.
	#[serde(default)]
	pub is_seller: bool,
}

/// Profile hints persisted in the session store.
///
/// Every field is optional because the hints are written piecemeal: the login flow stores the full
/// set, while role switches and seller upgrades only touch their own entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionHints {
	/// Active role, if known.
	pub role: Option<Role>,
	/// Seller capability flag; absent entries read as `false`.
	pub is_seller: bool,
	/// Display username, if known.
	pub username: Option<String>,
	/// User identifier as persisted (string form).
	pub user_id: Option<String>,
}
impl SessionHints {
	/// Flattens the hints into persisted key/value entries. `None` values are omitted.
	pub fn entries(&self) -> Vec<(SessionKey, String)> {
		let mut entries = Vec::with_capacity(4);

		if let Some(role) = self.role {
			entries.push((SessionKey::Role, role.as_str().to_owned()));
		}

		entries.push((SessionKey::IsSeller, self.is_seller.to_string()));

		if let Some(username) = &self.username {
			entries.push((SessionKey::Username, username.clone()));
		}
		if let Some(user_id) = &self.user_id {
			entries.push((SessionKey::UserId, user_id.clone()));
		}

		entries
	}

	/// Returns `true` when no hint is recorded.
	pub fn is_empty(&self) -> bool {
		self.role.is_none() && !self.is_seller && self.username.is_none() && self.user_id.is_none()
	}
}
impl From<&Profile> for SessionHints {
	fn from(profile: &Profile) -> Self {
		Self {
			role: Some(profile.role),
			is_seller: profile.is_seller,
			username: Some(profile.username.clone()),
			user_id: Some(profile.id.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn profile_defaults_missing_capabilities() {
		let profile: Profile = serde_json::from_str("{\"id\":7,\"username\":\"ada\"}")
			.expect("Minimal profile should deserialize.");

		assert_eq!(profile.role, Role::Buyer);
		assert!(!profile.is_seller);
		assert_eq!(profile.email, None);
	}

	#[test]
	fn hints_flatten_to_persisted_layout() {
		let profile = Profile {
			id: 42,
			username: "grace".into(),
			email: None,
			role: Role::Seller,
			is_seller: true,
		};
		let entries = SessionHints::from(&profile).entries();

		assert_eq!(
			entries,
			vec![
				(SessionKey::Role, "seller".to_owned()),
				(SessionKey::IsSeller, "true".to_owned()),
				(SessionKey::Username, "grace".to_owned()),
				(SessionKey::UserId, "42".to_owned()),
			]
		);
	}

	#[test]
	fn role_labels_parse() {
		assert_eq!("seller".parse::<Role>(), Ok(Role::Seller));
		assert!("admin".parse::<Role>().is_err());
	}
}
