//! Account endpoints and the session flows built on them.
//!
//! Anonymous endpoints (registration, verification, login, password reset, logout) go out without
//! a credential and bypass 401 recovery. The session flows [`ApiClient::sign_in`],
//! [`ApiClient::sign_out`], [`ApiClient::sync_profile`], [`ApiClient::become_seller`], and
//! [`ApiClient::switch_role`] keep the session store in step with the server and are serialized
//! against each other.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
	obs::{self, EventLevel, FlowKind, FlowOutcome, FlowSpan},
	session::{Profile, Role, SessionHints, SessionKey, TokenPair, TokenSecret},
	store::SessionStore,
};

const REGISTER_PATH: &str = "auth/register/";
const VERIFY_EMAIL_PATH: &str = "auth/verify-email/";
const RESEND_VERIFY_PATH: &str = "auth/resend-verify/";
const LOGIN_PATH: &str = "auth/login/";
const ME_PATH: &str = "auth/me/";
const LOGOUT_PATH: &str = "auth/logout/";
const PASSWORD_RESET_REQUEST_PATH: &str = "auth/password-reset/request/";
const PASSWORD_RESET_CONFIRM_PATH: &str = "auth/password-reset/confirm/";
const BECOME_SELLER_PATH: &str = "auth/become-seller/";
const SWITCH_ROLE_PATH: &str = "auth/switch-role/";

/// Login credentials. Accounts sign in with their email address.
#[derive(Clone, Serialize)]
pub struct Credentials {
	/// Account email.
	pub email: String,
	/// Account password.
	pub password: String,
}
impl Credentials {
	/// Builds credentials from an email/password pair.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: password.into() }
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Body returned by `auth/login/`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
	/// Issued access token.
	pub access: TokenSecret,
	/// Issued refresh token.
	pub refresh: TokenSecret,
	/// Active role at login time.
	#[serde(default)]
	pub role: Option<Role>,
	/// Seller capability at login time.
	#[serde(default)]
	pub is_seller: Option<bool>,
}
impl LoginResponse {
	/// Returns the issued credentials as a pair ready for the session store.
	pub fn tokens(&self) -> TokenPair {
		TokenPair { access: self.access.clone(), refresh: Some(self.refresh.clone()) }
	}
}

/// Generic `{"detail": ...}` acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Detail {
	/// Server-provided message.
	pub detail: String,
}

/// Body of `auth/password-reset/confirm/`.
#[derive(Clone, Serialize)]
pub struct PasswordResetConfirm {
	/// Token from the reset link.
	pub token: String,
	/// Replacement password.
	pub new_password: String,
}
impl Debug for PasswordResetConfirm {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PasswordResetConfirm")
			.field("token", &"<redacted>")
			.field("new_password", &"<redacted>")
			.finish()
	}
}

/// Body returned by `auth/become-seller/`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SellerStatus {
	/// Server-provided message (`seller_enabled` or `already a seller`).
	#[serde(default)]
	pub detail: Option<String>,
	/// Seller capability after the call.
	pub is_seller: bool,
}

#[derive(Serialize, Deserialize)]
struct RoleBody {
	role: Role,
}

#[derive(Serialize)]
struct TokenBody<'a> {
	token: &'a str,
}

#[derive(Serialize)]
struct EmailBody<'a> {
	email: &'a str,
}

#[derive(Serialize)]
struct LogoutBody<'a> {
	refresh: &'a str,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Registers a new account. The body shape is owned by the caller.
	pub async fn register<B, R>(&self, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.anonymous_json(ApiRequest::post(REGISTER_PATH).json(body)?).await
	}

	/// Confirms an email address with the token from the verification link.
	pub async fn verify_email(&self, token: &str) -> Result<Detail> {
		self.anonymous_json(ApiRequest::post(VERIFY_EMAIL_PATH).json(&TokenBody { token })?).await
	}

	/// Asks the server to send a new verification email.
	pub async fn resend_verification(&self, email: &str) -> Result<Detail> {
		self.anonymous_json(ApiRequest::post(RESEND_VERIFY_PATH).json(&EmailBody { email })?).await
	}

	/// Calls `auth/login/` without touching the session store; see [`ApiClient::sign_in`].
	pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
		self.anonymous_json(ApiRequest::post(LOGIN_PATH).json(credentials)?).await
	}

	/// Fetches the signed-in user's profile.
	pub async fn me(&self) -> Result<Profile> {
		self.send_json(ApiRequest::get(ME_PATH)).await
	}

	/// Calls `auth/logout/`, which revokes `refresh` on the server.
	pub async fn logout(&self, refresh: &TokenSecret) -> Result<()> {
		let request =
			ApiRequest::post(LOGOUT_PATH).json(&LogoutBody { refresh: refresh.expose() })?;

		self.send_anonymous(request).await?.error_for_status()?;

		Ok(())
	}

	/// Requests a password reset link for `email`.
	pub async fn request_password_reset(&self, email: &str) -> Result<Detail> {
		self.anonymous_json(ApiRequest::post(PASSWORD_RESET_REQUEST_PATH).json(&EmailBody { email })?)
			.await
	}

	/// Sets a new password using the token from the reset link.
	pub async fn confirm_password_reset(&self, body: &PasswordResetConfirm) -> Result<Detail> {
		self.anonymous_json(ApiRequest::post(PASSWORD_RESET_CONFIRM_PATH).json(body)?).await
	}

	/// Signs in: logs in, persists the issued tokens, then fetches and persists the profile.
	pub async fn sign_in(&self, credentials: &Credentials) -> Result<Profile> {
		const KIND: FlowKind = FlowKind::Session;

		let span = FlowSpan::new(KIND, "sign_in");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let _session = self.session_guard.lock().await;
				let login = self.login(credentials).await?;

				<dyn SessionStore>::save_tokens(self.store.as_ref(), &login.tokens()).await?;

				self.fetch_and_store_profile().await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Signs out: revokes the stored refresh token on a best-effort basis, then clears the whole
	/// session record whether or not the server call succeeded.
	pub async fn sign_out(&self) -> Result<()> {
		let span = FlowSpan::new(FlowKind::Session, "sign_out");

		span.instrument(async {
			let _session = self.session_guard.lock().await;

			if let Some(refresh) = <dyn SessionStore>::refresh_token(self.store.as_ref()).await? {
				let revoked = self.logout(&refresh).await;

				if revoked.is_err() {
					obs::flow_event(
						FlowKind::Session,
						EventLevel::Debug,
						"Logout call failed; clearing the local session anyway.",
					);
				}
			}

			<dyn SessionStore>::clear_all(self.store.as_ref()).await?;

			Ok::<_, Error>(())
		})
		.await
	}

	/// Re-fetches the profile and refreshes the persisted hints.
	pub async fn sync_profile(&self) -> Result<Profile> {
		let span = FlowSpan::new(FlowKind::Session, "sync_profile");

		span.instrument(async {
			let _session = self.session_guard.lock().await;

			self.fetch_and_store_profile().await
		})
		.await
	}

	/// Upgrades the account to a seller and persists the capability.
	pub async fn become_seller(&self) -> Result<SellerStatus> {
		let span = FlowSpan::new(FlowKind::Session, "become_seller");

		span.instrument(async {
			let _session = self.session_guard.lock().await;
			let status: SellerStatus = self.send_json(ApiRequest::post(BECOME_SELLER_PATH)).await?;

			self.store.set(SessionKey::IsSeller, status.is_seller.to_string()).await?;

			Ok::<_, Error>(status)
		})
		.await
	}

	/// Switches the active role and persists it. Non-sellers get HTTP 403 from the server.
	pub async fn switch_role(&self, role: Role) -> Result<Role> {
		let span = FlowSpan::new(FlowKind::Session, "switch_role");

		span.instrument(async {
			let _session = self.session_guard.lock().await;
			let request = ApiRequest::patch(SWITCH_ROLE_PATH).json(&RoleBody { role })?;
			let RoleBody { role } = self.send_json(request).await?;

			self.store.set(SessionKey::Role, role.as_str().to_owned()).await?;

			Ok::<_, Error>(role)
		})
		.await
	}

	/// Reads the profile hints persisted by the last sign-in or profile sync.
	pub async fn session_hints(&self) -> Result<SessionHints> {
		Ok(<dyn SessionStore>::hints(self.store.as_ref()).await?)
	}

	async fn fetch_and_store_profile(&self) -> Result<Profile> {
		let profile = self.me().await?;

		<dyn SessionStore>::save_hints(self.store.as_ref(), &SessionHints::from(&profile)).await?;

		Ok(profile)
	}

	async fn anonymous_json<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_anonymous(request).await?.error_for_status()?.json()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credentials_debug_redacts_password() {
		let credentials = Credentials::new("ada@example.com", "hunter2");
		let rendered = format!("{credentials:?}");

		assert!(rendered.contains("ada@example.com"));
		assert!(!rendered.contains("hunter2"));
	}

	#[test]
	fn login_response_yields_full_token_pair() {
		let response: LoginResponse = serde_json::from_str(
			r#"{"access":"A1","refresh":"R1","role":"seller","is_seller":true}"#,
		)
		.expect("Login response should decode.");

		assert_eq!(response.tokens(), TokenPair::new("A1", Some("R1")));
		assert_eq!(response.role, Some(Role::Seller));
		assert_eq!(response.is_seller, Some(true));
	}

	#[test]
	fn login_response_tolerates_missing_role_hints() {
		let response: LoginResponse = serde_json::from_str(r#"{"access":"A1","refresh":"R1"}"#)
			.expect("Minimal login response should decode.");

		assert_eq!(response.role, None);
		assert_eq!(response.is_seller, None);
	}

	#[test]
	fn seller_status_decodes_without_detail() {
		let status: SellerStatus =
			serde_json::from_str(r#"{"is_seller":true}"#).expect("Seller status should decode.");

		assert!(status.is_seller);
		assert_eq!(status.detail, None);
	}

	#[test]
	fn password_reset_confirm_debug_redacts_both_fields() {
		let body = PasswordResetConfirm {
			token: "reset-token-123".into(),
			new_password: "s3cret!".into(),
		};
		let rendered = format!("{body:?}");

		assert!(!rendered.contains("reset-token-123"));
		assert!(!rendered.contains("s3cret!"));
	}
}
