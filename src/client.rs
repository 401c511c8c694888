//! Authenticated API client with transparent 401 recovery.
//!
//! [`ApiClient::send`] attaches the stored access token to every request. When the API answers
//! 401 the client marks the request retried, obtains a fresh access token through the shared
//! [`RefreshCoordinator`] (one refresh call no matter how many requests failed at once), and
//! replays the request with the new credential. A retried request is never replayed twice.

mod redirect;

pub use redirect::*;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::{ConfigError, RefreshFailure},
	http::{ApiRequest, ApiResponse, ApiTransport},
	obs::{self, EventLevel, FlowKind, FlowOutcome, FlowSpan},
	refresh::{RefreshCoordinator, RefreshError, RefreshOutcome},
	session::{TokenPair, TokenSecret},
	store::SessionStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Marketplace API client.
///
/// The client owns the transport, session store, refresh coordinator, and sign-in redirect hook
/// behind `Arc`s, so clones are cheap and share all of them.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Validated configuration.
	pub config: Arc<ClientConfig>,
	/// HTTP transport used for every outbound request, including refresh calls.
	pub transport: Arc<T>,
	/// Persisted session record.
	pub store: Arc<dyn SessionStore>,
	/// Singleflight refresh state.
	pub coordinator: Arc<RefreshCoordinator>,
	/// Hook invoked when the user must sign in again.
	pub redirect: Arc<dyn SignInRedirect>,
	pub(crate) session_guard: Arc<AsyncMutex<()>>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client around a caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		transport: impl Into<Arc<T>>,
		store: Arc<dyn SessionStore>,
	) -> Self {
		Self {
			config: Arc::new(config),
			transport: transport.into(),
			store,
			coordinator: Default::default(),
			redirect: Arc::new(NoopRedirect),
			session_guard: Default::default(),
		}
	}

	/// Replaces the sign-in redirect hook.
	pub fn with_redirect(mut self, redirect: Arc<dyn SignInRedirect>) -> Self {
		self.redirect = redirect;

		self
	}

	/// Shares a refresh coordinator with other clients that use the same session store.
	pub fn with_coordinator(mut self, coordinator: Arc<RefreshCoordinator>) -> Self {
		self.coordinator = coordinator;

		self
	}

	/// Sends a request with the stored bearer credential, recovering once from a 401.
	///
	/// Returns the raw response for every status; use [`ApiClient::send_json`] or
	/// [`ApiClient::send_empty`] to turn non-success statuses into [`Error::Status`].
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Send;

		let span = FlowSpan::new(KIND, "send");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.send_with_recovery(request)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Sends a request and decodes a successful JSON body.
	pub async fn send_json<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send(request).await?.error_for_status()?.json()
	}

	/// Sends a request and discards a successful body.
	pub async fn send_empty(&self, request: ApiRequest) -> Result<()> {
		self.send(request).await?.error_for_status()?;

		Ok(())
	}

	/// Sends a request without a credential and without 401 recovery.
	///
	/// Used for the anonymous auth endpoints (login, registration, password reset), where a 401
	/// means bad input rather than an expired session.
	pub async fn send_anonymous(&self, request: ApiRequest) -> Result<ApiResponse> {
		let span = FlowSpan::new(FlowKind::Session, "send_anonymous");

		span.instrument(self.dispatch(&request)).await
	}

	async fn send_with_recovery(&self, mut request: ApiRequest) -> Result<ApiResponse> {
		let sent_with = <dyn SessionStore>::access_token(self.store.as_ref()).await?;

		if let Some(token) = &sent_with {
			request.set_bearer(token)?;
		}

		let response = self.dispatch(&request).await?;

		if !response.is_unauthorized() || request.retried {
			return Ok(response);
		}

		request.retried = true;

		let token = self.recover(sent_with.as_ref()).await?;

		request.set_bearer(&token)?;

		let span = FlowSpan::new(FlowKind::Replay, "replay_after_refresh");
		let replayed = span.instrument(self.dispatch(&request)).await;

		match &replayed {
			Ok(_) => obs::record_flow_outcome(FlowKind::Replay, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(FlowKind::Replay, FlowOutcome::Failure),
		}

		replayed
	}

	/// Exchanges the stored refresh token for a new access token, joining any refresh already in
	/// flight.
	pub async fn refresh_access(&self) -> Result<TokenSecret> {
		let leader = self.clone();

		self.coordinator.run(move || leader.refresh_access_token()).await.map_err(Error::from)
	}

	/// Produces the credential a rejected request should be replayed with.
	async fn recover(&self, sent_with: Option<&TokenSecret>) -> Result<TokenSecret> {
		// Another request may already have refreshed between our send and the 401.
		match <dyn SessionStore>::access_token(self.store.as_ref()).await? {
			Some(current) if Some(&current) != sent_with => {
				obs::flow_event(
					FlowKind::Replay,
					EventLevel::Debug,
					"Access token changed while the request was in flight; replaying without refresh.",
				);

				return Ok(current);
			},
			_ => {},
		}

		self.refresh_access().await
	}

	/// Performs one refresh call. Runs as the body of a coordinator flight, so it owns its client.
	async fn refresh_access_token(self) -> RefreshOutcome {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let outcome = span
			.instrument(async {
				let refresh = match <dyn SessionStore>::refresh_token(self.store.as_ref()).await {
					Ok(Some(refresh)) => refresh,
					Ok(None) => {
						self.redirect_to_sign_in(SignInReason::MissingRefreshToken);

						return Err(RefreshError::MissingRefreshToken);
					},
					Err(err) => return Err(RefreshError::Storage(err)),
				};
				let pair = match self.request_new_access(&refresh).await {
					Ok(pair) => pair,
					Err(err) => {
						let failure = RefreshFailure::from_error(&err);

						if <dyn SessionStore>::clear_credentials(self.store.as_ref()).await.is_err()
						{
							obs::flow_event(
								KIND,
								EventLevel::Warn,
								"Failed to clear credentials after a rejected refresh.",
							);
						}

						self.redirect_to_sign_in(SignInReason::RefreshRejected);

						return Err(RefreshError::Failed(failure));
					},
				};

				<dyn SessionStore>::save_tokens(self.store.as_ref(), &pair)
					.await
					.map_err(RefreshError::Storage)?;

				Ok(pair.access)
			})
			.await;

		match &outcome {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		outcome
	}

	/// Exchanges the refresh token for a new access token. The call bypasses the 401 recovery
	/// path: a rejected refresh is final.
	async fn request_new_access(&self, refresh: &TokenSecret) -> Result<TokenPair> {
		let request = ApiRequest::post(self.config.refresh_path.clone())
			.json(&RefreshBody { refresh: refresh.expose() })?;

		self.dispatch(&request).await?.error_for_status()?.json()
	}

	async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let url = request.resolve(&self.config)?;

		self.transport.execute(url, request.clone()).await
	}

	fn redirect_to_sign_in(&self, reason: SignInReason) {
		obs::record_sign_in_redirect(reason.as_str());
		obs::flow_event(FlowKind::Refresh, EventLevel::Warn, "Session expired; sign-in required.");

		self.redirect.redirect(&self.config.sign_in_path, reason);
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client with the crate's reqwest transport (redirects disabled).
	pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
		Ok(Self::with_transport(config, ReqwestTransport::new()?, store))
	}

	/// Creates a client configured from the environment; see [`ClientConfig::from_env`].
	pub fn from_env(store: Arc<dyn SessionStore>) -> Result<Self> {
		let config = ClientConfig::from_env().map_err(ConfigError::from)?;

		Self::new(config, store)
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			transport: self.transport.clone(),
			store: self.store.clone(),
			coordinator: self.coordinator.clone(),
			redirect: self.redirect.clone(),
			session_guard: self.session_guard.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("coordinator", &self.coordinator)
			.finish()
	}
}

#[derive(Serialize)]
struct RefreshBody<'a> {
	refresh: &'a str,
}
