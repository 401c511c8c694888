//! Transport primitives for marketplace API calls.
//!
//! The module exposes [`ApiTransport`] alongside the owned [`ApiRequest`] and [`ApiResponse`]
//! values so downstream crates can plug in custom HTTP stacks without losing the client's
//! refresh-and-replay behavior. Requests are plain data: the client clones them before each
//! attempt, which is what makes a 401 replay possible after the credential changes.

// crates.io
use ::http::{
	HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::{ConfigError, TransportError},
	session::TokenSecret,
};

/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing marketplace API requests.
///
/// The trait is the client's only dependency on an HTTP implementation. Implementations receive a
/// fully resolved URL (base URL, path, and query already joined) together with the request and
/// must return the raw response for every status code; status handling, including the 401
/// recovery path, happens in [`ApiClient`](crate::client::ApiClient). Only connection-level
/// failures should surface as errors.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` against `url`.
	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_>;
}

/// Owned description of an API call that can be replayed.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the configured base URL.
	pub path: String,
	/// Query string pairs appended in order.
	pub query: Vec<(String, String)>,
	/// Request headers.
	pub headers: HeaderMap,
	/// Request body.
	pub body: RequestBody,
	/// Set once the request has been replayed after a 401; a retried request is never
	/// replayed again.
	pub retried: bool,
}
impl ApiRequest {
	/// Creates a request for `method` + `path` with no body.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			headers: HeaderMap::new(),
			body: RequestBody::Empty,
			retried: false,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::PATCH, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Appends a query pair.
	pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.query.push((key.into(), value.to_string()));

		self
	}

	/// Sets a header, replacing any previous values for the same name.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Serializes `body` as the JSON payload.
	pub fn json<T>(mut self, body: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let bytes = serde_json::to_vec(body).map_err(ConfigError::Encode)?;

		self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		self.body = RequestBody::Json(bytes);

		Ok(self)
	}

	/// Uses a multipart form as the payload.
	pub fn multipart(mut self, form: MultipartForm) -> Self {
		// The transport sets the boundary-bearing content type itself.
		self.headers.remove(CONTENT_TYPE);
		self.body = RequestBody::Multipart(form);

		self
	}

	/// Sets the `Authorization: Bearer` header, replacing any previous credential so the token
	/// is present exactly once.
	pub fn set_bearer(&mut self, token: &TokenSecret) -> Result<()> {
		let mut value = HeaderValue::from_str(&token.bearer())
			.map_err(|_| ConfigError::InvalidHeader { name: AUTHORIZATION.to_string() })?;

		value.set_sensitive(true);
		self.headers.insert(AUTHORIZATION, value);

		Ok(())
	}

	/// Returns the bearer token carried by the request, if any.
	pub fn bearer_token(&self) -> Option<&str> {
		self.headers.get(AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
	}

	/// Resolves the request path and query against the configured base URL.
	pub fn resolve(&self, config: &ClientConfig) -> Result<Url> {
		let mut url = config.endpoint(&self.path)?;

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(self.query.iter());
		}

		Ok(url)
	}
}

/// Payload carried by an [`ApiRequest`].
#[derive(Clone, Debug, Default)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// Pre-encoded JSON bytes.
	Json(Vec<u8>),
	/// Multipart form, rebuilt by the transport on every attempt.
	Multipart(MultipartForm),
}

/// Cloneable multipart form description used for gig image uploads.
#[derive(Clone, Debug, Default)]
pub struct MultipartForm {
	/// Ordered `(field name, part)` entries.
	pub parts: Vec<(String, FormPart)>,
}
impl MultipartForm {
	/// Creates an empty form.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a text field.
	pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.parts.push((name.into(), FormPart::Text(value.into())));

		self
	}

	/// Adds a file field.
	pub fn file(
		mut self,
		name: impl Into<String>,
		file_name: impl Into<String>,
		mime: Option<&str>,
		bytes: Vec<u8>,
	) -> Self {
		self.parts.push((
			name.into(),
			FormPart::File { file_name: file_name.into(), mime: mime.map(Into::into), bytes },
		));

		self
	}
}

/// Single multipart field.
#[derive(Clone, PartialEq, Eq)]
pub enum FormPart {
	/// Plain text field.
	Text(String),
	/// File upload.
	File {
		/// File name reported to the server.
		file_name: String,
		/// Optional MIME type (e.g. `image/png`).
		mime: Option<String>,
		/// File contents.
		bytes: Vec<u8>,
	},
}
impl Debug for FormPart {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Text(value) => f.debug_tuple("Text").field(value).finish(),
			Self::File { file_name, mime, bytes } => f
				.debug_struct("File")
				.field("file_name", file_name)
				.field("mime", mime)
				.field("len", &bytes.len())
				.finish(),
		}
	}
}

/// Raw API response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response from its parts.
	pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
		Self { status, headers, body }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Returns `true` when the server rejected the credential (HTTP 401).
	pub fn is_unauthorized(&self) -> bool {
		self.status == StatusCode::UNAUTHORIZED
	}

	/// Body decoded lossily as UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Retry-After hint expressed as a relative duration.
	pub fn retry_after(&self) -> Option<Duration> {
		parse_retry_after(&self.headers)
	}

	/// Converts non-2xx responses into [`Error::Status`].
	pub fn error_for_status(self) -> Result<Self> {
		if self.is_success() {
			Ok(self)
		} else {
			Err(Error::Status {
				status: self.status.as_u16(),
				retry_after: self.retry_after(),
				body: self.text(),
			})
		}
	}

	/// Decodes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		// Empty bodies (204) decode as JSON `null` so `()` and `Option<_>` targets succeed.
		let body: &[u8] = if self.body.is_empty() { b"null" } else { &self.body };
		let mut de = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| Error::Decode { source, status: self.status.as_u16() })
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a client that never follows redirects, so bearer credentials are only ever sent to
	/// the configured API origin.
	pub fn new() -> Result<Self, ConfigError> {
		let client =
			ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let mut builder = self.0.request(request.method, url).headers(request.headers);

			builder = match request.body {
				RequestBody::Empty => builder,
				RequestBody::Json(bytes) => builder.body(bytes),
				RequestBody::Multipart(form) => builder.multipart(reqwest_form(form)?),
			};

			let response = builder.send().await.map_err(map_reqwest_error)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

			Ok(ApiResponse::new(status, headers, body))
		})
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_form(form: MultipartForm) -> Result<reqwest::multipart::Form> {
	use reqwest::multipart::{Form, Part};

	let mut out = Form::new();

	for (name, part) in form.parts {
		out = match part {
			FormPart::Text(value) => out.text(name, value),
			FormPart::File { file_name, mime, bytes } => {
				let mut part = Part::bytes(bytes).file_name(file_name);

				if let Some(mime) = mime {
					part = part.mime_str(&mime).map_err(ConfigError::from)?;
				}

				out.part(name, part)
			},
		};
	}

	Ok(out)
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::from(err).into()
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(i64::try_from(secs).map_or(Duration::MAX, Duration::seconds));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> ApiResponse {
		ApiResponse::new(
			StatusCode::from_u16(status).expect("Fixture status should be valid."),
			HeaderMap::new(),
			body.as_bytes().to_vec(),
		)
	}

	#[test]
	fn set_bearer_replaces_existing_credential() {
		let mut request = ApiRequest::get("orders/");

		request.set_bearer(&TokenSecret::new("A1")).expect("Bearer should be valid.");
		request.set_bearer(&TokenSecret::new("A2")).expect("Bearer should be valid.");

		assert_eq!(request.headers.get_all(AUTHORIZATION).iter().count(), 1);
		assert_eq!(request.bearer_token(), Some("A2"));
	}

	#[test]
	fn set_bearer_rejects_header_breaking_tokens() {
		let mut request = ApiRequest::get("orders/");
		let err = request
			.set_bearer(&TokenSecret::new("bad\ntoken"))
			.expect_err("Newlines must not reach the wire.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidHeader { .. })));
	}

	#[test]
	fn resolve_joins_path_and_query() {
		let config = ClientConfig::default();
		let url = ApiRequest::get("/chat/messages/")
			.query("conversation", 12)
			.resolve(&config)
			.expect("Request should resolve.");

		assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/chat/messages/?conversation=12");
	}

	#[test]
	fn resolve_refuses_foreign_hosts() {
		let mut request = ApiRequest::get("https://attacker.example/collect");

		request.set_bearer(&TokenSecret::new("A1")).expect("Bearer should be valid.");

		let err = request
			.resolve(&ClientConfig::default())
			.expect_err("Absolute URLs must not resolve.");

		assert!(matches!(err, Error::Config(ConfigError::PathOutsideBase { .. })));
	}

	#[test]
	fn json_sets_content_type() {
		let request = ApiRequest::post("auth/login/")
			.json(&serde_json::json!({ "email": "a@b.c" }))
			.expect("Body should encode.");

		assert_eq!(
			request.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
			Some("application/json")
		);
		assert!(matches!(request.body, RequestBody::Json(_)));
	}

	#[test]
	fn error_for_status_keeps_body() {
		let err = response(404, "{\"detail\":\"Not found.\"}")
			.error_for_status()
			.expect_err("404 should become an error.");

		match err {
			Error::Status { status, body, .. } => {
				assert_eq!(status, 404);
				assert!(body.contains("Not found."));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn json_reports_failing_path() {
		#[derive(Debug, Deserialize)]
		struct Token {
			#[allow(dead_code)]
			access: String,
		}

		let err = response(200, "{\"access\":42}")
			.json::<Token>()
			.expect_err("Numeric access token should not decode.");

		match err {
			Error::Decode { source, status } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "access");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn empty_body_decodes_as_unit() {
		response(204, "").json::<()>().expect("Empty body should decode as unit.");
	}

	#[test]
	fn retry_after_seconds_are_parsed() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));

		let response = ApiResponse::new(StatusCode::TOO_MANY_REQUESTS, headers, Vec::new());

		assert_eq!(response.retry_after(), Some(Duration::seconds(7)));
	}

	#[test]
	fn oversized_retry_after_saturates() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("18446744073709551615"));

		let response = ApiResponse::new(StatusCode::SERVICE_UNAVAILABLE, headers, Vec::new());

		assert_eq!(response.retry_after(), Some(Duration::MAX));
	}
}
