//! Hook invoked when the session can no longer be recovered and the user has to sign in again.

// self
use crate::_prelude::*;

/// Why the client is sending the caller back to the sign-in entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignInReason {
	/// A request was rejected and no refresh token is stored.
	MissingRefreshToken,
	/// The refresh call failed; stored credentials were cleared.
	RefreshRejected,
}
impl SignInReason {
	/// Returns a stable label suitable for log or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::MissingRefreshToken => "missing_refresh_token",
			Self::RefreshRejected => "refresh_rejected",
		}
	}
}
impl Display for SignInReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Receives sign-in redirects from the client.
///
/// A GUI navigates to `sign_in_path`; a CLI prints a prompt; a service flags the session. The
/// client still fails the request with [`Error::Unauthenticated`] or
/// [`Error::RefreshFailed`], so the hook is for side effects only.
pub trait SignInRedirect
where
	Self: Send + Sync,
{
	/// Called once per unrecoverable authentication failure.
	fn redirect(&self, sign_in_path: &str, reason: SignInReason);
}
impl<F> SignInRedirect for F
where
	F: Fn(&str, SignInReason) + Send + Sync,
{
	fn redirect(&self, sign_in_path: &str, reason: SignInReason) {
		self(sign_in_path, reason)
	}
}

/// Redirect hook that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRedirect;
impl SignInRedirect for NoopRedirect {
	fn redirect(&self, _sign_in_path: &str, _reason: SignInReason) {}
}

/// Redirect hook that records every redirect, for headless callers and tests.
#[derive(Debug, Default)]
pub struct RecordingRedirect(Mutex<Vec<(String, SignInReason)>>);
impl RecordingRedirect {
	/// Returns every recorded `(sign_in_path, reason)` pair in order.
	pub fn redirects(&self) -> Vec<(String, SignInReason)> {
		self.0.lock().clone()
	}

	/// Number of redirects recorded so far.
	pub fn count(&self) -> usize {
		self.0.lock().len()
	}
}
impl SignInRedirect for RecordingRedirect {
	fn redirect(&self, sign_in_path: &str, reason: SignInReason) {
		self.0.lock().push((sign_in_path.to_owned(), reason));
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	#[test]
	fn closures_act_as_redirect_hooks() {
		let calls = Arc::new(AtomicUsize::new(0));
		let seen = calls.clone();
		let hook = move |path: &str, reason: SignInReason| {
			assert_eq!(path, "/login");
			assert_eq!(reason, SignInReason::RefreshRejected);
			seen.fetch_add(1, Ordering::SeqCst);
		};

		hook.redirect("/login", SignInReason::RefreshRejected);

		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn recording_redirect_keeps_order() {
		let hook = RecordingRedirect::default();

		hook.redirect("/login", SignInReason::MissingRefreshToken);
		hook.redirect("/login", SignInReason::RefreshRejected);

		assert_eq!(
			hook.redirects(),
			vec![
				("/login".to_owned(), SignInReason::MissingRefreshToken),
				("/login".to_owned(), SignInReason::RefreshRejected),
			]
		);
	}
}
