//! Singleflight coordination for token refreshes.
//!
//! [`RefreshCoordinator`] owns the "refresh in flight" state that every request hitting a 401
//! consults. The first caller starts a flight; everyone arriving while it runs awaits the same
//! shared future and observes the same settled outcome, whether that is a fresh access token or
//! the failure. The slot is cleared as soon as the flight settles, so the next 401 after that
//! starts a new flight.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use futures::future::{BoxFuture, FutureExt, Shared};
// self
use crate::{_prelude::*, error::RefreshFailure, session::TokenSecret, store::StoreError};

/// Settled result of a refresh flight, cloned to every waiter.
pub type RefreshOutcome = Result<TokenSecret, RefreshError>;

/// Why a refresh flight did not produce a token.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// No refresh token was stored, so no refresh call was made.
	#[error("No refresh token is stored.")]
	MissingRefreshToken,
	/// The refresh call was made and failed.
	#[error(transparent)]
	Failed(RefreshFailure),
	/// The session store could not be read or written; the server-side session is unaffected.
	#[error(transparent)]
	Storage(StoreError),
}
impl From<RefreshError> for Error {
	fn from(err: RefreshError) -> Self {
		match err {
			RefreshError::MissingRefreshToken => Error::Unauthenticated,
			RefreshError::Failed(failure) => Error::RefreshFailed(failure),
			RefreshError::Storage(err) => Error::Storage(err),
		}
	}
}

type Flight = Shared<BoxFuture<'static, RefreshOutcome>>;

#[derive(Default)]
struct FlightSlot {
	next_id: u64,
	current: Option<(u64, Flight)>,
}

/// Owns the in-flight refresh and broadcasts its outcome to every waiter.
///
/// A coordinator is injected into each [`ApiClient`](crate::client::ApiClient); clients that
/// share a session store should share a coordinator too, otherwise they may refresh in parallel.
#[derive(Default)]
pub struct RefreshCoordinator {
	slot: Mutex<FlightSlot>,
	metrics: RefreshMetrics,
}
impl RefreshCoordinator {
	/// Creates an idle coordinator.
	pub fn new() -> Self {
		Self::default()
	}

	/// Joins the in-flight refresh, or starts one with `start` if none is running.
	///
	/// `start` is only invoked when this call becomes the leader; its future is driven by whichever
	/// waiter polls the shared flight, so dropping the leader does not strand the others.
	pub async fn run<F, Fut>(&self, start: F) -> RefreshOutcome
	where
		F: FnOnce() -> Fut,
		Fut: 'static + Send + Future<Output = RefreshOutcome>,
	{
		let (id, flight) = {
			let mut slot = self.slot.lock();

			match slot.current.as_ref() {
				Some((id, flight)) => {
					self.metrics.record_joined();

					(*id, flight.clone())
				},
				None => {
					let id = slot.next_id;
					let flight = start().boxed().shared();

					slot.next_id += 1;
					slot.current = Some((id, flight.clone()));
					self.metrics.record_attempt();

					(id, flight)
				},
			}
		};
		let outcome = flight.await;

		self.settle(id, &outcome);

		outcome
	}

	/// Returns `true` while a refresh flight is stored.
	pub fn is_refreshing(&self) -> bool {
		self.slot.lock().current.is_some()
	}

	/// Counters for flights started, joined, and settled.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	// The first waiter to observe the settled flight clears the slot and records the outcome;
	// later waiters find a different (or no) flight and leave it alone.
	fn settle(&self, id: u64, outcome: &RefreshOutcome) {
		let mut slot = self.slot.lock();

		if slot.current.as_ref().is_some_and(|(current, _)| *current == id) {
			slot.current = None;

			match outcome {
				Ok(_) => self.metrics.record_success(),
				Err(_) => self.metrics.record_failure(),
			}
		}
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("refreshing", &self.is_refreshing())
			.field("metrics", &self.metrics)
			.finish()
	}
}
