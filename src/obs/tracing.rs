// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by client flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("gigmarket_client.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Severity of a [`flow_event`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventLevel {
	/// Routine progress (refresh joined, request replayed).
	Debug,
	/// Something the operator should notice (credentials cleared, sign-in required).
	Warn,
}

/// Emits a structured event inside the current span (when tracing is enabled).
pub fn flow_event(kind: FlowKind, level: EventLevel, message: &'static str) {
	#[cfg(feature = "tracing")]
	{
		match level {
			EventLevel::Debug => tracing::debug!(flow = kind.as_str(), "{message}"),
			EventLevel::Warn => tracing::warn!(flow = kind.as_str(), "{message}"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, level, message);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn flow_event_noop_without_subscriber() {
		flow_event(FlowKind::Session, EventLevel::Warn, "credentials cleared");
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::Refresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
