// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"gigmarket_client_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a sign-in redirect labeled by its reason (when enabled).
pub fn record_sign_in_redirect(reason: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("gigmarket_client_sign_in_redirect_total", "reason" => reason)
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_flow_outcome(FlowKind::Send, FlowOutcome::Failure);
		record_sign_in_redirect("missing_refresh_token");
	}
}
