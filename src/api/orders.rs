//! Orders placed on gigs and the seller/buyer transitions on them.

// self
use crate::{
	_prelude::*,
	api,
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
};

const ORDERS: &str = "orders";

/// State transition a party can apply to an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderAction {
	/// Seller marks the work delivered.
	Deliver,
	/// Buyer rejects a delivery.
	Reject,
	/// Buyer accepts a delivery.
	Accept,
}
impl OrderAction {
	/// Path segment of the action endpoint.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Deliver => "deliver",
			Self::Reject => "reject",
			Self::Accept => "accept",
		}
	}
}
impl Display for OrderAction {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists the caller's orders (as buyer and seller).
	pub async fn list_orders<R>(&self) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get("orders/")).await
	}

	/// Places an order.
	pub async fn create_order<B, R>(&self, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::post("orders/").json(body)?).await
	}

	/// Applies `action` to order `order_id`.
	pub async fn transition_order<R>(&self, order_id: u64, action: OrderAction) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::post(api::action_path(ORDERS, order_id, action.as_str()))).await
	}

	/// Marks an order delivered.
	pub async fn deliver_order<R>(&self, order_id: u64) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.transition_order(order_id, OrderAction::Deliver).await
	}

	/// Rejects a delivered order.
	pub async fn reject_order<R>(&self, order_id: u64) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.transition_order(order_id, OrderAction::Reject).await
	}

	/// Accepts a delivered order.
	pub async fn accept_order<R>(&self, order_id: u64) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.transition_order(order_id, OrderAction::Accept).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn actions_map_to_endpoint_segments() {
		assert_eq!(api::action_path(ORDERS, 9, OrderAction::Deliver.as_str()), "orders/9/deliver/");
		assert_eq!(OrderAction::Reject.to_string(), "reject");
		assert_eq!(OrderAction::Accept.as_str(), "accept");
	}
}
