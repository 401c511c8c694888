//! Gig reviews.

// self
use crate::{
	_prelude::*,
	api,
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Reviews a completed order.
	pub async fn create_review<B, R>(&self, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::post("reviews/").json(body)?).await
	}

	/// Lists the reviews left on a gig.
	pub async fn gig_reviews<R>(&self, slug: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get(api::action_path("gigs", slug, "reviews"))).await
	}

	/// Fetches rating statistics for a gig.
	pub async fn gig_review_stats<R>(&self, slug: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get(api::action_path("gigs", slug, "reviews/stats"))).await
	}

	/// Asks whether the caller may review a gig.
	pub async fn can_review_gig<R>(&self, slug: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get(api::action_path("gigs", slug, "can-review"))).await
	}

	/// Lists the caller's completed orders that still await a review.
	pub async fn reviewable_orders<R>(&self) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get("my-orders/reviewable/")).await
	}

	/// Deletes a review.
	pub async fn delete_review(&self, review_id: u64) -> Result<()> {
		self.send_empty(ApiRequest::delete(api::item_path("reviews", review_id))).await
	}
}
