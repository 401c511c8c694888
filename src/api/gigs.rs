//! Gig listings. Listing and detail reads are public; writes require a seller session and send
//! multipart forms so images can ride along with the fields.

// self
use crate::{
	_prelude::*,
	api,
	client::ApiClient,
	http::{ApiRequest, ApiTransport, MultipartForm},
};

const GIGS: &str = "gigs";

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists gigs. `params` are forwarded as query pairs (search, category, page, ...).
	pub async fn list_gigs<R>(&self, params: &[(&str, &str)]) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let request = params
			.iter()
			.fold(ApiRequest::get("gigs/"), |request, (key, value)| request.query(*key, value));

		self.send_json(request).await
	}

	/// Fetches one gig by slug.
	pub async fn get_gig<R>(&self, slug: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get(api::item_path(GIGS, slug))).await
	}

	/// Creates a gig from a multipart form.
	pub async fn create_gig<R>(&self, form: MultipartForm) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::post("gigs/").multipart(form)).await
	}

	/// Partially updates a gig.
	pub async fn update_gig<R>(&self, slug: &str, form: MultipartForm) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::patch(api::item_path(GIGS, slug)).multipart(form)).await
	}

	/// Deletes a gig.
	pub async fn delete_gig(&self, slug: &str) -> Result<()> {
		self.send_empty(ApiRequest::delete(api::item_path(GIGS, slug))).await
	}

	/// Attaches an extra image to a gig.
	pub async fn upload_gig_image<R>(&self, slug: &str, form: MultipartForm) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::post(api::action_path(GIGS, slug, "upload_image")).multipart(form))
			.await
	}

	/// Lists the gigs published by one seller.
	pub async fn list_gigs_by_seller<R>(&self, seller_id: u64) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get(api::item_path("gigs/by-seller", seller_id))).await
	}
}
