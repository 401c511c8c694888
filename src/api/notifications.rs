//! In-app notifications.

// self
use crate::{
	_prelude::*,
	api,
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
};

#[derive(Serialize)]
struct ReadFlag {
	is_read: bool,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists the caller's notifications.
	pub async fn list_notifications<R>(&self) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get("notifications/")).await
	}

	/// Marks one notification as read.
	pub async fn mark_notification_read<R>(&self, notification_id: u64) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let request = ApiRequest::patch(api::item_path("notifications", notification_id))
			.json(&ReadFlag { is_read: true })?;

		self.send_json(request).await
	}

	/// Marks every notification as read.
	pub async fn mark_all_notifications_read(&self) -> Result<()> {
		self.send_empty(ApiRequest::post("notifications/mark-all-read/")).await
	}
}
