//! Buyer/seller conversations and their messages.

// self
use crate::{
	_prelude::*,
	api,
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
};

const CONVERSATIONS: &str = "chat/conversations";

#[derive(Serialize)]
struct NewConversation<'a> {
	participants: &'a [u64],
}

#[derive(Serialize)]
struct NewMessage<'a> {
	content: &'a str,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists the caller's conversations.
	pub async fn list_conversations<R>(&self) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get("chat/conversations/")).await
	}

	/// Fetches one conversation.
	pub async fn get_conversation<R>(&self, conversation_id: u64) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get(api::item_path(CONVERSATIONS, conversation_id))).await
	}

	/// Opens a conversation with the given participant user ids.
	pub async fn create_conversation<R>(&self, participants: &[u64]) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let request =
			ApiRequest::post("chat/conversations/").json(&NewConversation { participants })?;

		self.send_json(request).await
	}

	/// Deletes a conversation.
	pub async fn delete_conversation(&self, conversation_id: u64) -> Result<()> {
		self.send_empty(ApiRequest::delete(api::item_path(CONVERSATIONS, conversation_id))).await
	}

	/// Lists the messages of one conversation.
	pub async fn list_messages<R>(&self, conversation_id: u64) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get("chat/messages/").query("conversation", conversation_id))
			.await
	}

	/// Posts a message to a conversation.
	pub async fn send_message<R>(&self, conversation_id: u64, content: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let request = ApiRequest::post(api::action_path(CONVERSATIONS, conversation_id, "send_message"))
			.json(&NewMessage { content })?;

		self.send_json(request).await
	}

	/// Marks every message in a conversation as read.
	pub async fn mark_conversation_read(&self, conversation_id: u64) -> Result<()> {
		self.send_empty(ApiRequest::post(api::action_path(
			CONVERSATIONS,
			conversation_id,
			"mark_read",
		)))
		.await
	}

	/// Fetches unread message counts.
	pub async fn unread_counts<R>(&self) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send_json(ApiRequest::get("chat/conversations/unread_count/")).await
	}
}
