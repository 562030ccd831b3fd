//! Session client seam used by the request handler

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Chat;

/// Operations the relay needs from an authenticated messaging session
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Snapshot of all conversations visible to the session
    async fn chats(&self) -> Result<Vec<Chat>>;

    /// Send a text message to a chat by its serialized id
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()>;
}

/// First group chat whose name equals `name` exactly
///
/// Non-group chats never match, even with an identical name.
pub fn find_group<'a>(chats: &'a [Chat], name: &str) -> Option<&'a Chat> {
    chats
        .iter()
        .find(|chat| chat.is_group && chat.name.as_deref() == Some(name))
}
