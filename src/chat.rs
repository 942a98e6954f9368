//! Pickup coordination chat between a recipient and a donor.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::listing::FoodItem;
use crate::new_id;

pub const QUICK_REPLIES: [&str; 5] = [
    "Hi! Is this still available?",
    "I can pick it up in 30 mins.",
    "I'm on my way!",
    "I have arrived.",
    "Thank you so much!",
];

const REQUEST_SENT: &str = "Request sent";
const SYSTEM_SENDER: &str = "system";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub text: String,
    pub timestamp_ms: u64,
    #[serde(default)]
    pub is_system: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub item_id: String,
    pub item_title: String,
    pub item_image: String,
    pub other_user_id: String,
    pub other_user_name: String,
    pub other_user_avatar: String,
    pub messages: Vec<ChatMessage>,
    pub last_message: Option<String>,
    pub last_message_at_ms: Option<u64>,
    pub unread_count: u32,
}

impl ChatSession {
    fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.last_message = Some(message.text.clone());
        self.last_message_at_ms = Some(message.timestamp_ms);
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }
}

/// All chat sessions of one user, most recently opened first.
#[derive(Clone, Debug)]
pub struct Inbox {
    owner_id: String,
    sessions: Vec<ChatSession>,
}

impl Inbox {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            sessions: Vec::new(),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|session| session.id == id)
    }

    pub fn session_for_item(&self, item_id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|session| session.item_id == item_id)
    }

    /// Open the conversation with the donor of `item`, reusing an existing one.
    pub fn open_for_item(&mut self, item: &FoodItem, now_ms: u64) -> &ChatSession {
        if let Some(pos) = self
            .sessions
            .iter()
            .position(|session| session.item_id == item.id)
        {
            return &self.sessions[pos];
        }
        let session = ChatSession {
            id: new_id(),
            item_id: item.id.clone(),
            item_title: item.title.clone(),
            item_image: item.image_url.clone(),
            other_user_id: item.donor_id.clone(),
            other_user_name: item.donor_name.clone(),
            other_user_avatar: item.donor_avatar.clone(),
            messages: Vec::new(),
            last_message: Some(REQUEST_SENT.to_string()),
            last_message_at_ms: Some(now_ms),
            unread_count: 0,
        };
        log::debug!("chat opened for listing {} with {}", item.id, item.donor_id);
        self.sessions.insert(0, session);
        &self.sessions[0]
    }

    /// Send a message as the inbox owner.
    pub fn send(&mut self, session_id: &str, text: &str, now_ms: u64) -> Result<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(anyhow!("message must not be empty"));
        }
        let sender_id = self.owner_id.clone();
        let session = self.session_mut(session_id)?;
        Ok(session.push(ChatMessage {
            id: new_id(),
            sender_id,
            text: text.to_string(),
            timestamp_ms: now_ms,
            is_system: false,
        }))
    }

    /// Record a message from the other participant.
    pub fn receive(
        &mut self,
        session_id: &str,
        sender_id: &str,
        text: &str,
        now_ms: u64,
    ) -> Result<&ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(anyhow!("message must not be empty"));
        }
        let session = self.session_mut(session_id)?;
        if sender_id != session.other_user_id {
            return Err(anyhow!(
                "sender '{}' is not part of session '{}'",
                sender_id,
                session_id
            ));
        }
        session.unread_count += 1;
        Ok(session.push(ChatMessage {
            id: new_id(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            timestamp_ms: now_ms,
            is_system: false,
        }))
    }

    pub fn post_system(&mut self, session_id: &str, text: &str, now_ms: u64) -> Result<&ChatMessage> {
        let session = self.session_mut(session_id)?;
        Ok(session.push(ChatMessage {
            id: new_id(),
            sender_id: SYSTEM_SENDER.to_string(),
            text: text.to_string(),
            timestamp_ms: now_ms,
            is_system: true,
        }))
    }

    pub fn mark_read(&mut self, session_id: &str) -> Result<()> {
        self.session_mut(session_id)?.unread_count = 0;
        Ok(())
    }

    pub fn unread_total(&self) -> u32 {
        self.sessions.iter().map(|session| session.unread_count).sum()
    }

    /// Drop every session (sign-out).
    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    fn session_mut(&mut self, id: &str) -> Result<&mut ChatSession> {
        self.sessions
            .iter_mut()
            .find(|session| session.id == id)
            .ok_or_else(|| anyhow!("unknown chat session '{}'", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn open_reuses_session_per_item() {
        let items = seed::mock_items(NOW);
        let mut inbox = Inbox::new("u1");
        let first = inbox.open_for_item(&items[0], NOW).id.clone();
        let again = inbox.open_for_item(&items[0], NOW + 5).id.clone();
        assert_eq!(first, again);
        assert_eq!(inbox.sessions().len(), 1);

        let other = inbox.open_for_item(&items[1], NOW).id.clone();
        assert_ne!(first, other);
        assert_eq!(inbox.sessions()[0].id, other);

        let session = inbox.session(&first).unwrap();
        assert_eq!(session.other_user_id, "d1");
        assert_eq!(session.item_title, "Homemade Vegetable Lasagna");
        assert_eq!(session.last_message.as_deref(), Some("Request sent"));
        assert_eq!(session.unread_count, 0);
    }

    #[test]
    fn send_appends_and_updates_preview() {
        let items = seed::mock_items(NOW);
        let mut inbox = Inbox::new("u1");
        let id = inbox.open_for_item(&items[0], NOW).id.clone();

        let message = inbox.send(&id, QUICK_REPLIES[0], NOW + 10).unwrap().clone();
        assert_eq!(message.sender_id, "u1");
        assert!(!message.is_system);

        let session = inbox.session(&id).unwrap();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.last_message.as_deref(), Some(QUICK_REPLIES[0]));
        assert_eq!(session.last_message_at_ms, Some(NOW + 10));
    }

    #[test]
    fn rejects_blank_messages_and_unknown_sessions() {
        let items = seed::mock_items(NOW);
        let mut inbox = Inbox::new("u1");
        let id = inbox.open_for_item(&items[0], NOW).id.clone();
        assert!(inbox.send(&id, "   ", NOW).is_err());
        assert!(inbox.send("nope", "hi", NOW).is_err());
        assert!(inbox.session(&id).unwrap().messages.is_empty());
    }

    #[test]
    fn received_messages_count_as_unread() {
        let items = seed::mock_items(NOW);
        let mut inbox = Inbox::new("u1");
        let id = inbox.open_for_item(&items[2], NOW).id.clone();
        inbox.receive(&id, "d3", "Sure, come by", NOW + 1).unwrap();
        inbox.receive(&id, "d3", "I'm home", NOW + 2).unwrap();
        assert!(inbox.receive(&id, "d1", "wrong person", NOW + 3).is_err());
        assert_eq!(inbox.unread_total(), 2);

        inbox.mark_read(&id).unwrap();
        assert_eq!(inbox.unread_total(), 0);
    }

    #[test]
    fn system_notices_and_clear() {
        let items = seed::mock_items(NOW);
        let mut inbox = Inbox::new("u1");
        let id = inbox.open_for_item(&items[0], NOW).id.clone();
        let notice = inbox.post_system(&id, "Listing claimed", NOW).unwrap();
        assert!(notice.is_system);
        assert_eq!(notice.sender_id, "system");

        inbox.clear();
        assert!(inbox.sessions().is_empty());
    }
}
