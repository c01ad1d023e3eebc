//! Chat channel handle created alongside each game.
//!
//! The core only creates the channel and posts system announcements into it;
//! routing messages between clients is the messaging collaborator's concern.

use std::time::SystemTime;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::state::UserId;

/// Buffered messages kept for slow subscribers before they start lagging.
const CHANNEL_CAPACITY: usize = 64;

/// A single chat message flowing through a game's channel.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Who produced the message.
    pub sender: ChatSender,
    /// Message body.
    pub text: String,
    /// When the message was posted.
    pub sent_at: SystemTime,
}

/// Origin of a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatSender {
    /// Announcement posted by the game itself.
    System,
    /// Message posted by an enrolled player.
    Player(UserId),
}

/// Broadcast handle for one game's chat channel.
#[derive(Debug, Clone)]
pub struct MessageChannel {
    id: Uuid,
    tx: broadcast::Sender<ChatMessage>,
}

impl MessageChannel {
    /// Create a fresh channel with a unique identifier.
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            id: Uuid::new_v4(),
            tx,
        }
    }

    /// Stable identifier handed to the messaging collaborator.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Subscribe to the channel's message stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.tx.subscribe()
    }

    /// Post a system announcement. Dropped silently when nobody listens.
    pub fn announce(&self, text: impl Into<String>) {
        let _ = self.tx.send(ChatMessage {
            sender: ChatSender::System,
            text: text.into(),
            sent_at: SystemTime::now(),
        });
    }
}

impl Default for MessageChannel {
    fn default() -> Self {
        Self::new()
    }
}
