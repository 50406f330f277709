use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatStatus {
    Open,
    InProgress,
    PendingAgent,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sender {
    Client,
    Agent,
    Bot,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            sender,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A support conversation between a customer and either the bot or an agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatSession {
    pub id: String,
    pub user_id: String,
    pub status: ChatStatus,
    pub agent_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn is_closed(&self) -> bool {
        self.status == ChatStatus::Closed
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatStart {
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRequest {
    pub content: String,
}

/// The reply chosen by a response strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub sender: Sender,
    pub content: String,
    pub agent_id: Option<String>,
    /// Set when support hours are open but nobody could take the chat.
    pub awaiting_agent: bool,
}
