use crate::actor_framework::Entity;
use crate::domain::{ChatMessage, ChatSession, ChatStart, ChatStatus};
use super::ChatError;
use chrono::Utc;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Post(ChatMessage),
    /// Posts a response and records who handles the session, in one step.
    Reply {
        message: ChatMessage,
        agent_id: Option<String>,
        awaiting_agent: bool,
    },
    Close,
}

impl Entity for ChatSession {
    type Id = String;
    type CreateParams = ChatStart;
    type Patch = ();
    type Action = SessionAction;
    type ActionResult = ChatSession;
    type Error = ChatError;

    const KIND: &'static str = "chat session";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: ChatStart) -> Result<Self, ChatError> {
        let user_id = params.user_id.trim();
        if user_id.is_empty() {
            return Err(ChatError::ValidationError("user_id is required".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            user_id: user_id.to_string(),
            status: ChatStatus::Open,
            agent_id: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), ChatError> {
        Ok(())
    }

    /// Closed sessions accept nothing.
    fn handle_action(&mut self, action: SessionAction) -> Result<ChatSession, ChatError> {
        if self.is_closed() {
            return Err(ChatError::SessionClosed(self.id.clone()));
        }
        match action {
            SessionAction::Post(message) => self.messages.push(message),
            SessionAction::Reply {
                message,
                agent_id,
                awaiting_agent,
            } => {
                if let Some(agent_id) = agent_id {
                    self.agent_id = Some(agent_id);
                    self.status = ChatStatus::InProgress;
                } else if awaiting_agent && self.agent_id.is_none() {
                    self.status = ChatStatus::PendingAgent;
                }
                self.messages.push(message);
            }
            SessionAction::Close => self.status = ChatStatus::Closed,
        }
        self.updated_at = Utc::now();
        Ok(self.clone())
    }

    /// One live session per user.
    fn check_conflict(&self, other: &Self) -> Result<(), ChatError> {
        if self.user_id == other.user_id && !self.is_closed() && !other.is_closed() {
            return Err(ChatError::SessionExists(other.id.clone()));
        }
        Ok(())
    }
}
