use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::chat_actor::{ChatError, SessionAction};
use crate::domain::{ChatMessage, ChatSession, ChatStart, ChatStatus, Sender};
use crate::events::{DomainEvent, EventBus};
use crate::services::ResponseStrategy;

/// Client for support chat sessions.
#[derive(Clone)]
pub struct ChatClient {
    inner: ResourceClient<ChatSession>,
    strategy: Arc<dyn ResponseStrategy>,
    events: EventBus,
}

impl ChatClient {
    pub fn new(inner: ResourceClient<ChatSession>, strategy: Arc<dyn ResponseStrategy>, events: EventBus) -> Self {
        Self {
            inner,
            strategy,
            events,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    /// Returns the user's live session, opening one if there is none.
    #[instrument(skip(self))]
    pub async fn start_chat(&self, user_id: String) -> Result<ChatSession, ChatError> {
        debug!("Sending request");
        match self.inner.create(ChatStart { user_id }).await {
            Ok(id) => {
                let session = self.get_session(id).await?;
                info!(session_id = %session.id, "Chat started");
                self.events.publish(DomainEvent::ChatStarted {
                    session_id: session.id.clone(),
                    user_id: session.user_id.clone(),
                });
                Ok(session)
            }
            Err(ChatError::SessionExists(existing)) => self.get_session(existing).await,
            Err(e) => Err(e),
        }
    }

    /// Stores the customer's message and the reply picked by the strategy.
    ///
    /// Answers with the reply.
    #[instrument(skip(self))]
    pub async fn send_message(&self, session_id: String, content: &str) -> Result<ChatMessage, ChatError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::ValidationError("Message cannot be empty".into()));
        }
        let session = self
            .inner
            .perform_action(session_id.clone(), SessionAction::Post(ChatMessage::new(Sender::Client, content)))
            .await?;
        self.events.publish(DomainEvent::MessageReceived {
            session_id: session.id.clone(),
            content: content.to_string(),
        });

        let reply = self.strategy.respond(&session, content);
        let message = ChatMessage::new(reply.sender, reply.content);
        let updated = self
            .inner
            .perform_action(
                session_id.clone(),
                SessionAction::Reply {
                    message: message.clone(),
                    agent_id: reply.agent_id.clone(),
                    awaiting_agent: reply.awaiting_agent,
                },
            )
            .await?;
        if updated.agent_id != session.agent_id {
            info!(agent_id = ?updated.agent_id, "Agent assigned");
        } else if updated.status == ChatStatus::PendingAgent {
            info!("No agent free, chat is waiting");
        }
        if let (Sender::Agent, Some(agent_id)) = (reply.sender, reply.agent_id) {
            self.events.publish(DomainEvent::AgentResponded { session_id, agent_id });
        }
        Ok(message)
    }

    #[instrument(skip(self))]
    pub async fn end_chat(&self, session_id: String) -> Result<ChatSession, ChatError> {
        let session = self.inner.perform_action(session_id, SessionAction::Close).await?;
        info!(session_id = %session.id, "Chat ended");
        self.events.publish(DomainEvent::ChatEnded {
            session_id: session.id.clone(),
            status: session.status,
        });
        Ok(session)
    }
}

crate::impl_client_methods!(ChatClient, inner => ChatSession, ChatError, session);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::Entity;
    use crate::mock_framework::{create_mock_client, expect_action, spawn_actor};
    use crate::services::{AgentRoster, BotStrategy, FixedClock, HumanAgentStrategy, SupportHours};
    use chrono::NaiveTime;

    fn client(hour: u32, agents: &[&str]) -> ChatClient {
        ChatClient::new(spawn_actor("chat"), strategy(hour, agents), EventBus::new())
    }

    fn strategy(hour: u32, agents: &[&str]) -> Arc<dyn ResponseStrategy> {
        let strategy = HumanAgentStrategy::new(
            SupportHours::from_hours(9, 18),
            Arc::new(FixedClock(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())),
            Arc::new(AgentRoster::new(agents.iter().map(|a| a.to_string()).collect())),
            "Looking into '{content}'",
            BotStrategy::new("We are offline"),
        );
        Arc::new(strategy)
    }

    #[tokio::test]
    async fn test_start_reuses_live_session() {
        let chat = client(10, &["agent_a"]);
        let first = chat.start_chat("user_1".into()).await.unwrap();
        let again = chat.start_chat("user_1".into()).await.unwrap();
        assert_eq!(first.id, again.id);

        chat.end_chat(first.id.clone()).await.unwrap();
        let fresh = chat.start_chat("user_1".into()).await.unwrap();
        assert_ne!(fresh.id, first.id);
    }

    #[tokio::test]
    async fn test_agent_reply_in_hours() {
        let chat = client(10, &["agent_a"]);
        let session = chat.start_chat("user_1".into()).await.unwrap();
        let reply = chat.send_message(session.id.clone(), " late parcel ").await.unwrap();
        assert_eq!(reply.sender, Sender::Agent);
        assert_eq!(reply.content, "Looking into 'late parcel'");

        let session = chat.get_session(session.id).await.unwrap();
        assert_eq!(session.status, ChatStatus::InProgress);
        assert_eq!(session.agent_id.as_deref(), Some("agent_a"));
        let senders: Vec<_> = session.messages.iter().map(|m| m.sender).collect();
        assert_eq!(senders, [Sender::Client, Sender::Agent]);
    }

    #[tokio::test]
    async fn test_bot_reply_out_of_hours() {
        let chat = client(22, &["agent_a"]);
        let session = chat.start_chat("user_1".into()).await.unwrap();
        let reply = chat.send_message(session.id.clone(), "hello").await.unwrap();
        assert_eq!(reply.sender, Sender::Bot);
        assert_eq!(reply.content, "We are offline");
        assert_eq!(chat.get_session(session.id).await.unwrap().status, ChatStatus::Open);
    }

    #[tokio::test]
    async fn test_waits_when_no_agent_is_free() {
        let chat = client(10, &[]);
        let session = chat.start_chat("user_1".into()).await.unwrap();
        chat.send_message(session.id.clone(), "hello").await.unwrap();
        assert_eq!(chat.get_session(session.id).await.unwrap().status, ChatStatus::PendingAgent);
    }

    #[tokio::test]
    async fn test_closed_sessions_reject_messages() {
        let chat = client(10, &["agent_a"]);
        let session = chat.start_chat("user_1".into()).await.unwrap();
        assert!(matches!(
            chat.send_message(session.id.clone(), "   ").await,
            Err(ChatError::ValidationError(_))
        ));
        chat.end_chat(session.id.clone()).await.unwrap();
        assert_eq!(
            chat.send_message(session.id.clone(), "still there?").await,
            Err(ChatError::SessionClosed(session.id.clone()))
        );
        assert!(matches!(chat.end_chat(session.id).await, Err(ChatError::SessionClosed(_))));
    }

    #[tokio::test]
    async fn test_session_closed_mid_reply_is_rejected() {
        let (inner, mut rx) = create_mock_client::<ChatSession>(10);
        let chat = ChatClient::new(inner, strategy(10, &["agent_a"]), EventBus::new());
        let task = tokio::spawn(async move { chat.send_message("chat_1".into(), "hello").await });

        let (id, action, responder) = expect_action(&mut rx).await.expect("Expected customer post");
        assert_eq!(id, "chat_1");
        assert!(matches!(action, SessionAction::Post(_)));
        let open = ChatSession::from_create_params("chat_1".into(), ChatStart { user_id: "user_1".into() }).unwrap();
        responder.send(Ok(open)).unwrap();

        // The session is closed before the reply lands
        let (_, action, responder) = expect_action(&mut rx).await.expect("Expected reply");
        assert!(matches!(
            action,
            SessionAction::Reply { agent_id: Some(ref agent), .. } if agent == "agent_a"
        ));
        responder.send(Err(ChatError::SessionClosed("chat_1".into()))).unwrap();

        assert_eq!(task.await.unwrap(), Err(ChatError::SessionClosed("chat_1".into())));
        assert!(rx.try_recv().is_err());
    }
}
