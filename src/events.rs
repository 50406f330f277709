use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::{ChatStatus, RatingStatus, TransactionStatus};

const DEFAULT_CAPACITY: usize = 128;

/// Something that happened in one app that others may care about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    UserRegistered {
        user_id: String,
        email: String,
    },
    PasswordResetRequested {
        user_id: String,
    },
    PaymentStatusChanged {
        transaction_id: String,
        from: TransactionStatus,
        to: TransactionStatus,
    },
    OrderRated {
        order_id: String,
        customer_id: String,
        stars: u8,
    },
    RatingSkipped {
        order_id: String,
        status: RatingStatus,
    },
    TicketClosed {
        ticket_id: String,
        ticket_number: String,
    },
    ChatStarted {
        session_id: String,
        user_id: String,
    },
    MessageReceived {
        session_id: String,
        content: String,
    },
    AgentResponded {
        session_id: String,
        agent_id: String,
    },
    ChatEnded {
        session_id: String,
        status: ChatStatus,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "user_registered",
            Self::PasswordResetRequested { .. } => "password_reset_requested",
            Self::PaymentStatusChanged { .. } => "payment_status_changed",
            Self::OrderRated { .. } => "order_rated",
            Self::RatingSkipped { .. } => "rating_skipped",
            Self::TicketClosed { .. } => "ticket_closed",
            Self::ChatStarted { .. } => "chat_started",
            Self::MessageReceived { .. } => "message_received",
            Self::AgentResponded { .. } => "agent_responded",
            Self::ChatEnded { .. } => "chat_ended",
        }
    }
}

/// Fan-out channel for [`DomainEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes to every current subscriber. Having none is fine.
    pub fn publish(&self, event: DomainEvent) {
        let name = event.name();
        match self.sender.send(Arc::new(event)) {
            Ok(receivers) => trace!(event = name, receivers, "Event published"),
            Err(_) => trace!(event = name, "Event dropped, no subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
