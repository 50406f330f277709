use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{AppConfig, SystemError};
use crate::actor_framework::{Entity, ResourceActor, ResourceClient};
use crate::clients::{
    CatalogClient, ChatClient, CheckoutClient, FeedbackClient, PasswordResetClient, PaymentClient,
    PaymentMethodClient, TicketClient, TrackingClient, UserClient,
};
use crate::domain::{
    Category, ChatSession, Courier, DeliveryOrder, DeliveryRating, OrderComment, PaymentAttempt,
    PaymentMethod, PaymentTransaction, Product, Recipe, Ticket, TrackedOrder, User,
};
use crate::events::EventBus;
use crate::services::{
    AgentDirectory, AgentRoster, BotStrategy, CardGateway, Clock, HumanAgentStrategy, LogMailer,
    Mailer, MockCardGateway, PasswordHashing, ResetTokens, SecureCheckoutGateway,
    SimulatedCheckoutGateway, SupportHours, SystemClock,
};

/// Id generator producing `{prefix}_1`, `{prefix}_2`, ...
pub fn sequential_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || {
        let id = counter.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}_{id}")
    }
}

fn random_ids() -> String {
    Uuid::new_v4().to_string()
}

/// External services the clients talk to. Tests swap these for in-memory fakes.
pub struct Collaborators {
    pub mailer: Arc<dyn Mailer>,
    pub checkout_gateway: Arc<dyn SecureCheckoutGateway>,
    pub card_gateway: Arc<dyn CardGateway>,
    pub clock: Arc<dyn Clock>,
    pub agents: Arc<dyn AgentDirectory>,
    pub hashing: PasswordHashing,
}

impl Collaborators {
    pub fn from_config(config: &AppConfig) -> Result<Self, SystemError> {
        let hashing = PasswordHashing::new(
            config.accounts.hash_memory_kib,
            config.accounts.hash_iterations,
        )
        .map_err(|e| SystemError::InvalidSetting {
            key: "accounts.hash_memory_kib",
            reason: e.to_string(),
        })?;
        Ok(Self {
            mailer: Arc::new(LogMailer),
            checkout_gateway: Arc::new(SimulatedCheckoutGateway::new(
                config.checkout.gateway_url.clone(),
            )),
            card_gateway: Arc::new(MockCardGateway),
            clock: Arc::new(SystemClock),
            agents: Arc::new(AgentRoster::new(config.support.agents.clone())),
            hashing,
        })
    }
}

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct StoreSystem {
    pub users: UserClient,
    pub password_reset: PasswordResetClient,
    pub catalog: CatalogClient,
    pub checkout: CheckoutClient,
    pub payments: PaymentClient,
    pub payment_methods: PaymentMethodClient,
    pub feedback: FeedbackClient,
    pub tickets: TicketClient,
    pub tracking: TrackingClient,
    pub support: ChatClient,
    pub events: EventBus,
    handles: Vec<JoinHandle<()>>,
}

impl StoreSystem {
    pub fn new(config: &AppConfig) -> Result<Self, SystemError> {
        let collaborators = Collaborators::from_config(config)?;
        Ok(Self::with_collaborators(config, collaborators))
    }

    pub fn with_collaborators(config: &AppConfig, collaborators: Collaborators) -> Self {
        let buffer = config.actors.buffer_size;
        let mut handles = Vec::new();

        let events = EventBus::with_capacity(config.actors.event_capacity);
        handles.push(tokio::spawn(log_events(events.clone())));

        // 1. Accounts
        let users = UserClient::new(
            start::<User>(buffer, sequential_ids("user"), &mut handles),
            collaborators.hashing,
            events.clone(),
        );
        let password_reset = PasswordResetClient::new(
            users.clone(),
            ResetTokens::new(
                config.accounts.reset_secret.clone(),
                config.accounts.reset_timeout_secs,
            ),
            collaborators.mailer.clone(),
            config.accounts.site_url.clone(),
            events.clone(),
        );

        // 2. Catalog
        let catalog = CatalogClient::new(
            start::<Category>(buffer, sequential_ids("category"), &mut handles),
            start::<Product>(buffer, sequential_ids("product"), &mut handles),
            start::<Recipe>(buffer, sequential_ids("recipe"), &mut handles),
            config.catalog.page_size,
        );

        // 3. Checkout and payments
        let checkout = CheckoutClient::new(
            start::<PaymentAttempt>(buffer, sequential_ids("attempt"), &mut handles),
            collaborators.checkout_gateway,
            config.checkout.host_url.clone(),
            config.checkout.currency.clone(),
        );
        let payment_methods = PaymentMethodClient::new(start::<PaymentMethod>(
            buffer,
            sequential_ids("method"),
            &mut handles,
        ));
        let payments = PaymentClient::new(
            start::<PaymentTransaction>(buffer, random_ids, &mut handles),
            payment_methods.clone(),
            collaborators.card_gateway,
            events.clone(),
        );

        // 4. Feedback
        let feedback = FeedbackClient::new(
            start::<DeliveryOrder>(buffer, random_ids, &mut handles),
            start::<DeliveryRating>(buffer, sequential_ids("rating"), &mut handles),
            start::<OrderComment>(buffer, sequential_ids("comment"), &mut handles),
            config.rating.clone(),
            events.clone(),
        );

        // 5. Tickets and tracking
        let tickets = TicketClient::new(
            start::<Ticket>(buffer, sequential_ids("ticket"), &mut handles),
            collaborators.mailer,
            events.clone(),
        );
        let tracking = TrackingClient::new(
            start::<Courier>(buffer, sequential_ids("courier"), &mut handles),
            start::<TrackedOrder>(buffer, sequential_ids("shipment"), &mut handles),
        );

        // 6. Support chat
        let strategy = HumanAgentStrategy::new(
            SupportHours::from_hours(config.support.opening_hour, config.support.closing_hour),
            collaborators.clock,
            collaborators.agents,
            config.support.agent_template.clone(),
            BotStrategy::new(config.support.bot_message.clone()),
        );
        let support = ChatClient::new(
            start::<ChatSession>(buffer, random_ids, &mut handles),
            Arc::new(strategy),
            events.clone(),
        );

        info!(actors = handles.len() - 1, "Store system started");
        Self {
            users,
            password_reset,
            catalog,
            checkout,
            payments,
            payment_methods,
            feedback,
            tickets,
            tracking,
            support,
            events,
            handles,
        }
    }

    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        // Actors stop once every client holding their channel is gone.
        drop(self.users);
        drop(self.password_reset);
        drop(self.catalog);
        drop(self.checkout);
        drop(self.payments);
        drop(self.payment_methods);
        drop(self.feedback);
        drop(self.tickets);
        drop(self.tracking);
        drop(self.support);
        drop(self.events);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::ActorTask(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

fn start<T: Entity>(
    buffer: usize,
    next_id: impl Fn() -> T::Id + Send + Sync + 'static,
    handles: &mut Vec<JoinHandle<()>>,
) -> ResourceClient<T> {
    let (actor, client) = ResourceActor::<T>::new(buffer, next_id);
    handles.push(tokio::spawn(actor.run()));
    client
}

async fn log_events(events: EventBus) {
    let mut receiver = events.subscribe();
    drop(events);
    loop {
        match receiver.recv().await {
            Ok(event) => {
                let payload = serde_json::to_string(event.as_ref()).unwrap_or_default();
                info!(event = event.name(), %payload, "Domain event");
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event logger fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let next = sequential_ids("ticket");
        assert_eq!(next(), "ticket_1");
        assert_eq!(next(), "ticket_2");
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let system = StoreSystem::with_collaborators(
            &AppConfig::default(),
            Collaborators {
                hashing: crate::services::fast_hashing(),
                ..Collaborators::from_config(&AppConfig::default()).unwrap()
            },
        );
        let category = system
            .catalog
            .create_category(crate::domain::CategoryCreate { name: "Tools".into() })
            .await
            .unwrap();
        assert_eq!(category.id, "category_1");
        system.shutdown().await.unwrap();
    }
}
