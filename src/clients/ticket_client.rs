use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{normalize_email, Ticket, TicketCreate, TicketStatus, TicketTransition};
use crate::events::{DomainEvent, EventBus};
use crate::services::{Mail, Mailer};
use crate::ticket_actor::{TicketAction, TicketError};

/// Attempts at drawing an unused ticket number before giving up.
const TICKET_NUMBER_ATTEMPTS: usize = 5;

/// Client for support tickets.
#[derive(Clone)]
pub struct TicketClient {
    inner: ResourceClient<Ticket>,
    mailer: Arc<dyn Mailer>,
    events: EventBus,
}

impl TicketClient {
    pub fn new(inner: ResourceClient<Ticket>, mailer: Arc<dyn Mailer>, events: EventBus) -> Self {
        Self {
            inner,
            mailer,
            events,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    #[instrument(skip(self))]
    pub async fn create(&self, params: TicketCreate) -> Result<Ticket, TicketError> {
        debug!("Sending request");
        let reporter_email = match params.reporter_email.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(raw) => Some(normalize_email(raw).map_err(TicketError::ValidationError)?),
        };
        let params = TicketCreate {
            description: params.description,
            reporter_email,
        };
        let mut attempt = 1;
        let id = loop {
            match self.inner.create(params.clone()).await {
                Err(TicketError::DuplicateNumber(number)) if attempt < TICKET_NUMBER_ATTEMPTS => {
                    warn!(%number, attempt, "Ticket number taken, drawing another");
                    attempt += 1;
                }
                result => break result?,
            }
        };
        let ticket = self.get_ticket(id).await?;
        info!(ticket_number = %ticket.ticket_number, "Ticket opened");
        Ok(ticket)
    }

    /// Newest first.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Ticket>, TicketError> {
        let mut tickets = self.inner.list().await?;
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    /// Moves a ticket to `status`. Closing it notifies the reporter exactly once.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: String, status: &str) -> Result<TicketTransition, TicketError> {
        let status: TicketStatus = status.parse().map_err(TicketError::InvalidStatus)?;
        let transition = self
            .inner
            .perform_action(id, TicketAction::ChangeStatus(status))
            .await?;
        if transition.changed {
            info!(ticket_id = %transition.ticket.id, status = %status, "Ticket status changed");
            if status == TicketStatus::Closed {
                self.notify_closed(&transition.ticket);
            }
        }
        Ok(transition)
    }

    fn notify_closed(&self, ticket: &Ticket) {
        match &ticket.reporter_email {
            Some(email) => {
                let mail = Mail {
                    to: email.clone(),
                    subject: format!("Ticket {} closed", ticket.ticket_number),
                    body: format!(
                        "Your ticket {} has been closed.\n\n{}\n",
                        ticket.ticket_number, ticket.description
                    ),
                };
                if let Err(e) = self.mailer.send(mail) {
                    warn!(error = %e, ticket_id = %ticket.id, "Closure notification failed");
                }
            }
            None => info!(
                ticket_id = %ticket.id,
                ticket_number = %ticket.ticket_number,
                "Ticket closed, reporter has no email"
            ),
        }
        self.events.publish(DomainEvent::TicketClosed {
            ticket_id: ticket.id.clone(),
            ticket_number: ticket.ticket_number.clone(),
        });
    }
}

crate::impl_client_methods!(TicketClient, inner => Ticket, TicketError, ticket);
