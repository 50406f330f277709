use crate::actor_framework::Entity;
use crate::domain::{generate_ticket_number, Ticket, TicketCreate, TicketStatus, TicketTransition};
use super::TicketError;
use chrono::Utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    ChangeStatus(TicketStatus),
}

impl Entity for Ticket {
    type Id = String;
    type CreateParams = TicketCreate;
    type Patch = ();
    type Action = TicketAction;
    type ActionResult = TicketTransition;
    type Error = TicketError;

    const KIND: &'static str = "ticket";

    fn id(&self) -> &String {
        &self.id
    }

    /// Opens a ticket with a fresh tracking number.
    fn from_create_params(id: String, params: TicketCreate) -> Result<Self, TicketError> {
        let description = params.description.trim();
        if description.is_empty() {
            return Err(TicketError::ValidationError("Description is required".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            ticket_number: generate_ticket_number(),
            description: description.to_string(),
            status: TicketStatus::Open,
            reporter_email: params.reporter_email,
            created_at: now,
            updated_at: now,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), TicketError> {
        Ok(())
    }

    /// Setting the status a ticket already has is not an error, it just reports no change.
    fn handle_action(&mut self, action: TicketAction) -> Result<TicketTransition, TicketError> {
        let TicketAction::ChangeStatus(status) = action;
        let changed = self.status != status;
        if changed {
            self.status = status;
            self.updated_at = Utc::now();
        }
        Ok(TicketTransition {
            ticket: self.clone(),
            changed,
        })
    }

    fn check_conflict(&self, other: &Self) -> Result<(), TicketError> {
        if self.ticket_number == other.ticket_number {
            return Err(TicketError::DuplicateNumber(self.ticket_number.clone()));
        }
        Ok(())
    }
}
