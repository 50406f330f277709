use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    #[serde(rename = "ABIERTO")]
    Open,
    #[serde(rename = "EN_PROGRESO")]
    InProgress,
    #[serde(rename = "CERRADO")]
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "ABIERTO",
            Self::InProgress => "EN_PROGRESO",
            Self::Closed => "CERRADO",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ABIERTO" => Ok(Self::Open),
            "EN_PROGRESO" => Ok(Self::InProgress),
            "CERRADO" => Ok(Self::Closed),
            other => Err(format!("Invalid ticket status '{other}'")),
        }
    }
}

/// Represents a support ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    pub id: String,
    pub ticket_number: String,
    pub description: String,
    pub status: TicketStatus,
    pub reporter_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for opening a ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketCreate {
    pub description: String,
    #[serde(default)]
    pub reporter_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Result of a status change; `changed` is false when the ticket already had the status.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketTransition {
    pub ticket: Ticket,
    pub changed: bool,
}

pub fn generate_ticket_number() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_uppercase()
}
