use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveTime};

use crate::domain::{ChatSession, Reply, Sender};

pub trait Clock: Send + Sync {
    fn time_of_day(&self) -> NaiveTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn time_of_day(&self) -> NaiveTime {
        self.0
    }
}

/// Source of support agents able to take a conversation.
pub trait AgentDirectory: Send + Sync {
    fn next_available(&self) -> Option<String>;
}

/// Hands out agents from a fixed roster in turn.
#[derive(Debug, Default)]
pub struct AgentRoster {
    agents: Vec<String>,
    cursor: AtomicUsize,
}

impl AgentRoster {
    pub fn new(agents: Vec<String>) -> Self {
        Self {
            agents,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl AgentDirectory for AgentRoster {
    fn next_available(&self) -> Option<String> {
        if self.agents.is_empty() {
            return None;
        }
        let turn = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.agents.get(turn % self.agents.len()).cloned()
    }
}

/// Half-open daily window `[opening, closing)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportHours {
    pub opening: NaiveTime,
    pub closing: NaiveTime,
}

impl SupportHours {
    pub fn from_hours(opening_hour: u32, closing_hour: u32) -> Self {
        let at = |hour: u32| NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
        Self {
            opening: at(opening_hour),
            closing: if closing_hour >= 24 {
                NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
            } else {
                at(closing_hour)
            },
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.opening <= time && time < self.closing
    }
}

/// Chooses who answers a customer message.
pub trait ResponseStrategy: Send + Sync {
    fn respond(&self, session: &ChatSession, content: &str) -> Reply;
}

#[derive(Debug, Clone)]
pub struct BotStrategy {
    message: String,
}

impl BotStrategy {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ResponseStrategy for BotStrategy {
    fn respond(&self, _session: &ChatSession, _content: &str) -> Reply {
        Reply {
            sender: Sender::Bot,
            content: self.message.clone(),
            agent_id: None,
            awaiting_agent: false,
        }
    }
}

/// Routes to a human agent during support hours and to the bot otherwise.
pub struct HumanAgentStrategy {
    hours: SupportHours,
    clock: Arc<dyn Clock>,
    agents: Arc<dyn AgentDirectory>,
    template: String,
    fallback: BotStrategy,
}

impl HumanAgentStrategy {
    pub fn new(
        hours: SupportHours,
        clock: Arc<dyn Clock>,
        agents: Arc<dyn AgentDirectory>,
        template: impl Into<String>,
        fallback: BotStrategy,
    ) -> Self {
        Self {
            hours,
            clock,
            agents,
            template: template.into(),
            fallback,
        }
    }
}

impl ResponseStrategy for HumanAgentStrategy {
    fn respond(&self, session: &ChatSession, content: &str) -> Reply {
        if !self.hours.contains(self.clock.time_of_day()) {
            return self.fallback.respond(session, content);
        }
        let agent = session
            .agent_id
            .clone()
            .or_else(|| self.agents.next_available());
        match agent {
            Some(agent_id) => Reply {
                sender: Sender::Agent,
                content: self.template.replace("{content}", content),
                agent_id: Some(agent_id),
                awaiting_agent: false,
            },
            None => Reply {
                awaiting_agent: true,
                ..self.fallback.respond(session, content)
            },
        }
    }
}
