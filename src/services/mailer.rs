use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outgoing mail transport.
pub trait Mailer: Send + Sync {
    fn send(&self, mail: Mail) -> Result<(), String>;
}

/// Writes mail to the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, mail: Mail) -> Result<(), String> {
        info!(to = %mail.to, subject = %mail.subject, "Sending mail");
        debug!(body = %mail.body, "Mail body");
        Ok(())
    }
}

/// Keeps every message in memory so tests can inspect them.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: std::sync::Mutex<Vec<Mail>>,
}

#[cfg(test)]
impl MemoryMailer {
    pub fn sent(&self) -> Vec<Mail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl Mailer for MemoryMailer {
    fn send(&self, mail: Mail) -> Result<(), String> {
        self.sent
            .lock()
            .map_err(|e| e.to_string())?
            .push(mail);
        Ok(())
    }
}
