use async_trait::async_trait;

use crate::error::MailError;
use crate::report::Report;

/// Sender, recipients and stream shared by every message of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub from: String,
    pub to: Vec<String>,
    pub message_stream: String,
}

/// A fully rendered email ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub message_stream: String,
}

/// What the provider tells us about an accepted message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: Option<String>,
}

impl Envelope {
    pub fn compose(&self, report: Report) -> OutgoingEmail {
        OutgoingEmail {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: report.subject,
            html_body: report.html_body,
            text_body: report.text_body,
            message_stream: self.message_stream.clone(),
        }
    }
}

/// Common trait for email providers
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one message
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, MailError>;

    /// Get the name of the provider, used in logs
    fn provider_name(&self) -> &'static str;
}
