use async_trait::async_trait;
use tracing::info;

use crate::error::MailError;
use crate::mail::traits::{DeliveryReceipt, EmailSender, OutgoingEmail};

/// Dry-run sender: logs the message instead of delivering it
#[derive(Debug, Default)]
pub struct LogOnlySender;

#[async_trait]
impl EmailSender for LogOnlySender {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, MailError> {
        if email.to.is_empty() {
            return Err(MailError::NoRecipients);
        }

        info!("📧 [DRY RUN] From: {}", email.from);
        info!("📧 [DRY RUN] To: {}", email.to.join(", "));
        info!("📧 [DRY RUN] Subject: {}", email.subject);
        info!("📧 [DRY RUN] Body:\n{}", email.text_body);

        Ok(DeliveryReceipt::default())
    }

    fn provider_name(&self) -> &'static str {
        "dry run"
    }
}
