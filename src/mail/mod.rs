pub mod log_only;
pub mod postmark;
pub mod traits;

pub use log_only::LogOnlySender;
pub use postmark::PostmarkClient;
pub use traits::{DeliveryReceipt, EmailSender, Envelope, OutgoingEmail};
