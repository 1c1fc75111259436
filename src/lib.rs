//! Watch a municipal WFS parking feed and email a report when a spot at the
//! chosen lot is free.

pub mod availability;
pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod notifier;
pub mod report;
pub mod sources;

pub use availability::Availability;
pub use config::{Cli, Settings};
pub use error::{ConfigError, FailureKind, MailError, ScoutError};
pub use models::{Feature, FeatureCollection};
pub use notifier::{AvailabilityNotifier, NotifierConfig, RunOutcome};
