use std::sync::Arc;

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::availability::Availability;
use crate::error::ScoutError;
use crate::mail::{EmailSender, Envelope};
use crate::models::FeatureCollection;
use crate::report::{self, ReportContext};
use crate::sources::FeatureSource;

/// What the notifier needs to know about one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    pub facility_code: String,
    pub site_label: String,
    pub heartbeat: bool,
    pub notify_on_failure: bool,
    pub envelope: Envelope,
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A report went out
    Notified {
        free: usize,
        message_id: Option<String>,
    },
    /// Nothing free and no heartbeat, so nothing was sent
    Silent { matching: usize, free: usize },
}

/// Fetch, filter and notify, once per invocation
pub struct AvailabilityNotifier {
    source: Arc<dyn FeatureSource>,
    mailer: Arc<dyn EmailSender>,
    config: NotifierConfig,
}

impl AvailabilityNotifier {
    pub fn new(
        source: Arc<dyn FeatureSource>,
        mailer: Arc<dyn EmailSender>,
        config: NotifierConfig,
    ) -> Self {
        Self {
            source,
            mailer,
            config,
        }
    }

    /// Run one check.
    ///
    /// Fetch-stage failures are optionally reported to the recipients before
    /// being returned; a failure of that report is only logged.
    pub async fn run(&self) -> Result<RunOutcome, ScoutError> {
        match self.check().await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!("Parking check failed ({}): {}", err.kind(), err);
                if self.config.notify_on_failure && err.kind().is_fetch_stage() {
                    self.alert_operator(&err).await;
                }
                Err(err)
            }
        }
    }

    async fn check(&self) -> Result<RunOutcome, ScoutError> {
        let body = self.source.fetch_body().await?;
        debug!("{} returned {} bytes", self.source.source_name(), body.len());

        let collection = FeatureCollection::from_json(&body).inspect_err(|err| {
            if let Some(prefix) = err.body_prefix() {
                error!("Could not parse JSON. Raw response: {}", prefix);
            }
        })?;

        let code = self.config.facility_code.as_str();
        let availability = Availability::evaluate(&collection.features, code);
        info!(
            "Found {} with cod_parcare={}, free: {}",
            availability.matching.len(),
            code,
            availability.free_count()
        );

        if !availability.should_notify(self.config.heartbeat) {
            info!("No free spots found → no email sent.");
            return Ok(RunOutcome::Silent {
                matching: availability.matching.len(),
                free: 0,
            });
        }

        let report = report::render(
            &availability.free,
            &ReportContext {
                facility_code: code,
                site_label: &self.config.site_label,
                heartbeat: self.config.heartbeat,
                checked_at: Local::now(),
            },
        );
        let email = self.config.envelope.compose(report);
        let receipt = self.mailer.send(&email).await?;
        info!("✅ Email sent via {}!", self.mailer.provider_name());

        Ok(RunOutcome::Notified {
            free: availability.free_count(),
            message_id: receipt.message_id,
        })
    }

    async fn alert_operator(&self, err: &ScoutError) {
        let report = report::render_failure(err, &self.config.site_label, Local::now());
        let email = self.config.envelope.compose(report);

        match self.mailer.send(&email).await {
            Ok(_) => warn!("Failure report sent via {}", self.mailer.provider_name()),
            Err(mail_err) => error!("Could not send failure report: {}", mail_err),
        }
    }
}
