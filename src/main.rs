use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use parking_scout::mail::{EmailSender, LogOnlySender, PostmarkClient};
use parking_scout::sources::WfsClient;
use parking_scout::{AvailabilityNotifier, Cli, RunOutcome, Settings};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::from_cli(Cli::parse()).context("Invalid configuration")?;

    info!(
        "🅿️  Parking Scout - {} (cod_parcare={}){}",
        settings.notifier.site_label,
        settings.notifier.facility_code,
        if settings.notifier.heartbeat { " [heartbeat]" } else { "" }
    );

    if settings.uses_sandbox_token() {
        warn!("POSTMARK_TOKEN not set, using the sandbox token: nothing will be delivered");
    }

    let source = WfsClient::new(settings.wfs_url.clone(), settings.timeout)
        .context("Failed to create WFS client")?;

    let mailer: Arc<dyn EmailSender> = if settings.dry_run {
        Arc::new(LogOnlySender)
    } else {
        Arc::new(
            PostmarkClient::new(
                &settings.postmark_api_url,
                &settings.postmark_token,
                settings.timeout,
            )
            .context("Failed to create Postmark client")?,
        )
    };

    let notifier = AvailabilityNotifier::new(Arc::new(source), mailer, settings.notifier);

    match notifier.run().await.context("Parking check failed")? {
        RunOutcome::Notified { free, message_id } => info!(
            "Done: report sent ({} free, message id {})",
            free,
            message_id.as_deref().unwrap_or("n/a")
        ),
        RunOutcome::Silent { matching, free } => {
            info!("Done: {} matching spots, {} free, nothing sent", matching, free)
        }
    }

    Ok(())
}
