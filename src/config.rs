use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use reqwest::Url;

use crate::error::ConfigError;
use crate::mail::postmark::{DEFAULT_API_URL, SANDBOX_TOKEN};
use crate::mail::Envelope;
use crate::notifier::NotifierConfig;
use crate::sources::DEFAULT_WFS_URL;

const DEFAULT_MAILBOX: &str = "parking-scout@example.com";

/// Command line, with environment fallbacks for every setting
#[derive(Debug, Clone, Parser)]
#[command(name = "parking-scout")]
#[command(about = "Check the municipal parking feed for free spots and email a report")]
pub struct Cli {
    /// Send a liveness email even when no spot is free
    #[arg(long)]
    pub heartbeat: bool,

    /// Log the email instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Email the recipients when the feed cannot be fetched or parsed.
    /// The env value accepts true/false, yes/no, on/off and 1/0.
    #[arg(
        long,
        env = "NOTIFY_ON_FAILURE",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub notify_on_failure: bool,

    #[arg(long, env = "POSTMARK_TOKEN", default_value = SANDBOX_TOKEN, hide_env_values = true)]
    pub postmark_token: String,

    #[arg(long, env = "POSTMARK_API_URL", default_value = DEFAULT_API_URL)]
    pub postmark_api_url: String,

    #[arg(long, env = "MAIL_FROM", default_value = DEFAULT_MAILBOX)]
    pub mail_from: String,

    /// Comma-separated recipient list
    #[arg(long, env = "MAIL_TO", default_value = DEFAULT_MAILBOX)]
    pub mail_to: String,

    #[arg(long, env = "MAIL_STREAM", default_value = "outbound")]
    pub mail_stream: String,

    #[arg(long, env = "PARKING_WFS_URL", default_value = DEFAULT_WFS_URL)]
    pub wfs_url: String,

    /// `cod_parcare` of the lot to watch
    #[arg(long, env = "PARKING_CODE", default_value = "9020")]
    pub facility_code: String,

    /// Name of the lot used in subjects
    #[arg(long, env = "PARKING_SITE", default_value = "VITAN")]
    pub site_label: String,

    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

/// Validated, immutable run configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub wfs_url: Url,
    pub timeout: Duration,
    pub dry_run: bool,
    pub postmark_api_url: Url,
    pub postmark_token: String,
    pub notifier: NotifierConfig,
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let wfs_url = parse_url("WFS", &cli.wfs_url)?;
        let postmark_api_url = parse_url("Postmark API", &cli.postmark_api_url)?;

        if cli.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if cli.facility_code.is_empty() {
            return Err(ConfigError::Empty("facility code"));
        }

        let from = cli.mail_from.trim().to_string();
        if from.is_empty() {
            return Err(ConfigError::Empty("MAIL_FROM"));
        }

        let to = split_recipients(&cli.mail_to);
        if to.is_empty() {
            return Err(ConfigError::NoRecipients);
        }

        Ok(Self {
            wfs_url,
            timeout: Duration::from_secs(cli.timeout_secs),
            dry_run: cli.dry_run,
            postmark_api_url,
            postmark_token: cli.postmark_token,
            notifier: NotifierConfig {
                facility_code: cli.facility_code,
                site_label: cli.site_label,
                heartbeat: cli.heartbeat,
                notify_on_failure: cli.notify_on_failure,
                envelope: Envelope {
                    from,
                    to,
                    message_stream: cli.mail_stream,
                },
            },
        })
    }

    /// True when mail would go to Postmark's sandbox and never be delivered
    pub fn uses_sandbox_token(&self) -> bool {
        !self.dry_run && self.postmark_token == SANDBOX_TOKEN
    }
}

/// Split a comma-separated list, dropping blanks
pub fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, MutexGuard};

    use super::*;

    const ENV_VARS: [&str; 10] = [
        "NOTIFY_ON_FAILURE",
        "POSTMARK_TOKEN",
        "POSTMARK_API_URL",
        "MAIL_FROM",
        "MAIL_TO",
        "MAIL_STREAM",
        "PARKING_WFS_URL",
        "PARKING_CODE",
        "PARKING_SITE",
        "HTTP_TIMEOUT_SECS",
    ];

    // Tests read and write process env, serialize them
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn clear_env() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
    }

    fn parse(args: &[&str]) -> Result<Settings, ConfigError> {
        let _guard = env_lock();
        let mut argv = vec!["parking-scout"];
        argv.extend_from_slice(args);
        Settings::from_cli(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn recipients_are_trimmed_and_blanks_dropped() {
        assert_eq!(
            split_recipients(" a@example.com, b@example.com ,, "),
            ["a@example.com", "b@example.com"]
        );
        assert!(split_recipients(" , ").is_empty());
    }

    #[test]
    fn flags_override_defaults() {
        let settings = parse(&[
            "--heartbeat",
            "--dry-run",
            "--facility-code",
            "1234",
            "--mail-to",
            "x@example.com,y@example.com",
            "--wfs-url",
            "http://localhost:9000/wfs",
        ])
        .unwrap();

        assert!(settings.dry_run);
        assert!(settings.notifier.heartbeat);
        assert_eq!(settings.notifier.facility_code, "1234");
        assert_eq!(settings.notifier.envelope.to, ["x@example.com", "y@example.com"]);
        assert_eq!(settings.wfs_url.as_str(), "http://localhost:9000/wfs");
        assert!(!settings.uses_sandbox_token());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            parse(&["--wfs-url", "not a url"]),
            Err(ConfigError::InvalidUrl { name: "WFS", .. })
        ));
        assert!(matches!(
            parse(&["--mail-to", " , "]),
            Err(ConfigError::NoRecipients)
        ));
        assert!(matches!(
            parse(&["--timeout-secs", "0"]),
            Err(ConfigError::ZeroTimeout)
        ));
    }

    #[test]
    fn defaults_use_the_sandbox_token() {
        let _guard = env_lock();
        clear_env();

        let cli = Cli::try_parse_from(["parking-scout"]).unwrap();
        let settings = Settings::from_cli(cli).unwrap();

        assert!(settings.uses_sandbox_token());
        assert!(!settings.notifier.notify_on_failure);
        assert!(!settings.notifier.heartbeat);
        assert_eq!(settings.notifier.facility_code, "9020");
        assert_eq!(settings.notifier.site_label, "VITAN");
        assert_eq!(settings.notifier.envelope.to, [DEFAULT_MAILBOX]);
        assert_eq!(settings.notifier.envelope.message_stream, "outbound");
        assert_eq!(settings.wfs_url.as_str(), DEFAULT_WFS_URL);
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn settings_fall_back_to_the_environment() {
        let _guard = env_lock();
        clear_env();
        std::env::set_var("MAIL_TO", "ops@example.com, night@example.com");
        std::env::set_var("PARKING_CODE", "9021");
        std::env::set_var("POSTMARK_TOKEN", "live-token");

        let mut notify = Vec::new();
        for value in ["1", "yes", "on", "true", "0", "no", "false"] {
            std::env::set_var("NOTIFY_ON_FAILURE", value);
            let cli = Cli::try_parse_from(["parking-scout"]);
            notify.push(cli.map(|cli| cli.notify_on_failure).ok());
        }

        std::env::set_var("NOTIFY_ON_FAILURE", "1");
        let settings = Settings::from_cli(Cli::try_parse_from(["parking-scout"]).unwrap());
        clear_env();

        assert_eq!(
            notify,
            [Some(true), Some(true), Some(true), Some(true), Some(false), Some(false), Some(false)]
        );
        let settings = settings.unwrap();
        assert!(settings.notifier.notify_on_failure);
        assert_eq!(settings.notifier.facility_code, "9021");
        assert_eq!(
            settings.notifier.envelope.to,
            ["ops@example.com", "night@example.com"]
        );
        assert_eq!(settings.postmark_token, "live-token");
        assert!(!settings.uses_sandbox_token());
    }
}
