use std::fmt;

use thiserror::Error;

/// Everything that can end a parking check
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("could not parse JSON response: {source}")]
    MalformedResponse {
        body_prefix: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response does not contain a features array (found {found})")]
    MissingFeatures { found: &'static str },

    #[error("email dispatch failed: {0}")]
    Dispatch(#[from] MailError),
}

/// Failures of the email collaborator
#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error talking to {provider}: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} rejected the message (HTTP {status}, error code {code}): {message}")]
    Rejected {
        provider: &'static str,
        status: u16,
        code: i64,
        message: String,
    },

    #[error("message has no recipients")]
    NoRecipients,
}

/// Coarse classification used in logs and operator alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    TransportFailure,
    MalformedResponse,
    MissingFeatures,
    DispatchFailure,
}

impl ScoutError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } | Self::UnexpectedStatus { .. } => FailureKind::TransportFailure,
            Self::MalformedResponse { .. } => FailureKind::MalformedResponse,
            Self::MissingFeatures { .. } => FailureKind::MissingFeatures,
            Self::Dispatch(_) => FailureKind::DispatchFailure,
        }
    }

    /// Raw body prefix, only present for unparsable responses
    pub fn body_prefix(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { body_prefix, .. } => Some(body_prefix),
            _ => None,
        }
    }
}

impl FailureKind {
    /// Failures that happen before anything is sent and may be reported to the operator
    pub fn is_fetch_stage(self) -> bool {
        !matches!(self, Self::DispatchFailure)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TransportFailure => "TransportFailure",
            Self::MalformedResponse => "MalformedResponse",
            Self::MissingFeatures => "MissingFeatures",
            Self::DispatchFailure => "DispatchFailure",
        };
        f.write_str(name)
    }
}

/// Invalid startup configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name} URL \"{value}\": {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("MAIL_TO does not contain any recipient")]
    NoRecipients,

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("HTTP timeout must be at least one second")]
    ZeroTimeout,
}
