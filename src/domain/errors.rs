use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while preparing or sending a push to the gateway
#[derive(Debug, Error)]
pub enum PushError {
    #[error("Invalid gateway URL {url}: {reason}")]
    InvalidGatewayUrl { url: String, reason: String },

    #[error("Invalid job name: {reason}")]
    InvalidJob { reason: String },

    #[error("Invalid push method: {0}. Must be 'put' or 'post'")]
    InvalidMethod(String),

    #[error("Invalid grouping label name: {name:?}")]
    InvalidGroupingLabel { name: String },

    #[error("Pushed metric {metric} already contains grouping label {label}")]
    LabelConflict { metric: String, label: String },

    #[error("Failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),

    #[error("Transport error pushing to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Gateway {url} rejected push with status {status}: {body}")]
    Protocol {
        url: String,
        status: StatusCode,
        body: String,
    },
}

impl PushError {
    /// Connection, DNS, TLS or timeout failure while talking to the gateway
    pub fn is_transport(&self) -> bool {
        matches!(self, PushError::Transport { .. })
    }

    /// The gateway answered with a non-success status
    pub fn is_protocol(&self) -> bool {
        matches!(self, PushError::Protocol { .. })
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            PushError::Protocol { status, .. } => Some(*status),
            PushError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Errors related to building an authentication credential
#[derive(Debug, Error, PartialEq)]
pub enum CredentialError {
    #[error("Unknown auth scheme: {0}. Must be 'bearer' or 'basic'")]
    UnknownScheme(String),

    #[error("Missing {field} for {scheme} authentication")]
    Missing {
        scheme: &'static str,
        field: &'static str,
    },
}
