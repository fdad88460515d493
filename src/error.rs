use std::fmt;
use thiserror::Error;

/// Which campaign attribute collided with an existing campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Name,
    Keyword,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateField::Name => write!(f, "name"),
            DuplicateField::Keyword => write!(f, "keyword"),
        }
    }
}

/// Every way a provisioning run can fail. All of them are fatal.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("ConfigurationError: {0}")]
    Configuration(String),

    #[error("UsageError: {0}")]
    Usage(String),

    #[error("DuplicateCampaignError: campaign with same {field} already exists ({value})")]
    DuplicateCampaign { field: DuplicateField, value: String },

    #[error("NotFoundError: {what}")]
    NotFound { what: String },

    #[error("FetchError: could not retrieve {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("TransportError: request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("ApiError: tracker returned errors for {endpoint}: {errors}")]
    Api {
        endpoint: String,
        errors: serde_json::Value,
    },

    #[error("UnsupportedMethodError: {0}")]
    UnsupportedMethod(String),

    #[error("MalformedResponseError: unexpected response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("IoError: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProvisionError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn malformed(endpoint: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 1,
            Self::Configuration(_) => 2,
            Self::DuplicateCampaign { .. } => 3,
            Self::NotFound { .. } => 4,
            Self::Fetch { .. } => 5,
            Self::Transport { .. } => 6,
            Self::Api { .. } => 7,
            Self::MalformedResponse { .. } => 8,
            Self::Io { .. } => 74,
            Self::UnsupportedMethod(_) => 70,
        }
    }

    /// Operator guidance printed under the error message
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Configuration(_) => Some(
                "Set TRACKER_ENTRYPOINT and TRACKER_API_KEY (environment, .env or campaign-provisioner.toml)",
            ),
            Self::Usage(_) => Some("Pass the target domain, e.g. provision-campaign example.com"),
            Self::DuplicateCampaign { .. } => {
                Some("Nothing was written to the tracker. Rename or remove the existing campaign first")
            }
            Self::NotFound { .. } => Some(
                "Check the tracker setup (traffic source, default domain, user permission schema)",
            ),
            Self::Fetch { .. } => Some("Check that the domain serves a page over HTTPS"),
            Self::Transport { .. } | Self::Api { .. } | Self::MalformedResponse { .. } => Some(
                "Entities created earlier in this run are not rolled back; reconcile them in the tracker",
            ),
            Self::Io { .. } | Self::UnsupportedMethod(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
