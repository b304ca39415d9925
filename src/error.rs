/// Failure taxonomy for every outbound fetch
/// Every provider and service call resolves to one of these instead of panicking
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Missing credential: {credential}")]
    CredentialMissing { credential: String },

    #[error("Transport error: {reason}")]
    Transport { reason: String },

    #[error("Decode error: {reason}")]
    Decode { reason: String },
}

impl FetchError {
    pub fn credential_missing(credential: &str) -> Self {
        Self::CredentialMissing {
            credential: credential.to_string(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Map a reqwest failure, dropping the URL so embedded credentials never reach logs
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        let error = error.without_url();
        if error.is_decode() {
            Self::decode(error.to_string())
        } else {
            Self::transport(error.to_string())
        }
    }

    pub fn is_credential_missing(&self) -> bool {
        matches!(self, Self::CredentialMissing { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
