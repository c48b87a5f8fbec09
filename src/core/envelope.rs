//! Uniform outward shape for fetch outcomes.

use super::config::Environment;
use super::error::FetchError;
use super::payload::Payload;
use super::provider::ProviderId;
use serde::Serialize;

pub const UNAVAILABLE_DETAIL: &str = "Service temporarily unavailable";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Success { data: Payload, source: String },
    Failure { status: u16, detail: String },
}

impl Envelope {
    /// `NotFound` keeps its detail (it names the missing resource);
    /// `Unavailable` only reveals the upstream reason outside production.
    pub fn from_result(
        result: Result<Payload, FetchError>,
        provider: ProviderId,
        environment: Environment,
    ) -> Self {
        match result {
            Ok(data) => Envelope::Success {
                data,
                source: provider.source().to_string(),
            },
            Err(FetchError::NotFound(detail)) => Envelope::Failure {
                status: 404,
                detail,
            },
            Err(FetchError::Unavailable(reason)) => Envelope::Failure {
                status: 500,
                detail: match environment {
                    Environment::Production => UNAVAILABLE_DETAIL.to_string(),
                    Environment::Development => format!("{UNAVAILABLE_DETAIL}: {reason}"),
                },
            },
        }
    }

    /// HTTP-equivalent status code.
    pub fn status(&self) -> u16 {
        match self {
            Envelope::Success { .. } => 200,
            Envelope::Failure { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }
}
