use thiserror::Error;

use crate::github::Endpoint;

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    FetchFailed,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("username must not be empty")]
    InvalidInput,

    /// One of the five requests failed to send, returned a non-success
    /// status, or carried a body of the wrong shape. `endpoint` is `None`
    /// only when the whole operation was cut short by an outer deadline.
    #[error("{}", describe_failure(.endpoint))]
    FetchFailed {
        endpoint: Option<Endpoint>,
        #[source]
        source: anyhow::Error,
    },
}

fn describe_failure(endpoint: &Option<Endpoint>) -> String {
    match endpoint {
        Some(e) => format!("failed to fetch {} data", e.label()),
        None => "failed to fetch GitHub data".to_string(),
    }
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::InvalidInput => ErrorKind::InvalidInput,
            FetchError::FetchFailed { .. } => ErrorKind::FetchFailed,
        }
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            FetchError::FetchFailed { endpoint, .. } => *endpoint,
            FetchError::InvalidInput => None,
        }
    }

    pub(crate) fn failed(endpoint: Endpoint, source: anyhow::Error) -> Self {
        FetchError::FetchFailed {
            endpoint: Some(endpoint),
            source,
        }
    }
}
