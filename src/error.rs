use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failure of a single call against the board or tracker API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status.
    #[error("{service} answered {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} sent a response that could not be decoded: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Board field kinds that cannot hold a free-form value (drop-down lists).
    #[error("board field kind `{0}` cannot hold a free-form value")]
    UnsupportedFieldKind(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport { source, .. } | ApiError::Decode { source, .. } => {
                source.status().map(|s| s.as_u16())
            }
            ApiError::UnsupportedFieldKind(_) => None,
        }
    }
}

/// Failure that aborts a whole sync pass.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{phase} failed: {source}")]
    Api {
        phase: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("could not resolve assignee {member_id} of card {card_id}: {source}")]
    MemberLookup {
        card_id: String,
        member_id: String,
        #[source]
        source: ApiError,
    },
}

impl SyncError {
    pub fn api(phase: &'static str) -> impl FnOnce(ApiError) -> SyncError {
        move |source| SyncError::Api { phase, source }
    }
}
