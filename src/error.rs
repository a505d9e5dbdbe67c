use thiserror::Error;

/// Failure at a single exchange fetch boundary.
///
/// None of these abort a run: the pipeline logs them and degrades that
/// exchange's contribution to an empty result for the current tier.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("schema error: {0}")]
    Schema(String),

    #[error("run deadline expired")]
    Deadline,
}

impl FetchError {
    /// Coarse class used for logging and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) | FetchError::Status { .. } | FetchError::Deadline => "transport",
            FetchError::Schema(_) => "schema",
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Schema(e.to_string())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
