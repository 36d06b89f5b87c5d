use thiserror::Error;

/// Errors surfaced by the choropleth pipeline.
///
/// Missing or non-numeric data is never an error: it is rendered as "no value".
#[derive(Debug, Error)]
pub enum ChoroplethError {
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("failed to load asset `{asset}`: {reason}")]
    Asset { asset: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ChoroplethError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChoroplethError>;
