use thiserror::Error;

/// Everything that can go wrong between opening the popup and showing
/// results. All three kinds collapse to the same error surface.
#[derive(Debug, Error)]
pub enum PopupError {
    #[error("no movie identifier in {0:?}")]
    InvalidIdentifier(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
