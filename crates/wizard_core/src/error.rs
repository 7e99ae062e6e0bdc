use shared::domain::ElementId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("page is missing required element '{0}'")]
    MissingElement(ElementId),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(String),
    /// Non-2xx answer from the processing endpoint.
    #[error("处理失败 (HTTP {status})")]
    Processing { status: u16 },
    #[error("{0}")]
    PreconditionUnmet(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for WizardError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            WizardError::Decode(value.to_string())
        } else {
            WizardError::Transport(value)
        }
    }
}

pub type WizardResult<T> = Result<T, WizardError>;
