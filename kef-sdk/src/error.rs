use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("API error: {0}")]
    Api(#[from] kef_api::ApiError),

    #[error("Cannot connect to speaker at {0}")]
    CannotConnect(String),

    #[error("Speaker at {0} is not ready, retry later")]
    NotReady(String),

    #[error("Entry store error: {0}")]
    Store(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Poller worker stopped")]
    WorkerStopped,

    #[error("Feature not supported by the current player: {0}")]
    UnsupportedFeature(&'static str),
}

/// Outcome of validating a host during setup
///
/// Every failure collapses into one condition, the same one a user sees
/// on the setup form.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    #[error("cannot_connect")]
    CannotConnect,
}

pub type Result<T> = std::result::Result<T, SdkError>;
