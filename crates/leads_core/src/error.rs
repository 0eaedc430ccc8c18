use thiserror::Error;

/// Failures the controller observes while acquiring results.
///
/// `Parse` and `Channel` are absorbed by the state machine; the other
/// variants end a run in [`crate::ChannelState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("could not parse status message: {0}")]
    Parse(String),
    #[error("live channel error: {0}")]
    Channel(String),
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("unexpected response shape: expected a list, got {0}")]
    Shape(String),
    #[error("processing failed: {0}")]
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("this controller has already been started")]
    AlreadyStarted,
    #[error("no campaign identifiers were given")]
    NoCampaigns,
}
