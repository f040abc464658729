use campusmap_data::DataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CampusMapError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CampusMapError {
    /// A path was requested between a location and itself.
    #[must_use]
    pub fn is_invalid_pair(&self) -> bool {
        matches!(self, Self::Data(DataError::InvalidPair(_)))
    }
}

pub type Result<T> = std::result::Result<T, CampusMapError>;
