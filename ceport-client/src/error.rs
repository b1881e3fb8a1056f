use ceport_api::models::SensorName;

/// Failure of a single backend operation. None of these are retried; the
/// message of each variant is what the user gets to see.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("No data received")]
    NoData,

    #[error("Failed to parse {what}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    Conflict,

    #[error("Sensor not found")]
    NotFound(SensorName),

    #[error("{0}")]
    Validation(String),

    #[error("{operation} failed with status {status}")]
    UnexpectedStatus { operation: &'static str, status: u16 },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation(message.into())
    }
}
