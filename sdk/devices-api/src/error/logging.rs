use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LoggingError {
    #[error("Logger Initialization Error: {message} {location}")]
    Initialize {
        message: String,
        location: ErrorLocation,
    },
}
