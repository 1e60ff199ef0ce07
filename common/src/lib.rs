//! Shared primitives for the Device Connect SDK.
//!
//! Nothing in here knows about HTTP requests or models. These are the small
//! building blocks the SDK crate threads through its error and credential
//! handling:
//!
//! - [`ErrorLocation`]: file/line/column of the site that raised an error
//! - [`HttpStatusCode`]: status code with success/client/server predicates
//! - [`RedactedSecret`]: credential material that never leaks into logs

pub mod error;
pub mod http_status;
pub mod redacted_secret;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_secret::RedactedSecret;
