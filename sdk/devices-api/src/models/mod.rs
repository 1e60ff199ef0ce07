//! Models of the Device Connect API schema components.

pub mod error;

pub use error::Error;
