//! Wire types shared by every endpoint

pub mod error;
pub mod json;

pub use error::{ApiError, ApiErrorCode, ApiErrorResponse};
pub use json::Json;
