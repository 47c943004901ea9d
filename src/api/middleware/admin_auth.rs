//! Admin authentication via a shared secret header

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Header carrying the admin secret
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Extractor that requires a matching `X-Admin-Secret` header
///
/// Rejects with 401 when the header is missing or wrong, and also when the
/// server has no admin secret configured.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(ADMIN_SECRET_HEADER)
            .and_then(|value| value.to_str().ok());

        let Some(expected) = state.admin_secret.as_deref() else {
            warn!("Admin request rejected: no admin secret configured");
            return Err(ApiError::unauthorized("Unauthorized"));
        };

        if !validate_admin_secret(provided, expected) {
            debug!("Admin request rejected: bad secret");
            return Err(ApiError::unauthorized("Unauthorized"));
        }

        Ok(RequireAdmin)
    }
}

/// Compares the provided secret against the expected one in constant time
///
/// Missing or empty values on either side never match.
pub fn validate_admin_secret(provided: Option<&str>, expected: &str) -> bool {
    match provided {
        Some(provided) if !provided.is_empty() && !expected.is_empty() => {
            constant_time_compare(provided, expected)
        }
        _ => false,
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    // Length mismatch still walks the expected value once
    let other = if a_bytes.len() == b_bytes.len() {
        a_bytes
    } else {
        b_bytes
    };

    let mut result = 0u8;
    for (x, y) in other.iter().zip(b_bytes) {
        result |= x ^ y;
    }

    result == 0 && a_bytes.len() == b_bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::mock::{test_context, ADMIN_SECRET};
    use axum::http::{Request, StatusCode};

    fn parts_with(secret: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/admin/reports");
        if let Some(secret) = secret {
            builder = builder.header("X-Admin-Secret", secret);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("hell", "hello"));
    }

    #[test]
    fn test_validate_admin_secret() {
        assert!(validate_admin_secret(Some("s3cret"), "s3cret"));
        assert!(!validate_admin_secret(Some("s3cre"), "s3cret"));
        assert!(!validate_admin_secret(None, "s3cret"));
        assert!(!validate_admin_secret(Some(""), "s3cret"));
        assert!(!validate_admin_secret(Some(""), ""));
    }

    #[tokio::test]
    async fn test_extractor_accepts_matching_secret() {
        let ctx = test_context();
        let mut parts = parts_with(Some(ADMIN_SECRET));

        let result = RequireAdmin::from_request_parts(&mut parts, &ctx.state).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_extractor_rejects_missing_and_wrong_secret() {
        let ctx = test_context();

        for secret in [None, Some("nope")] {
            let mut parts = parts_with(secret);
            let err = RequireAdmin::from_request_parts(&mut parts, &ctx.state)
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_extractor_rejects_when_unconfigured() {
        let ctx = test_context();
        let state = ctx.state.with_admin_secret(None);
        let mut parts = parts_with(Some(ADMIN_SECRET));

        let err = RequireAdmin::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
