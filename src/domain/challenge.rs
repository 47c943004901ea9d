//! Bot challenge verification

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Outcome reported by the challenge provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeVerification {
    pub success: bool,
    #[serde(rename = "error-codes", default)]
    pub error_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_ts: Option<String>,
}

impl ChallengeVerification {
    pub fn passed() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(code: impl Into<String>) -> Self {
        Self {
            success: false,
            error_codes: vec![code.into()],
            ..Self::default()
        }
    }
}

/// Verifies a client-side challenge token
///
/// Never fails: transport problems are reported as an unsuccessful
/// verification.
#[async_trait]
pub trait ChallengeVerifier: Send + Sync + Debug {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> ChallengeVerification;
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_provider_response() {
        let value = json!({
            "success": false,
            "error-codes": ["timeout-or-duplicate"]
        });

        let result: ChallengeVerification = serde_json::from_value(value).unwrap();
        assert!(!result.success);
        assert_eq!(result.error_codes, vec!["timeout-or-duplicate"]);
    }

    #[test]
    fn test_failed_carries_code() {
        let result = ChallengeVerification::failed("internal-error");
        assert!(!result.success);
        assert_eq!(result.error_codes, vec!["internal-error"]);
    }
}
