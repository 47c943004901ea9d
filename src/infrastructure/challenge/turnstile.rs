//! Cloudflare Turnstile server-side verification

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{ChallengeVerification, ChallengeVerifier};

/// Turnstile siteverify endpoint
pub const TURNSTILE_VERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

/// Verifier calling the Turnstile siteverify API
#[derive(Clone)]
pub struct TurnstileVerifier {
    client: reqwest::Client,
    secret_key: String,
    verify_url: String,
}

impl std::fmt::Debug for TurnstileVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnstileVerifier")
            .field("verify_url", &self.verify_url)
            .finish()
    }
}

impl TurnstileVerifier {
    pub fn new(client: reqwest::Client, secret_key: impl Into<String>) -> Self {
        Self {
            client,
            secret_key: secret_key.into(),
            verify_url: TURNSTILE_VERIFY_URL.to_string(),
        }
    }

    pub fn with_verify_url(mut self, url: impl Into<String>) -> Self {
        self.verify_url = url.into();
        self
    }

    async fn call(
        &self,
        token: &str,
        remote_ip: Option<&str>,
    ) -> Result<ChallengeVerification, reqwest::Error> {
        let mut form = vec![("secret", self.secret_key.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        self.client
            .post(&self.verify_url)
            .form(&form)
            .send()
            .await?
            .json::<ChallengeVerification>()
            .await
    }
}

#[async_trait]
impl ChallengeVerifier for TurnstileVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> ChallengeVerification {
        match self.call(token, remote_ip).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Turnstile validation error: {}", e);
                ChallengeVerification::failed("internal-error")
            }
        }
    }
}

/// Verifier used when no Turnstile secret is configured
///
/// Accepts every token. Only meant for local development.
#[derive(Debug, Clone, Default)]
pub struct PermissiveVerifier;

#[async_trait]
impl ChallengeVerifier for PermissiveVerifier {
    async fn verify(&self, _token: &str, _remote_ip: Option<&str>) -> ChallengeVerification {
        warn!("Turnstile secret not configured, accepting challenge token unverified");
        ChallengeVerification::passed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn verifier(server: &MockServer) -> TurnstileVerifier {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        TurnstileVerifier::new(client, "secret-key")
            .with_verify_url(format!("{}/siteverify", server.uri()))
    }

    #[tokio::test]
    async fn test_verify_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/siteverify"))
            .and(body_string_contains("secret=secret-key"))
            .and(body_string_contains("response=good-token"))
            .and(body_string_contains("remoteip=203.0.113.7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "hostname": "example.com",
                "error-codes": []
            })))
            .mount(&server)
            .await;

        let result = verifier(&server)
            .verify("good-token", Some("203.0.113.7"))
            .await;

        assert!(result.success);
        assert_eq!(result.hostname.as_deref(), Some("example.com"));
    }

    #[tokio::test]
    async fn test_verify_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error-codes": ["invalid-input-response"]
            })))
            .mount(&server)
            .await;

        let result = verifier(&server).verify("bad-token", None).await;

        assert!(!result.success);
        assert_eq!(result.error_codes, vec!["invalid-input-response"]);
    }

    #[tokio::test]
    async fn test_unparseable_response_is_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let result = verifier(&server).verify("token", None).await;

        assert_eq!(result, ChallengeVerification::failed("internal-error"));
    }

    #[tokio::test]
    async fn test_permissive_verifier_passes() {
        assert!(PermissiveVerifier.verify("anything", None).await.success);
    }
}
