//! API key delivery through the Resend email API

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{DomainError, KeyMailer};

/// Resend send-email endpoint
pub const RESEND_API_URL: &str = "https://api.resend.com/emails";

const SUBJECT: &str = "Your DisposableCheck API Key";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

/// Renders the HTML body sent with a key
pub fn render_key_email(api_key: &str, public_base_url: &str, daily_limit: u64) -> String {
    let base = public_base_url.trim_end_matches('/');
    format!(
        r##"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1>Your API key is ready</h1>
  <p>Thanks for signing up for DisposableCheck. Here is your API key:</p>
  <pre style="background: #f3f4f6; padding: 16px; word-break: break-all;">{api_key}</pre>
  <h2>Quick start</h2>
  <pre style="background: #1f2937; color: #e5e7eb; padding: 16px;">curl "{base}/api/v1/check?email=test@tempmail.com" \
  -H "X-API-Key: {api_key}"</pre>
  <p><strong>Rate limit:</strong> {daily_limit} requests/day</p>
  <p style="color: #9ca3af; font-size: 12px;"><a href="{base}">{base}</a></p>
</body>
</html>
"##
    )
}

/// Mailer posting to the Resend API
#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
    api_url: String,
    public_base_url: String,
    daily_limit: u64,
}

impl std::fmt::Debug for ResendMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendMailer")
            .field("from", &self.from)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl ResendMailer {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        from: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            from: from.into(),
            api_url: RESEND_API_URL.to_string(),
            public_base_url: public_base_url.into(),
            daily_limit: crate::domain::key_registry::DEFAULT_DAILY_LIMIT,
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Limit quoted in the email body
    pub fn with_daily_limit(mut self, limit: u64) -> Self {
        self.daily_limit = limit;
        self
    }
}

/// Pulls `message` out of a Resend error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl KeyMailer for ResendMailer {
    async fn send_api_key(&self, to: &str, api_key: &str) -> Result<(), DomainError> {
        let request = SendEmailRequest {
            from: &self.from,
            to: [to],
            subject: SUBJECT,
            html: render_key_email(api_key, &self.public_base_url, self.daily_limit),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::provider("resend", format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                "resend",
                format!("HTTP {}: {}", status, error_message(&body)),
            ));
        }

        debug!("API key email sent to {}", to);
        Ok(())
    }
}

/// Mailer used when no Resend key is configured
///
/// Logs the delivery instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl KeyMailer for LogMailer {
    async fn send_api_key(&self, to: &str, api_key: &str) -> Result<(), DomainError> {
        let shown: String = api_key.chars().take(12).collect();
        info!(to = %to, key_prefix = %shown, "Email delivery disabled, API key not sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mailer(server: &MockServer) -> ResendMailer {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        ResendMailer::new(
            client,
            "re_test",
            "DisposableCheck <noreply@example.com>",
            "https://check.example.com/",
        )
        .with_api_url(format!("{}/emails", server.uri()))
    }

    #[tokio::test]
    async fn test_send_posts_to_resend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test"))
            .and(body_partial_json(serde_json::json!({
                "from": "DisposableCheck <noreply@example.com>",
                "to": ["a@x.com"],
                "subject": "Your DisposableCheck API Key"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "1"})))
            .expect(1)
            .mount(&server)
            .await;

        mailer(&server)
            .send_api_key("a@x.com", "dk_live_abc")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_failure_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "statusCode": 422,
                "message": "Invalid `to` field"
            })))
            .mount(&server)
            .await;

        let err = mailer(&server)
            .send_api_key("a@x.com", "dk_live_abc")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Invalid `to` field"));
    }

    #[test]
    fn test_render_key_email() {
        let html = render_key_email("dk_live_abc", "https://check.example.com/", 1000);

        assert!(html.contains("dk_live_abc"));
        assert!(html.contains("https://check.example.com/api/v1/check?email="));
        assert!(html.contains("1000 requests/day"));
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(error_message(r#"{"message":"nope"}"#), "nope");
        assert_eq!(error_message("plain failure"), "plain failure");
    }

    #[tokio::test]
    async fn test_log_mailer_succeeds() {
        assert!(LogMailer.send_api_key("a@x.com", "dk_live_abc").await.is_ok());
    }
}
