//! Blocklist source fetched over HTTP

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::blocklist::{parse_domain_list, BlocklistSource};
use crate::domain::DomainError;

/// Default public blocklists
pub const DEFAULT_SOURCES: [&str; 3] = [
    "https://raw.githubusercontent.com/7c/fakefilter/main/txt/data.txt",
    "https://raw.githubusercontent.com/disposable-email-domains/disposable-email-domains/main/disposable_email_blocklist.conf",
    "https://raw.githubusercontent.com/wesbos/burner-email-providers/master/emails.txt",
];

/// Default User-Agent sent to list hosts
pub const DEFAULT_USER_AGENT: &str = "DisposableCheck/1.0";

/// Builds the HTTP client shared by every source
pub fn build_http_client(
    user_agent: &str,
    timeout: Duration,
) -> Result<reqwest::Client, DomainError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Plain-text domain list at a URL
#[derive(Debug, Clone)]
pub struct HttpBlocklistSource {
    url: String,
    client: reqwest::Client,
}

impl HttpBlocklistSource {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl BlocklistSource for HttpBlocklistSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<String>, DomainError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DomainError::provider(&self.url, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::provider(&self.url, format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::provider(&self.url, format!("Failed to read body: {}", e)))?;

        Ok(parse_domain_list(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> reqwest::Client {
        build_http_client(DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_parses_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list.txt"))
            .and(header("user-agent", DEFAULT_USER_AGENT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("# comment\nMailinator.com\n\nyopmail.com\n"),
            )
            .mount(&server)
            .await;

        let source = HttpBlocklistSource::new(format!("{}/list.txt", server.uri()), client());
        let domains = source.fetch().await.unwrap();

        assert_eq!(domains, vec!["mailinator.com", "yopmail.com"]);
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = HttpBlocklistSource::new(format!("{}/missing.txt", server.uri()), client());
        let result = source.fetch().await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }
}
