//! External structured-data validators.

use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use ldgraph_shared::{LdGraphError, Result, ValidatorEndpoint};

/// Verdict returned by an external validator for one URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalVerdict {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// A third-party checker that validates a published page by URL.
pub trait ExternalValidator: Send + Sync {
    /// Short name used in report findings.
    fn name(&self) -> &str;

    fn submit(&self, url: &str) -> impl Future<Output = Result<ExternalVerdict>> + Send;
}

/// Validator reached through a JSON endpoint: `POST {"url": ...}` answered
/// with an [`ExternalVerdict`] body.
#[derive(Debug, Clone)]
pub struct HttpValidator {
    name: String,
    endpoint: Url,
    client: Client,
}

impl HttpValidator {
    pub fn new(endpoint: &ValidatorEndpoint, timeout_secs: u64) -> Result<Self> {
        let url = Url::parse(&endpoint.endpoint).map_err(|e| {
            LdGraphError::config(format!(
                "validator '{}' has an invalid endpoint '{}': {e}",
                endpoint.name, endpoint.endpoint
            ))
        })?;

        Ok(Self {
            name: endpoint.name.clone(),
            endpoint: url,
            client: crate::build_client(timeout_secs)?,
        })
    }

    /// Build one validator per configured endpoint.
    pub fn from_config(endpoints: &[ValidatorEndpoint], timeout_secs: u64) -> Result<Vec<Self>> {
        endpoints
            .iter()
            .map(|endpoint| Self::new(endpoint, timeout_secs))
            .collect()
    }
}

impl ExternalValidator for HttpValidator {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(validator = %self.name, url = %url))]
    async fn submit(&self, url: &str) -> Result<ExternalVerdict> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .map_err(|e| LdGraphError::Network(format!("{}: {e}", self.name)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LdGraphError::Network(format!("{}: HTTP {status}", self.name)));
        }

        let verdict: ExternalVerdict = response.json().await.map_err(|e| {
            LdGraphError::Network(format!("{}: unreadable verdict: {e}", self.name))
        })?;

        debug!(
            valid = verdict.valid,
            errors = verdict.errors.len(),
            warnings = verdict.warnings.len(),
            "external verdict"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(uri: &str) -> ValidatorEndpoint {
        ValidatorEndpoint {
            name: "rich-results".into(),
            endpoint: format!("{uri}/check"),
        }
    }

    #[tokio::test]
    async fn submits_url_and_parses_verdict() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/check"))
            .and(wiremock::matchers::body_json(
                serde_json::json!({ "url": "https://x.test/blog/a" }),
            ))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "valid": false,
                "errors": ["Missing field \"image\""],
                "warnings": []
            })))
            .mount(&server)
            .await;

        let validator = HttpValidator::new(&endpoint(&server.uri()), 5).unwrap();
        let verdict = validator.submit("https://x.test/blog/a").await.unwrap();
        assert_eq!(validator.name(), "rich-results");
        assert!(!verdict.valid);
        assert_eq!(verdict.errors, vec!["Missing field \"image\"".to_string()]);
        assert!(verdict.warnings.is_empty());
    }

    #[tokio::test]
    async fn missing_verdict_fields_default() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({ "valid": true })),
            )
            .mount(&server)
            .await;

        let validator = HttpValidator::new(&endpoint(&server.uri()), 5).unwrap();
        let verdict = validator.submit("https://x.test/blog/a").await.unwrap();
        assert!(verdict.valid);
        assert!(verdict.errors.is_empty());
    }

    #[tokio::test]
    async fn http_failure_is_an_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let validator = HttpValidator::new(&endpoint(&server.uri()), 5).unwrap();
        let err = validator.submit("https://x.test/blog/a").await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[test]
    fn invalid_endpoint_is_config_error() {
        let bad = ValidatorEndpoint {
            name: "broken".into(),
            endpoint: "not a url".into(),
        };
        let err = HttpValidator::new(&bad, 5).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
