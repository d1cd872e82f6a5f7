/*!
 * Ranger Client
 * Blocking policy fetch from the external authority
 */

use crate::ranger::config::RangerConfig;
use log::debug;
use std::fs;
use thiserror::Error;

/// Errors raised by a policy fetch.
#[derive(Debug, Error)]
pub enum RangerError {
    #[error("invalid ranger configuration: {0}")]
    Config(String),

    #[error("failed to read TLS material: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for a Ranger-compatible policy authority.
pub struct RangerClient {
    config: RangerConfig,
}

impl RangerClient {
    pub fn new(config: RangerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RangerConfig {
        &self.config
    }

    /// Target URL for the policy listing: base URL joined with the listing
    /// path, with `serviceName` appended to the query string.
    pub(crate) fn policies_url(&self) -> String {
        let mut url = self.config.base_url.clone();
        if !self.config.policies_path.is_empty() {
            if url.ends_with('/') && self.config.policies_path.starts_with('/') {
                url.pop();
            }
            url.push_str(&self.config.policies_path);
        }
        if url.contains('?') {
            url.push('&');
        } else {
            url.push('?');
        }
        url.push_str("serviceName=");
        url.push_str(&self.config.service_name);
        url
    }

    fn build_client(&self) -> Result<reqwest::blocking::Client, RangerError> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(self.config.request_timeout)
            .connect_timeout(self.config.connect_timeout)
            .user_agent(concat!("authgov/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!self.config.tls_verify);

        if let Some(ca) = &self.config.ca_cert_path {
            let pem = fs::read(ca)?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
        }

        match (&self.config.client_cert_path, &self.config.client_key_path) {
            (Some(cert), Some(key)) => {
                // rustls wants cert and key in one PEM bundle
                let mut pem = fs::read(cert)?;
                pem.extend_from_slice(&fs::read(key)?);
                builder = builder.identity(reqwest::Identity::from_pem(&pem)?);
            }
            (None, None) => {}
            _ => {
                return Err(RangerError::Config(
                    "mutual TLS requires both client_cert_path and client_key_path".to_string(),
                ));
            }
        }

        Ok(builder.build()?)
    }

    /// Fetch the policy listing for the configured service.
    ///
    /// Performs a single synchronous GET under the configured TLS and timeout
    /// settings and returns the parsed JSON document of a 2xx response. Any
    /// transport failure or non-2xx status is an error carrying a diagnostic;
    /// retrying within [`RangerConfig::retry_count`] is the caller's job.
    /// Blocking: drive this from a background task, never from the
    /// request-serving path.
    pub fn fetch_policies(&self) -> Result<serde_json::Value, RangerError> {
        let url = self.policies_url();
        debug!("fetching ranger policies from {}", url);

        let client = self.build_client()?;
        let mut request = client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.config.bearer_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(RangerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str, path: &str) -> RangerClient {
        let mut config = RangerConfig::new(base_url, "themis");
        config.policies_path = path.to_string();
        RangerClient::new(config)
    }

    #[test]
    fn test_url_joins_slash_seam() {
        let c = client("https://ranger.internal:6182/", "/service/plugins/policies");
        assert_eq!(
            c.policies_url(),
            "https://ranger.internal:6182/service/plugins/policies?serviceName=themis"
        );
    }

    #[test]
    fn test_url_without_trailing_slash() {
        let c = client("https://ranger.internal:6182", "/service/plugins/policies");
        assert_eq!(
            c.policies_url(),
            "https://ranger.internal:6182/service/plugins/policies?serviceName=themis"
        );
    }

    #[test]
    fn test_url_appends_to_existing_query() {
        let c = client("https://ranger.internal:6182", "/policies?format=json");
        assert_eq!(
            c.policies_url(),
            "https://ranger.internal:6182/policies?format=json&serviceName=themis"
        );
    }

    #[test]
    fn test_url_with_empty_path() {
        let c = client("https://ranger.internal:6182", "");
        assert_eq!(
            c.policies_url(),
            "https://ranger.internal:6182?serviceName=themis"
        );
    }

    #[test]
    fn test_mtls_requires_both_halves() {
        let mut config = RangerConfig::new("https://ranger.internal", "themis");
        config.client_cert_path = Some("client.pem".into());
        let c = RangerClient::new(config);
        assert!(matches!(c.build_client(), Err(RangerError::Config(_))));
    }
}
