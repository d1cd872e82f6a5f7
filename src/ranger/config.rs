/*!
 * Ranger Client Configuration
 * Connection, authentication, TLS, and retry-budget settings
 */

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for [`RangerClient`](crate::ranger::RangerClient).
///
/// `retry_count` and `retry_backoff` are a budget for the calling layer:
/// [`fetch_policies`](crate::ranger::RangerClient::fetch_policies) performs
/// exactly one attempt, and the background sync task is expected to retry
/// failed fetches with exponential backoff up to this budget.
#[derive(Debug, Clone)]
pub struct RangerConfig {
    /// Base URL of the policy authority, e.g. `https://ranger.internal:6182`.
    pub base_url: String,
    /// Policy-listing path joined onto the base URL.
    pub policies_path: String,
    /// Service name passed as the `serviceName` query parameter.
    pub service_name: String,
    /// Bearer token attached as `Authorization: Bearer ...` when set.
    pub bearer_token: Option<String>,
    /// Verify the server certificate. Disable only against test instances.
    pub tls_verify: bool,
    /// Custom trust anchor (PEM) for private CAs.
    pub ca_cert_path: Option<PathBuf>,
    /// Client certificate (PEM) for mutual TLS; requires `client_key_path`.
    pub client_cert_path: Option<PathBuf>,
    /// Client private key (PEM) for mutual TLS; requires `client_cert_path`.
    pub client_key_path: Option<PathBuf>,
    /// TCP connect budget.
    pub connect_timeout: Duration,
    /// Whole-request budget, connect included.
    pub request_timeout: Duration,
    /// Retry budget for the calling layer.
    pub retry_count: u32,
    /// Exponential backoff base for the calling layer.
    pub retry_backoff: Duration,
}

impl Default for RangerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            policies_path: "/service/plugins/policies".to_string(),
            service_name: String::new(),
            bearer_token: None,
            tls_verify: true,
            ca_cert_path: None,
            client_cert_path: None,
            client_key_path: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            retry_count: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl RangerConfig {
    /// Minimal configuration for a given authority and service.
    pub fn new(base_url: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_name: service_name.into(),
            ..Self::default()
        }
    }
}
