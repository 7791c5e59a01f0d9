//! Client configuration.
//!
//! [`ClientConfig`] holds everything except credentials, so it can be loaded
//! from a configuration file with `serde` and combined with secrets obtained
//! elsewhere:
//!
//! ```
//! use smslink_bulk::{ClientConfig, Protocol};
//!
//! let config = ClientConfig {
//!     test_mode: true,
//!     protocol: Protocol::Https,
//!     ..ClientConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::ConfigurationError;
use crate::domain::{Protocol, UnixTimestamp};

pub const DEFAULT_HTTP_ENDPOINT: &str = "http://www.smslink.ro/sms/gateway/communicate/bulk-v3.php";
pub const DEFAULT_HTTPS_ENDPOINT: &str =
    "https://secure.smslink.ro/sms/gateway/communicate/bulk-v3.php";

/// Default ceiling for the whole upload (connect, send, read reply).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Ask the gateway to validate the package without delivering it.
    pub test_mode: bool,
    /// Which of the two endpoints to call.
    pub protocol: Protocol,
    pub http_endpoint: String,
    pub https_endpoint: String,
    /// `None` waits for the gateway indefinitely.
    pub timeout: Option<Duration>,
    /// Skip TLS certificate validation. On by default for compatibility with
    /// older gateway deployments.
    pub accept_invalid_certs: bool,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            test_mode: false,
            protocol: Protocol::Https,
            http_endpoint: DEFAULT_HTTP_ENDPOINT.to_owned(),
            https_endpoint: DEFAULT_HTTPS_ENDPOINT.to_owned(),
            timeout: Some(DEFAULT_TIMEOUT),
            accept_invalid_certs: true,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Check that both endpoints are absolute URLs.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        parse_endpoint(&self.http_endpoint)?;
        parse_endpoint(&self.https_endpoint)?;
        Ok(())
    }

    /// Endpoint used for `protocol`.
    pub fn endpoint(&self, protocol: Protocol) -> &str {
        match protocol {
            Protocol::Http => &self.http_endpoint,
            Protocol::Https => &self.https_endpoint,
        }
    }

    /// Endpoint for the configured protocol, with `?timestamp=<unix>` appended.
    pub(crate) fn upload_url(&self, timestamp: UnixTimestamp) -> Result<Url, ConfigurationError> {
        let mut url = parse_endpoint(self.endpoint(self.protocol))?;
        url.query_pairs_mut()
            .append_pair("timestamp", &timestamp.to_string());
        Ok(url)
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigurationError> {
    Url::parse(endpoint).map_err(|source| ConfigurationError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_secure_gateway() {
        let config = ClientConfig::default();
        assert_eq!(config.protocol, Protocol::Https);
        assert_eq!(config.endpoint(Protocol::Https), DEFAULT_HTTPS_ENDPOINT);
        assert_eq!(config.endpoint(Protocol::Http), DEFAULT_HTTP_ENDPOINT);
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn upload_url_carries_timestamp_query() {
        let config = ClientConfig {
            protocol: Protocol::Http,
            ..ClientConfig::default()
        };
        let url = config.upload_url(UnixTimestamp::new(1_700_000_000)).unwrap();
        assert_eq!(
            url.as_str(),
            "http://www.smslink.ro/sms/gateway/communicate/bulk-v3.php?timestamp=1700000000"
        );
    }

    #[test]
    fn invalid_endpoint_is_a_configuration_error() {
        let config = ClientConfig {
            https_endpoint: "not a url".to_owned(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn deserializes_partial_config_with_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{ "test_mode": true, "protocol": "HTTP", "timeout": null }"#,
        )
        .unwrap();
        assert!(config.test_mode);
        assert_eq!(config.protocol, Protocol::Http);
        assert_eq!(config.timeout, None);
        assert_eq!(config.https_endpoint, DEFAULT_HTTPS_ENDPOINT);
        assert!(config.accept_invalid_certs);
    }
}
