//! Client layer: orchestrates transport calls and maps transport ↔ domain.

mod config;

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

pub use config::{ClientConfig, DEFAULT_HTTP_ENDPOINT, DEFAULT_HTTPS_ENDPOINT, DEFAULT_TIMEOUT};

use crate::domain::{
    BulkPackage, ConnectionId, LocalMessageId, MessageOutcome, Password, Protocol,
    RemotePackageId, StateError, UnixTimestamp, ValidationError,
};
use crate::transport::{BulkReply, CompressionError, PACKAGE_FIELD, PACKAGE_FILE_NAME};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
type Outcomes = BTreeMap<LocalMessageId, MessageOutcome>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

/// Multipart body: plain text fields followed by one file part.
#[derive(Debug, Clone)]
struct MultipartUpload {
    fields: Vec<(String, String)>,
    file_field: &'static str,
    file_name: &'static str,
    file: Vec<u8>,
}

trait HttpTransport: Send + Sync {
    fn post_multipart<'a>(
        &'a self,
        url: &'a str,
        upload: MultipartUpload,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_multipart<'a>(
        &'a self,
        url: &'a str,
        upload: MultipartUpload,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let mut form = reqwest::multipart::Form::new();
            for (name, value) in upload.fields {
                form = form.text(name, value);
            }
            let file = reqwest::multipart::Part::bytes(upload.file)
                .file_name(upload.file_name)
                .mime_str("application/octet-stream")?;
            form = form.part(upload.file_field, file);

            let response = self.client.post(url).multipart(form).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// Gateway credentials (`connection_id` + `password`).
pub struct Auth {
    connection_id: ConnectionId,
    password: Password,
}

impl Auth {
    /// Validate that the connection id is non-empty after trimming and the password is
    /// non-empty.
    pub fn new(
        connection_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            connection_id: ConnectionId::new(connection_id)?,
            password: Password::new(password)?,
        })
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    fn push_form_params(&self, params: &mut Vec<(String, String)>) {
        params.push((
            ConnectionId::FIELD.to_owned(),
            self.connection_id.as_str().to_owned(),
        ));
        params.push((Password::FIELD.to_owned(), self.password.as_str().to_owned()));
    }
}

#[derive(Debug, thiserror::Error)]
/// Problems with how the client is set up, as opposed to a single send.
pub enum ConfigurationError {
    /// Connection id or password missing.
    #[error("invalid credentials: {0}")]
    Credentials(#[from] ValidationError),

    #[error("invalid endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// The selected compression method was compiled out of this build.
    #[error("compression unavailable: {0}")]
    CompressionUnavailable(#[source] CompressionError),

    #[error("cannot build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SmsLinkClient::send_package`].
///
/// Every variant except [`BulkError::State`] is also recorded on the package as
/// [`TransmissionResult::error_message`](crate::TransmissionResult::error_message),
/// rendered by [`BulkError::wire_message`].
pub enum BulkError {
    /// Empty or already sent package. Nothing was attempted.
    #[error("package cannot be sent: {0}")]
    State(#[from] StateError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("compression error: {0}")]
    Compression(#[source] CompressionError),

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// The gateway refused the package; `response` is its reply, verbatim.
    #[error("gateway error: {response}")]
    Gateway { response: String },
}

impl BulkError {
    /// Render the error in the gateway's own `ERROR;<code>;<text>` shape.
    ///
    /// Gateway replies are returned unchanged; locally detected failures use code `0`.
    pub fn wire_message(&self) -> String {
        match self {
            Self::Gateway { response } => response.clone(),
            Self::HttpStatus { status, .. } => format!("ERROR;0;Unexpected HTTP code {status}"),
            Self::Parse(source) => format!("ERROR;0;Unexpected response format: {source}"),
            Self::Transport(source) => format!("ERROR;0;{source}"),
            Self::Compression(source) => format!("ERROR;0;{source}"),
            Self::Configuration(source) => format!("ERROR;0;{source}"),
            Self::State(source) => format!("ERROR;0;{source}"),
        }
    }
}

impl From<CompressionError> for BulkError {
    fn from(err: CompressionError) -> Self {
        match err {
            CompressionError::Unavailable { .. } => {
                Self::Configuration(ConfigurationError::CompressionUnavailable(err))
            }
            CompressionError::Io { .. } => Self::Compression(err),
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`SmsLinkClient`].
///
/// Use this when you need test mode, plain HTTP, custom endpoints, a different
/// timeout, or strict certificate validation.
pub struct SmsLinkClientBuilder {
    auth: Auth,
    config: ClientConfig,
}

impl SmsLinkClientBuilder {
    /// Create a builder with [`ClientConfig::default`].
    pub fn new(auth: Auth) -> Self {
        Self {
            auth,
            config: ClientConfig::default(),
        }
    }

    /// Replace the whole configuration, e.g. one loaded from a file.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn test_mode(mut self, test_mode: bool) -> Self {
        self.config.test_mode = test_mode;
        self
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// Override the plain HTTP endpoint URL.
    pub fn http_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.http_endpoint = endpoint.into();
        self
    }

    /// Override the HTTPS endpoint URL.
    pub fn https_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.https_endpoint = endpoint.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Wait for the gateway without any deadline.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`SmsLinkClient`].
    pub fn build(self) -> Result<SmsLinkClient, ConfigurationError> {
        self.config.validate()?;

        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(self.config.accept_invalid_certs);
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.config.user_agent.as_deref() {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build().map_err(ConfigurationError::HttpClient)?;

        Ok(SmsLinkClient {
            auth: self.auth,
            config: self.config,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// Client for the SMSLink bulk gateway.
///
/// A client uploads [`BulkPackage`]s: each call to [`SmsLinkClient::send_package`]
/// performs exactly one multipart POST and records the outcome on the package.
/// There are no retries.
pub struct SmsLinkClient {
    auth: Auth,
    config: ClientConfig,
    http: Arc<dyn HttpTransport>,
}

impl SmsLinkClient {
    /// Create a client with the default configuration.
    pub fn new(auth: Auth) -> Result<Self, ConfigurationError> {
        SmsLinkClientBuilder::new(auth).build()
    }

    /// Validate raw credentials and create a client, optionally in test mode.
    pub fn from_credentials(
        connection_id: impl Into<String>,
        password: impl Into<String>,
        test_mode: bool,
    ) -> Result<Self, ConfigurationError> {
        let auth = Auth::new(connection_id, password)?;
        SmsLinkClientBuilder::new(auth).test_mode(test_mode).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(auth: Auth) -> SmsLinkClientBuilder {
        SmsLinkClientBuilder::new(auth)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn protocol(&self) -> Protocol {
        self.config.protocol
    }

    /// Switch between the HTTP and HTTPS endpoints for subsequent sends.
    pub fn set_protocol(&mut self, protocol: Protocol) {
        self.config.protocol = protocol;
    }

    /// Upload `package` and record the outcome on it.
    ///
    /// An empty or already sent package fails with [`BulkError::State`] before
    /// anything else happens; its previous result is left untouched. Otherwise
    /// the previous outcomes and error are cleared and either:
    /// - the gateway accepts the package: it becomes
    ///   [`PackageStatus::Sent`](crate::PackageStatus::Sent) and its result holds the
    ///   remote package id, per-message outcomes and elapsed seconds, or
    /// - the attempt fails: the package stays open and its result holds
    ///   [`BulkError::wire_message`].
    #[instrument(
        skip_all,
        fields(receivers = package.len(), compression = %package.compression())
    )]
    pub async fn send_package(
        &self,
        package: &mut BulkPackage,
    ) -> Result<RemotePackageId, BulkError> {
        package.ensure_sendable()?;

        let started = Instant::now();
        package.begin_attempt();

        match self.upload(package).await {
            Ok((package_id, outcomes)) => {
                let elapsed = started.elapsed().as_secs_f64();
                info!(
                    remote_package_id = package_id.value(),
                    messages = outcomes.len(),
                    elapsed_seconds = elapsed,
                    "bulk package accepted"
                );
                package.record_success(package_id, outcomes, elapsed);
                Ok(package_id)
            }
            Err(err) => {
                warn!(error = %err, "bulk package upload failed");
                package.record_failure(err.wire_message());
                Err(err)
            }
        }
    }

    async fn upload(
        &self,
        package: &BulkPackage,
    ) -> Result<(RemotePackageId, Outcomes), BulkError> {
        let payload = crate::transport::build_payload(package)?;
        let timestamp = UnixTimestamp::now();
        let url = self.config.upload_url(timestamp)?;

        let mut fields = Vec::<(String, String)>::new();
        self.auth.push_form_params(&mut fields);
        fields.extend(crate::transport::encode_bulk_upload_form(
            &payload,
            package.len(),
            self.config.test_mode,
            timestamp,
        ));

        debug!(
            protocol = %self.config.protocol,
            size_plain = payload.plain.len(),
            size_compressed = payload.compressed.len(),
            md5_plain = %payload.md5_plain,
            test_mode = self.config.test_mode,
            "uploading bulk package"
        );

        let upload = MultipartUpload {
            fields,
            file_field: PACKAGE_FIELD,
            file_name: PACKAGE_FILE_NAME,
            file: payload.compressed,
        };
        let response = self
            .http
            .post_multipart(url.as_str(), upload)
            .await
            .map_err(BulkError::Transport)?;

        if !(200..=299).contains(&response.status) {
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(BulkError::HttpStatus {
                status: response.status,
                body,
            });
        }

        let reply = crate::transport::decode_bulk_response(&response.body)
            .map_err(|err| BulkError::Parse(Box::new(err)))?;

        match reply {
            BulkReply::Accepted {
                package_id,
                outcomes,
            } => Ok((package_id, outcomes)),
            BulkReply::Rejected { response } => Err(BulkError::Gateway { response }),
        }
    }
}
