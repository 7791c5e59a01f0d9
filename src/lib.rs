//! Typed Rust client for the SMSLink bulk SMS gateway.
//!
//! Messages are collected into a [`BulkPackage`], encoded as `;`-delimited
//! records, optionally compressed, stamped with MD5 digests and uploaded in a
//! single multipart request. The gateway's reply is decoded into per-message
//! outcomes stored on the package.
//!
//! The crate is layered: a domain layer of strong types, a transport layer for
//! the wire format, and a small client layer orchestrating the upload.
//!
//! ```rust,no_run
//! use smslink_bulk::{BulkError, BulkPackage, SmsLinkClient, UnixTimestamp};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SmsLinkClient::from_credentials("connection-id", "password", true)?;
//!
//!     let mut package = BulkPackage::new();
//!     package.insert_message("1", "0722123456", "numeric", "hello", UnixTimestamp::IMMEDIATE)?;
//!
//!     match client.send_package(&mut package).await {
//!         Ok(package_id) => println!("queued as {package_id}"),
//!         Err(BulkError::Gateway { response }) => eprintln!("refused: {response}"),
//!         Err(err) => return Err(err.into()),
//!     }
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    Auth, BulkError, ClientConfig, ConfigurationError, DEFAULT_HTTP_ENDPOINT,
    DEFAULT_HTTPS_ENDPOINT, DEFAULT_TIMEOUT, SmsLinkClient, SmsLinkClientBuilder,
};
pub use domain::{
    BulkPackage, CompressionMethod, ConnectionId, KnownMessageStatus, LocalMessageId,
    MessageEntry, MessageOutcome, MessageStatus, MessageText, PackageStatus, Password, Protocol,
    ReceiverNumber, RemoteMessageId, RemotePackageId, SenderId, StateError, TransmissionResult,
    UnixTimestamp, ValidationError,
};
pub use transport::{
    CompressionError, PayloadArtifact, build_payload, compress, encode_payload, encode_record,
    md5_hex,
};
