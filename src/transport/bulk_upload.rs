use std::collections::BTreeMap;

use super::payload::PayloadArtifact;
use super::record::FIELD_DELIMITER;
use crate::domain::{
    CompressionMethod, LocalMessageId, MessageOutcome, MessageStatus, RemoteMessageId,
    RemotePackageId, UnixTimestamp,
};

/// Bulk protocol client version announced in the `Version` field.
pub const CLIENT_VERSION: &str = "2";
/// Multipart field carrying the (compressed) package.
pub const PACKAGE_FIELD: &str = "Package";
pub const PACKAGE_FILE_NAME: &str = "sms-package";

const SUCCESS_MARKER: &str = "MESSAGE";
const MIN_FIELDS: usize = 3;
const PACKAGE_ID_INDEX: usize = 3;
const MESSAGES_INDEX: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("expected at least {MIN_FIELDS} `;`-separated fields, got {actual}")]
    TooFewFields { actual: usize },

    #[error("accepted response has no field {index}")]
    MissingField { index: usize },

    #[error("invalid remote package id: {value:?}")]
    InvalidPackageId { value: String },

    #[error("malformed message entry {entry:?}: expected `local:remote:status`")]
    MalformedEntry { entry: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BulkReply {
    /// The gateway queued the package.
    Accepted {
        package_id: RemotePackageId,
        outcomes: BTreeMap<LocalMessageId, MessageOutcome>,
    },
    /// The gateway answered with its own error payload, kept verbatim.
    Rejected { response: String },
}

/// Form fields of the upload, credentials and the package file part excluded.
pub fn encode_bulk_upload_form(
    payload: &PayloadArtifact,
    receivers: usize,
    test_mode: bool,
    timestamp: UnixTimestamp,
) -> Vec<(String, String)> {
    vec![
        ("test".to_owned(), flag(test_mode)),
        (
            CompressionMethod::FIELD.to_owned(),
            payload.compression.id().to_string(),
        ),
        ("MD5Plain".to_owned(), payload.md5_plain.clone()),
        ("MD5Compressed".to_owned(), payload.md5_compressed.clone()),
        ("SizePlain".to_owned(), payload.plain.len().to_string()),
        (
            "SizeCompressed".to_owned(),
            payload.compressed.len().to_string(),
        ),
        ("Timestamp".to_owned(), timestamp.to_string()),
        ("Buffering".to_owned(), flag(true)),
        ("Version".to_owned(), CLIENT_VERSION.to_owned()),
        ("Receivers".to_owned(), receivers.to_string()),
    ]
}

/// Parse the `;`-delimited gateway reply.
///
/// Accepted replies look like `MESSAGE;<code>;<text>;<package id>;<l:r:s>,<l:r:s>...`.
/// Every triple must parse, otherwise the whole reply is rejected. Triples are
/// recorded as returned, whether or not the local id is still in the package.
pub fn decode_bulk_response(body: &str) -> Result<BulkReply, TransportError> {
    let fields = body.split(FIELD_DELIMITER).collect::<Vec<_>>();
    if fields.len() < MIN_FIELDS {
        return Err(TransportError::TooFewFields {
            actual: fields.len(),
        });
    }

    if fields[0].trim() != SUCCESS_MARKER {
        return Ok(BulkReply::Rejected {
            response: body.to_owned(),
        });
    }

    let package_id = field(&fields, PACKAGE_ID_INDEX)?;
    let package_id = package_id
        .parse::<u64>()
        .map(RemotePackageId::new)
        .map_err(|_| TransportError::InvalidPackageId {
            value: package_id.to_owned(),
        })?;

    let messages = field(&fields, MESSAGES_INDEX)?;
    let outcomes = if messages.is_empty() {
        BTreeMap::new()
    } else {
        messages
            .split(',')
            .map(decode_outcome)
            .collect::<Result<BTreeMap<_, _>, _>>()?
    };

    Ok(BulkReply::Accepted {
        package_id,
        outcomes,
    })
}

fn flag(on: bool) -> String {
    String::from(if on { "1" } else { "0" })
}

fn field<'a>(fields: &[&'a str], index: usize) -> Result<&'a str, TransportError> {
    fields
        .get(index)
        .map(|value| value.trim())
        .ok_or(TransportError::MissingField { index })
}

fn decode_outcome(entry: &str) -> Result<(LocalMessageId, MessageOutcome), TransportError> {
    let malformed = || TransportError::MalformedEntry {
        entry: entry.to_owned(),
    };

    let parts = entry.split(':').map(str::trim).collect::<Vec<_>>();
    let [local, remote, status] = parts.as_slice() else {
        return Err(malformed());
    };

    let local_id = LocalMessageId::parse(local).map_err(|_| malformed())?;
    let remote_message_id = remote
        .parse::<u64>()
        .map(RemoteMessageId::new)
        .map_err(|_| malformed())?;
    let status = status
        .parse::<i32>()
        .map(MessageStatus::new)
        .map_err(|_| malformed())?;

    Ok((
        local_id,
        MessageOutcome {
            remote_message_id,
            status,
        },
    ))
}
