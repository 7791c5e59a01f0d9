use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::domain::response::{MessageOutcome, TransmissionResult};
use crate::domain::validation::ValidationError;
use crate::domain::value::{
    CompressionMethod, LocalMessageId, MessageText, ReceiverNumber, RemotePackageId, SenderId,
    UnixTimestamp,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One outbound SMS inside a [`BulkPackage`].
pub struct MessageEntry {
    local_id: LocalMessageId,
    receiver: ReceiverNumber,
    sender_id: SenderId,
    text: MessageText,
    scheduled_at: UnixTimestamp,
}

impl MessageEntry {
    /// Build an entry scheduled for immediate delivery.
    pub fn new(
        local_id: LocalMessageId,
        receiver: ReceiverNumber,
        sender_id: SenderId,
        text: MessageText,
    ) -> Self {
        Self {
            local_id,
            receiver,
            sender_id,
            text,
            scheduled_at: UnixTimestamp::IMMEDIATE,
        }
    }

    /// Deliver at `at` instead of immediately.
    pub fn scheduled_at(mut self, at: UnixTimestamp) -> Self {
        self.scheduled_at = at;
        self
    }

    pub fn local_id(&self) -> LocalMessageId {
        self.local_id
    }

    pub fn receiver(&self) -> &ReceiverNumber {
        &self.receiver
    }

    pub fn sender_id(&self) -> &SenderId {
        &self.sender_id
    }

    pub fn text(&self) -> &MessageText {
        &self.text
    }

    pub fn schedule(&self) -> UnixTimestamp {
        self.scheduled_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
/// Lifecycle of a [`BulkPackage`]. `Sent` is terminal.
pub enum PackageStatus {
    #[default]
    Open,
    Sent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Operation refused because of the package lifecycle.
pub enum StateError {
    /// The package was already accepted by the gateway.
    AlreadySent,
    /// There is nothing to send.
    Empty,
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadySent => f.write_str("package was already sent"),
            Self::Empty => f.write_str("package contains no messages"),
        }
    }
}

impl std::error::Error for StateError {}

#[derive(Debug, Clone, Default)]
/// In-memory batch of messages uploaded to the gateway in a single request.
///
/// Entries keep their insertion order, which is also the record order of the
/// uploaded payload. After a successful send the package is locked: the
/// compression method can no longer change and further sends are refused.
/// Inserting or removing entries stays possible.
pub struct BulkPackage {
    entries: Vec<MessageEntry>,
    status: PackageStatus,
    compression: CompressionMethod,
    result: TransmissionResult,
}

impl BulkPackage {
    /// Create an empty, open package using the default compression ([`CompressionMethod::Zlib`]).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty, open package with a specific compression method.
    pub fn with_compression(compression: CompressionMethod) -> Self {
        Self {
            compression,
            ..Self::default()
        }
    }

    /// Validate raw values and append a message.
    ///
    /// `local_id` must be a decimal number and `receiver` must contain at least one
    /// digit once formatting characters are stripped. On error the package is unchanged.
    pub fn insert_message(
        &mut self,
        local_id: &str,
        receiver: &str,
        sender_id: &str,
        text: &str,
        scheduled_at: UnixTimestamp,
    ) -> Result<(), ValidationError> {
        let local_id = LocalMessageId::parse(local_id)?;
        let receiver = ReceiverNumber::new(receiver)?;
        let entry = MessageEntry::new(
            local_id,
            receiver,
            SenderId::new(sender_id),
            MessageText::new(text),
        )
        .scheduled_at(scheduled_at);
        self.insert(entry);
        Ok(())
    }

    /// Append an already validated entry.
    pub fn insert(&mut self, entry: MessageEntry) {
        self.entries.push(entry);
    }

    /// Remove every entry carrying `local_id`. Returns how many were removed.
    pub fn remove_message(&mut self, local_id: LocalMessageId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.local_id != local_id);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn status(&self) -> PackageStatus {
        self.status
    }

    pub fn compression(&self) -> CompressionMethod {
        self.compression
    }

    /// Change the compression method. Refused once the package was sent.
    pub fn set_compression(&mut self, method: CompressionMethod) -> Result<(), StateError> {
        if self.status == PackageStatus::Sent {
            return Err(StateError::AlreadySent);
        }
        self.compression = method;
        Ok(())
    }

    /// Outcome of the last send attempt that reached the network stage.
    pub fn result(&self) -> &TransmissionResult {
        &self.result
    }

    pub(crate) fn ensure_sendable(&self) -> Result<(), StateError> {
        if self.status != PackageStatus::Open {
            return Err(StateError::AlreadySent);
        }
        if self.entries.is_empty() {
            return Err(StateError::Empty);
        }
        Ok(())
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.result.remote_message_ids.clear();
        self.result.error_message = None;
    }

    pub(crate) fn record_failure(&mut self, message: String) {
        self.result.error_message = Some(message);
    }

    pub(crate) fn record_success(
        &mut self,
        remote_package_id: RemotePackageId,
        outcomes: BTreeMap<LocalMessageId, MessageOutcome>,
        elapsed_seconds: f64,
    ) {
        self.result = TransmissionResult {
            remote_package_id: Some(remote_package_id),
            remote_message_ids: outcomes,
            error_message: None,
            elapsed_seconds: Some(round_centis(elapsed_seconds)),
        };
        self.status = PackageStatus::Sent;
    }
}

fn round_centis(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}
