use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMSLink gateway connection id.
///
/// Invariant: non-empty after trimming.
pub struct ConnectionId(String);

impl ConnectionId {
    /// Multipart field name used by the bulk gateway (`connection_id`).
    pub const FIELD: &'static str = "connection_id";

    /// Create a validated [`ConnectionId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated connection id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// SMSLink gateway connection password.
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
pub struct Password(String);

impl Password {
    /// Multipart field name used by the bulk gateway (`password`).
    pub const FIELD: &'static str = "password";

    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Caller-assigned message id, echoed back by the gateway in its reply.
pub struct LocalMessageId(u64);

impl LocalMessageId {
    pub const FIELD: &'static str = "local_message_id";

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Parse a decimal id. Surrounding whitespace is ignored; signs, fractions and
    /// exponents are rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::NotNumeric {
                field: Self::FIELD,
                input: input.to_owned(),
            });
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ValidationError::NotNumeric {
                field: Self::FIELD,
                input: input.to_owned(),
            })
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for LocalMessageId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for LocalMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
/// Destination phone number reduced to its digits.
///
/// Both national (`07xxxxxxxx`) and international (`00` + country code) formats are
/// accepted as-is; formatting characters such as `+`, spaces or dashes are dropped.
///
/// Invariant: non-empty, ASCII digits only.
pub struct ReceiverNumber(String);

impl ReceiverNumber {
    pub const FIELD: &'static str = "receiver_number";

    /// Strip every non-digit character and validate that something remains.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let digits: String = value.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(ValidationError::InvalidReceiverNumber { input: value });
        }
        Ok(Self(digits))
    }

    /// Digits as written into the package record.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
/// Sender label (`numeric`, a shortcode, or an alphanumeric sender approved for the
/// account).
///
/// Passed through unchanged; the gateway decides whether it is usable.
pub struct SenderId(String);

impl SenderId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SenderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
/// Message body sanitized for the `;`-delimited package record.
///
/// Invariants: contains no raw `;`, `\n`, `\r` or `\t`, and is at most
/// [`MessageText::MAX_CHARS`] characters long.
pub struct MessageText(String);

impl MessageText {
    /// Upper bound on the body length, in characters. Longer input is truncated to at
    /// most this many; a cut that would split a `%0A` or `%3B` escape drops the whole
    /// escape, leaving 158 or 159 characters.
    pub const MAX_CHARS: usize = 160;

    const ESCAPES: [(&'static str, &'static str); 2] = [("\n", "%0A"), (";", "%3B")];

    /// Sanitize raw text. Never fails: structural characters are escaped, tab and
    /// carriage return are removed, and overlong text is truncated.
    pub fn new(value: impl AsRef<str>) -> Self {
        let mut text = value.as_ref().trim().replace("\r\n", "\n");
        for (raw, escaped) in Self::ESCAPES {
            text = text.replace(raw, escaped);
        }
        text.retain(|c| !matches!(c, '\t' | '\r'));
        Self(truncate_chars(text, Self::MAX_CHARS))
    }

    /// Borrow the sanitized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters after sanitization.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

/// Cut `text` to `max` characters without leaving half of a `%0A` / `%3B` escape behind.
fn truncate_chars(mut text: String, max: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max) else {
        return text;
    };

    let mut end = cut;
    for back in 1..=2 {
        let Some(start) = cut.checked_sub(back) else {
            break;
        };
        if !text.is_char_boundary(start) {
            continue;
        }
        let tail = &text[start..];
        if MessageText::ESCAPES
            .iter()
            .any(|(_, escaped)| tail.starts_with(escaped))
        {
            end = start;
            break;
        }
    }

    text.truncate(end);
    text
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
/// Unix timestamp in seconds.
///
/// `0` schedules a message for immediate delivery.
pub struct UnixTimestamp(u64);

impl UnixTimestamp {
    /// Send as soon as the gateway processes the package.
    pub const IMMEDIATE: Self = Self(0);

    /// Create a timestamp value (no range validation is performed).
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Current wall-clock time. A clock set before 1970 yields `0`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        Self(secs)
    }

    /// Get the underlying timestamp in seconds.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnixTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Compression applied to the package before upload.
///
/// The numeric [`CompressionMethod::id`] is what the gateway receives in the
/// `Compression` field.
pub enum CompressionMethod {
    /// Upload the plain records.
    None,
    /// zlib stream at maximum compression.
    #[default]
    Zlib,
    /// bzip2 stream at maximum compression.
    Bzip2,
    /// LZF block.
    Lzf,
}

impl CompressionMethod {
    /// Multipart field name used by the bulk gateway (`Compression`).
    pub const FIELD: &'static str = "Compression";

    pub const ALL: [Self; 4] = [Self::None, Self::Zlib, Self::Bzip2, Self::Lzf];

    /// Wire id of this method.
    pub fn id(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Zlib => 1,
            Self::Bzip2 => 2,
            Self::Lzf => 3,
        }
    }

    /// Map a wire id back to a method.
    pub fn from_id(id: u8) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|method| method.id() == id)
            .ok_or(ValidationError::UnknownCompressionMethod { id })
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::None => "No Compression",
            Self::Zlib => "Compression using Zlib",
            Self::Bzip2 => "Compression using bzip2",
            Self::Lzf => "Compression using LZF",
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// Scheme used to reach the bulk endpoint.
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
        }
    }
}

impl FromStr for Protocol {
    type Err = ValidationError;

    /// Case-insensitive `HTTP` / `HTTPS`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HTTP" => Ok(Self::Http),
            "HTTPS" => Ok(Self::Https),
            _ => Err(ValidationError::UnknownProtocol {
                input: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
/// Package id assigned by the gateway.
pub struct RemotePackageId(u64);

impl RemotePackageId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RemotePackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
/// Message id assigned by the gateway. Delivery reports refer to messages by this id.
pub struct RemoteMessageId(u64);

impl RemoteMessageId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RemoteMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
/// Per-message status returned by the bulk gateway.
///
/// This value is preserved as-is even when the code is unknown to this crate.
pub struct MessageStatus(i32);

impl MessageStatus {
    /// Construct a status from its integer representation.
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    /// Get the integer code as provided by the gateway.
    pub fn as_i32(self) -> i32 {
        self.0
    }

    /// Map this code to a known status variant, if one exists.
    pub fn known(self) -> Option<KnownMessageStatus> {
        KnownMessageStatus::from_code(self.0)
    }

    /// Returns `true` when the gateway accepted the message for delivery.
    pub fn is_accepted(self) -> bool {
        self.known() == Some(KnownMessageStatus::Accepted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Known per-message statuses of the bulk gateway.
pub enum KnownMessageStatus {
    SenderRejected,
    NumberRejected,
    Accepted,
    InternalErrorOrBlacklisted,
    InsufficientCredit,
}

impl KnownMessageStatus {
    /// Convert a raw integer status into a known variant.
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            1 => Self::SenderRejected,
            2 => Self::NumberRejected,
            3 => Self::Accepted,
            4 => Self::InternalErrorOrBlacklisted,
            5 => Self::InsufficientCredit,
            _ => return None,
        })
    }

    pub fn code(self) -> i32 {
        match self {
            Self::SenderRejected => 1,
            Self::NumberRejected => 2,
            Self::Accepted => 3,
            Self::InternalErrorOrBlacklisted => 4,
            Self::InsufficientCredit => 5,
        }
    }
}
