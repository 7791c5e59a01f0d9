//! Domain layer: strong types with validation and invariants (no I/O).

mod package;
mod response;
mod validation;
mod value;

pub use package::{BulkPackage, MessageEntry, PackageStatus, StateError};
pub use response::{MessageOutcome, TransmissionResult};
pub use validation::ValidationError;
pub use value::{
    CompressionMethod, ConnectionId, KnownMessageStatus, LocalMessageId, MessageStatus,
    MessageText, Password, Protocol, ReceiverNumber, RemoteMessageId, RemotePackageId, SenderId,
    UnixTimestamp,
};
