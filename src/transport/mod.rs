//! Transport layer: package wire format (records, compression, hashes) and the
//! gateway request/response framing.

mod bulk_upload;
mod compression;
mod integrity;
mod payload;
mod record;

pub use bulk_upload::{
    BulkReply, PACKAGE_FIELD, PACKAGE_FILE_NAME, decode_bulk_response, encode_bulk_upload_form,
};
pub use compression::{CompressionError, compress};
pub use integrity::md5_hex;
pub use payload::{PayloadArtifact, build_payload};
pub use record::{encode_payload, encode_record};
