use super::compression::{CompressionError, compress};
use super::integrity::md5_hex;
use super::record::encode_payload;
use crate::domain::{BulkPackage, CompressionMethod};

/// Upload body derived from a package. Rebuilt on every send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadArtifact {
    pub compression: CompressionMethod,
    pub plain: Vec<u8>,
    pub compressed: Vec<u8>,
    pub md5_plain: String,
    pub md5_compressed: String,
}

/// Encode, compress and hash the current contents of `package`.
pub fn build_payload(package: &BulkPackage) -> Result<PayloadArtifact, CompressionError> {
    let compression = package.compression();
    let plain = encode_payload(package.entries()).into_bytes();
    let compressed = compress(&plain, compression)?;

    Ok(PayloadArtifact {
        compression,
        md5_plain: md5_hex(&plain),
        md5_compressed: md5_hex(&compressed),
        plain,
        compressed,
    })
}
