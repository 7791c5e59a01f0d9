use md5::{Digest, Md5};

/// MD5 of `bytes` as 32 lowercase hex characters.
///
/// The gateway uses it to detect truncated or corrupted uploads; it is not a
/// security primitive.
pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}
