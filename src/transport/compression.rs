use std::io;

use crate::domain::CompressionMethod;

#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("{method} is not available in this build")]
    Unavailable { method: CompressionMethod },

    #[error("{method} failed: {source}")]
    Io {
        method: CompressionMethod,
        #[source]
        source: io::Error,
    },
}

/// Compress the plain package with `method`. [`CompressionMethod::None`] returns a copy.
///
/// A method whose cargo feature is disabled fails with
/// [`CompressionError::Unavailable`] rather than falling back to plain data.
pub fn compress(plain: &[u8], method: CompressionMethod) -> Result<Vec<u8>, CompressionError> {
    let compressed = match method {
        CompressionMethod::None => return Ok(plain.to_vec()),
        CompressionMethod::Zlib => zlib(plain),
        CompressionMethod::Bzip2 => bzip2(plain),
        CompressionMethod::Lzf => lzf(plain),
    };

    match compressed {
        Ok(Some(bytes)) => Ok(bytes),
        Ok(None) => Err(CompressionError::Unavailable { method }),
        Err(source) => Err(CompressionError::Io { method, source }),
    }
}

#[cfg(feature = "deflate")]
fn zlib(plain: &[u8]) -> io::Result<Option<Vec<u8>>> {
    use std::io::Write;

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::best());
    encoder.write_all(plain)?;
    encoder.finish().map(Some)
}

#[cfg(not(feature = "deflate"))]
fn zlib(_plain: &[u8]) -> io::Result<Option<Vec<u8>>> {
    Ok(None)
}

#[cfg(feature = "bzip2")]
fn bzip2(plain: &[u8]) -> io::Result<Option<Vec<u8>>> {
    use std::io::Write;

    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
    encoder.write_all(plain)?;
    encoder.finish().map(Some)
}

#[cfg(not(feature = "bzip2"))]
fn bzip2(_plain: &[u8]) -> io::Result<Option<Vec<u8>>> {
    Ok(None)
}

#[cfg(feature = "lzf")]
fn lzf(plain: &[u8]) -> io::Result<Option<Vec<u8>>> {
    if plain.is_empty() {
        return Ok(Some(Vec::new()));
    }
    match lzf::compress(plain) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(lzf::LzfError::NoCompressionPossible) => Ok(Some(lzf_literal_runs(plain))),
        Err(err) => Err(io::Error::other(format!("{err:?}"))),
    }
}

#[cfg(not(feature = "lzf"))]
fn lzf(_plain: &[u8]) -> io::Result<Option<Vec<u8>>> {
    Ok(None)
}

/// Encode `plain` as LZF literal runs only (control byte `len - 1`, at most 32 bytes per run).
#[cfg(feature = "lzf")]
fn lzf_literal_runs(plain: &[u8]) -> Vec<u8> {
    const MAX_LITERAL_RUN: usize = 32;

    let mut out = Vec::with_capacity(plain.len() + plain.len() / MAX_LITERAL_RUN + 1);
    for run in plain.chunks(MAX_LITERAL_RUN) {
        out.push((run.len() - 1) as u8);
        out.extend_from_slice(run);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"1;0722123456;numeric;Hello there;0\r\n\
                            2;0722123457;numeric;Hello there;0\r\n\
                            3;0722123458;numeric;Hello there;0";

    #[test]
    fn none_is_identity() {
        assert_eq!(compress(SAMPLE, CompressionMethod::None).unwrap(), SAMPLE);
    }

    #[cfg(feature = "deflate")]
    #[test]
    fn zlib_produces_a_decodable_zlib_stream() {
        use std::io::Read;

        let compressed = compress(SAMPLE, CompressionMethod::Zlib).unwrap();
        assert_eq!(compressed[0], 0x78);

        let mut decoded = Vec::new();
        flate2::read::ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, SAMPLE);
    }

    #[cfg(feature = "bzip2")]
    #[test]
    fn bzip2_uses_best_block_size() {
        use std::io::Read;

        let compressed = compress(SAMPLE, CompressionMethod::Bzip2).unwrap();
        assert!(compressed.starts_with(b"BZh9"));

        let mut decoded = Vec::new();
        bzip2::read::BzDecoder::new(compressed.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, SAMPLE);
    }

    #[cfg(feature = "lzf")]
    #[test]
    fn lzf_round_trips_compressible_input() {
        let plain = SAMPLE.repeat(4);
        let compressed = compress(&plain, CompressionMethod::Lzf).unwrap();
        assert!(compressed.len() < plain.len());
        assert_eq!(lzf::decompress(&compressed, plain.len()).unwrap(), plain);
    }

    #[cfg(feature = "lzf")]
    #[test]
    fn lzf_falls_back_to_literal_runs_for_incompressible_input() {
        let plain = (0u8..=70).collect::<Vec<_>>();
        let literal = lzf_literal_runs(&plain);
        assert_eq!(literal.len(), plain.len() + 3);
        assert_eq!(literal[0], 31);
        assert_eq!(literal[33], 31);
        assert_eq!(literal[66], 6);
        assert_eq!(lzf::decompress(&literal, plain.len()).unwrap(), plain);

        let compressed = compress(&plain, CompressionMethod::Lzf).unwrap();
        assert_eq!(lzf::decompress(&compressed, plain.len()).unwrap(), plain);
    }

    #[cfg(not(feature = "lzf"))]
    #[test]
    fn disabled_method_is_reported_not_skipped() {
        let err = compress(SAMPLE, CompressionMethod::Lzf).unwrap_err();
        assert!(matches!(
            err,
            CompressionError::Unavailable {
                method: CompressionMethod::Lzf
            }
        ));
    }
}
