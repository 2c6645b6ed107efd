//! Reverse a declared Content-Encoding on a buffered body

use std::io::Read;

use crate::error::DecodeError;

/// Decode `body` according to `encoding`.
///
/// Matching is case-insensitive and ignores surrounding whitespace. Absent or
/// unrecognized encodings return the body unchanged.
pub fn decode_body(encoding: Option<&str>, body: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let encoding = match encoding {
        Some(enc) => enc.trim().to_lowercase(),
        None => return Ok(body.to_vec()),
    };

    let decoded = match encoding.as_str() {
        "gzip" | "x-gzip" => {
            let mut decoder = flate2::read::GzDecoder::new(body);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out).map_err(DecodeError::Gzip)?;
            out
        }
        // HTTP "deflate" is zlib-framed
        "deflate" => {
            let mut decoder = flate2::read::ZlibDecoder::new(body);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out).map_err(DecodeError::Deflate)?;
            out
        }
        "br" => {
            let mut out = Vec::new();
            brotli::BrotliDecompress(&mut std::io::Cursor::new(body), &mut out)
                .map_err(DecodeError::Brotli)?;
            out
        }
        "zstd" => zstd::decode_all(body).map_err(DecodeError::Zstd)?,
        _ => return Ok(body.to_vec()),
    };

    tracing::trace!(
        encoding = %encoding,
        original_size = body.len(),
        decoded_size = decoded.len(),
        "Decoded body"
    );
    Ok(decoded)
}
