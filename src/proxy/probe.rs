//! Scan an SSE body for real delta content

use std::io::BufRead;

use crate::api::StreamChunk;

const DATA_PREFIX: &[u8] = b"data:";

/// Returns true as soon as one `data:` line carries non-empty delta content.
///
/// Scanning stops at the first hit. Payloads that do not parse as a chunk
/// (including `[DONE]`) are skipped.
pub fn stream_has_content<R: BufRead>(reader: R) -> bool {
    for (line_no, line) in reader.split(b'\n').enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Stream read failed during content scan");
                return false;
            }
        };

        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            continue;
        };

        match serde_json::from_slice::<StreamChunk>(payload) {
            Ok(chunk) if chunk.has_content() => {
                tracing::trace!(line = line_no + 1, "Found delta content");
                return true;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::trace!(line = line_no + 1, error = %e, "Skipping unparsable SSE payload");
            }
        }
    }
    false
}
