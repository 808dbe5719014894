//! Converting binary data to a `data:` URL.
//!
//! The OCR provider (spec §4.2) needs to embed the raw document bytes as
//! base-64 inside a `data:` URL before handing it to the vision model.

use base64::{Engine as _, prelude::BASE64_STANDARD};

/// Buffers larger than this are base-64 encoded in chunks, rather than
/// all at once, to avoid a second full-size allocation sitting next to
/// the input buffer in a single call.
const CHUNKED_ENCODING_THRESHOLD: usize = 4 * 1024 * 1024;

/// Chunk size used for chunked encoding. Must be a multiple of 3 so that
/// chunk boundaries never land mid base-64 group.
const CHUNK_SIZE: usize = 3 * 256 * 1024;

/// Convert binary data to a `data:` URL.
pub fn data_url(mime_type: &str, data: &[u8]) -> String {
    let base64_data = if data.len() > CHUNKED_ENCODING_THRESHOLD {
        encode_chunked(data)
    } else {
        BASE64_STANDARD.encode(data)
    };
    // Some sources indicate that the base64 payload should be
    // percent-encoded, but in practice this breaks several vision
    // models, which expect the raw base64 alphabet.
    format!("data:{mime_type};base64,{base64_data}")
}

/// Base64-encode `data` in fixed-size chunks, to bound peak memory use
/// for very large documents.
fn encode_chunked(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
    for chunk in data.chunks(CHUNK_SIZE) {
        BASE64_STANDARD.encode_string(chunk, &mut out);
    }
    out
}
