//! Pure text and byte codecs used by the Prism blocks.

use std::io::{Read, Write};

use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use flate2::{Compression, read::DeflateDecoder, write::DeflateEncoder};
use serde_json::Value;
use tracing::debug;

use crate::error::{PrismError, Result};

// Accepts input with or without trailing padding and with non-zero unused bits, like `atob`
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

pub fn base64_encode(text: &str) -> String {
    LENIENT.encode(text.as_bytes())
}

/// Decodes base64 into text; ASCII whitespace in the input is ignored.
///
/// Payloads that are not UTF-8 decode byte-per-character (Latin-1).
///
/// # Errors
///
/// Returns [`PrismError::Codec`] when the input is not valid base64
pub fn base64_decode(encoded: &str) -> Result<String> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = LENIENT
        .decode(compact)
        .map_err(|e| PrismError::Codec(format!("Invalid base64: {e}")))?;

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    })
}

/// Character for a UTF-16 code unit. The code is reduced modulo 2^16 and
/// non-finite codes count as 0; a lone surrogate yields U+FFFD.
pub fn from_char_code(code: f64) -> String {
    let unit = if code.is_finite() {
        code.trunc().rem_euclid(65_536.0) as u16
    } else {
        0
    };
    String::from_utf16_lossy(&[unit])
}

/// UTF-16 code unit of the first character, `None` for empty text
pub fn to_char_code(text: &str) -> Option<u16> {
    text.encode_utf16().next()
}

/// Parses a JSON array of byte values.
///
/// Elements are converted like typed-array stores: truncated and wrapped
/// modulo 256, non-numeric elements become 0.
///
/// # Errors
///
/// Returns [`PrismError::InvalidArgument`] when the text is not a JSON array
pub fn parse_byte_array(text: &str) -> Result<Vec<u8>> {
    let value: Value = serde_json::from_str(text).map_err(|e| PrismError::InvalidArgument {
        name: "ARRAY".into(),
        reason: e.to_string(),
    })?;
    let Value::Array(items) = value else {
        return Err(PrismError::InvalidArgument {
            name: "ARRAY".into(),
            reason: "not an array".into(),
        });
    };

    Ok(items
        .iter()
        .map(|item| match crate::args::to_number(item) {
            Some(n) if n.is_finite() => n.trunc().rem_euclid(256.0) as u8,
            _ => 0,
        })
        .collect())
}

/// Raw DEFLATE compression
///
/// # Errors
///
/// Returns [`PrismError::Codec`] if the encoder fails
pub fn deflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .map_err(|e| PrismError::Codec(format!("Deflate failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| PrismError::Codec(format!("Deflate failed: {e}")))
}

/// Raw DEFLATE decompression
///
/// # Errors
///
/// Returns [`PrismError::Codec`] when the input is not a valid DEFLATE stream
pub fn inflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    DeflateDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(|e| PrismError::Codec(format!("Inflate failed: {e}")))?;
    Ok(out)
}

/// Block-level deflate: JSON array text in, JSON array text out.
/// Invalid input is treated as an empty array.
pub fn deflate_array(text: &str) -> String {
    let bytes = parse_byte_array(text).unwrap_or_else(|e| {
        debug!(error = %e, "Deflating invalid array as []");
        Vec::new()
    });
    let compressed = deflate(&bytes).unwrap_or_else(|e| {
        debug!(error = %e, "Deflate failed");
        Vec::new()
    });
    byte_array_json(&compressed)
}

/// Block-level inflate: JSON array text in, JSON array text out.
/// Invalid arrays and corrupt streams yield `[]`.
pub fn inflate_array(text: &str) -> String {
    let bytes = parse_byte_array(text).unwrap_or_else(|e| {
        debug!(error = %e, "Inflating invalid array as []");
        Vec::new()
    });
    let inflated = inflate(&bytes).unwrap_or_else(|e| {
        debug!(error = %e, "Inflate failed");
        Vec::new()
    });
    byte_array_json(&inflated)
}

fn byte_array_json(bytes: &[u8]) -> String {
    serde_json::to_string(bytes).unwrap_or_else(|_| "[]".into())
}
