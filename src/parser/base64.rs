//! Base64 decoding utilities
//!
//! Subscription feeds wrap their payloads in Base64 with no agreed-upon
//! variant: standard and URL-safe alphabets both appear in the wild, with
//! and without padding. This module decodes all of them, and turns the
//! decoded bytes into text without ever failing on the text step.

use anyhow::{Result, bail};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use tracing::trace;

// ============================================================================
// Base64 Decoding
// ============================================================================

/// Decodes Base64 content, trying multiple variants
///
/// Attempts to decode the content using:
/// 1. Standard Base64
/// 2. URL-safe Base64
/// 3. URL-safe Base64 without padding
/// 4. Standard/URL-safe with padding added
///
/// Whitespace in the input is automatically removed before decoding.
/// An error means "this was not Base64"; callers fall back accordingly.
pub fn decode_base64(content: &str) -> Result<Vec<u8>> {
    // Remove all whitespace (handles line breaks within Base64)
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    trace!(
        "Attempting Base64 decode, cleaned length: {} bytes",
        cleaned.len()
    );

    // Try standard Base64 first
    if let Ok(decoded) = STANDARD.decode(&cleaned) {
        trace!("Decoded using standard Base64");
        return Ok(decoded);
    }

    // Try URL-safe Base64
    if let Ok(decoded) = URL_SAFE.decode(&cleaned) {
        trace!("Decoded using URL-safe Base64");
        return Ok(decoded);
    }

    // Try URL-safe Base64 without padding
    if let Ok(decoded) = URL_SAFE_NO_PAD.decode(&cleaned) {
        trace!("Decoded using URL-safe Base64 without padding");
        return Ok(decoded);
    }

    // Try with padding added if needed
    let padded = add_base64_padding(&cleaned);
    if let Ok(decoded) = STANDARD.decode(&padded) {
        trace!("Decoded using standard Base64 with added padding");
        return Ok(decoded);
    }
    if let Ok(decoded) = URL_SAFE.decode(&padded) {
        trace!("Decoded using URL-safe Base64 with added padding");
        return Ok(decoded);
    }

    bail!("Failed to decode Base64 content")
}

/// Adds proper padding to Base64 string if missing
///
/// Base64 strings should have a length that is a multiple of 4.
/// This function adds '=' padding characters as needed.
pub fn add_base64_padding(s: &str) -> String {
    let mut result = s.to_string();
    while !result.len().is_multiple_of(4) {
        result.push('=');
    }
    result
}

/// Decodes Base64 content into text
///
/// The decoded bytes are interpreted as UTF-8; anything else falls back to
/// a one-byte-per-character (Latin-1) reading, so the text step itself
/// never fails. The only error is the input not being Base64 at all.
pub fn decode_base64_text(content: &str) -> Result<String> {
    let decoded = decode_base64(content)?;
    Ok(bytes_to_text(decoded))
}

/// Interprets bytes as UTF-8, falling back to Latin-1
///
/// Subscription payloads occasionally carry node names in legacy 8-bit
/// encodings. Mapping each byte to the code point of the same value keeps
/// the surrounding ASCII intact instead of rejecting the whole payload.
pub fn bytes_to_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err
            .into_bytes()
            .iter()
            .map(|&byte| char::from(byte))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_standard() {
        // "hello world" in standard Base64
        let encoded = "aGVsbG8gd29ybGQ=";
        let decoded = decode_base64(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "hello world");
    }

    #[test]
    fn test_decode_base64_url_safe() {
        // URL-safe Base64 with - and _ instead of + and /
        let encoded = "aGVsbG8td29ybGQ_"; // "hello-world?" with URL-safe encoding
        let result = decode_base64(encoded);
        assert!(result.is_ok());
    }

    #[test]
    fn test_decode_base64_with_linebreaks() {
        let encoded = "aGVs\nbG8g\nd29y\nbGQ=";
        let decoded = decode_base64(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "hello world");
    }

    #[test]
    fn test_decode_base64_without_padding() {
        // "hello world" without padding (should have 1 padding char)
        let encoded = "aGVsbG8gd29ybGQ";
        let decoded = decode_base64(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "hello world");
    }

    #[test]
    fn test_decode_base64_with_whitespace() {
        let encoded = "  aGVsbG8gd29ybGQ=  ";
        let decoded = decode_base64(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "hello world");
    }

    #[test]
    fn test_decode_base64_empty() {
        let encoded = "";
        let result = decode_base64(encoded);
        // Empty string decodes to empty bytes
        assert!(result.is_ok());
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_decode_base64_invalid() {
        let encoded = "not valid base64!!!";
        let result = decode_base64(encoded);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_base64_rejects_uri_text() {
        // Proxy URIs carry ':' and '#', which no Base64 alphabet contains
        let uri = "ss://YWVzLTI1Ni1nY206cGFzc3dvcmQ@example.com:8388#test";
        assert!(decode_base64(uri).is_err());
    }

    #[test]
    fn test_add_base64_padding_none_needed() {
        assert_eq!(add_base64_padding("abcd"), "abcd");
        assert_eq!(add_base64_padding("abcdabcd"), "abcdabcd");
    }

    #[test]
    fn test_add_base64_padding_one_needed() {
        assert_eq!(add_base64_padding("abc"), "abc=");
    }

    #[test]
    fn test_add_base64_padding_two_needed() {
        assert_eq!(add_base64_padding("ab"), "ab==");
    }

    #[test]
    fn test_add_base64_padding_empty() {
        assert_eq!(add_base64_padding(""), "");
    }

    #[test]
    fn test_decode_base64_text_utf8() {
        // "节点" in standard Base64
        let encoded = "6IqC54K5";
        assert_eq!(decode_base64_text(encoded).unwrap(), "节点");
    }

    #[test]
    fn test_decode_base64_text_latin1_fallback() {
        use base64::engine::general_purpose::STANDARD;
        // 0xE9 is not valid UTF-8 on its own but is 'é' in Latin-1
        let encoded = STANDARD.encode([b'c', b'a', b'f', 0xE9]);
        assert_eq!(decode_base64_text(&encoded).unwrap(), "café");
    }

    #[test]
    fn test_decode_base64_text_not_base64() {
        assert!(decode_base64_text("definitely not base64!!!").is_err());
    }

    #[test]
    fn test_bytes_to_text_preserves_length() {
        let bytes = vec![0x41, 0xFF, 0x42, 0x80, 0x43];
        let text = bytes_to_text(bytes);
        assert_eq!(text.chars().count(), 5);
        assert!(text.starts_with('A'));
        assert!(text.ends_with('C'));
    }

    #[test]
    fn test_decode_base64_multiline_uri_list() {
        use base64::engine::general_purpose::STANDARD;
        let original = "ss://abc@host1:1234#node1\nvmess://xyz@host2:5678#node2";
        let encoded = STANDARD.encode(original);
        let decoded = decode_base64(&encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), original);
    }
}
