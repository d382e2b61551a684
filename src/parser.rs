//! Subscription and Protocol Parsing Module
//!
//! This module provides functionality for:
//! - Unwrapping whole-subscription Base64 (subscriptions are frequently
//!   delivered fully Base64-wrapped; plain text passes through unchanged)
//! - Parsing protocol URIs (vmess://, vless://, ss://, trojan://)
//! - Dynamic dispatch to the appropriate parser based on the URI scheme

pub mod base64;
pub mod protocols;

use tracing::{debug, warn};

use crate::clash::proxy::Proxy;

use self::base64::decode_base64_text;
use self::protocols::{ProtocolRegistry, extract_scheme};

// ============================================================================
// Subscription Unwrapping
// ============================================================================

/// Unwraps a fully Base64-encoded subscription body
///
/// When the whole input decodes as Base64, the decoded text replaces the
/// original for line splitting. Anything that is not Base64 (which
/// includes any plain URI list, since `:` and `#` are not in the
/// alphabet) is kept unchanged.
pub fn unwrap_subscription(content: &str) -> String {
    match decode_base64_text(content) {
        Ok(decoded) => {
            debug!(
                "Unwrapped Base64 subscription: {} -> {} bytes",
                content.len(),
                decoded.len()
            );
            decoded
        }
        Err(_) => content.to_string(),
    }
}

// ============================================================================
// Subscription Parsing
// ============================================================================

/// One dropped line, with enough context to report it
#[derive(Debug, Clone)]
pub struct LineFailure {
    /// 1-based line number in the unwrapped subscription text
    pub line: usize,
    /// URI scheme of the failing line
    pub scheme: String,
    /// Human-readable failure reason
    pub reason: String,
}

/// Result of parsing a subscription: the records plus per-line diagnostics
///
/// Failed lines never abort the parse; they are dropped and recorded here
/// so the caller decides how to surface them.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Successfully parsed proxies, in input line order
    pub proxies: Vec<Proxy>,
    /// Lines with a known scheme that failed to decode
    pub failures: Vec<LineFailure>,
}

/// Parses subscription content into proxies
///
/// Step 1: unwrap whole-input Base64 if present. Step 2: split into
/// lines, skipping blanks and `#` comments. Step 3: dispatch each line
/// by scheme; lines with no known scheme are silently skipped, lines
/// with a known scheme that fail to decode are dropped with one
/// diagnostic each.
pub fn parse_subscription(content: &str) -> ParseOutcome {
    let text = unwrap_subscription(content);
    let registry = ProtocolRegistry::with_builtin_parsers();

    let mut outcome = ParseOutcome::default();

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match registry.parse_line(line) {
            Some(Ok(proxy)) => outcome.proxies.push(proxy),
            Some(Err(e)) => {
                let line_number = index + 1;
                let scheme = extract_scheme(line).unwrap_or("unknown").to_string();
                warn!("Failed to parse line {}: {:#}", line_number, e);
                outcome.failures.push(LineFailure {
                    line: line_number,
                    scheme,
                    reason: format!("{:#}", e),
                });
            }
            None => {}
        }
    }

    debug!(
        "Subscription parsing complete: {} proxies, {} dropped lines",
        outcome.proxies.len(),
        outcome.failures.len()
    );

    outcome
}
