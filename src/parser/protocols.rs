//! Protocol parsers module
//!
//! This module contains parsers for the supported proxy URI schemes. Each
//! parser implements the `ProtocolParser` trait to turn one URI line into
//! a Clash proxy entry, and the registry maps scheme prefixes to parsers
//! so the subscription parser can dispatch by prefix lookup.

mod shadowsocks;
mod trojan;
mod vless;
mod vmess;

pub use shadowsocks::ShadowsocksParser;
pub use trojan::TrojanParser;
pub use vless::VLessParser;
pub use vmess::VMessParser;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::clash::proxy::Proxy;

// ============================================================================
// Protocol Parser Trait
// ============================================================================

/// Trait for parsing individual protocol URIs
pub trait ProtocolParser: Send + Sync {
    /// Returns the protocol scheme this parser handles (e.g., "ss", "vmess")
    fn scheme(&self) -> &str;

    /// Parses a URI string into a Clash proxy entry
    fn parse(&self, uri: &str) -> Result<Proxy>;

    /// Checks if this parser can handle the given URI
    fn can_parse(&self, uri: &str) -> bool {
        uri.starts_with(&format!("{}://", self.scheme()))
    }
}

// ============================================================================
// Protocol Registry
// ============================================================================

/// Registry for protocol parsers with dynamic dispatch
#[derive(Default)]
pub struct ProtocolRegistry {
    parsers: HashMap<String, Arc<dyn ProtocolParser>>,
}

impl ProtocolRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Creates a registry with all built-in parsers registered
    pub fn with_builtin_parsers() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(VMessParser));
        registry.register(Arc::new(VLessParser));
        registry.register(Arc::new(ShadowsocksParser));
        registry.register(Arc::new(TrojanParser));
        registry
    }

    /// Registers a protocol parser
    pub fn register(&mut self, parser: Arc<dyn ProtocolParser>) {
        self.parsers.insert(parser.scheme().to_string(), parser);
    }

    /// Gets a parser for the given scheme
    pub fn get(&self, scheme: &str) -> Option<&Arc<dyn ProtocolParser>> {
        self.parsers.get(scheme)
    }

    /// Parses one line if it matches a registered scheme
    ///
    /// Returns `None` for lines that are not URIs or carry an unregistered
    /// scheme; those are not errors, so mixed or annotated subscription
    /// text survives. `Some(Err(..))` means a registered parser was tried
    /// and rejected the line.
    pub fn parse_line(&self, line: &str) -> Option<Result<Proxy>> {
        let Ok(scheme) = extract_scheme(line) else {
            debug!("Skipping non-URI line");
            return None;
        };

        let Some(parser) = self.parsers.get(scheme) else {
            debug!("Skipping line with unsupported scheme '{}'", scheme);
            return None;
        };

        let result = parser.parse(line);
        match &result {
            Ok(proxy) => {
                debug!("Parsed {} URI -> proxy '{}'", scheme, proxy.name());
            }
            Err(e) => {
                debug!("Failed to parse {} URI: {}", scheme, e);
            }
        }
        Some(result)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parses host:port string, handling IPv6 addresses in brackets
pub fn parse_host_port(hostport: &str) -> Result<(String, u16)> {
    // Handle IPv6 addresses: [::1]:8080
    if hostport.starts_with('[') {
        let bracket_end = hostport
            .find(']')
            .ok_or_else(|| anyhow!("Invalid IPv6 address: missing closing bracket"))?;

        let host = hostport[1..bracket_end].to_string();
        let port_str = hostport[bracket_end + 1..]
            .strip_prefix(':')
            .ok_or_else(|| anyhow!("Missing port after IPv6 address"))?;

        let port: u16 = port_str
            .parse()
            .map_err(|_| anyhow!("Invalid port number: {}", port_str))?;
        return Ok((host, validate_port(port)?));
    }

    // Handle regular host:port; the last colon splits, so never a colon
    // inside an unbracketed name
    let colon_pos = hostport
        .rfind(':')
        .ok_or_else(|| anyhow!("Invalid host:port format: missing colon"))?;

    let host = hostport[..colon_pos].to_string();
    let port: u16 = hostport[colon_pos + 1..]
        .parse()
        .map_err(|_| anyhow!("Invalid port number"))?;

    Ok((host, validate_port(port)?))
}

/// Rejects port 0, which no reachable server listens on
pub fn validate_port(port: u16) -> Result<u16> {
    if port == 0 {
        anyhow::bail!("Invalid port number: 0");
    }
    Ok(port)
}

/// Extracts the scheme from a URI
pub fn extract_scheme(uri: &str) -> Result<&str> {
    // First check that :// actually exists in the URI
    if !uri.contains("://") {
        anyhow::bail!("Invalid URI: missing scheme separator ://");
    }
    uri.split("://")
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("Invalid URI: missing scheme"))
}

/// Maps empty strings to `None`, so unset fields vanish from the output
pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Extracts the host from a parsed URL, unbracketing IPv6 literals
///
/// The Clash format writes IPv6 servers without brackets. A URL with no
/// host yields an empty string; consumers treat that as invalid, the
/// parsers do not reject it.
pub(crate) fn url_host(url: &url::Url) -> String {
    url.host_str()
        .unwrap_or_default()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_string()
}
