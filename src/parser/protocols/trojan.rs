//! Trojan protocol parser
//!
//! This module provides parsing for Trojan (trojan://) URIs.
//! Format: trojan://password@host:port?params#name

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use tracing::trace;
use url::Url;

use crate::clash::proxy::{Proxy, TrojanProxy, WsOpts};

use super::{ProtocolParser, non_empty, url_host, validate_port};

// ============================================================================
// Trojan Parser
// ============================================================================

/// Parser for Trojan (trojan://) URIs
///
/// Format: trojan://password@host:port?params#name
pub struct TrojanParser;

impl ProtocolParser for TrojanParser {
    fn scheme(&self) -> &str {
        "trojan"
    }

    fn parse(&self, uri: &str) -> Result<Proxy> {
        trace!("Parsing Trojan URI");
        let url = Url::parse(uri).map_err(|e| anyhow!("Failed to parse Trojan URI: {}", e))?;

        let server = url_host(&url);
        let port = validate_port(url.port().unwrap_or(443))?;

        // Parse query parameters; empty values count as absent
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

        let name = url
            .fragment()
            .map(|f| {
                urlencoding::decode(f)
                    .unwrap_or_else(|_| f.into())
                    .into_owned()
            })
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Trojan".to_string());

        // SNI falls back to the server host when the query omits it
        let sni = param(&params, "sni")
            .map(str::to_string)
            .or_else(|| non_empty(server.clone()));

        let (network, ws_opts) = build_transport(&params);

        Ok(Proxy::Trojan(TrojanProxy {
            name,
            server,
            port,
            password: non_empty(url.username().to_string()),
            skip_cert_verify: true,
            sni,
            network,
            ws_opts,
        }))
    }
}

/// Builds the WebSocket transport when the query asks for it
fn build_transport(params: &HashMap<String, String>) -> (Option<String>, Option<WsOpts>) {
    match param(params, "type") {
        Some("ws") => {
            let path = param(params, "path").unwrap_or("/");
            let host = param(params, "host").unwrap_or("");
            (Some("ws".to_string()), Some(WsOpts::new(path, host)))
        }
        _ => (None, None),
    }
}

/// Looks up a query parameter, treating empty values as absent
fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trojan_basic() {
        let uri = "trojan://password@example.com:443?sni=cdn.example.com#test-node";
        let proxy = TrojanParser.parse(uri).unwrap();

        if let Proxy::Trojan(trojan) = proxy {
            assert_eq!(trojan.name, "test-node");
            assert_eq!(trojan.server, "example.com");
            assert_eq!(trojan.port, 443);
            assert_eq!(trojan.password, Some("password".to_string()));
            assert!(trojan.skip_cert_verify);
            assert_eq!(trojan.sni, Some("cdn.example.com".to_string()));
            assert_eq!(trojan.network, None);
            assert!(trojan.ws_opts.is_none());
        } else {
            panic!("Expected Trojan proxy");
        }
    }

    #[test]
    fn test_trojan_default_name() {
        let uri = "trojan://password@example.com:443";
        let proxy = TrojanParser.parse(uri).unwrap();
        assert_eq!(proxy.name(), "Trojan");
    }

    #[test]
    fn test_trojan_default_port() {
        let uri = "trojan://password@example.com#node";
        let proxy = TrojanParser.parse(uri).unwrap();
        assert_eq!(proxy.port(), 443);
    }

    #[test]
    fn test_trojan_sni_falls_back_to_host() {
        let uri = "trojan://password@example.com:443#node";
        let proxy = TrojanParser.parse(uri).unwrap();

        if let Proxy::Trojan(trojan) = proxy {
            assert_eq!(trojan.sni, Some("example.com".to_string()));
        } else {
            panic!("Expected Trojan proxy");
        }
    }

    #[test]
    fn test_trojan_empty_sni_param_falls_back() {
        let uri = "trojan://password@example.com:443?sni=#node";
        let proxy = TrojanParser.parse(uri).unwrap();

        if let Proxy::Trojan(trojan) = proxy {
            assert_eq!(trojan.sni, Some("example.com".to_string()));
        } else {
            panic!("Expected Trojan proxy");
        }
    }

    #[test]
    fn test_trojan_with_websocket() {
        let uri = "trojan://password@example.com:443?type=ws&path=/ws&host=ws.example.com#ws-node";
        let proxy = TrojanParser.parse(uri).unwrap();

        if let Proxy::Trojan(trojan) = proxy {
            assert_eq!(trojan.network, Some("ws".to_string()));
            let ws = trojan.ws_opts.unwrap();
            assert_eq!(ws.path, "/ws");
            assert_eq!(ws.headers.get("Host"), Some(&"ws.example.com".to_string()));
        } else {
            panic!("Expected Trojan proxy");
        }
    }

    #[test]
    fn test_trojan_websocket_default_path() {
        let uri = "trojan://password@example.com:443?type=ws#ws-node";
        let proxy = TrojanParser.parse(uri).unwrap();

        if let Proxy::Trojan(trojan) = proxy {
            let ws = trojan.ws_opts.unwrap();
            assert_eq!(ws.path, "/");
            assert!(ws.headers.is_empty());
        } else {
            panic!("Expected Trojan proxy");
        }
    }

    #[test]
    fn test_trojan_non_ws_type_has_no_transport() {
        let uri = "trojan://password@example.com:443?type=grpc&serviceName=svc#grpc-node";
        let proxy = TrojanParser.parse(uri).unwrap();

        if let Proxy::Trojan(trojan) = proxy {
            assert_eq!(trojan.network, None);
            assert!(trojan.ws_opts.is_none());
        } else {
            panic!("Expected Trojan proxy");
        }
    }

    #[test]
    fn test_trojan_empty_password_omitted() {
        let uri = "trojan://@example.com:443#node";
        let proxy = TrojanParser.parse(uri).unwrap();

        if let Proxy::Trojan(trojan) = proxy {
            assert_eq!(trojan.password, None);
        } else {
            panic!("Expected Trojan proxy");
        }
    }

    #[test]
    fn test_trojan_url_encoded_name() {
        let uri = "trojan://password@example.com:443#%F0%9F%87%BA%F0%9F%87%B8%20US%20Server";
        let proxy = TrojanParser.parse(uri).unwrap();
        assert!(proxy.name().contains("US Server"));
    }

    #[test]
    fn test_trojan_ipv6_host_unbracketed() {
        let uri = "trojan://password@[2001:db8::1]:8443#ipv6-node";
        let proxy = TrojanParser.parse(uri).unwrap();

        if let Proxy::Trojan(trojan) = proxy {
            assert_eq!(trojan.server, "2001:db8::1");
            assert_eq!(trojan.port, 8443);
            assert_eq!(trojan.sni, Some("2001:db8::1".to_string()));
        } else {
            panic!("Expected Trojan proxy");
        }
    }

    #[test]
    fn test_trojan_port_zero_rejected() {
        let uri = "trojan://password@example.com:0#node";
        assert!(TrojanParser.parse(uri).is_err());
    }

    #[test]
    fn test_trojan_invalid_uri() {
        assert!(TrojanParser.parse("not-a-uri").is_err());
        assert!(TrojanParser.parse("trojan://password@:443").is_err());
    }

    #[test]
    fn test_scheme() {
        assert_eq!(TrojanParser.scheme(), "trojan");
    }

    #[test]
    fn test_can_parse() {
        assert!(TrojanParser.can_parse("trojan://password@host:443"));
        assert!(!TrojanParser.can_parse("vmess://abc"));
        assert!(!TrojanParser.can_parse("not-a-uri"));
    }
}
