//! VLESS protocol parser
//!
//! This module provides parsing for VLESS (vless://) URIs.
//! Format: vless://uuid@host:port?params#name

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use tracing::trace;
use url::Url;

use crate::clash::proxy::{GrpcOpts, Proxy, VlessProxy, WsOpts};

use super::{ProtocolParser, non_empty, url_host, validate_port};

// ============================================================================
// VLESS Parser
// ============================================================================

/// Parser for VLESS (vless://) URIs
///
/// Format: vless://uuid@host:port?params#name
pub struct VLessParser;

impl ProtocolParser for VLessParser {
    fn scheme(&self) -> &str {
        "vless"
    }

    fn parse(&self, uri: &str) -> Result<Proxy> {
        trace!("Parsing VLESS URI");
        let url = Url::parse(uri).map_err(|e| anyhow!("Failed to parse VLESS URI: {}", e))?;

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
            .unwrap_or_else(|| "VLESS".to_string());

        let network = param(&params, "type").unwrap_or("tcp").to_string();
        let tls = param(&params, "security") == Some("tls");

        let (ws_opts, grpc_opts) = build_transport(&network, &params);

        Ok(Proxy::Vless(VlessProxy {
            name,
            server,
            port,
            uuid: non_empty(url.username().to_string()),
            network,
            tls,
            skip_cert_verify: true,
            servername: param(&params, "sni").map(str::to_string),
            flow: param(&params, "flow").map(str::to_string),
            ws_opts,
            grpc_opts,
        }))
    }
}

/// Builds the transport options matching the query's network type
fn build_transport(
    network: &str,
    params: &HashMap<String, String>,
) -> (Option<WsOpts>, Option<GrpcOpts>) {
    match network {
        "ws" => {
            let path = param(params, "path").unwrap_or("/");
            let host = param(params, "host").unwrap_or("");
            (Some(WsOpts::new(path, host)), None)
        }
        "grpc" => {
            let opts = GrpcOpts {
                grpc_service_name: param(params, "serviceName").unwrap_or("").to_string(),
            };
            (None, Some(opts))
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
