//! VMess protocol parser
//!
//! This module provides parsing for VMess (vmess://) URIs.
//! Format: vmess://BASE64(JSON)

use anyhow::{Result, anyhow};
use serde::{Deserialize, Deserializer};
use tracing::trace;

use crate::clash::proxy::{GrpcOpts, H2Opts, Proxy, VmessProxy, WsOpts};
use crate::parser::base64::decode_base64_text;

use super::{ProtocolParser, non_empty, validate_port};

// ============================================================================
// VMess Payload
// ============================================================================

/// The JSON document carried inside a vmess:// URI
///
/// Subscription emitters are loose about types here: ports and alter ids
/// arrive as numbers or numeric strings, and most keys may be missing.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct VmessPayload {
    /// Remark/name
    ps: String,

    /// Server address
    add: String,

    /// Server port (can be string or number)
    #[serde(deserialize_with = "deserialize_port")]
    port: Option<u16>,

    /// User id
    id: String,

    /// Alter ID (can be string or number)
    #[serde(deserialize_with = "deserialize_u32")]
    aid: Option<u32>,

    /// Security/encryption method
    scy: String,

    /// Network type (tcp, ws, h2, grpc)
    net: String,

    /// TLS marker; the literal "tls" enables TLS
    tls: String,

    /// TLS server name
    sni: String,

    /// Transport host (ws/h2 Host header, h2 host list)
    host: String,

    /// Transport path; doubles as the grpc service name
    ///
    /// Kept as an Option so "key absent" stays distinguishable from "key
    /// present but empty": only the former takes the `/` default.
    path: Option<String>,
}

/// Deserializes a port that may be a number or a numeric string
fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u16),
        String(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port value: {s}"))),
    }
}

/// Deserializes an alter id that may be a number or a numeric string
fn deserialize_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid numeric value: {s}"))),
    }
}

// ============================================================================
// VMess Parser
// ============================================================================

/// Parser for VMess (vmess://) URIs
///
/// Format: vmess://BASE64({ "ps": "name", "add": "host", "port": 443, ... })
pub struct VMessParser;

impl ProtocolParser for VMessParser {
    fn scheme(&self) -> &str {
        "vmess"
    }

    fn parse(&self, uri: &str) -> Result<Proxy> {
        trace!("Parsing VMess URI");
        let encoded = uri
            .strip_prefix("vmess://")
            .ok_or_else(|| anyhow!("Not a VMess URI"))?;

        let decoded = decode_base64_text(encoded)
            .map_err(|e| anyhow!("VMess URI is not valid Base64: {}", e))?;
        let payload: VmessPayload = serde_json::from_str(&decoded)
            .map_err(|e| anyhow!("VMess payload is not valid JSON: {}", e))?;

        let name = if payload.ps.is_empty() {
            "VMess".to_string()
        } else {
            payload.ps.clone()
        };
        let port = validate_port(payload.port.unwrap_or(443))?;
        let cipher = if payload.scy.is_empty() {
            "auto".to_string()
        } else {
            payload.scy.clone()
        };
        let network = if payload.net.is_empty() {
            "tcp".to_string()
        } else {
            payload.net.clone()
        };

        let (ws_opts, h2_opts, grpc_opts) = build_transport(&network, &payload);

        Ok(Proxy::Vmess(VmessProxy {
            name,
            server: payload.add.clone(),
            port,
            uuid: non_empty(payload.id.clone()),
            alter_id: payload.aid.unwrap_or(0),
            cipher,
            network,
            tls: payload.tls == "tls",
            skip_cert_verify: true,
            servername: non_empty(payload.sni.clone()),
            ws_opts,
            h2_opts,
            grpc_opts,
        }))
    }
}

/// Builds the transport options matching the payload's network
fn build_transport(
    network: &str,
    payload: &VmessPayload,
) -> (Option<WsOpts>, Option<H2Opts>, Option<GrpcOpts>) {
    match network {
        "ws" => {
            let path = payload.path.clone().unwrap_or_else(|| "/".to_string());
            (Some(WsOpts::new(path, &payload.host)), None, None)
        }
        "h2" => {
            let path = payload.path.clone().unwrap_or_else(|| "/".to_string());
            let opts = H2Opts {
                host: vec![payload.host.clone()],
                path,
            };
            (None, Some(opts), None)
        }
        "grpc" => {
            let opts = GrpcOpts {
                grpc_service_name: payload.path.clone().unwrap_or_default(),
            };
            (None, None, Some(opts))
        }
        _ => (None, None, None),
    }
}
