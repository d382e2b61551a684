use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Proxy Entries
// ============================================================================

/// A single entry in the `proxies` list, tagged by protocol
///
/// Field spelling follows the Clash configuration format (`alterId`,
/// `skip-cert-verify`, `ws-opts`, ...). Optional fields are omitted from
/// serialization when unset, so emitted documents never contain null or
/// empty placeholder keys.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Proxy {
    /// VMess proxy
    Vmess(VmessProxy),

    /// VLESS proxy
    Vless(VlessProxy),

    /// Shadowsocks proxy
    #[serde(rename = "ss")]
    Shadowsocks(ShadowsocksProxy),

    /// Trojan proxy
    Trojan(TrojanProxy),
}

impl Proxy {
    /// Display name of the proxy, as referenced by proxy groups
    pub fn name(&self) -> &str {
        match self {
            Proxy::Vmess(p) => &p.name,
            Proxy::Vless(p) => &p.name,
            Proxy::Shadowsocks(p) => &p.name,
            Proxy::Trojan(p) => &p.name,
        }
    }

    /// Server address the proxy points at
    pub fn server(&self) -> &str {
        match self {
            Proxy::Vmess(p) => &p.server,
            Proxy::Vless(p) => &p.server,
            Proxy::Shadowsocks(p) => &p.server,
            Proxy::Trojan(p) => &p.server,
        }
    }

    /// Server port
    pub fn port(&self) -> u16 {
        match self {
            Proxy::Vmess(p) => p.port,
            Proxy::Vless(p) => p.port,
            Proxy::Shadowsocks(p) => p.port,
            Proxy::Trojan(p) => p.port,
        }
    }
}

/// VMess proxy entry
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct VmessProxy {
    pub name: String,

    pub server: String,

    pub port: u16,

    /// User id; omitted when the source payload carried none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(rename = "alterId", default)]
    pub alter_id: u32,

    /// Encryption method, `auto` unless the payload says otherwise
    pub cipher: String,

    /// Transport network: `tcp`, `ws`, `h2` or `grpc`
    pub network: String,

    #[serde(default)]
    pub tls: bool,

    #[serde(rename = "skip-cert-verify", default)]
    pub skip_cert_verify: bool,

    /// TLS server name indication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servername: Option<String>,

    #[serde(rename = "ws-opts", default, skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<WsOpts>,

    #[serde(rename = "h2-opts", default, skip_serializing_if = "Option::is_none")]
    pub h2_opts: Option<H2Opts>,

    #[serde(
        rename = "grpc-opts",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub grpc_opts: Option<GrpcOpts>,
}

/// VLESS proxy entry
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct VlessProxy {
    pub name: String,

    pub server: String,

    pub port: u16,

    /// User id; omitted when the URI carried no userinfo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    /// Transport network: `tcp`, `ws` or `grpc`
    pub network: String,

    #[serde(default)]
    pub tls: bool,

    #[serde(rename = "skip-cert-verify", default)]
    pub skip_cert_verify: bool,

    /// TLS server name indication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servername: Option<String>,

    /// Flow control (e.g. `xtls-rprx-vision`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,

    #[serde(rename = "ws-opts", default, skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<WsOpts>,

    #[serde(
        rename = "grpc-opts",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub grpc_opts: Option<GrpcOpts>,
}

/// Shadowsocks proxy entry
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ShadowsocksProxy {
    pub name: String,

    pub server: String,

    pub port: u16,

    /// Encryption method (e.g. `aes-256-gcm`)
    pub cipher: String,

    pub password: String,

    /// SIP003 plugin name (e.g. `obfs`, `v2ray-plugin`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,

    /// SIP003 plugin options; omitted entirely when there are none
    #[serde(
        rename = "plugin-opts",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub plugin_opts: BTreeMap<String, String>,
}

/// Trojan proxy entry
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TrojanProxy {
    pub name: String,

    pub server: String,

    pub port: u16,

    /// Password; omitted when the URI carried no userinfo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(rename = "skip-cert-verify", default)]
    pub skip_cert_verify: bool,

    /// TLS server name indication, falling back to the server address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,

    /// Set to `ws` for WebSocket transport; absent means plain TCP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    #[serde(rename = "ws-opts", default, skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<WsOpts>,
}

// ============================================================================
// Transport Options
// ============================================================================

/// WebSocket transport options (`ws-opts`)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WsOpts {
    pub path: String,

    /// Extra request headers; in practice only `Host`
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

impl WsOpts {
    /// Build options from a path and an optional Host header value
    ///
    /// An empty host means no headers key at all.
    pub fn new(path: impl Into<String>, host: &str) -> Self {
        let mut headers = HashMap::new();
        if !host.is_empty() {
            headers.insert("Host".to_string(), host.to_string());
        }
        Self {
            path: path.into(),
            headers,
        }
    }
}

/// HTTP/2 transport options (`h2-opts`)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct H2Opts {
    pub host: Vec<String>,

    pub path: String,
}

/// gRPC transport options (`grpc-opts`)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GrpcOpts {
    #[serde(rename = "grpc-service-name")]
    pub grpc_service_name: String,
}
