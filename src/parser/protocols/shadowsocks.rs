//! Shadowsocks protocol parser
//!
//! This module provides parsing for Shadowsocks (ss://) URIs.
//! Supports both SIP002 format and legacy format, as well as SIP003 plugins.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use tracing::trace;

use crate::clash::proxy::{Proxy, ShadowsocksProxy};
use crate::parser::base64::decode_base64_text;

use super::{ProtocolParser, parse_host_port};

// ============================================================================
// Shadowsocks Parser
// ============================================================================

/// Parser for Shadowsocks (ss://) URIs
///
/// Supports both SIP002 format and legacy format, as well as SIP003 plugins:
/// - SIP002: ss://BASE64(method:password)@host:port#name
/// - SIP002 with SIP003 plugin: ss://BASE64(userinfo)@host:port/?plugin=name;opts#name
/// - Legacy: ss://BASE64(method:password@host:port)#name
///
/// The two forms are told apart by the presence of `@` in the body: base64
/// text never contains one, so a literal `@` means the authority is plain.
pub struct ShadowsocksParser;

impl ProtocolParser for ShadowsocksParser {
    fn scheme(&self) -> &str {
        "ss"
    }

    fn parse(&self, uri: &str) -> Result<Proxy> {
        let uri = uri.trim();
        trace!("Parsing Shadowsocks URI");

        let body = uri
            .strip_prefix("ss://")
            .ok_or_else(|| anyhow!("Invalid Shadowsocks URI: missing ss:// prefix"))?;

        if body.contains('@') {
            trace!("Parsing as SIP002 format (found @ separator)");
            return parse_sip002(body);
        }

        trace!("Parsing as legacy Base64 format");
        parse_legacy(body)
    }
}

/// Parses SIP002 format: BASE64(method:password)@host:port[/?plugin=...][#name]
///
/// The body must contain exactly one `@`, fragment included; extras mean
/// a malformed line, not a host or name character.
fn parse_sip002(body: &str) -> Result<Proxy> {
    let (userinfo, rest) = body
        .split_once('@')
        .filter(|(_, rest)| !rest.contains('@'))
        .ok_or_else(|| anyhow!("Invalid Shadowsocks URI: expected a single @ separator"))?;

    let (rest, name) = split_fragment(rest);

    // Split off query string if present: host:port/?plugin=... or host:port?plugin=...
    let (hostport_raw, query) = match rest.split_once('?') {
        Some((hostport, query)) => (hostport, Some(query)),
        None => (rest, None),
    };

    // Strip trailing slash that may appear before the query string
    let hostport = hostport_raw.trim_end_matches('/');
    let (server, port) = parse_host_port(hostport)?;

    let (cipher, password) = split_userinfo(&decode_base64_text(userinfo)?)?;
    let (plugin, plugin_opts) = parse_plugin_query(query);

    Ok(Proxy::Shadowsocks(ShadowsocksProxy {
        name,
        server,
        port,
        cipher,
        password,
        plugin,
        plugin_opts,
    }))
}

/// Parses legacy format: BASE64(method:password@host:port)[#name]
fn parse_legacy(body: &str) -> Result<Proxy> {
    let (encoded, name) = split_fragment(body);
    let decoded = decode_base64_text(encoded)
        .map_err(|e| anyhow!("Failed to decode legacy Shadowsocks URI: {}", e))?;

    let (cipher, rest) = split_userinfo(&decoded)?;

    // The last @ splits credentials from the authority, so passwords may
    // contain one
    let (password, hostport) = rest
        .rsplit_once('@')
        .ok_or_else(|| anyhow!("Invalid legacy Shadowsocks format: missing @"))?;

    let (server, port) = parse_host_port(hostport)?;

    Ok(Proxy::Shadowsocks(ShadowsocksProxy {
        name,
        server,
        port,
        cipher,
        password: password.to_string(),
        plugin: None,
        plugin_opts: BTreeMap::new(),
    }))
}

/// Splits an optional `#fragment` off and percent-decodes it into the name
fn split_fragment(body: &str) -> (&str, String) {
    match body.split_once('#') {
        Some((rest, fragment)) => {
            let name = urlencoding::decode(fragment)
                .unwrap_or_else(|_| fragment.into())
                .into_owned();
            if name.is_empty() {
                (rest, "SS".to_string())
            } else {
                (rest, name)
            }
        }
        None => (body, "SS".to_string()),
    }
}

/// Splits decoded userinfo on the first `:` into method and password
fn split_userinfo(userinfo: &str) -> Result<(String, String)> {
    let (method, password) = userinfo.split_once(':').ok_or_else(|| {
        anyhow!("Invalid Shadowsocks userinfo: missing method:password separator")
    })?;
    Ok((method.to_string(), password.to_string()))
}

/// Parses the SIP003 `plugin` query parameter from a query string.
///
/// The plugin parameter format is: `plugin=plugin-name;plugin-opts`
/// where `;`-separated options are `key=value` pairs, bare keys standing
/// for `key=true`.
///
/// Examples:
/// - `plugin=obfs-local;obfs=http;obfs-host=example.com`
///   → plugin: `obfs-local`, opts: `{obfs: http, obfs-host: example.com}`
/// - `plugin=v2ray-plugin;tls;host=example.com`
///   → plugin: `v2ray-plugin`, opts: `{tls: true, host: example.com}`
fn parse_plugin_query(query: Option<&str>) -> (Option<String>, BTreeMap<String, String>) {
    let query = match query {
        Some(q) if !q.is_empty() => q,
        _ => return (None, BTreeMap::new()),
    };

    for param in query.split('&') {
        if let Some(raw_value) = param.strip_prefix("plugin=") {
            let decoded = urlencoding::decode(raw_value)
                .unwrap_or_else(|_| raw_value.into())
                .into_owned();

            if decoded.is_empty() {
                return (None, BTreeMap::new());
            }

            let mut segments = decoded.split(';');
            let plugin = segments.next().unwrap_or_default().to_string();

            let mut opts = BTreeMap::new();
            for segment in segments {
                if segment.is_empty() {
                    continue;
                }
                match segment.split_once('=') {
                    Some((key, value)) => opts.insert(key.to_string(), value.to_string()),
                    None => opts.insert(segment.to_string(), "true".to_string()),
                };
            }

            return (Some(plugin), opts);
        }
    }

    (None, BTreeMap::new())
}
