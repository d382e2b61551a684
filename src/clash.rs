use serde::{Deserialize, Serialize};

use crate::clash::dns::Dns;
use crate::clash::group::ProxyGroup;
use crate::clash::proxy::Proxy;

pub mod dns;
pub mod group;
pub mod proxy;

/// Complete Clash configuration document
///
/// This struct represents the whole emitted file: general settings, the DNS
/// block, the proxies decoded from the subscription, the proxy groups and
/// the routing rules. Key order in the YAML output follows field order
/// here. The defaults carry the fixed general settings; proxies, groups
/// and rules are filled in by the generator.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ClashConfig {
    /// HTTP proxy port
    pub port: u16,

    /// SOCKS5 proxy port
    #[serde(rename = "socks-port")]
    pub socks_port: u16,

    #[serde(rename = "allow-lan")]
    pub allow_lan: bool,

    pub mode: Mode,

    #[serde(rename = "log-level")]
    pub log_level: LogLevel,

    /// RESTful API listen address
    #[serde(rename = "external-controller")]
    pub external_controller: String,

    pub dns: Dns,

    pub proxies: Vec<Proxy>,

    #[serde(rename = "proxy-groups")]
    pub proxy_groups: Vec<ProxyGroup>,

    pub rules: Vec<String>,
}

/// Traffic handling mode
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Rule,
    Global,
    Direct,
}

/// Clash core log verbosity
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Silent,
}

impl Default for ClashConfig {
    fn default() -> Self {
        Self {
            port: 7890,
            socks_port: 7891,
            allow_lan: false,
            mode: Mode::Rule,
            log_level: LogLevel::Info,
            external_controller: "127.0.0.1:9090".to_string(),
            dns: Dns::default(),
            proxies: Vec::new(),
            proxy_groups: Vec::new(),
            rules: Vec::new(),
        }
    }
}

impl ClashConfig {
    /// Create a configuration with the default general settings and no
    /// proxies, groups or rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration builder
    pub fn builder() -> ClashConfigBuilder {
        ClashConfigBuilder::new()
    }

    /// Serialize the configuration to a YAML string
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Deserialize a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

/// Builder for ClashConfig
#[derive(Default)]
pub struct ClashConfigBuilder {
    config: ClashConfig,
}

impl ClashConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the DNS block
    pub fn dns(mut self, dns: Dns) -> Self {
        self.config.dns = dns;
        self
    }

    /// Add a proxy
    pub fn proxy(mut self, proxy: Proxy) -> Self {
        self.config.proxies.push(proxy);
        self
    }

    /// Set the proxies
    pub fn proxies(mut self, proxies: Vec<Proxy>) -> Self {
        self.config.proxies = proxies;
        self
    }

    /// Add a proxy group
    pub fn proxy_group(mut self, group: ProxyGroup) -> Self {
        self.config.proxy_groups.push(group);
        self
    }

    /// Set the proxy groups
    pub fn proxy_groups(mut self, groups: Vec<ProxyGroup>) -> Self {
        self.config.proxy_groups = groups;
        self
    }

    /// Set the routing rules
    pub fn rules(mut self, rules: Vec<String>) -> Self {
        self.config.rules = rules;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClashConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clash::proxy::TrojanProxy;

    #[test]
    fn test_default_general_settings() {
        let config = ClashConfig::default();
        assert_eq!(config.port, 7890);
        assert_eq!(config.socks_port, 7891);
        assert!(!config.allow_lan);
        assert_eq!(config.mode, Mode::Rule);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.external_controller, "127.0.0.1:9090");
        assert!(config.proxies.is_empty());
    }

    #[test]
    fn test_to_yaml_uses_clash_key_spelling() {
        let yaml = ClashConfig::default().to_yaml().unwrap();
        assert!(yaml.contains("port: 7890"));
        assert!(yaml.contains("socks-port: 7891"));
        assert!(yaml.contains("allow-lan: false"));
        assert!(yaml.contains("mode: rule"));
        assert!(yaml.contains("log-level: info"));
        assert!(yaml.contains("external-controller: 127.0.0.1:9090"));
        assert!(yaml.contains("proxies: []"));
    }

    #[test]
    fn test_builder() {
        let config = ClashConfig::builder()
            .proxy(Proxy::Trojan(TrojanProxy {
                name: "t1".to_string(),
                server: "example.com".to_string(),
                port: 443,
                password: Some("pw".to_string()),
                skip_cert_verify: true,
                sni: Some("example.com".to_string()),
                network: None,
                ws_opts: None,
            }))
            .proxy_group(ProxyGroup::select("pick", vec!["t1".to_string()]))
            .rules(vec!["MATCH,pick".to_string()])
            .build();

        assert_eq!(config.proxies.len(), 1);
        assert_eq!(config.proxy_groups.len(), 1);
        assert_eq!(config.rules, vec!["MATCH,pick"]);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let original = ClashConfig::builder()
            .proxy_group(ProxyGroup::select("pick", vec!["DIRECT".to_string()]))
            .rules(vec!["MATCH,pick".to_string()])
            .build();
        let yaml = original.to_yaml().unwrap();
        let parsed = ClashConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.port, original.port);
        assert_eq!(parsed.proxy_groups, original.proxy_groups);
        assert_eq!(parsed.rules, original.rules);
    }

    #[test]
    fn test_from_yaml_fills_missing_keys_with_defaults() {
        let config = ClashConfig::from_yaml("mode: global\n").unwrap();
        assert_eq!(config.mode, Mode::Global);
        assert_eq!(config.port, 7890);
    }

    #[test]
    fn test_yaml_output_has_no_nulls() {
        let yaml = ClashConfig::default().to_yaml().unwrap();
        assert!(!yaml.contains("null"));
        assert!(!yaml.contains("~"));
    }
}
