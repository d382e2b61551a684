use serde::{Deserialize, Serialize};

// ============================================================================
// DNS Configuration
// ============================================================================

/// DNS block of the Clash document
///
/// The generated document always carries a complete resolver setup, so none
/// of these fields are optional.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Dns {
    pub enable: bool,

    pub listen: String,

    pub ipv6: bool,

    /// Bootstrap resolvers used to look up the DoH/DoT hosts below
    #[serde(rename = "default-nameserver")]
    pub default_nameserver: Vec<String>,

    #[serde(rename = "enhanced-mode")]
    pub enhanced_mode: EnhancedMode,

    #[serde(rename = "fake-ip-range")]
    pub fake_ip_range: String,

    /// Domains answered with their real address instead of a fake IP
    #[serde(rename = "fake-ip-filter")]
    pub fake_ip_filter: Vec<String>,

    pub nameserver: Vec<String>,

    /// Resolvers consulted when a primary answer looks poisoned
    pub fallback: Vec<String>,

    #[serde(rename = "fallback-filter")]
    pub fallback_filter: FallbackFilter,
}

/// DNS resolution mode
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EnhancedMode {
    FakeIp,
    RedirHost,
}

/// Conditions under which fallback resolvers take over
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FallbackFilter {
    pub geoip: bool,

    #[serde(rename = "geoip-code")]
    pub geoip_code: String,

    pub ipcidr: Vec<String>,
}

impl Default for Dns {
    /// Fake-IP resolver setup tuned for mainland-China networks
    ///
    /// Domestic nameservers answer plain queries; poisoning-suspect answers
    /// fall through to encrypted resolvers. The fake-IP filter keeps LAN
    /// names, connectivity probes, game services and music streaming on
    /// real addresses.
    fn default() -> Self {
        Self {
            enable: true,
            listen: "0.0.0.0:53".to_string(),
            ipv6: false,
            default_nameserver: string_vec(&["114.114.114.114", "223.5.5.5"]),
            enhanced_mode: EnhancedMode::FakeIp,
            fake_ip_range: "198.18.0.1/16".to_string(),
            fake_ip_filter: string_vec(&[
                "*.lan",
                "*.localdomain",
                "*.example",
                "*.invalid",
                "*.localhost",
                "*.test",
                "*.local",
                "*.home.arpa",
                "+.msftconnecttest.com",
                "+.msftncsi.com",
                "localhost.ptlogin2.qq.com",
                "+.srv.nintendo.net",
                "+.stun.playstation.net",
                "xbox.*.microsoft.com",
                "+.battlenet.com.cn",
                "+.wotgame.cn",
                "+.wggames.cn",
                "+.wowsgame.cn",
                "+.wargaming.net",
                "music.163.com",
                "*.music.163.com",
                "*.126.net",
                "musicapi.taihe.com",
                "music.taihe.com",
                "songsearch.kugou.com",
                "trackercdn.kugou.com",
                "*.kuwo.cn",
                "api-jooxtt.sanook.com",
                "api.joox.com",
                "joox.com",
                "y.qq.com",
                "*.y.qq.com",
                "streamoc.music.tc.qq.com",
                "mobileoc.music.tc.qq.com",
                "isure.stream.qqmusic.qq.com",
                "dl.stream.qqmusic.qq.com",
                "aqqmusic.tc.qq.com",
                "amobile.music.tc.qq.com",
                "*.xiami.com",
                "*.music.migu.cn",
                "music.migu.cn",
            ]),
            nameserver: string_vec(&[
                "119.29.29.29",
                "223.5.5.5",
                "114.114.114.114",
                "8.8.8.8",
            ]),
            fallback: string_vec(&[
                "https://dns.cloudflare.com/dns-query",
                "https://dns.google/dns-query",
                "tls://dns.google",
            ]),
            fallback_filter: FallbackFilter {
                geoip: true,
                geoip_code: "CN".to_string(),
                ipcidr: string_vec(&["240.0.0.0/4"]),
            },
        }
    }
}

fn string_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dns_shape() {
        let dns = Dns::default();
        assert!(dns.enable);
        assert_eq!(dns.listen, "0.0.0.0:53");
        assert!(!dns.ipv6);
        assert_eq!(dns.enhanced_mode, EnhancedMode::FakeIp);
        assert_eq!(dns.fake_ip_range, "198.18.0.1/16");
        assert_eq!(dns.default_nameserver.len(), 2);
        assert_eq!(dns.nameserver.len(), 4);
        assert_eq!(dns.fallback.len(), 3);
    }

    #[test]
    fn test_default_dns_fallback_filter() {
        let filter = Dns::default().fallback_filter;
        assert!(filter.geoip);
        assert_eq!(filter.geoip_code, "CN");
        assert_eq!(filter.ipcidr, vec!["240.0.0.0/4"]);
    }

    #[test]
    fn test_enhanced_mode_serializes_kebab_case() {
        let yaml = serde_yaml::to_string(&EnhancedMode::FakeIp).unwrap();
        assert_eq!(yaml.trim(), "fake-ip");
    }

    #[test]
    fn test_dns_serializes_clash_keys() {
        let yaml = serde_yaml::to_string(&Dns::default()).unwrap();
        assert!(yaml.contains("enhanced-mode: fake-ip"));
        assert!(yaml.contains("fake-ip-range: 198.18.0.1/16"));
        assert!(yaml.contains("default-nameserver:"));
        assert!(yaml.contains("fallback-filter:"));
        assert!(yaml.contains("geoip-code: CN"));
    }

    #[test]
    fn test_dns_roundtrip() {
        let original = Dns::default();
        let yaml = serde_yaml::to_string(&original).unwrap();
        let parsed: Dns = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, original);
    }
}
