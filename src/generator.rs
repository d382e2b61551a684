//! Configuration generator module
//!
//! This module turns a parsed proxy list into a complete Clash
//! configuration: general settings, the DNS block, a fixed proxy-group
//! layout over the proxy names, and a fixed rule table. The output is a
//! pure function of the proxy list, so the same subscription always
//! produces byte-identical YAML.

use tracing::debug;

use crate::clash::ClashConfig;
use crate::clash::dns::Dns;
use crate::clash::group::ProxyGroup;
use crate::clash::proxy::Proxy;

// ============================================================================
// Group Names
// ============================================================================

/// Manual node selection, the main entry group
pub const GROUP_PROXY_SELECT: &str = "🚀 节点选择";
/// Latency-probed automatic selection
pub const GROUP_AUTO_SELECT: &str = "♻️ 自动选择";
/// Direct connection
pub const GROUP_DIRECT: &str = "🎯 全球直连";
/// Ad blocking
pub const GROUP_AD_BLOCK: &str = "🛑 广告拦截";
/// Bilibili
pub const GROUP_BILIBILI: &str = "📺 哔哩哔哩";
/// NetEase Cloud Music
pub const GROUP_NETEASE_MUSIC: &str = "🎵 网易云音乐";
/// YouTube
pub const GROUP_YOUTUBE: &str = "📹 YouTube";
/// Netflix
pub const GROUP_NETFLIX: &str = "🎬 Netflix";
/// Telegram
pub const GROUP_TELEGRAM: &str = "📱 Telegram";
/// Google
pub const GROUP_GOOGLE: &str = "🔍 Google";
/// Apple services
pub const GROUP_APPLE: &str = "🍎 苹果服务";
/// Microsoft services
pub const GROUP_MICROSOFT: &str = "Ⓜ️ 微软服务";
/// Google FCM push notifications
pub const GROUP_GOOGLE_FCM: &str = "📢 谷歌FCM";
/// Catch-all for traffic no other rule matched
pub const GROUP_FINAL: &str = "🐟 漏网之鱼";

/// Health-check endpoint for the auto-select group
const AUTO_SELECT_URL: &str = "http://www.gstatic.com/generate_204";
/// Probe interval in seconds
const AUTO_SELECT_INTERVAL: u32 = 300;
/// Latency tolerance in milliseconds
const AUTO_SELECT_TOLERANCE: u32 = 50;

// ============================================================================
// Config Building
// ============================================================================

/// Builds the full Clash configuration from parsed proxies
///
/// Proxies pass through verbatim in input order; only their names feed
/// the group membership lists. An empty input still yields the complete
/// group and rule tables.
pub fn build_config(proxies: Vec<Proxy>) -> ClashConfig {
    let names: Vec<String> = proxies.iter().map(|p| p.name().to_string()).collect();
    debug!("Building config with {} proxies", names.len());

    ClashConfig::builder()
        .dns(Dns::default())
        .proxies(proxies)
        .proxy_groups(build_proxy_groups(&names))
        .rules(build_rules())
        .build()
}

/// Builds the fixed group table over the given proxy names
fn build_proxy_groups(names: &[String]) -> Vec<ProxyGroup> {
    vec![
        ProxyGroup::select(
            GROUP_PROXY_SELECT,
            with_names(&[GROUP_AUTO_SELECT, GROUP_DIRECT], names),
        ),
        ProxyGroup::url_test(
            GROUP_AUTO_SELECT,
            names.to_vec(),
            AUTO_SELECT_URL,
            AUTO_SELECT_INTERVAL,
            AUTO_SELECT_TOLERANCE,
        ),
        ProxyGroup::select(GROUP_DIRECT, vec!["DIRECT".to_string()]),
        ProxyGroup::select(
            GROUP_AD_BLOCK,
            vec!["REJECT".to_string(), "DIRECT".to_string()],
        ),
        ProxyGroup::select(GROUP_BILIBILI, with_names(&[GROUP_DIRECT], names)),
        ProxyGroup::select(GROUP_NETEASE_MUSIC, with_names(&[GROUP_DIRECT], names)),
        ProxyGroup::select(GROUP_YOUTUBE, with_names(&[GROUP_PROXY_SELECT], names)),
        ProxyGroup::select(GROUP_NETFLIX, with_names(&[GROUP_PROXY_SELECT], names)),
        ProxyGroup::select(GROUP_TELEGRAM, with_names(&[GROUP_PROXY_SELECT], names)),
        ProxyGroup::select(GROUP_GOOGLE, with_names(&[GROUP_PROXY_SELECT], names)),
        ProxyGroup::select(
            GROUP_APPLE,
            with_names(&[GROUP_DIRECT, GROUP_PROXY_SELECT], names),
        ),
        ProxyGroup::select(
            GROUP_MICROSOFT,
            with_names(&[GROUP_DIRECT, GROUP_PROXY_SELECT], names),
        ),
        ProxyGroup::select(
            GROUP_GOOGLE_FCM,
            with_names(&[GROUP_PROXY_SELECT, GROUP_DIRECT], names),
        ),
        ProxyGroup::select(
            GROUP_FINAL,
            with_names(&[GROUP_PROXY_SELECT, GROUP_DIRECT], names),
        ),
    ]
}

/// Fixed leading entries followed by every proxy name in input order
fn with_names(leading: &[&str], names: &[String]) -> Vec<String> {
    leading
        .iter()
        .map(|entry| entry.to_string())
        .chain(names.iter().cloned())
        .collect()
}

/// The fixed routing rules, terminating in the catch-all
fn build_rules() -> Vec<String> {
    [
        // Local network
        "DOMAIN-SUFFIX,local,DIRECT",
        "IP-CIDR,127.0.0.0/8,DIRECT",
        "IP-CIDR,172.16.0.0/12,DIRECT",
        "IP-CIDR,192.168.0.0/16,DIRECT",
        "IP-CIDR,10.0.0.0/8,DIRECT",
        "IP-CIDR,17.0.0.0/8,DIRECT",
        "IP-CIDR,100.64.0.0/10,DIRECT",
        // Ad blocking
        "DOMAIN-KEYWORD,googleads,🛑 广告拦截",
        "DOMAIN-KEYWORD,googlesyndication,🛑 广告拦截",
        "DOMAIN-KEYWORD,googletagmanager,🛑 广告拦截",
        "DOMAIN,pagead2.googlesyndication.com,🛑 广告拦截",
        // Dashboards
        "DOMAIN,clash.razord.top,🎯 全球直连",
        "DOMAIN,yacd.haishan.me,🎯 全球直连",
        // YouTube
        "DOMAIN-KEYWORD,youtube,📹 YouTube",
        "DOMAIN,youtubei.googleapis.com,📹 YouTube",
        "DOMAIN-SUFFIX,googlevideo.com,📹 YouTube",
        "DOMAIN-SUFFIX,youtube.com,📹 YouTube",
        "DOMAIN-SUFFIX,ytimg.com,📹 YouTube",
        // Netflix
        "DOMAIN-KEYWORD,netflix,🎬 Netflix",
        "DOMAIN-SUFFIX,netflix.com,🎬 Netflix",
        "DOMAIN-SUFFIX,netflix.net,🎬 Netflix",
        "DOMAIN-SUFFIX,nflximg.net,🎬 Netflix",
        "DOMAIN-SUFFIX,nflxext.com,🎬 Netflix",
        "DOMAIN-SUFFIX,nflxso.net,🎬 Netflix",
        "DOMAIN-SUFFIX,nflxvideo.net,🎬 Netflix",
        // Telegram
        "DOMAIN-KEYWORD,telegram,📱 Telegram",
        "DOMAIN-SUFFIX,t.me,📱 Telegram",
        "DOMAIN-SUFFIX,tdesktop.com,📱 Telegram",
        "DOMAIN-SUFFIX,telegram.me,📱 Telegram",
        "DOMAIN-SUFFIX,telegram.org,📱 Telegram",
        "DOMAIN-SUFFIX,telesco.pe,📱 Telegram",
        // Bilibili
        "DOMAIN-KEYWORD,bilibili,📺 哔哩哔哩",
        "DOMAIN-SUFFIX,acg.tv,📺 哔哩哔哩",
        "DOMAIN-SUFFIX,acgvideo.com,📺 哔哩哔哩",
        "DOMAIN-SUFFIX,b23.tv,📺 哔哩哔哩",
        "DOMAIN-SUFFIX,bilibili.com,📺 哔哩哔哩",
        "DOMAIN-SUFFIX,bilivideo.com,📺 哔哩哔哩",
        "DOMAIN-SUFFIX,hdslb.com,📺 哔哩哔哩",
        // NetEase Cloud Music
        "DOMAIN,music.163.com,🎵 网易云音乐",
        "DOMAIN-SUFFIX,music.163.com,🎵 网易云音乐",
        "DOMAIN-SUFFIX,163yun.com,🎵 网易云音乐",
        "DOMAIN-SUFFIX,126.net,🎵 网易云音乐",
        "DOMAIN-SUFFIX,163.com,🎵 网易云音乐",
        // Microsoft
        "DOMAIN-KEYWORD,microsoft,Ⓜ️ 微软服务",
        "DOMAIN-SUFFIX,bing.com,Ⓜ️ 微软服务",
        "DOMAIN-SUFFIX,microsoft.com,Ⓜ️ 微软服务",
        "DOMAIN-SUFFIX,office.com,Ⓜ️ 微软服务",
        "DOMAIN-SUFFIX,outlook.com,Ⓜ️ 微软服务",
        "DOMAIN-SUFFIX,xbox.com,Ⓜ️ 微软服务",
        // Google FCM
        "DOMAIN,mtalk.google.com,📢 谷歌FCM",
        "DOMAIN,alt1-mtalk.google.com,📢 谷歌FCM",
        "DOMAIN,alt2-mtalk.google.com,📢 谷歌FCM",
        "DOMAIN,alt3-mtalk.google.com,📢 谷歌FCM",
        "DOMAIN,alt4-mtalk.google.com,📢 谷歌FCM",
        // GeoIP and final
        "GEOIP,LAN,🎯 全球直连",
        "GEOIP,CN,🎯 全球直连",
        "MATCH,🐟 漏网之鱼",
    ]
    .into_iter()
    .map(|rule| rule.to_string())
    .collect()
}
