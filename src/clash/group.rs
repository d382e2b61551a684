use serde::{Deserialize, Serialize};

// ============================================================================
// Proxy Groups
// ============================================================================

/// A named group in the `proxy-groups` list
///
/// Members reference proxies (or other groups) by name. `url`, `interval`
/// and `tolerance` only apply to latency-probing groups and are omitted
/// for plain selectors.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProxyGroup {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: GroupKind,

    pub proxies: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Probe interval in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,

    /// Latency delta in milliseconds below which the current pick is kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u32>,
}

/// Proxy group behavior
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKind {
    /// Manual selection
    Select,

    /// Automatic selection by periodic latency probe
    UrlTest,
}

impl ProxyGroup {
    /// Create a manual-selection group
    pub fn select(name: impl Into<String>, proxies: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: GroupKind::Select,
            proxies,
            url: None,
            interval: None,
            tolerance: None,
        }
    }

    /// Create a latency-probing group
    pub fn url_test(
        name: impl Into<String>,
        proxies: Vec<String>,
        url: impl Into<String>,
        interval: u32,
        tolerance: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind: GroupKind::UrlTest,
            proxies,
            url: Some(url.into()),
            interval: Some(interval),
            tolerance: Some(tolerance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_group_omits_probe_fields() {
        let group = ProxyGroup::select("direct", vec!["DIRECT".to_string()]);
        let yaml = serde_yaml::to_string(&group).unwrap();
        assert!(yaml.contains("type: select"));
        assert!(yaml.contains("- DIRECT"));
        assert!(!yaml.contains("url"));
        assert!(!yaml.contains("interval"));
        assert!(!yaml.contains("tolerance"));
    }

    #[test]
    fn test_url_test_group_serializes_probe_fields() {
        let group = ProxyGroup::url_test(
            "auto",
            vec!["node-1".to_string(), "node-2".to_string()],
            "http://www.gstatic.com/generate_204",
            300,
            50,
        );
        let yaml = serde_yaml::to_string(&group).unwrap();
        assert!(yaml.contains("type: url-test"));
        assert!(yaml.contains("url: http://www.gstatic.com/generate_204"));
        assert!(yaml.contains("interval: 300"));
        assert!(yaml.contains("tolerance: 50"));
    }

    #[test]
    fn test_group_kind_kebab_case() {
        assert_eq!(
            serde_yaml::to_string(&GroupKind::UrlTest).unwrap().trim(),
            "url-test"
        );
        assert_eq!(
            serde_yaml::to_string(&GroupKind::Select).unwrap().trim(),
            "select"
        );
    }

    #[test]
    fn test_group_roundtrip() {
        let original = ProxyGroup::select("pick", vec!["a".to_string(), "b".to_string()]);
        let yaml = serde_yaml::to_string(&original).unwrap();
        let parsed: ProxyGroup = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, original);
    }
}
