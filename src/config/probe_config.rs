use serde::Deserialize;

use crate::http_probe::encoding::DEFAULT_SAFE;

/// Probe settings read from the optional YAML config file.
/// Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Timeout for each individual request, in seconds.
    pub timeout_seconds: u64,

    /// Follow redirects returned by the endpoint.
    pub follow_redirects: bool,

    /// Characters of the response body kept for error responses.
    pub body_preview_chars: usize,

    /// Characters `percentEncodeSafe` never escapes.
    pub safe_characters: String,

    /// Send all variants at once instead of one after another.
    pub concurrent: bool,

    /// Optional bound on the whole run, in seconds.
    pub deadline_seconds: Option<u64>,

    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            follow_redirects: true,
            body_preview_chars: 200,
            safe_characters: DEFAULT_SAFE.to_string(),
            concurrent: false,
            deadline_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("urlprobe/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: ProbeConfig = serde_yaml::from_str("{}").expect("Invalid YAML");
        assert_eq!(config, ProbeConfig::default());
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.safe_characters, ":/");
        assert!(config.follow_redirects);
        assert!(config.user_agent.starts_with("urlprobe/"));
    }

    #[test]
    fn test_probe_config_deserialization() {
        let yaml = r#"
                    timeout_seconds: 5
                    follow_redirects: false
                    body_preview_chars: 80
                    safe_characters: ":/?="
                    concurrent: true
                    deadline_seconds: 12
                    user_agent: storage-debug/0.1
                    "#;

        let config: ProbeConfig = serde_yaml::from_str(yaml).expect("Invalid YAML");
        assert_eq!(config.timeout_seconds, 5);
        assert!(!config.follow_redirects);
        assert_eq!(config.body_preview_chars, 80);
        assert_eq!(config.safe_characters, ":/?=");
        assert!(config.concurrent);
        assert_eq!(config.deadline_seconds, Some(12));
        assert_eq!(config.user_agent, "storage-debug/0.1");
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config: ProbeConfig = serde_yaml::from_str("concurrent: true").expect("Invalid YAML");
        assert!(config.concurrent);
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.deadline_seconds, None);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(serde_yaml::from_str::<ProbeConfig>("timeout: 5").is_err());
    }
}
