use std::collections::BTreeMap;
use std::time::Duration;

/// One spelling of the base URL to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub variant_name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A response arrived. 4xx and 5xx land here too.
    Success {
        status_code: u16,
        headers: BTreeMap<String, String>,
        body_preview: String,
    },
    TransportFailure { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub variant_name: String,
    pub requested_url: String,
    pub outcome: ProbeOutcome,
    /// Wall-clock time of the request, zero when it was never sent.
    pub elapsed: Duration,
}

impl ProbeResult {
    pub fn status_code(&self) -> Option<u16> {
        match &self.outcome {
            ProbeOutcome::Success { status_code, .. } => Some(*status_code),
            ProbeOutcome::TransportFailure { .. } => None,
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::TransportFailure { .. })
    }
}

/// First `max_chars` characters of `body`.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body_counts_chars() {
        assert_eq!(truncate_body("hello", 3), "hel");
        assert_eq!(truncate_body("hi", 200), "hi");
        assert_eq!(truncate_body("ééé", 2), "éé");
        assert_eq!(truncate_body("abc", 0), "");
    }

    #[test]
    fn test_status_code_accessor() {
        let ok = ProbeResult {
            variant_name: "identity".into(),
            requested_url: "http://a/".into(),
            outcome: ProbeOutcome::Success {
                status_code: 503,
                headers: BTreeMap::new(),
                body_preview: String::new(),
            },
            elapsed: Duration::ZERO,
        };
        assert_eq!(ok.status_code(), Some(503));
        assert!(!ok.is_transport_failure());

        let failed = ProbeResult {
            outcome: ProbeOutcome::TransportFailure {
                message: "dns error".into(),
            },
            ..ok
        };
        assert_eq!(failed.status_code(), None);
        assert!(failed.is_transport_failure());
    }
}
