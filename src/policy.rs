//! Publisher allow-list policy: the final trusted/untrusted decision.

use crate::error::TrustStatus;

/// Injectable allow-list of trusted publisher-name prefixes.
///
/// A subject name is accepted when, compared case-insensitively, its first N
/// characters equal one of the configured prefixes, where N is that prefix's
/// own length. This is a fixed-length prefix comparison, not substring search
/// and not full equality: a longer unrelated name sharing an allow-listed
/// prefix is accepted.
#[derive(Debug, Clone, Default)]
pub struct PublisherAllowList {
    prefixes: Vec<String>,
}

impl PublisherAllowList {
    pub fn new(prefixes: Vec<String>) -> Self {
        PublisherAllowList { prefixes }
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Whether `subject_name` starts with any allow-listed prefix.
    pub fn matches(&self, subject_name: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| prefix_matches(subject_name, prefix))
    }
}

/// Case-insensitive comparison of the first `prefix.chars().count()`
/// characters of `subject`. Prefix-at-start only: an occurrence at any later
/// offset does not match.
fn prefix_matches(subject: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    let len = prefix.chars().count();
    let head: String = subject.chars().take(len).collect();
    head.chars().count() == len && head.to_lowercase() == prefix.to_lowercase()
}

/// Combines the trust-verification outcome and the extracted subject name
/// into the final decision. Any upstream failure forces `false`; there is no
/// partial trust.
pub fn is_trusted_publisher(
    status: &TrustStatus,
    subject_name: &str,
    allow_list: &PublisherAllowList,
) -> bool {
    matches!(status, TrustStatus::Success) && allow_list.matches(subject_name)
}
