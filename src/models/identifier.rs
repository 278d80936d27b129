//! PubMed Central article identifiers.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use regex::Regex;

static PMC_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PMC(\d+)").expect("valid PMC id regex"));

/// Numeric PMC identifier, stored without the `PMC` prefix.
///
/// `https://pmc.ncbi.nlm.nih.gov/articles/PMC4136787/` yields `4136787`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PmcId(String);

impl PmcId {
    /// Build an identifier from a bare digit run or a `PMC`-prefixed id.
    ///
    /// Returns `None` when anything other than digits remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw.trim();
        let digits = digits.strip_prefix("PMC").unwrap_or(digits);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(digits.to_string()))
        } else {
            None
        }
    }

    /// The digit run.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier with its `PMC` prefix, as used in article page URLs.
    pub fn prefixed(&self) -> String {
        format!("PMC{}", self.0)
    }
}

impl std::fmt::Display for PmcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PmcId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the PMC identifier from a free-form article URL.
///
/// Absence is a normal outcome: URLs without a `PMC<digits>` marker return `None`
/// so callers can report the source as ineligible without touching the network.
pub fn extract_pmc_id(url: &str) -> Option<PmcId> {
    PMC_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| PmcId(m.as_str().to_string()))
}
