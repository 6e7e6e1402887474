use crate::extract::{authority, host_from_url};
use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Tokens that phishing URLs lean on to look urgent or official.
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "login",
    "verify",
    "update",
    "reset",
    "bank",
    "secure",
    "password",
    "unlock",
    "support",
    "confirm",
    "credential",
    "invoice",
    "wallet",
];

static KEYWORDS: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(SUSPICIOUS_KEYWORDS)
        .expect("keyword patterns must compile")
});

/// Local, rule-based suspicion signal for a single URL.
///
/// Invariant: `flagged` is true exactly when `reasons` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicFinding {
    pub flagged: bool,
    pub reasons: Vec<String>,
}

/// Run the fixed rule battery against one URL. Pure function, no I/O.
///
/// Every rule is checked; a URL can accumulate several reasons. Reason codes
/// appear in rule-check order.
pub fn evaluate_url(url: &str) -> HeuristicFinding {
    let mut reasons: Vec<String> = Vec::new();
    let host = host_from_url(url);

    // Urgency/credential keywords anywhere in the URL, host or path.
    if KEYWORDS.is_match(url) {
        reasons.push("suspicious_keywords".to_string());
    }

    // Raw IP instead of a domain name.
    if host.parse::<IpAddr>().is_ok() {
        reasons.push("ip_in_host".to_string());
    }

    // IDN homograph markers: punycode labels or non-ASCII host characters.
    if host.contains("xn--") {
        reasons.push("punycode_host".to_string());
    }
    if host.chars().any(|c| (c as u32) > 127) {
        reasons.push("non_ascii_host".to_string());
    }

    // Subdomain pile-ups like bank.secure.account.verify.example.com.
    if host.matches('.').count() >= 4 {
        reasons.push("many_subdomains".to_string());
    }

    // user@host authorities hide the real destination.
    if authority(url).contains('@') {
        reasons.push("at_symbol_in_authority".to_string());
    }

    HeuristicFinding {
        flagged: !reasons.is_empty(),
        reasons,
    }
}
