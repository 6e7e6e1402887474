use crate::extract::extract_urls;
use crate::heuristics::{evaluate_url, HeuristicFinding};
use crate::reputation::{ReputationLookup, ReputationProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// One URL with its local finding and any provider matches for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlAssessment {
    pub url: String,
    pub heuristics_flagged: bool,
    pub heuristic_reasons: Vec<String>,
    #[serde(default)]
    pub gsb_matches: Vec<String>,
}

/// Full output of one scoring call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallAssessment {
    pub found_urls: Vec<String>,
    pub url_assessments: Vec<UrlAssessment>,
    pub gsb_supported: bool,
    pub gsb_error: Option<String>,
    pub overall_risk: RiskLevel,
    pub is_phishing: bool,
}

/// Escalation thresholds, passed in at construction rather than read from
/// the environment mid-scoring.
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    /// Number of heuristically flagged URLs at which risk escalates to
    /// MEDIUM. A single flagged URL stays LOW.
    pub medium_flag_count: usize,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self { medium_flag_count: 2 }
    }
}

/// Combine per-URL findings and the provider lookup into one verdict.
///
/// Priority order, first match wins: any provider match is HIGH; enough
/// heuristic flags is MEDIUM; everything else is LOW.
pub fn aggregate(
    urls: Vec<String>,
    findings: Vec<HeuristicFinding>,
    reputation: ReputationLookup,
    policy: &ScoringPolicy,
) -> OverallAssessment {
    debug_assert_eq!(urls.len(), findings.len());

    let flagged_total = findings.iter().filter(|f| f.flagged).count();
    let overall_risk = if reputation.hit_count() > 0 {
        RiskLevel::High
    } else if flagged_total >= policy.medium_flag_count {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let url_assessments = urls
        .iter()
        .zip(findings)
        .map(|(url, finding)| UrlAssessment {
            url: url.clone(),
            heuristics_flagged: finding.flagged,
            heuristic_reasons: finding.reasons,
            gsb_matches: reputation.matches.get(url).cloned().unwrap_or_default(),
        })
        .collect();

    OverallAssessment {
        found_urls: urls,
        url_assessments,
        gsb_supported: reputation.supported,
        gsb_error: reputation.error,
        overall_risk,
        is_phishing: overall_risk != RiskLevel::Low,
    }
}

/// The scoring engine: extraction, heuristics, reputation lookup and
/// aggregation behind a single call. Holds no state across calls beyond the
/// provider handle and the policy.
pub struct Scorer {
    provider: Arc<dyn ReputationProvider>,
    policy: ScoringPolicy,
}

impl Scorer {
    pub fn new(provider: Arc<dyn ReputationProvider>, policy: ScoringPolicy) -> Self {
        Self { provider, policy }
    }

    /// Score one plaintext message. Always returns a structured assessment;
    /// provider trouble degrades to heuristic-only results.
    pub async fn score(&self, text: &str) -> OverallAssessment {
        let urls = extract_urls(text);
        let findings: Vec<HeuristicFinding> = urls.iter().map(|u| evaluate_url(u)).collect();

        let reputation = if urls.is_empty() {
            ReputationLookup::unsupported()
        } else {
            self.provider.lookup(&urls).await
        };

        aggregate(urls, findings, reputation, &self.policy)
    }
}
