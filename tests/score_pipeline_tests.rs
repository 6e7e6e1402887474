use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trustid_sidecar::assess::{RiskLevel, Scorer, ScoringPolicy};
use trustid_sidecar::reputation::{ReputationLookup, ReputationProvider};

/// Canned provider so pipeline tests stay offline.
struct StubProvider {
    result: ReputationLookup,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ReputationProvider for StubProvider {
    async fn lookup(&self, _urls: &[String]) -> ReputationLookup {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

fn scorer_with(result: ReputationLookup) -> (Scorer, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = StubProvider {
        result,
        calls: calls.clone(),
    };
    (Scorer::new(Arc::new(provider), ScoringPolicy::default()), calls)
}

#[tokio::test]
async fn two_keyword_flagged_urls_score_medium_without_a_provider() {
    let (scorer, _) = scorer_with(ReputationLookup::unsupported());

    let out = scorer
        .score("verify your account: http://fakebank-login.com and https://accounts.example.com/reset")
        .await;

    assert_eq!(
        out.found_urls,
        vec!["http://fakebank-login.com", "https://accounts.example.com/reset"]
    );
    assert!(out.url_assessments[0].heuristics_flagged);
    assert_eq!(out.url_assessments[0].heuristic_reasons, vec!["suspicious_keywords"]);
    assert!(out.url_assessments[1].heuristics_flagged);
    assert_eq!(out.url_assessments[1].heuristic_reasons, vec!["suspicious_keywords"]);

    assert_eq!(out.overall_risk, RiskLevel::Medium);
    assert!(out.is_phishing);
    assert!(!out.gsb_supported);
    assert!(out.gsb_error.is_none());
}

#[tokio::test]
async fn a_single_flagged_url_scores_low_end_to_end() {
    let (scorer, _) = scorer_with(ReputationLookup::unsupported());

    let out = scorer.score("docs moved to https://example.com/login").await;

    assert_eq!(out.found_urls.len(), 1);
    assert!(out.url_assessments[0].heuristics_flagged);
    assert_eq!(out.overall_risk, RiskLevel::Low);
    assert!(!out.is_phishing);
}

#[tokio::test]
async fn a_reputation_match_forces_high_and_lands_on_the_right_url() {
    let mut matches = HashMap::new();
    matches.insert(
        "http://known-bad.example/x".to_string(),
        vec!["SOCIAL_ENGINEERING".to_string()],
    );
    let (scorer, _) = scorer_with(ReputationLookup {
        supported: true,
        matches,
        error: None,
    });

    let out = scorer
        .score("http://known-bad.example/x plus https://fine.example/about")
        .await;

    assert_eq!(out.overall_risk, RiskLevel::High);
    assert!(out.is_phishing);
    assert!(out.gsb_supported);
    assert_eq!(
        out.url_assessments[0].gsb_matches,
        vec!["SOCIAL_ENGINEERING".to_string()]
    );
    assert!(out.url_assessments[1].gsb_matches.is_empty());
}

#[tokio::test]
async fn empty_text_skips_the_provider_entirely() {
    let (scorer, calls) = scorer_with(ReputationLookup::unsupported());

    let out = scorer.score("").await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(out.found_urls.is_empty());
    assert_eq!(out.overall_risk, RiskLevel::Low);
    assert!(!out.is_phishing);
    assert!(!out.gsb_supported);
}

#[tokio::test]
async fn provider_failure_degrades_to_heuristics_only() {
    let (scorer, _) = scorer_with(ReputationLookup {
        supported: true,
        matches: HashMap::new(),
        error: Some("deadline exceeded".to_string()),
    });

    let out = scorer.score("see https://example.com/login now").await;

    assert!(out.gsb_supported);
    assert_eq!(out.gsb_error.as_deref(), Some("deadline exceeded"));
    assert!(out.url_assessments[0].heuristics_flagged);
    assert_eq!(out.overall_risk, RiskLevel::Low);
}

#[tokio::test]
async fn repeated_urls_are_assessed_once() {
    let (scorer, _) = scorer_with(ReputationLookup::unsupported());

    let out = scorer
        .score("http://a.example/x again http://a.example/x and http://b.example/y")
        .await;

    assert_eq!(out.found_urls, vec!["http://a.example/x", "http://b.example/y"]);
    assert_eq!(out.url_assessments.len(), 2);
}
