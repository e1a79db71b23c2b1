// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 规则分类的场景测试：名称变体、群组识别与个人主页排除

use pageresolver::domain::models::search_hit::SearchHit;
use pageresolver::domain::models::verdict::UrlKind;
use pageresolver::domain::services::candidate_filter::CandidateFilter;
use pageresolver::domain::services::rule_classifier::RuleClassifier;
use pageresolver::domain::services::url_classifier::UrlClassifier;

fn classifier() -> RuleClassifier {
    RuleClassifier::new("Facebook")
}

#[tokio::test]
async fn test_page_preferred_over_group_and_profile() {
    let hits = vec![
        SearchHit::new("https://www.facebook.com/john.smith", "John Smith", ""),
        SearchHit::new(
            "https://www.facebook.com/groups/ovadatennis/",
            "Tennis Club Ovada fans",
            "",
        ),
        SearchHit::new(
            "https://www.facebook.com/TennisClubOvada/",
            "Tennis Club Ovada",
            "Ovada",
        ),
    ];

    let verdict = classifier()
        .classify("Tennis Club Ovada", "Ovada,IT", &hits)
        .await;
    assert_eq!(verdict.kind, UrlKind::Page);
    assert_eq!(verdict.url, "https://www.facebook.com/TennisClubOvada/");
}

#[tokio::test]
async fn test_group_url_is_never_a_page() {
    let hits = vec![SearchHit::new(
        "https://www.facebook.com/Groups/TennisClubOvada/",
        "Tennis Club Ovada",
        "",
    )];

    let verdict = classifier()
        .classify("Tennis Club Ovada", "Ovada,IT", &hits)
        .await;
    assert_eq!(verdict.kind, UrlKind::Group);
}

#[tokio::test]
async fn test_profile_only_results_are_not_found() {
    let hits = vec![
        SearchHit::new("https://www.facebook.com/profile.php?id=100012345678", "Mario Rossi", ""),
        SearchHit::new("https://www.facebook.com/mario.rossi.90", "Mario Rossi", ""),
    ];

    let verdict = classifier()
        .classify("Pizzeria Da Mario", "Napoli,IT", &hits)
        .await;
    assert_eq!(verdict.kind, UrlKind::NotFound);
    assert_eq!(verdict.url, "Not found");
    assert_eq!(verdict.confidence, 0.0);
}

#[tokio::test]
async fn test_word_order_and_spacing_variants_match() {
    let hits = vec![SearchHit::new(
        "https://www.facebook.com/ovadatennisclub/",
        "Ovada Tennis Club",
        "",
    )];

    let verdict = classifier()
        .classify("Tennis Club Ovada", "Ovada,IT", &hits)
        .await;
    assert_eq!(verdict.kind, UrlKind::Page);
    assert!(verdict.confidence > 0.8);
}

#[test]
fn test_filter_is_idempotent() {
    let filter = CandidateFilter::new("facebook.com");
    let hits = vec![
        SearchHit::new("https://www.facebook.com/TennisClubOvada/", "", ""),
        SearchHit::new("https://www.instagram.com/tennisclubovada/", "", ""),
        SearchHit::new("https://m.FACEBOOK.com/groups/ovada/", "", ""),
    ];

    let once = filter.filter(&hits);
    assert_eq!(once.len(), 2);
    assert_eq!(filter.filter(&once), once);
}
