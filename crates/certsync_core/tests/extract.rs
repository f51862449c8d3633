use std::sync::Once;

use certsync_core::{extract_records, NormalizeError, RawEntry, SkipReason};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn entry(title: &str, dates: &str, link: Option<&str>) -> RawEntry {
    RawEntry::new(title, dates, link.map(ToOwned::to_owned))
}

#[test]
fn entries_without_link_are_dropped_and_order_is_kept() {
    init_logging();
    let entries = vec![
        entry(
            "AWS Certified Cloud Practitioner",
            "Issued Jan 2022 \u{00B7} Expires Jan 2025",
            Some("https://a.example.com/1"),
        ),
        entry("Microsoft Certified: Azure Fundamentals", "Issued Feb 2021", None),
        entry(
            "HashiCorp Certified: Terraform Associate",
            "Issued Mar 2023 \u{00B7} Expires Mar 2025",
            Some("https://b.example.com/2?x=1"),
        ),
        entry(
            "KCNA: Kubernetes and Cloud Native Associate",
            "Issued Apr 2023",
            Some("   "),
        ),
        entry(
            "Google Cloud Digital Leader",
            "Issued May 2020",
            Some("https://c.example.com/3#top"),
        ),
    ];

    let extraction = extract_records(entries);

    let names: Vec<_> = extraction.records.iter().map(|r| r.name()).collect();
    assert_eq!(
        names,
        vec!["Cloud Practitioner", "Terraform Associate", "Digital Leader"]
    );
    assert_eq!(extraction.records.len(), 5 - 2);

    let skipped: Vec<_> = extraction
        .skipped
        .iter()
        .map(|s| (s.index, s.reason.clone()))
        .collect();
    assert_eq!(
        skipped,
        vec![(1, SkipReason::MissingLink), (3, SkipReason::MissingLink)]
    );
}

#[test]
fn extracted_record_carries_normalized_fields() {
    init_logging();
    let extraction = extract_records(vec![entry(
        "AWS Certified Solutions Architect \u{2013} Associate",
        "Issued Jan 2022 \u{00B7} Expires Mar 2024",
        Some("https://example.com/cert?linked_in_profile=abc&x=1"),
    )]);

    assert!(extraction.skipped.is_empty());
    let record = &extraction.records[0];
    assert_eq!(record.name(), "Solutions Architect - Associate");
    assert!(record.has_expiry());
    assert_eq!(record.issue_date(), "01012022");
    assert_eq!(record.expiry_date(), Some("03012024"));
    assert_eq!(record.url(), "https://example.com/cert");
}

#[test]
fn duplicates_are_not_collapsed() {
    init_logging();
    let twice = entry(
        "AWS Certified Developer",
        "Issued Jun 2021",
        Some("https://x.example.com/d"),
    );
    let extraction = extract_records(vec![twice.clone(), twice]);
    assert_eq!(extraction.records.len(), 2);
    assert_eq!(extraction.records[0], extraction.records[1]);
}

#[test]
fn normalization_failures_are_skipped_not_fatal() {
    init_logging();
    let extraction = extract_records(vec![
        entry("Bad Month", "Issued Sept 2021", Some("https://x.example.com/a")),
        entry("Bad Link", "Issued Jan 2021", Some("not a url")),
        entry("AWS Certified", "Issued Jan 2021", Some("https://x.example.com/b")),
        entry("Good One", "Issued Jan 2021", Some("https://x.example.com/c")),
    ]);

    assert_eq!(extraction.records.len(), 1);
    assert_eq!(extraction.records[0].name(), "Good One");
    assert_eq!(
        extraction.skipped[0].reason,
        SkipReason::Normalize(NormalizeError::UnrecognizedMonth("Sept".into()))
    );
    assert!(matches!(
        extraction.skipped[1].reason,
        SkipReason::Normalize(NormalizeError::InvalidUrl { .. })
    ));
    assert!(matches!(extraction.skipped[2].reason, SkipReason::Record(_)));
}

#[test]
fn empty_listing_yields_empty_extraction() {
    init_logging();
    let extraction = extract_records(Vec::new());
    assert!(extraction.records.is_empty());
    assert!(extraction.skipped.is_empty());
}
