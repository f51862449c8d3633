mod common;

use certsync_core::{extract_records, RawEntry};
use certsync_engine::{
    collect_listing, parse_listing, ClaimFormSettings, ListingError, ListingSelectors, UiError,
};
use common::{fast_waits, init_logging, Call, ScriptedSurface};
use pretty_assertions::assert_eq;

const LISTING_URL: &str = "https://www.linkedin.com/in/jane/details/certifications/";

const LISTING_HTML: &str = r#"
<html><body>
<div class="scaffold-finite-scroll__content">
  <ul>
    <li>
      <div><span>AWS Certified Solutions Architect &#8211; Associate</span></div>
      <span>Amazon Web Services (AWS)</span>
      <span>Issued Jan 2022 &#183; Expires Jan 2025</span>
      <div class="pv-action__padding">
        <a href="https://www.credly.com/badges/abc/linked_in_profile?trk=x">Show credential</a>
      </div>
    </li>
    <li>
      <div><span>Microsoft Certified: Azure Fundamentals</span></div>
      <span>Issued Jun 2021</span>
    </li>
    <li>
      <div><span>Certified Kubernetes Administrator (CKA)</span></div>
      <span>Issued Mar 2023</span>
      <div class="pv-action__padding"><a href="/redir/cka">Show credential</a></div>
    </li>
    <li><div></div></li>
  </ul>
</div>
</body></html>
"#;

#[test]
fn listing_items_become_raw_entries() {
    init_logging();
    let entries = parse_listing(LISTING_HTML, &ListingSelectors::default(), Some(LISTING_URL))
        .unwrap();

    assert_eq!(
        entries,
        vec![
            RawEntry::new(
                "AWS Certified Solutions Architect \u{2013} Associate",
                "Issued Jan 2022 \u{00B7} Expires Jan 2025",
                Some("https://www.credly.com/badges/abc/linked_in_profile?trk=x".to_string()),
            ),
            RawEntry::new("Microsoft Certified: Azure Fundamentals", "Issued Jun 2021", None),
            RawEntry::new(
                "Certified Kubernetes Administrator (CKA)",
                "Issued Mar 2023",
                Some("https://www.linkedin.com/redir/cka".to_string()),
            ),
        ]
    );
}

#[test]
fn parsed_listing_feeds_extraction() {
    init_logging();
    let entries = parse_listing(LISTING_HTML, &ListingSelectors::default(), Some(LISTING_URL))
        .unwrap();
    let extraction = extract_records(entries);

    assert_eq!(extraction.records.len(), 2);
    assert_eq!(extraction.skipped.len(), 1);
    assert_eq!(extraction.skipped[0].index, 1);

    let first = &extraction.records[0];
    assert_eq!(first.name(), "Solutions Architect - Associate");
    assert_eq!(first.issue_date(), "01012022");
    assert_eq!(first.expiry_date(), Some("01012025"));
    assert_eq!(first.url(), "https://www.credly.com/badges/abc/");
}

#[test]
fn relative_links_without_base_are_dropped() {
    init_logging();
    let entries = parse_listing(LISTING_HTML, &ListingSelectors::default(), None).unwrap();
    assert_eq!(entries[2].link, None);
}

#[test]
fn empty_page_has_no_entries() {
    init_logging();
    let entries = parse_listing("<html></html>", &ListingSelectors::default(), None).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn bad_selector_is_reported() {
    init_logging();
    let selectors = ListingSelectors {
        item: "li[".to_string(),
        ..ListingSelectors::default()
    };
    let err = parse_listing(LISTING_HTML, &selectors, None).unwrap_err();
    assert!(matches!(err, ListingError::InvalidSelector { selector, .. } if selector == "li["));
}

#[tokio::test]
async fn collect_listing_scrolls_until_the_height_settles() {
    init_logging();
    let selectors = ListingSelectors::default();
    let surface = ScriptedSurface::new(&ClaimFormSettings::default())
        .with_heights(&[100, 200, 300, 300])
        .with_html(LISTING_HTML);

    let entries = collect_listing(&surface, LISTING_URL, &selectors, &fast_waits())
        .await
        .unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(
        surface.calls(),
        vec![
            Call::Navigate(LISTING_URL.to_string()),
            Call::Scroll,
            Call::Scroll,
            Call::Scroll,
        ]
    );
}

#[tokio::test]
async fn endlessly_growing_listing_times_out() {
    init_logging();
    let selectors = ListingSelectors::default();
    let surface = ScriptedSurface::new(&ClaimFormSettings::default())
        .with_heights(&[1, 2, 3, 4, 5, 6, 7, 8])
        .with_html(LISTING_HTML);

    let err = collect_listing(&surface, LISTING_URL, &selectors, &fast_waits())
        .await
        .unwrap_err();

    assert!(matches!(err, ListingError::Ui(UiError::Timeout { .. })));
}

#[tokio::test]
async fn missing_listing_container_times_out() {
    init_logging();
    let selectors = ListingSelectors::default();
    let surface = ScriptedSurface::new(&ClaimFormSettings::default())
        .without(&selectors.container)
        .with_html(LISTING_HTML);

    let err = collect_listing(&surface, LISTING_URL, &selectors, &fast_waits())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ListingError::Ui(UiError::Timeout { what, .. }) if what == selectors.container.to_string()
    ));
}
