use pricewise_core::default_retailers;

use super::*;

fn retailers() -> Vec<RetailerConfig> {
    default_retailers().expect("embedded retailer table")
}

fn marker(m: &str) -> SlugRule {
    SlugRule::BeforeMarker {
        marker: m.to_string(),
    }
}

// -----------------------------------------------------------------------
// detect_retailer
// -----------------------------------------------------------------------

#[test]
fn detects_every_configured_domain() {
    let table = retailers();
    for retailer in &table {
        let url = format!("https://www.{}/some-product/p/123", retailer.domain);
        let found = detect_retailer(&url, &table).map(|r| r.id.as_str());
        assert_eq!(found, Some(retailer.id.as_str()), "url {url}");
    }
}

#[test]
fn detection_is_case_insensitive() {
    let table = retailers();
    let found = detect_retailer("HTTPS://WWW.FLIPKART.COM/Item/p/itm1", &table);
    assert_eq!(found.map(|r| r.id.as_str()), Some("flipkart"));
}

#[test]
fn unknown_domain_is_unsupported() {
    let table = retailers();
    assert!(detect_retailer("https://www.ebay.com/itm/123", &table).is_none());
    assert!(detect_retailer("not a url at all", &table).is_none());
}

// -----------------------------------------------------------------------
// extract_name_from_url
// -----------------------------------------------------------------------

#[test]
fn amazon_slug_precedes_dp_marker() {
    assert_eq!(
        extract_name_from_url(
            "https://www.amazon.in/some-product-name/dp/ASIN123",
            &marker("dp")
        ),
        "some product name"
    );
}

#[test]
fn amazon_short_link_without_slug_is_empty() {
    assert_eq!(
        extract_name_from_url("https://www.amazon.in/dp/B0EXAMPLE", &marker("dp")),
        ""
    );
}

#[test]
fn marker_absent_yields_empty() {
    assert_eq!(
        extract_name_from_url("https://www.amazon.in/gp/product/B0X", &marker("dp")),
        ""
    );
}

#[test]
fn flipkart_uses_second_raw_segment() {
    assert_eq!(
        extract_name_from_url(
            "https://www.flipkart.com/apple-iphone-15-black-128-gb/p/itm6ac6485515ae4?pid=MOBGTAGPTB3VS24W",
            &SlugRule::Segment { index: 1 }
        ),
        "apple iphone 15 black 128 gb"
    );
}

#[test]
fn segment_out_of_range_is_empty() {
    assert_eq!(
        extract_name_from_url("https://www.flipkart.com/", &SlugRule::Segment { index: 3 }),
        ""
    );
}

#[test]
fn generic_rule_uses_first_non_empty_segment() {
    assert_eq!(
        extract_name_from_url(
            "https://www.myntra.com/tshirts/roadster/12345/buy",
            &SlugRule::FirstSegment
        ),
        "tshirts"
    );
}

#[test]
fn slug_is_percent_decoded() {
    assert_eq!(
        extract_name_from_url(
            "https://www.croma.com/caf%C3%A9-espresso-maker/p/123",
            &SlugRule::FirstSegment
        ),
        "café espresso maker"
    );
}

#[test]
fn malformed_escape_yields_empty() {
    assert_eq!(
        extract_name_from_url(
            "https://www.croma.com/100%zz-cotton-shirt/p/123",
            &SlugRule::FirstSegment
        ),
        ""
    );
    assert_eq!(
        extract_name_from_url("https://www.croma.com/shirt-50%/p/1", &SlugRule::FirstSegment),
        ""
    );
}

#[test]
fn invalid_utf8_escape_yields_empty() {
    assert_eq!(
        extract_name_from_url("https://www.croma.com/caf%E9-maker/p/1", &SlugRule::FirstSegment),
        ""
    );
}

#[test]
fn unparsable_url_yields_empty() {
    assert_eq!(extract_name_from_url("amazon.in/x/dp/y", &marker("dp")), "");
}

// -----------------------------------------------------------------------
// clean_title
// -----------------------------------------------------------------------

#[test]
fn clean_title_drops_everything_after_pipe() {
    assert_eq!(
        clean_title("Widget Pro | Amazon.in: Buy Widget Pro Online"),
        "Widget Pro"
    );
}

#[test]
fn clean_title_drops_buy_suffix() {
    assert_eq!(
        clean_title("Noise ColorFit Pro 4 - Buy Noise Smartwatch at Best Price"),
        "Noise ColorFit Pro 4"
    );
}

#[test]
fn clean_title_drops_online_suffix() {
    assert_eq!(
        clean_title("Roadster Men Black T-shirt - Online Shopping India"),
        "Roadster Men Black T-shirt"
    );
}

#[test]
fn clean_title_drops_amazon_suffix() {
    assert_eq!(
        clean_title("boAt Airdopes 141 : Amazon.in: Electronics"),
        "boAt Airdopes 141"
    );
}

#[test]
fn clean_title_drops_trailing_parenthetical() {
    assert_eq!(
        clean_title("Samsung Galaxy M14 (Icy Silver, 128 GB)"),
        "Samsung Galaxy M14"
    );
}

#[test]
fn clean_title_collapses_whitespace() {
    assert_eq!(
        clean_title("\n   Apple   iPhone 15\n  (Black)  "),
        "Apple iPhone 15"
    );
}

#[test]
fn clean_title_of_noise_only_is_empty() {
    assert_eq!(clean_title("| Flipkart.com"), "");
    assert_eq!(clean_title("   "), "");
}

// -----------------------------------------------------------------------
// normalize_url
// -----------------------------------------------------------------------

#[test]
fn normalize_url_strips_tracking_params() {
    assert_eq!(
        normalize_url("https://www.amazon.in/x/dp/B0X?ref=sr_1&tag=aff-21&th=1"),
        "https://www.amazon.in/x/dp/B0X?th=1"
    );
}

#[test]
fn normalize_url_drops_empty_query() {
    assert_eq!(
        normalize_url("https://www.flipkart.com/x/p/itm1?pid=ABC&affid=xyz"),
        "https://www.flipkart.com/x/p/itm1"
    );
}

#[test]
fn normalize_url_leaves_clean_urls_untouched() {
    let url = "https://www.croma.com/p/123?color=Jet%20Black";
    assert_eq!(normalize_url(url), url);
}

#[test]
fn normalize_url_returns_garbage_unchanged() {
    assert_eq!(normalize_url("not a url"), "not a url");
}
