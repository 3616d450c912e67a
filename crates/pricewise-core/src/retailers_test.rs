use super::*;

fn minimal_retailer(id: &str, name: &str) -> RetailerConfig {
    RetailerConfig {
        id: id.to_string(),
        name: name.to_string(),
        domain: "shop.test".to_string(),
        search_url: "https://www.shop.test/search?q={query}".to_string(),
        logo: None,
        slug: SlugRule::FirstSegment,
        selectors: SelectorSet {
            title: vec!["h2".to_string()],
            price: vec![".price".to_string()],
            link: vec![],
            image: vec![],
        },
    }
}

#[test]
fn embedded_table_loads_all_seven_retailers() {
    let retailers = default_retailers().expect("embedded table must be valid");
    let ids: Vec<&str> = retailers.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "amazon",
            "flipkart",
            "myntra",
            "ajio",
            "reliancedigital",
            "croma",
            "tatacliq"
        ]
    );
}

#[test]
fn embedded_table_slug_rules() {
    let retailers = default_retailers().unwrap();
    assert_eq!(
        retailers[0].slug,
        SlugRule::BeforeMarker {
            marker: "dp".to_string()
        }
    );
    assert_eq!(retailers[1].slug, SlugRule::Segment { index: 1 });
    assert_eq!(retailers[2].slug, SlugRule::FirstSegment);
}

#[test]
fn search_url_encodes_query_like_uri_component() {
    let retailers = default_retailers().unwrap();
    let amazon = &retailers[0];
    assert_eq!(
        amazon.search_url_for("boAt Rockerz 450 (Blue) & more"),
        "https://www.amazon.in/s?k=boAt%20Rockerz%20450%20(Blue)%20%26%20more"
    );
}

#[test]
fn encode_uri_component_keeps_unreserved_marks() {
    assert_eq!(encode_uri_component("a-b_c.d!e~f*g'h"), "a-b_c.d!e~f*g'h");
    assert_eq!(encode_uri_component("₹/?"), "%E2%82%B9%2F%3F");
}

#[test]
fn origin_prefixes_www() {
    let r = minimal_retailer("shop", "Shop");
    assert_eq!(r.origin(), "https://www.shop.test");
}

#[test]
fn validate_rejects_empty_table() {
    let err = validate_retailers(&RetailersFile { retailers: vec![] }).unwrap_err();
    assert!(err.to_string().contains("at least one retailer"));
}

#[test]
fn validate_rejects_missing_query_placeholder() {
    let mut r = minimal_retailer("shop", "Shop");
    r.search_url = "https://www.shop.test/search".to_string();
    let err = validate_retailers(&RetailersFile { retailers: vec![r] }).unwrap_err();
    assert!(err.to_string().contains("{query}"));
}

#[test]
fn validate_rejects_missing_price_selectors() {
    let mut r = minimal_retailer("shop", "Shop");
    r.selectors.price.clear();
    let err = validate_retailers(&RetailersFile { retailers: vec![r] }).unwrap_err();
    assert!(err.to_string().contains("price selector"));
}

#[test]
fn validate_rejects_duplicate_id_case_insensitive() {
    let err = validate_retailers(&RetailersFile {
        retailers: vec![
            minimal_retailer("shop", "Shop One"),
            minimal_retailer("SHOP", "Shop Two"),
        ],
    })
    .unwrap_err();
    assert!(err.to_string().contains("duplicate retailer id"));
}

#[test]
fn validate_rejects_duplicate_name() {
    let err = validate_retailers(&RetailersFile {
        retailers: vec![
            minimal_retailer("one", "Shop"),
            minimal_retailer("two", "shop"),
        ],
    })
    .unwrap_err();
    assert!(err.to_string().contains("duplicate retailer name"));
}

#[test]
fn slug_rule_defaults_to_first_segment_when_omitted() {
    let yaml = r#"
retailers:
  - id: shop
    name: Shop
    domain: shop.test
    search_url: "https://www.shop.test/?q={query}"
    selectors:
      title: ["h2"]
      price: [".price"]
"#;
    let retailers = parse_retailers(yaml).unwrap();
    assert_eq!(retailers[0].slug, SlugRule::FirstSegment);
    assert!(retailers[0].selectors.link.is_empty());
}

#[test]
fn load_retailers_reports_missing_file() {
    let err = load_retailers(Path::new("/definitely/not/here/retailers.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::RetailersFileIo { .. }));
}

#[test]
fn parse_retailers_reports_bad_yaml() {
    let err = parse_retailers("retailers: [not, a, table").unwrap_err();
    assert!(matches!(err, ConfigError::RetailersFileParse(_)));
}
