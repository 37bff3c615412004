use allergen_core::{
    assemble, normalize_url_for_dedupe, CartItemRef, ItemOutcome, ItemStatus, MatchOutcome,
    ScrapeResult, FETCH_FAILED_TEXT, NO_INGREDIENTS_TEXT, UNKNOWN_PRODUCT_TITLE,
};
use pretty_assertions::assert_eq;

fn extracted(url: &str, title: &str, ingredients: &str, matches: &[&str]) -> ItemOutcome {
    ItemOutcome {
        item: CartItemRef::new(url, title),
        status: ItemStatus::Extracted {
            ingredients: ingredients.to_string(),
            allergens: MatchOutcome {
                found: !matches.is_empty(),
                matches: matches.iter().map(|m| m.to_string()).collect(),
            },
        },
    }
}

#[test]
fn keeps_order_and_annotates_only_successes() {
    let results = assemble(vec![
        extracted("https://shop.test/dp/A", "Crackers", "wheat, whey", &["milk"]),
        ItemOutcome {
            item: CartItemRef::new("https://shop.test/dp/B", "Lamp"),
            status: ItemStatus::ExtractFailed {
                category: "Home › Lighting".to_string(),
            },
        },
        ItemOutcome {
            item: CartItemRef::new("https://shop.test/dp/C", "Juice"),
            status: ItemStatus::FetchFailed {
                message: "Failed to fetch product page: 503 Service Unavailable".to_string(),
            },
        },
    ]);

    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0],
        ScrapeResult {
            url: "https://shop.test/dp/A".to_string(),
            title: "Crackers".to_string(),
            ingredients: "wheat, whey".to_string(),
            error: None,
            allergy_found: Some(true),
            allergy_matches: Some(vec!["milk".to_string()]),
        }
    );

    assert_eq!(results[1].ingredients, NO_INGREDIENTS_TEXT);
    assert!(results[1]
        .error
        .as_deref()
        .unwrap()
        .ends_with("Category: Home › Lighting"));
    assert_eq!(results[1].allergy_found, None);
    assert_eq!(results[1].allergy_matches, None);

    assert_eq!(results[2].ingredients, FETCH_FAILED_TEXT);
    assert_eq!(
        results[2].error.as_deref(),
        Some("Failed to fetch product page: 503 Service Unavailable")
    );
    assert_eq!(results[2].allergy_found, None);
}

#[test]
fn drops_later_duplicates_of_alternate_url_forms() {
    let results = assemble(vec![
        extracted("https://shop.test/dp/A", "First", "oats", &[]),
        extracted("https://shop.test/dp/B", "Second", "rice", &[]),
        extracted("https://SHOP.test/dp/A/#reviews", "First again", "oats", &[]),
    ]);
    let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[test]
fn link_label_titles_become_fallback() {
    let results = assemble(vec![
        extracted("https://shop.test/dp/A", "Opens in a new tab", "oats", &[]),
        extracted("https://shop.test/dp/B", "Granola Opens in a new tab", "oats", &[]),
    ]);
    assert_eq!(results[0].title, UNKNOWN_PRODUCT_TITLE);
    assert_eq!(results[1].title, "Granola");
}

#[test]
fn dedupe_key_keeps_query() {
    assert_eq!(
        normalize_url_for_dedupe("https://shop.test/dp/A/?th=1#top"),
        "https://shop.test/dp/A?th=1"
    );
    assert_eq!(normalize_url_for_dedupe(" not a url "), "not a url");
}

#[test]
fn serializes_in_camel_case_without_absent_fields() {
    let results = assemble(vec![
        extracted("https://shop.test/dp/A", "Crackers", "whey", &["milk"]),
        ItemOutcome {
            item: CartItemRef::new("https://shop.test/dp/B", "Lamp"),
            status: ItemStatus::FetchFailed {
                message: "network error".to_string(),
            },
        },
    ]);
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json[0]["allergyFound"], serde_json::json!(true));
    assert_eq!(json[0]["allergyMatches"], serde_json::json!(["milk"]));
    assert!(json[0].get("error").is_none());
    assert!(json[1].get("allergyFound").is_none());
    assert_eq!(json[1]["error"], serde_json::json!("network error"));
}
