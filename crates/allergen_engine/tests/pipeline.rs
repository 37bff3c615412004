mod common;

use std::sync::Arc;

use allergen_core::{LocateFailure, ScanPhase, ScrapeResult, SynonymTable};
use allergen_engine::{
    BatchWindow, CartPage, ExtractError, Extraction, IngredientExtractor, LocateError, ScanEvent,
    ScanHandle, ScanPipeline, ScanProgress, ScanRequest, ScanResponse, StrategyKind,
};
use common::{non_food_page, product_page, CollectingSink, FakeFetcher};
use pretty_assertions::assert_eq;
use url::Url;

const CART: &str = r#"
<html><body>
<div id="sc-expanded-cart-localmarket">
    <div class="sc-list-item"><a class="sc-product-link" href="/dp/CRACKERS">Crackers</a></div>
    <div class="sc-list-item"><a class="sc-product-link" href="/dp/JUICE">Juice</a></div>
    <div class="sc-list-item"><a class="sc-product-link" href="/dp/LAMP">Desk Lamp</a></div>
</div>
</body></html>"#;

fn cart() -> CartPage {
    CartPage::new(CART, Url::parse("https://shop.test/cart").unwrap())
}

fn allergies() -> Vec<String> {
    vec!["milk".to_string(), "peanuts".to_string()]
}

fn fetcher(juice_fails: bool) -> FakeFetcher {
    let fetcher = FakeFetcher::new()
        .page(
            "https://shop.test/dp/CRACKERS",
            &product_page("Wheat flour, sugar, whey, salt"),
        )
        .page("https://shop.test/dp/LAMP", &non_food_page("Lighting"));
    if juice_fails {
        fetcher.failing(
            "https://shop.test/dp/JUICE",
            404,
            "Failed to fetch product page: 404 Not Found",
        )
    } else {
        fetcher.page("https://shop.test/dp/JUICE", &product_page("Apple juice"))
    }
}

fn pipeline(fetcher: FakeFetcher) -> ScanPipeline {
    scan_logging::initialize_for_tests();
    ScanPipeline::new(Arc::new(fetcher), Arc::new(SynonymTable::builtin()))
        .with_window(BatchWindow::new(2))
}

#[tokio::test]
async fn scan_produces_ordered_results_with_isolated_failures() {
    let results = pipeline(fetcher(true))
        .scan(&cart(), &allergies())
        .await
        .unwrap();

    assert_eq!(
        results[0],
        ScrapeResult {
            url: "https://shop.test/dp/CRACKERS".to_string(),
            title: "Crackers".to_string(),
            ingredients: "Wheat flour, sugar, whey, salt".to_string(),
            error: None,
            allergy_found: Some(true),
            allergy_matches: Some(vec!["milk".to_string()]),
        }
    );
    assert_eq!(
        results[1],
        ScrapeResult {
            url: "https://shop.test/dp/JUICE".to_string(),
            title: "Juice".to_string(),
            ingredients: "Failed to load product page".to_string(),
            error: Some("Failed to fetch product page: 404 Not Found".to_string()),
            allergy_found: None,
            allergy_matches: None,
        }
    );
    assert_eq!(results[2].ingredients, "No ingredients found");
    assert_eq!(
        results[2].error.as_deref(),
        Some(
            "No ingredients section found. This may be a non-food item or the ingredients are not listed. Category: Lighting"
        )
    );
}

#[tokio::test]
async fn one_fetch_failure_does_not_change_other_results() {
    let with_failure = pipeline(fetcher(true))
        .scan(&cart(), &allergies())
        .await
        .unwrap();
    let without_failure = pipeline(fetcher(false))
        .scan(&cart(), &allergies())
        .await
        .unwrap();

    assert_eq!(with_failure[0], without_failure[0]);
    assert_eq!(with_failure[2], without_failure[2]);
    assert_eq!(without_failure[1].allergy_found, Some(false));
    assert_eq!(without_failure[1].allergy_matches, Some(Vec::new()));
}

#[tokio::test]
async fn empty_allergy_list_still_annotates_successes() {
    let results = pipeline(fetcher(false))
        .scan::<String>(&cart(), &[])
        .await
        .unwrap();
    assert_eq!(results[0].allergy_found, Some(false));
    assert_eq!(results[0].allergy_matches, Some(Vec::new()));
}

#[tokio::test]
async fn progress_walks_the_scan_phases() {
    let sink = CollectingSink::default();
    let request = ScanRequest::scrape_cart(allergies());
    let response = pipeline(fetcher(true))
        .handle(9, &cart(), &request, &sink)
        .await;
    assert!(response.success);

    let progress: Vec<ScanProgress> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            ScanEvent::Progress(progress) => Some(progress),
            ScanEvent::Completed { .. } => None,
        })
        .collect();
    let phases: Vec<ScanPhase> = progress.iter().map(|p| p.phase).collect();
    assert_eq!(
        phases,
        vec![
            ScanPhase::Locating,
            ScanPhase::Located,
            // first window: crackers and the failing juice
            ScanPhase::Fetching,
            ScanPhase::Extracting,
            ScanPhase::Matching,
            // second window: the lamp, which has no ingredients
            ScanPhase::Fetching,
            ScanPhase::Extracting,
            ScanPhase::Assembled,
        ]
    );
    // Reported while the second window was still outstanding.
    assert_eq!(
        progress[4],
        ScanProgress {
            request_id: 9,
            phase: ScanPhase::Matching,
            items_total: 3,
            items_succeeded: 1,
        }
    );
    let last = progress.last().unwrap();
    assert_eq!(last.request_id, 9);
    assert_eq!((last.items_total, last.items_succeeded), (3, 1));
}

#[tokio::test]
async fn locate_failure_is_a_top_level_error_response() {
    let sink = CollectingSink::default();
    let page = CartPage::new(
        "<html><body><p>Your session expired</p></body></html>",
        Url::parse("https://shop.test/cart").unwrap(),
    );
    let response = pipeline(FakeFetcher::new())
        .handle(1, &page, &ScanRequest::scrape_cart(allergies()), &sink)
        .await;

    assert_eq!(
        response,
        ScanResponse::failed(LocateError::CartNotFound.to_string())
    );
    let phases: Vec<ScanPhase> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            ScanEvent::Progress(progress) => Some(progress.phase),
            ScanEvent::Completed { .. } => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            ScanPhase::Locating,
            ScanPhase::Failed(LocateFailure::CartNotFound)
        ]
    );
}

struct FixedExtractor;

impl IngredientExtractor for FixedExtractor {
    fn extract(&self, html: &str) -> Result<Extraction, ExtractError> {
        if html.contains("Lighting") {
            return Err(ExtractError::NoIngredientsFound {
                category: "Lamps".to_string(),
            });
        }
        Ok(Extraction {
            ingredients: "peanut oil".to_string(),
            strategy: StrategyKind::BodyText,
        })
    }
}

#[tokio::test]
async fn injected_extractor_replaces_the_cascade() {
    let results = pipeline(fetcher(false))
        .with_extractor(Arc::new(FixedExtractor))
        .scan(&cart(), &allergies())
        .await
        .unwrap();

    assert_eq!(results[0].ingredients, "peanut oil");
    assert_eq!(results[0].allergy_matches, Some(vec!["peanuts".to_string()]));
    assert_eq!(results[1].ingredients, "peanut oil");
    assert!(results[2]
        .error
        .as_deref()
        .is_some_and(|error| error.ends_with("Category: Lamps")));
}

#[test]
fn request_wire_format() {
    let request = ScanRequest::from_json(r#"{"action":"scrapeCart","allergies":["Milk"]}"#).unwrap();
    assert_eq!(request.allergies(), &["Milk".to_string()]);

    let request = ScanRequest::from_json(r#"{"action":"scrapeCart"}"#).unwrap();
    assert!(request.allergies().is_empty());

    assert!(ScanRequest::from_json(r#"{"action":"logout"}"#).is_err());
}

#[test]
fn null_allergy_list_is_treated_as_empty() {
    let request = ScanRequest::from_json(r#"{"action":"scrapeCart","allergies":null}"#).unwrap();
    assert_eq!(request, ScanRequest::scrape_cart(Vec::new()));
}

#[test]
fn response_wire_format() {
    let failed = serde_json::to_value(ScanResponse::failed("Cart not found")).unwrap();
    assert_eq!(
        failed,
        serde_json::json!({"success": false, "error": "Cart not found"})
    );

    let done = serde_json::to_value(ScanResponse::completed(Vec::new())).unwrap();
    assert_eq!(done, serde_json::json!({"success": true, "results": []}));
}

#[test]
fn handle_runs_scan_in_background_and_reports_completion() {
    let handle = ScanHandle::new(pipeline(fetcher(false)));
    handle.submit(42, cart(), ScanRequest::scrape_cart(vec!["wheat".to_string()]));

    let response = loop {
        match handle.recv() {
            Some(ScanEvent::Completed {
                request_id,
                response,
            }) => {
                assert_eq!(request_id, 42);
                break response;
            }
            Some(ScanEvent::Progress(_)) => continue,
            None => panic!("scan thread stopped without completing"),
        }
    };

    assert!(response.success);
    let matched: Vec<Option<bool>> = response.results().iter().map(|r| r.allergy_found).collect();
    assert_eq!(matched, vec![Some(true), Some(false), None]);
}
