#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use allergen_engine::{FailureKind, FetchError, PageFetcher, ProgressSink, ScanEvent};

#[derive(Clone)]
struct FakePage {
    delay: Duration,
    result: Result<String, FetchError>,
}

/// In-memory fetcher with per-URL delays and failures. Records when each
/// fetch starts and ends so tests can check window boundaries.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, FakePage>,
    log: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FakePage {
                delay: Duration::ZERO,
                result: Ok(html.to_string()),
            },
        );
        self
    }

    pub fn slow_page(mut self, url: &str, html: &str, delay: Duration) -> Self {
        self.pages.insert(
            url.to_string(),
            FakePage {
                delay,
                result: Ok(html.to_string()),
            },
        );
        self
    }

    pub fn failing(mut self, url: &str, status: u16, message: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FakePage {
                delay: Duration::ZERO,
                result: Err(FetchError::new(FailureKind::HttpStatus(status), message)),
            },
        );
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.log.lock().unwrap().push(format!("start {url}"));
        let page = self.pages.get(url).cloned();
        let result = match page {
            Some(page) => {
                if !page.delay.is_zero() {
                    tokio::time::sleep(page.delay).await;
                }
                page.result
            }
            None => Err(FetchError::new(FailureKind::Network, "no such page")),
        };
        self.log.lock().unwrap().push(format!("end {url}"));
        result
    }
}

#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<ScanEvent>>,
}

impl CollectingSink {
    pub fn take(&self) -> Vec<ScanEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for CollectingSink {
    fn emit(&self, event: ScanEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn product_page(ingredients: &str) -> String {
    format!(
        r#"<html><body>
        <div id="feature-bullets"><ul>
            <li>Family size</li>
            <li>Ingredients: {ingredients}. Store in a cool place</li>
        </ul></div>
        </body></html>"#
    )
}

pub fn non_food_page(category: &str) -> String {
    format!(
        r#"<html><body>
        <div id="wayfinding-breadcrumbs_feature_div"><ul>
            <li>{category}</li>
        </ul></div>
        <p>A sturdy desk lamp.</p>
        </body></html>"#
    )
}
