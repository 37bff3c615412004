use std::sync::Arc;

use allergen_core::{
    assemble, update, AllergenMatcher, AllergenQuery, CartItemRef, ItemOutcome, ItemStatus, Msg,
    ScanState, ScanSummary, ScrapeResult, SynonymTable,
};
use scan_logging::{scan_debug, scan_error, scan_info, scan_warn};

use crate::extract::{CascadeExtractor, ExtractError, IngredientExtractor};
use crate::fetch::PageFetcher;
use crate::locate::{locate_items, CartPage};
use crate::protocol::{ScanRequest, ScanResponse};
use crate::scheduler::BatchWindow;
use crate::{LocateError, RequestId, ScanEvent, ScanProgress};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ScanEvent);
}

/// Sink for callers that do not care about progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: ScanEvent) {}
}

/// Locate, fetch, extract, match and assemble, for one cart at a time.
///
/// The synonym table is shared read-only; every scan gets its own state.
#[derive(Clone)]
pub struct ScanPipeline {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn IngredientExtractor>,
    synonyms: Arc<SynonymTable>,
    window: BatchWindow,
}

impl ScanPipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>, synonyms: Arc<SynonymTable>) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(CascadeExtractor::new()),
            synonyms,
            window: BatchWindow::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn IngredientExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_window(mut self, window: BatchWindow) -> Self {
        self.window = window;
        self
    }

    pub async fn scan<S: AsRef<str> + Sync>(
        &self,
        cart: &CartPage,
        allergies: &[S],
    ) -> Result<Vec<ScrapeResult>, LocateError> {
        self.scan_with_progress(0, cart, allergies, &NullProgressSink)
            .await
    }

    /// Answers a transport request. Only locate failures produce an error
    /// response; item failures live inside their results.
    pub async fn handle(
        &self,
        request_id: RequestId,
        cart: &CartPage,
        request: &ScanRequest,
        sink: &dyn ProgressSink,
    ) -> ScanResponse {
        match self
            .scan_with_progress(request_id, cart, request.allergies(), sink)
            .await
        {
            Ok(results) => ScanResponse::completed(results),
            Err(err) => ScanResponse::failed(err.to_string()),
        }
    }

    pub async fn scan_with_progress<S: AsRef<str> + Sync>(
        &self,
        request_id: RequestId,
        cart: &CartPage,
        allergies: &[S],
        sink: &dyn ProgressSink,
    ) -> Result<Vec<ScrapeResult>, LocateError> {
        let mut tracker = PhaseTracker::new(request_id, sink);
        tracker.apply(Msg::LocateStarted);

        let items = match locate_items(cart) {
            Ok(items) => items,
            Err(err) => {
                scan_error!("Scan {} aborted: {}", request_id, err);
                tracker.apply(Msg::LocateFailed((&err).into()));
                return Err(err);
            }
        };
        let total = items.len();
        tracker.apply(Msg::Located { count: total });

        let query = AllergenMatcher::new(&self.synonyms).query(allergies);
        let outcomes = self
            .window
            .run_windows(
                items,
                |item| self.process_item(item, &query),
                |offset, window| tracker.replay_window(offset, window),
            )
            .await;

        let results = assemble(outcomes);
        tracker.apply(Msg::Assembled);

        let summary = ScanSummary::from_results(&results);
        if summary.succeeded < total {
            scan_info!(
                "Successfully found ingredients for {} out of {} products",
                summary.succeeded,
                total
            );
        } else {
            scan_info!("Scan {} complete: {}", request_id, summary);
        }
        Ok(results)
    }

    async fn process_item(&self, item: CartItemRef, query: &AllergenQuery) -> ItemOutcome {
        scan_debug!("Fetching: {}", item.url);
        let status = match self.fetcher.fetch_page(&item.url).await {
            Ok(html) => self.inspect_page(&item, &html, query),
            Err(err) => {
                scan_warn!("Failed to load {}: {}", item.url, err);
                ItemStatus::FetchFailed {
                    message: err.message,
                }
            }
        };
        ItemOutcome { item, status }
    }

    fn inspect_page(&self, item: &CartItemRef, html: &str, query: &AllergenQuery) -> ItemStatus {
        match self.extractor.extract(html) {
            Ok(extraction) => {
                scan_debug!("Found ingredients for {}", item.title);
                let allergens = query.check(&extraction.ingredients);
                ItemStatus::Extracted {
                    ingredients: extraction.ingredients,
                    allergens,
                }
            }
            Err(ExtractError::NoIngredientsFound { category }) => {
                scan_warn!("No ingredients found for {} ({})", item.title, category);
                ItemStatus::ExtractFailed { category }
            }
        }
    }
}

/// Feeds the scan state machine and reports every phase change.
struct PhaseTracker<'s> {
    request_id: RequestId,
    state: ScanState,
    sink: &'s dyn ProgressSink,
}

impl<'s> PhaseTracker<'s> {
    fn new(request_id: RequestId, sink: &'s dyn ProgressSink) -> Self {
        Self {
            request_id,
            state: ScanState::new(),
            sink,
        }
    }

    fn apply(&mut self, msg: Msg) {
        let before = self.state.phase();
        self.state = update(std::mem::take(&mut self.state), msg);
        if self.state.phase() != before {
            let summary = self.state.summary();
            self.sink.emit(ScanEvent::Progress(ScanProgress {
                request_id: self.request_id,
                phase: self.state.phase(),
                items_total: summary.total,
                items_succeeded: summary.succeeded,
            }));
        }
    }

    /// Items inside a window finish out of phase order, so each window's
    /// transitions are replayed stage by stage once the window has resolved.
    fn replay_window(&mut self, offset: usize, outcomes: &[ItemOutcome]) {
        let indexed = || (offset..).zip(outcomes);
        for (index, outcome) in indexed() {
            let ok = !matches!(outcome.status, ItemStatus::FetchFailed { .. });
            self.apply(Msg::ItemFetched { index, ok });
        }
        for (index, outcome) in indexed() {
            match outcome.status {
                ItemStatus::Extracted { .. } => {
                    self.apply(Msg::ItemExtracted { index, ok: true })
                }
                ItemStatus::ExtractFailed { .. } => {
                    self.apply(Msg::ItemExtracted { index, ok: false })
                }
                ItemStatus::FetchFailed { .. } => {}
            }
        }
        for (index, outcome) in indexed() {
            if matches!(outcome.status, ItemStatus::Extracted { .. }) {
                self.apply(Msg::ItemMatched { index });
            }
        }
    }
}
