use std::future::Future;

use allergen_core::CartItemRef;
use futures_util::future::join_all;
use scan_logging::scan_debug;

use crate::fetch::PageFetcher;
use crate::FetchOutcome;

pub const DEFAULT_BATCH_WIDTH: usize = 5;

/// Fixed-width batch window.
///
/// Items are processed in contiguous windows of `width`. Every task in a
/// window runs concurrently on the calling task, and the next window is only
/// admitted once all of them have resolved. Output order always matches
/// input order, whatever order the tasks finish in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchWindow {
    width: usize,
}

impl BatchWindow {
    /// A width of zero is treated as one.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub async fn run<I, O, F, Fut>(&self, items: Vec<I>, task: F) -> Vec<O>
    where
        F: FnMut(I) -> Fut,
        Fut: Future<Output = O>,
    {
        self.run_windows(items, task, |_, _| {}).await
    }

    /// Like [`BatchWindow::run`], calling `on_window(offset, outputs)` as soon
    /// as each window resolves, before the next one is admitted. `offset` is
    /// the input index of the window's first item.
    pub async fn run_windows<I, O, F, Fut, W>(
        &self,
        items: Vec<I>,
        mut task: F,
        mut on_window: W,
    ) -> Vec<O>
    where
        F: FnMut(I) -> Fut,
        Fut: Future<Output = O>,
        W: FnMut(usize, &[O]),
    {
        let total = items.len();
        let mut results = Vec::with_capacity(total);
        let mut pending = items.into_iter().peekable();
        let mut window_index = 0;

        while pending.peek().is_some() {
            let window: Vec<Fut> = pending.by_ref().take(self.width).map(&mut task).collect();
            scan_debug!(
                "Batch window {} admitted {} task(s) ({} of {} done)",
                window_index,
                window.len(),
                results.len(),
                total
            );
            let offset = results.len();
            results.extend(join_all(window).await);
            on_window(offset, &results[offset..]);
            window_index += 1;
        }

        results
    }

    /// Fetches every item, window by window. Failures stay attached to their item.
    pub async fn fetch_all(
        &self,
        fetcher: &dyn PageFetcher,
        items: Vec<CartItemRef>,
    ) -> Vec<FetchOutcome> {
        self.run(items, |item| async move {
            let result = fetcher.fetch_page(&item.url).await;
            FetchOutcome { item, result }
        })
        .await
    }
}

impl Default for BatchWindow {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_WIDTH)
    }
}
