//! Allergen engine: cart location, page fetching, ingredient extraction and
//! the scan pipeline that ties them to the matcher.
mod decode;
mod dom;
mod engine;
mod extract;
mod fetch;
mod locate;
mod persist;
mod pipeline;
mod protocol;
mod scheduler;
mod types;

pub use decode::{decode_page, DecodedPage};
pub use engine::{ChannelProgressSink, ScanHandle};
pub use extract::{
    category_breadcrumb, CascadeExtractor, ExtractError, Extraction, IngredientExtractor,
    StrategyKind,
};
pub use fetch::{FetchSettings, PageFetcher, ReqwestFetcher};
pub use locate::{
    locate_items, CartPage, ItemLocateError, ANCHOR_SELECTORS, CART_CONTAINER_SELECTORS,
    ITEM_NODE_SELECTOR,
};
pub use persist::{write_report, PersistError, ReportWriter};
pub use pipeline::{NullProgressSink, ProgressSink, ScanPipeline};
pub use protocol::{ScanRequest, ScanResponse};
pub use scheduler::{BatchWindow, DEFAULT_BATCH_WIDTH};
pub use types::{
    FailureKind, FetchError, FetchOutcome, LocateError, RequestId, ScanEvent, ScanProgress,
};

// Re-exported so callers can parse pages for `StrategyKind::apply` without a
// direct scraper dependency.
pub use scraper::Html;
