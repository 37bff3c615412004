use std::fmt;

use allergen_core::{CartItemRef, LocateFailure, ScanPhase};

use crate::protocol::ScanResponse;

pub type RequestId = u64;

/// Raw markup of one product page together with the item it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub item: CartItemRef,
    pub result: Result<String, FetchError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Top-level failures of the locate stage. Either one aborts the scan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error("Cart not found. Please make sure you're on the cart page.")]
    CartNotFound,
    #[error("No products found in cart. Please make sure your cart contains items.")]
    NoItemsFound,
}

impl From<&LocateError> for LocateFailure {
    fn from(err: &LocateError) -> Self {
        match err {
            LocateError::CartNotFound => LocateFailure::CartNotFound,
            LocateError::NoItemsFound => LocateFailure::NoItems,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub request_id: RequestId,
    pub phase: ScanPhase,
    pub items_total: usize,
    pub items_succeeded: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Progress(ScanProgress),
    Completed {
        request_id: RequestId,
        response: ScanResponse,
    },
}
