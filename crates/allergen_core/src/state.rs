use crate::view_model::ScanSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPhase {
    #[default]
    Idle,
    Locating,
    Located,
    Fetching,
    Extracting,
    Matching,
    Assembled,
    Failed(LocateFailure),
}

impl ScanPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanPhase::Assembled | ScanPhase::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateFailure {
    CartNotFound,
    NoItems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemStage {
    #[default]
    Pending,
    Fetched,
    FetchFailed,
    Extracted,
    ExtractFailed,
    Matched,
}

impl ItemStage {
    pub fn is_success(self) -> bool {
        matches!(self, ItemStage::Extracted | ItemStage::Matched)
    }
}

/// Progress of one scrape invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanState {
    phase: ScanPhase,
    items: Vec<ItemStage>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn items(&self) -> &[ItemStage] {
        &self.items
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            total: self.items.len(),
            succeeded: self.items.iter().filter(|s| s.is_success()).count(),
        }
    }

    pub(crate) fn set_phase(&mut self, phase: ScanPhase) {
        self.phase = phase;
    }

    pub(crate) fn reset_items(&mut self, count: usize) {
        self.items = vec![ItemStage::Pending; count];
    }

    pub(crate) fn item_mut(&mut self, index: usize) -> Option<&mut ItemStage> {
        self.items.get_mut(index)
    }
}
