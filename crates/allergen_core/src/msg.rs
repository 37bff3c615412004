use crate::state::LocateFailure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A scrape trigger arrived; start looking for the cart.
    LocateStarted,
    /// The cart could not be located or held no usable items.
    LocateFailed(LocateFailure),
    /// The locator produced `count` unique items.
    Located { count: usize },
    /// The fetch for item `index` resolved.
    ItemFetched { index: usize, ok: bool },
    /// Extraction for item `index` finished.
    ItemExtracted { index: usize, ok: bool },
    /// Allergen matching ran for item `index`.
    ItemMatched { index: usize },
    /// All results were merged into the final list.
    Assembled,
}
