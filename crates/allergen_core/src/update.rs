use crate::{ItemStage, Msg, ScanPhase, ScanState};

/// Pure update function: applies a message to the scan state.
///
/// Messages that do not fit the current phase are ignored, and terminal
/// phases absorb everything.
pub fn update(mut state: ScanState, msg: Msg) -> ScanState {
    if state.phase().is_terminal() {
        return state;
    }

    match msg {
        Msg::LocateStarted => {
            if state.phase() == ScanPhase::Idle {
                state.set_phase(ScanPhase::Locating);
            }
        }
        Msg::LocateFailed(failure) => {
            if state.phase() == ScanPhase::Locating {
                state.set_phase(ScanPhase::Failed(failure));
            }
        }
        Msg::Located { count } => {
            if state.phase() == ScanPhase::Locating {
                state.reset_items(count);
                state.set_phase(ScanPhase::Located);
            }
        }
        Msg::ItemFetched { index, ok } => {
            let next = if ok {
                ItemStage::Fetched
            } else {
                ItemStage::FetchFailed
            };
            if is_processing(state.phase())
                && advance_item(&mut state, index, ItemStage::Pending, next)
            {
                state.set_phase(ScanPhase::Fetching);
            }
        }
        Msg::ItemExtracted { index, ok } => {
            let next = if ok {
                ItemStage::Extracted
            } else {
                ItemStage::ExtractFailed
            };
            if is_processing(state.phase())
                && advance_item(&mut state, index, ItemStage::Fetched, next)
            {
                state.set_phase(ScanPhase::Extracting);
            }
        }
        Msg::ItemMatched { index } => {
            if is_processing(state.phase())
                && advance_item(&mut state, index, ItemStage::Extracted, ItemStage::Matched)
            {
                state.set_phase(ScanPhase::Matching);
            }
        }
        Msg::Assembled => {
            if !matches!(state.phase(), ScanPhase::Idle | ScanPhase::Locating) {
                state.set_phase(ScanPhase::Assembled);
            }
        }
    }

    state
}

/// Items are processed window by window, so the phase cycles from
/// `Matching` back to `Fetching` when the next window reports in.
fn is_processing(phase: ScanPhase) -> bool {
    matches!(
        phase,
        ScanPhase::Located | ScanPhase::Fetching | ScanPhase::Extracting | ScanPhase::Matching
    )
}

/// Moves one item from `expected` to `next`. False if the item is unknown or
/// not at `expected`.
fn advance_item(
    state: &mut ScanState,
    index: usize,
    expected: ItemStage,
    next: ItemStage,
) -> bool {
    match state.item_mut(index) {
        Some(stage) if *stage == expected => {
            *stage = next;
            true
        }
        _ => false,
    }
}
