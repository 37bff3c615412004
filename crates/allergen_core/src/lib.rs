//! Allergen core: pure matching, result assembly and scan state machine.
mod annotate;
mod assemble;
mod item;
mod matcher;
mod msg;
mod state;
mod synonyms;
mod update;
mod view_model;

pub use annotate::{annotate_ingredients, IngredientSegment};
pub use assemble::{assemble, normalize_url_for_dedupe, presentable_title};
pub use item::{
    no_ingredients_message, CartItemRef, ItemOutcome, ItemStatus, ScrapeResult,
    FETCH_FAILED_TEXT, NO_INGREDIENTS_TEXT, UNKNOWN_CATEGORY, UNKNOWN_PRODUCT_TITLE,
};
pub use matcher::{
    is_placeholder_text, normalize_ingredients, AllergenMatcher, AllergenQuery, MatchOutcome,
};
pub use msg::Msg;
pub use state::{ItemStage, LocateFailure, ScanPhase, ScanState};
pub use synonyms::{SynonymEntry, SynonymTable};
pub use update::update;
pub use view_model::ScanSummary;
