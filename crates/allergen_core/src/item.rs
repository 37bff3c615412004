use serde::{Deserialize, Serialize};

use crate::matcher::MatchOutcome;

pub const UNKNOWN_PRODUCT_TITLE: &str = "Unknown Product";
pub const UNKNOWN_CATEGORY: &str = "Unknown category";
pub const FETCH_FAILED_TEXT: &str = "Failed to load product page";
pub const NO_INGREDIENTS_TEXT: &str = "No ingredients found";

/// A located cart entry: absolute product URL plus display title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartItemRef {
    pub url: String,
    pub title: String,
}

impl CartItemRef {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// What happened to one item after fetch, extraction and matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Extracted {
        ingredients: String,
        allergens: MatchOutcome,
    },
    FetchFailed {
        message: String,
    },
    ExtractFailed {
        category: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub item: CartItemRef,
    pub status: ItemStatus,
}

/// Final per-item record handed back to the caller.
///
/// Allergy fields are only present when `error` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub url: String,
    pub title: String,
    pub ingredients: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergy_found: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergy_matches: Option<Vec<String>>,
}

impl ScrapeResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl From<ItemOutcome> for ScrapeResult {
    fn from(outcome: ItemOutcome) -> Self {
        let ItemOutcome { item, status } = outcome;
        match status {
            ItemStatus::Extracted {
                ingredients,
                allergens,
            } => ScrapeResult {
                url: item.url,
                title: item.title,
                ingredients,
                error: None,
                allergy_found: Some(allergens.found),
                allergy_matches: Some(allergens.matches),
            },
            ItemStatus::FetchFailed { message } => ScrapeResult {
                url: item.url,
                title: item.title,
                ingredients: FETCH_FAILED_TEXT.to_string(),
                error: Some(message),
                allergy_found: None,
                allergy_matches: None,
            },
            ItemStatus::ExtractFailed { category } => ScrapeResult {
                url: item.url,
                title: item.title,
                ingredients: NO_INGREDIENTS_TEXT.to_string(),
                error: Some(no_ingredients_message(&category)),
                allergy_found: None,
                allergy_matches: None,
            },
        }
    }
}

pub fn no_ingredients_message(category: &str) -> String {
    format!(
        "No ingredients section found. This may be a non-food item or the ingredients are not listed. Category: {category}"
    )
}
