use std::sync::LazyLock;

use allergen_core::UNKNOWN_CATEGORY;
use regex::Regex;
use scan_logging::scan_debug;
use scraper::Html;

use crate::dom::{
    all_in, all_in_doc, body, closest, collapse_whitespace, first_in, first_in_doc,
    next_element_sibling, parent_element, text_content,
};

const DETAIL_BULLET_ITEMS: &str = "#detailBullets_feature_div li";
const DETAIL_BULLET_LABEL: &str = "span.a-text-bold";
const DETAIL_TABLE_ROWS: &str =
    "#productDetails_detailBullets_sections1 tr, #productDetails tr, .prodDetTable tr, .a-keyvalue tr";
const FEATURE_BULLETS: &str = "#feature-bullets, .a-unordered-list";
const IMPORTANT_INFORMATION: &str =
    "#importantInformation, #important-information, .important-information, .product-facts";
const IMPORTANT_INFORMATION_LABELS: &str = "h5, h4, h3, b, strong, .a-text-bold";
const ANY_HEADING: &str = "h1, h2, h3, h4, h5, h6, .a-section .a-text-bold";
const ENCLOSING_SECTION: &str = ".a-section, div";
const NUTRITION_FACTS: &str = ".nutritionFacts, #nutrition-facts, .nutrition-facts";
const BREADCRUMBS: &str = "#wayfinding-breadcrumbs_feature_div, .a-breadcrumb";

// Product pages often wrap the colon in bidi marks ("Ingredients ‏ : ‎ ...").
static LABEL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)ingredients").ok());
static LABEL_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)ingredients[:\s\x{200E}\x{200F}]*").ok());
static VALUE_TO_PERIOD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)ingredients[:\s\x{200E}\x{200F}]*([^.]+)").ok());
static VALUE_TO_LINE_END: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)ingredients[:\s\x{200E}\x{200F}]*([^\n.]+)").ok());

/// One way of finding the ingredients on a product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Detail bullet list entry with a bold "Ingredients" label.
    LabeledListItem,
    /// Product detail table row whose header says "Ingredients".
    LabeledTableRow,
    /// "Ingredients: ..." inside the feature bullets, up to the first period.
    FeatureBullets,
    /// Labelled value inside the important information block.
    ImportantInformation,
    /// Any heading mentioning ingredients, anywhere on the page.
    AnyHeading,
    /// "Ingredients: ..." anywhere in the body text.
    BodyText,
    /// "Ingredients: ..." inside a nutrition facts block.
    NutritionFacts,
}

impl StrategyKind {
    /// Every strategy, in the order they are tried.
    pub const CASCADE: [StrategyKind; 7] = [
        StrategyKind::LabeledListItem,
        StrategyKind::LabeledTableRow,
        StrategyKind::FeatureBullets,
        StrategyKind::ImportantInformation,
        StrategyKind::AnyHeading,
        StrategyKind::BodyText,
        StrategyKind::NutritionFacts,
    ];

    /// Runs this strategy alone. `None` unless it produced non-empty text.
    pub fn apply(self, doc: &Html) -> Option<String> {
        let found = match self {
            StrategyKind::LabeledListItem => labeled_list_item(doc),
            StrategyKind::LabeledTableRow => labeled_table_row(doc),
            StrategyKind::FeatureBullets => feature_bullets(doc),
            StrategyKind::ImportantInformation => important_information(doc),
            StrategyKind::AnyHeading => any_heading(doc),
            StrategyKind::BodyText => body_text(doc),
            StrategyKind::NutritionFacts => nutrition_facts(doc),
        }?;
        let collapsed = collapse_whitespace(&found);
        (!collapsed.is_empty()).then_some(collapsed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub ingredients: String,
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// Every strategy came up empty. `category` is the page's breadcrumb
    /// trail, which usually explains why (non-food item, unlisted ingredients).
    #[error("No ingredients section found in the parsed HTML")]
    NoIngredientsFound { category: String },
}

pub trait IngredientExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<Extraction, ExtractError>;
}

/// Parses the page and tries each strategy in order until one yields text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeExtractor {
    strategies: Vec<StrategyKind>,
}

impl CascadeExtractor {
    pub fn new() -> Self {
        Self::with_strategies(StrategyKind::CASCADE.to_vec())
    }

    pub fn with_strategies(strategies: Vec<StrategyKind>) -> Self {
        Self { strategies }
    }

    pub fn extract_from(&self, doc: &Html) -> Result<Extraction, ExtractError> {
        for strategy in &self.strategies {
            if let Some(ingredients) = strategy.apply(doc) {
                scan_debug!("Ingredients found by {:?}", strategy);
                return Ok(Extraction {
                    ingredients,
                    strategy: *strategy,
                });
            }
        }
        Err(ExtractError::NoIngredientsFound {
            category: category_breadcrumb(doc),
        })
    }
}

impl Default for CascadeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl IngredientExtractor for CascadeExtractor {
    fn extract(&self, html: &str) -> Result<Extraction, ExtractError> {
        let doc = Html::parse_document(html);
        self.extract_from(&doc)
    }
}

/// Breadcrumb text of the page, or the unknown-category placeholder.
pub fn category_breadcrumb(doc: &Html) -> String {
    first_in_doc(doc, BREADCRUMBS)
        .map(|crumbs| collapse_whitespace(&text_content(crumbs)))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

fn labeled_list_item(doc: &Html) -> Option<String> {
    all_in_doc(doc, DETAIL_BULLET_ITEMS)
        .into_iter()
        .filter(|item| {
            first_in(*item, DETAIL_BULLET_LABEL)
                .is_some_and(|label| is_ingredients_label(&text_content(label)))
        })
        .map(|item| strip_label(&text_content(item)))
        .find(|text| !text.is_empty())
}

fn labeled_table_row(doc: &Html) -> Option<String> {
    all_in_doc(doc, DETAIL_TABLE_ROWS)
        .into_iter()
        .filter(|row| {
            first_in(*row, "th").is_some_and(|th| is_ingredients_label(&text_content(th)))
        })
        .filter_map(|row| first_in(row, "td"))
        .map(|td| text_content(td).trim().to_string())
        .find(|text| !text.is_empty())
}

fn feature_bullets(doc: &Html) -> Option<String> {
    let bullets = first_in_doc(doc, FEATURE_BULLETS)?;
    capture_value(&VALUE_TO_PERIOD, &text_content(bullets))
}

fn important_information(doc: &Html) -> Option<String> {
    let section = first_in_doc(doc, IMPORTANT_INFORMATION)?;

    for label in all_in(section, IMPORTANT_INFORMATION_LABELS) {
        if !is_ingredients_label(&text_content(label)) {
            continue;
        }
        let mut info = next_element_sibling(label)
            .map(|next| text_content(next).trim().to_string())
            .unwrap_or_default();
        if info.is_empty() {
            if let Some(parent) = parent_element(label) {
                info = strip_label(&text_content(parent));
            }
        }
        if !info.is_empty() {
            return Some(info);
        }
    }

    capture_value(&VALUE_TO_LINE_END, &text_content(section))
}

fn any_heading(doc: &Html) -> Option<String> {
    for heading in all_in_doc(doc, ANY_HEADING) {
        let heading_text = text_content(heading);
        if !is_ingredients_label(&heading_text) {
            continue;
        }

        if let Some(section) = closest(heading, ENCLOSING_SECTION) {
            let text = text_content(section).replacen(&heading_text, "", 1);
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }

        if let Some(next) = next_element_sibling(heading) {
            let text = text_content(next).trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn body_text(doc: &Html) -> Option<String> {
    capture_value(&VALUE_TO_LINE_END, &text_content(body(doc)))
}

fn nutrition_facts(doc: &Html) -> Option<String> {
    let section = first_in_doc(doc, NUTRITION_FACTS)?;
    capture_value(&VALUE_TO_LINE_END, &text_content(section))
}

fn is_ingredients_label(text: &str) -> bool {
    (*LABEL).as_ref().is_some_and(|label| label.is_match(text))
}

/// Removes the first "Ingredients:" label and trims the rest.
fn strip_label(text: &str) -> String {
    match (*LABEL_PREFIX).as_ref() {
        Some(prefix) => prefix.replacen(text, 1, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

fn capture_value(pattern: &LazyLock<Option<Regex>>, text: &str) -> Option<String> {
    let captures = (**pattern).as_ref()?.captures(text)?;
    let value = captures.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}
