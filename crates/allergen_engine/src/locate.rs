use std::collections::HashSet;

use allergen_core::{CartItemRef, UNKNOWN_PRODUCT_TITLE};
use scan_logging::{scan_debug, scan_info, scan_warn};
use scraper::{ElementRef, Html};
use url::Url;

use crate::dom::{all_in, collapse_whitespace, first_in, first_in_doc, resolve_href, text_content};
use crate::LocateError;

/// Cart container candidates, highest priority first.
pub const CART_CONTAINER_SELECTORS: &[&str] = &[
    "#sc-expanded-cart-localmarket",
    ".sc-list-body",
    ".sc-list-item-content",
    ".sc-list-items",
    ".a-container",
];

/// Item nodes inside the container, taken in document order.
pub const ITEM_NODE_SELECTOR: &str = ".sc-list-item, .sc-list-item-content, .sc-product-item";

/// Anchor candidates inside one item node, highest priority first.
pub const ANCHOR_SELECTORS: &[&str] = &["a.sc-product-link", ".a-link-normal", "a[href*='/dp/']"];

/// Why a single item node was skipped. Never surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemLocateError {
    #[error("Missing href attribute on element")]
    MissingHref,
}

/// The host cart page: its markup and the origin relative hrefs resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartPage {
    pub markup: String,
    pub base_url: Url,
}

impl CartPage {
    pub fn new(markup: impl Into<String>, base_url: Url) -> Self {
        Self {
            markup: markup.into(),
            base_url,
        }
    }
}

/// Finds the cart, then every unique product in it, in first-seen order.
pub fn locate_items(cart: &CartPage) -> Result<Vec<CartItemRef>, LocateError> {
    let doc = Html::parse_document(&cart.markup);
    let container = find_container(&doc).ok_or(LocateError::CartNotFound)?;

    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for (index, node) in all_in(container, ITEM_NODE_SELECTOR).into_iter().enumerate() {
        match locate_item(node, &cart.base_url) {
            Ok(item) => {
                if seen.insert(item.url.clone()) {
                    items.push(item);
                } else {
                    scan_debug!("Item node {} repeats {}", index, item.url);
                }
            }
            Err(err) => scan_debug!("Skipping item node {}: {}", index, err),
        }
    }

    if items.is_empty() {
        scan_warn!("Cart container found but it holds no usable items");
        return Err(LocateError::NoItemsFound);
    }

    scan_info!("Found {} items in cart", items.len());
    Ok(items)
}

fn find_container(doc: &Html) -> Option<ElementRef<'_>> {
    CART_CONTAINER_SELECTORS.iter().find_map(|css| {
        let found = first_in_doc(doc, css);
        if found.is_some() {
            scan_debug!("Cart container matched {}", css);
        }
        found
    })
}

fn locate_item(node: ElementRef<'_>, base_url: &Url) -> Result<CartItemRef, ItemLocateError> {
    let anchor = ANCHOR_SELECTORS
        .iter()
        .find_map(|css| first_in(node, css))
        .ok_or(ItemLocateError::MissingHref)?;

    let url = anchor
        .value()
        .attr("href")
        .and_then(|href| resolve_href(href, base_url))
        .ok_or(ItemLocateError::MissingHref)?;

    let title = collapse_whitespace(&text_content(anchor));
    let title = if title.is_empty() {
        UNKNOWN_PRODUCT_TITLE.to_string()
    } else {
        title
    };

    Ok(CartItemRef::new(url, title))
}
