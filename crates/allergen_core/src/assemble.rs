use std::collections::HashSet;

use url::Url;

use crate::item::{ItemOutcome, ScrapeResult, UNKNOWN_PRODUCT_TITLE};

/// Accessibility labels that some carts render as the only text of a link.
const GENERIC_LINK_LABELS: &[&str] = &["Opens in a new tab", "Opens in a new window"];

/// Turns per-item outcomes into the final result list, keeping their order.
///
/// A later outcome whose URL normalizes to one already seen is dropped, and
/// titles that are nothing but a link label become the fallback title.
pub fn assemble(outcomes: Vec<ItemOutcome>) -> Vec<ScrapeResult> {
    let mut seen = HashSet::with_capacity(outcomes.len());
    let mut results = Vec::with_capacity(outcomes.len());

    for mut outcome in outcomes {
        if !seen.insert(normalize_url_for_dedupe(&outcome.item.url)) {
            continue;
        }
        outcome.item.title = presentable_title(&outcome.item.title);
        results.push(ScrapeResult::from(outcome));
    }

    results
}

/// Key used to spot the same product behind cosmetically different URLs:
/// fragment dropped, trailing path slash dropped, scheme and host lowercased.
pub fn normalize_url_for_dedupe(url: &str) -> String {
    let trimmed = url.trim();
    let Ok(mut parsed) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };
    parsed.set_fragment(None);
    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }
    parsed.to_string()
}

pub fn presentable_title(title: &str) -> String {
    let mut text = title.to_string();
    for label in GENERIC_LINK_LABELS {
        text = text.replace(label, " ");
    }
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        UNKNOWN_PRODUCT_TITLE.to_string()
    } else {
        collapsed
    }
}
