//! Small helpers over `scraper` shared by the locator and the extractor.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parses a selector known at compile time. Invalid selectors match nothing.
pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// First element matching `css` in document order, like `querySelector`.
pub(crate) fn first_in_doc<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    doc.select(&sel).next()
}

/// All elements matching `css` in document order, like `querySelectorAll`.
pub(crate) fn all_in_doc<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => doc.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// First descendant of `scope` matching `css`.
pub(crate) fn first_in<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    scope.select(&sel).next()
}

pub(crate) fn all_in<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => scope.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// Concatenated text of every descendant text node, like DOM `textContent`.
pub(crate) fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

pub(crate) fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Nearest inclusive ancestor matching `css`, like DOM `closest`.
pub(crate) fn closest<'a>(element: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    std::iter::successors(Some(element), |current| parent_element(*current))
        .find(|candidate| sel.matches(candidate))
}

/// `<body>` if present, the document root otherwise.
pub(crate) fn body(doc: &Html) -> ElementRef<'_> {
    first_in_doc(doc, "body").unwrap_or_else(|| doc.root_element())
}

/// Resolves an href against the origin of the page base (scheme, host and
/// port with path `/`), never against the page's own directory. Empty,
/// fragment-only and `javascript:` references do not point at a product page.
pub(crate) fn resolve_href(reference: &str, base: &Url) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(url) => Some(url),
        Err(_) => base.join("/").ok()?.join(trimmed).ok(),
    }
}
