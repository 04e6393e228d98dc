//! Small DOM helpers shared by the adapters.
//!
//! The marketplaces mostly use label/value markup rather than clean
//! attributes, so most extraction is "find the element carrying this
//! label, then read the text next to it".

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// All text under an element, whitespace-normalized and trimmed.
pub(crate) fn text(el: ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First non-empty text fragment under an element. Summary links lead
/// with their display title before any nested markup.
pub(crate) fn first_text(el: ElementRef) -> Option<String> {
    el.text().map(str::trim).find(|t| !t.is_empty()).map(str::to_string)
}

/// First non-empty text node following an element, e.g. the value after
/// `<label>Year:</label> 1979`.
pub(crate) fn following_text(el: ElementRef) -> Option<String> {
    let mut node = el.next_sibling();
    while let Some(n) = node {
        if let Node::Text(t) = n.value() {
            let trimmed = t.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        node = n.next_sibling();
    }
    None
}

/// First element sibling following an element, e.g. the value `<div>`
/// after a `<div class="spec-name">`.
pub(crate) fn following_element(el: ElementRef) -> Option<ElementRef> {
    let mut node = el.next_sibling();
    while let Some(n) = node {
        if let Some(sibling) = ElementRef::wrap(n) {
            return Some(sibling);
        }
        node = n.next_sibling();
    }
    None
}

/// Find the element matching `selector` whose trimmed text equals `label`.
pub(crate) fn find_labelled<'a>(
    doc: &'a Html,
    selector: &Selector,
    label: &str,
) -> Option<ElementRef<'a>> {
    doc.select(selector).find(|el| text(*el) == label)
}

/// Find the innermost element matching `selector` whose text contains
/// `label`. Nested tables make the outermost match useless.
pub(crate) fn find_containing<'a>(
    doc: &'a Html,
    selector: &Selector,
    label: &str,
) -> Option<ElementRef<'a>> {
    doc.select(selector)
        .filter(|el| text(*el).contains(label))
        .last()
}
