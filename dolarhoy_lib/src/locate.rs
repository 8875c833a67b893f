//! Card Locator: finds the page region that holds one rate card.
//!
//! The site markup is unknown and changes without notice, so the lookup keys
//! on the visible card title instead of class names or fixed depths.

use std::sync::OnceLock;

use dolarhoy_page::{Document, ElementRef};
use regex::Regex;

/// How many ancestors above the title are inspected for the card container.
pub const MAX_CARD_DEPTH: usize = 10;

fn price_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d[\d.,]+").expect("valid price regex"))
}

/// Finds the smallest region around the element whose text is exactly
/// `title` (trimmed, case-insensitive).
///
/// Navigation, header and link elements never count as titles, neither do
/// invisible ones. The first match in document order wins.
pub fn find_card<'a>(doc: &'a Document, title: &str) -> Option<ElementRef<'a>> {
    let wanted = normalize(title);
    let title_el = doc
        .body()
        .descendants()
        .filter(is_title_candidate)
        .find(|el| normalize(&el.text_content()) == wanted)?;
    Some(enclosing_card(title_el))
}

/// Tries each spelling in order and returns the first card found.
pub fn find_card_any<'a>(doc: &'a Document, titles: &[&str]) -> Option<ElementRef<'a>> {
    titles.iter().find_map(|title| find_card(doc, title))
}

fn is_title_candidate(el: &ElementRef<'_>) -> bool {
    el.tag() != "a"
        && el.is_visible()
        && el.closest("nav").is_none()
        && el.closest("header").is_none()
}

/// Walks up from the title to the first ancestor that reads like a quote
/// card, falling back to the title's parent.
fn enclosing_card(title: ElementRef<'_>) -> ElementRef<'_> {
    let Some(parent) = title.parent() else {
        return title;
    };
    title
        .ancestors()
        .take(MAX_CARD_DEPTH)
        .find(|el| looks_like_card(&el.text_content()))
        .unwrap_or(parent)
}

/// Mentions both compra and venta and carries at least one price-like number.
pub fn looks_like_card(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("compra") && lower.contains("venta") && price_digits().is_match(&lower)
}

pub(crate) fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
