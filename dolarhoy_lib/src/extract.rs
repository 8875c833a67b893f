//! Field Extractor: pulls the raw compra/venta text out of a card.
//!
//! Each lookup is an ordered list of named strategies. The first one that
//! yields text wins; a miss is `None`, never an error.

use std::fmt;
use std::sync::OnceLock;

use dolarhoy_page::ElementRef;
use regex::Regex;

use crate::locate::normalize;

/// Text that ends in a number (`1425`, `1.425,00`).
fn trailing_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d[\d.,]*$").expect("valid trailing number regex"))
}

/// Text that ends in a number, optionally `$`-prefixed.
fn trailing_price() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$?\d[\d.,]*$").expect("valid trailing price regex"))
}

/// `$` then thousands-grouped digits with an optional two-digit decimal part.
fn grouped_price() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$?\s*(\d{1,3}(?:\.\d{3})*(?:,\d{2})?)").expect("valid grouped price regex")
    })
}

fn venta_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)venta").expect("valid venta regex"))
}

/// How far past the `venta` label the text fallbacks look for a price.
const AFTER_LABEL_WINDOW: usize = 100;

/// The two quote sides, named as the site labels them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    Compra,
    Venta,
}

impl FieldLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compra => "compra",
            Self::Venta => "venta",
        }
    }
}

impl fmt::Display for FieldLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw, unparsed text for one card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawQuote {
    pub compra: Option<String>,
    pub venta: Option<String>,
}

/// Strategies for a compra/venta field, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStrategy {
    /// First number-ending element next to the label, inside the label's parent.
    LabelSibling,
    /// Any price-shaped element in the card other than the label itself.
    LabelCardScan,
    /// First price-shaped element in the card, label or not. Skips `exclude`.
    FirstPriceInCard,
}

impl FieldStrategy {
    pub const ORDER: [FieldStrategy; 3] = [
        FieldStrategy::LabelSibling,
        FieldStrategy::LabelCardScan,
        FieldStrategy::FirstPriceInCard,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LabelSibling => "label-sibling",
            Self::LabelCardScan => "label-card-scan",
            Self::FirstPriceInCard => "first-price-in-card",
        }
    }

    /// Runs this strategy alone. `exclude` is text already claimed by the
    /// other field and is only honoured by the label-less scan.
    pub fn apply(&self, card: ElementRef<'_>, label: FieldLabel, exclude: Option<&str>) -> Option<String> {
        match self {
            Self::LabelSibling => {
                let label_el = find_label(card, label.as_str())?;
                let parent = label_el.parent()?;
                parent
                    .descendants()
                    .map(|el| trimmed_text(&el))
                    .find(|text| trailing_number().is_match(text))
            }
            Self::LabelCardScan => {
                let label_el = find_label(card, label.as_str())?;
                card.descendants()
                    .filter(|el| *el != label_el)
                    .map(|el| trimmed_text(&el))
                    .find(|text| trailing_price().is_match(text))
            }
            Self::FirstPriceInCard => card
                .descendants()
                .map(|el| trimmed_text(&el))
                .find(|text| trailing_price().is_match(text) && Some(text.as_str()) != exclude),
        }
    }
}

/// Strategies for the venta-only tarjeta card, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentaStrategy {
    /// First grouped price in an element after the label, among its siblings.
    FollowingSibling,
    /// Grouped price shortly after the word `venta` in the parent's text.
    ParentTextAfterLabel,
    /// Grouped price shortly after the word `venta` in the card's text.
    CardTextAfterLabel,
}

impl VentaStrategy {
    pub const ORDER: [VentaStrategy; 3] = [
        VentaStrategy::FollowingSibling,
        VentaStrategy::ParentTextAfterLabel,
        VentaStrategy::CardTextAfterLabel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FollowingSibling => "following-sibling",
            Self::ParentTextAfterLabel => "parent-text-after-label",
            Self::CardTextAfterLabel => "card-text-after-label",
        }
    }

    pub fn apply(&self, card: ElementRef<'_>, label_el: ElementRef<'_>) -> Option<String> {
        match self {
            Self::FollowingSibling => {
                let parent = label_el.parent()?;
                parent
                    .children()
                    .skip_while(|el| *el != label_el)
                    .skip(1)
                    .find_map(|el| grouped_price_in(el.text_content().trim()))
            }
            Self::ParentTextAfterLabel => {
                let parent = label_el.parent()?;
                price_after_venta(&parent.text_content())
            }
            Self::CardTextAfterLabel => price_after_venta(&card.text_content()),
        }
    }
}

/// First descendant of `card` whose whole text is `label`.
pub fn find_label<'a>(card: ElementRef<'a>, label: &str) -> Option<ElementRef<'a>> {
    card.descendants()
        .find(|el| normalize(&el.text_content()) == label)
}

/// Best-guess raw text for one field, without cross-field exclusion.
pub fn extract_value(card: ElementRef<'_>, label: FieldLabel) -> Option<String> {
    extract_field(card, label, None)
}

/// Runs [`FieldStrategy::ORDER`] and returns the first hit.
pub fn extract_field(card: ElementRef<'_>, label: FieldLabel, exclude: Option<&str>) -> Option<String> {
    FieldStrategy::ORDER.iter().find_map(|strategy| {
        let found = strategy.apply(card, label, exclude)?;
        tracing::debug!(field = %label, strategy = strategy.name(), raw = %found, "Field extracted");
        Some(found)
    })
}

/// Both sides of a card. Venta never falls back to the text picked for compra.
pub fn extract_quote(card: ElementRef<'_>) -> RawQuote {
    let compra = extract_field(card, FieldLabel::Compra, None);
    let venta = extract_field(card, FieldLabel::Venta, compra.as_deref());
    RawQuote { compra, venta }
}

/// Venta for the tarjeta card, which has no compra side.
pub fn extract_venta_tarjeta(card: ElementRef<'_>) -> Option<String> {
    let label_el = find_label(card, FieldLabel::Venta.as_str())?;
    VentaStrategy::ORDER.iter().find_map(|strategy| {
        let found = strategy.apply(card, label_el)?;
        tracing::debug!(strategy = strategy.name(), raw = %found, "Tarjeta venta extracted");
        Some(found)
    })
}

fn trimmed_text(el: &ElementRef<'_>) -> String {
    el.text_content().trim().to_string()
}

fn grouped_price_in(text: &str) -> Option<String> {
    grouped_price()
        .find(text)
        .map(|m| m.as_str().trim().to_string())
}

/// Looks for a price within the first characters following the first
/// `venta` (up to the next one).
fn price_after_venta(text: &str) -> Option<String> {
    let after = venta_marker().split(text).nth(1)?;
    let window: String = after.chars().take(AFTER_LABEL_WINDOW).collect();
    grouped_price_in(&window)
}
