//! Rate Assembler: one rendered page in, one [`ScrapeRecord`] out.

use chrono::{DateTime, SecondsFormat, Utc};
use dolarhoy_page::{Document, DomNode};

use crate::extract::{extract_quote, extract_venta_tarjeta, RawQuote};
use crate::locate::find_card_any;
use crate::price::parse_price;
use crate::record::{RateCategory, RateData, RateQuote, ScrapeRecord};

/// Stamps every record it builds with a source URL and timezone name.
#[derive(Debug, Clone)]
pub struct Assembler {
    source: String,
    timezone: String,
}

impl Assembler {
    pub fn new(source: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            timezone: timezone.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Builds a record timestamped now.
    pub fn assemble(&self, page: &DomNode) -> ScrapeRecord {
        self.assemble_at(&Document::new(page), Utc::now())
    }

    pub fn assemble_at(&self, doc: &Document, at: DateTime<Utc>) -> ScrapeRecord {
        let mut data = RateData::default();
        for category in RateCategory::ALL {
            let raw = raw_quote(doc, category);
            data.set(
                category,
                RateQuote {
                    compra: parse_price(raw.compra.as_deref()),
                    venta: parse_price(raw.venta.as_deref()),
                },
            );
        }

        ScrapeRecord {
            timestamp: format_timestamp(at),
            timezone: self.timezone.clone(),
            source: self.source.clone(),
            data,
        }
    }
}

/// Raw text for one category, empty when the card is not on the page.
pub fn raw_quote(doc: &Document, category: RateCategory) -> RawQuote {
    let Some(card) = find_card_any(doc, category.titles()) else {
        tracing::debug!(category = %category, "Card not found");
        return RawQuote::default();
    };
    if category.has_compra() {
        extract_quote(card)
    } else {
        RawQuote {
            compra: None,
            venta: extract_venta_tarjeta(card),
        }
    }
}

/// `2025-01-10T15:00:00.000Z`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
