//! Quote and record types as stored in the history file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of rate cards tracked on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateCategory {
    Blue,
    Oficial,
    Mep,
    Cripto,
    Ccl,
    Tarjeta,
}

impl RateCategory {
    pub const ALL: [RateCategory; 6] = [
        RateCategory::Blue,
        RateCategory::Oficial,
        RateCategory::Mep,
        RateCategory::Cripto,
        RateCategory::Ccl,
        RateCategory::Tarjeta,
    ];

    /// Key used in the stored `data` object.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Oficial => "oficial",
            Self::Mep => "mep",
            Self::Cripto => "cripto",
            Self::Ccl => "ccl",
            Self::Tarjeta => "tarjeta",
        }
    }

    /// Card titles as the site spells them, most common first.
    pub fn titles(&self) -> &'static [&'static str] {
        match self {
            Self::Blue => &["Dólar blue"],
            Self::Oficial => &["Dólar Oficial"],
            Self::Mep => &["Dólar MEP"],
            Self::Cripto => &[
                "Dólar cripto (USDT)",
                "Dólar Cripto (USDT)",
                "Dólar cripto USDT",
                "Dólar Cripto USDT",
            ],
            Self::Ccl => &[
                "Contado con liqui",
                "Contado con Liqui",
                "Contado con Liquidación",
                "CCL",
            ],
            Self::Tarjeta => &["Dólar Tarjeta"],
        }
    }

    /// Tarjeta only publishes a selling price.
    pub fn has_compra(&self) -> bool {
        !matches!(self, Self::Tarjeta)
    }
}

impl fmt::Display for RateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RateCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown rate category: {}", s))
    }
}

/// Buy/sell pair for one category. Either side may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RateQuote {
    pub compra: Option<f64>,
    pub venta: Option<f64>,
}

/// Sell-only quote (tarjeta).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VentaQuote {
    pub venta: Option<f64>,
}

/// Quotes for every category in one scrape.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RateData {
    pub blue: RateQuote,
    pub oficial: RateQuote,
    pub mep: RateQuote,
    pub cripto: RateQuote,
    pub ccl: RateQuote,
    /// Records written before tarjeta was tracked have no such key.
    #[serde(default)]
    pub tarjeta: VentaQuote,
}

impl RateData {
    /// The quote for `category`; tarjeta reports `compra: None`.
    pub fn quote(&self, category: RateCategory) -> RateQuote {
        match category {
            RateCategory::Blue => self.blue,
            RateCategory::Oficial => self.oficial,
            RateCategory::Mep => self.mep,
            RateCategory::Cripto => self.cripto,
            RateCategory::Ccl => self.ccl,
            RateCategory::Tarjeta => RateQuote {
                compra: None,
                venta: self.tarjeta.venta,
            },
        }
    }

    pub fn set(&mut self, category: RateCategory, quote: RateQuote) {
        match category {
            RateCategory::Blue => self.blue = quote,
            RateCategory::Oficial => self.oficial = quote,
            RateCategory::Mep => self.mep = quote,
            RateCategory::Cripto => self.cripto = quote,
            RateCategory::Ccl => self.ccl = quote,
            RateCategory::Tarjeta => self.tarjeta.venta = quote.venta,
        }
    }

    /// The eleven stored numeric slots: compra/venta of five categories plus
    /// tarjeta venta.
    pub fn slots(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        RateCategory::ALL.into_iter().flat_map(move |category| {
            let quote = self.quote(category);
            let compra = category.has_compra().then_some(quote.compra);
            compra.into_iter().chain(std::iter::once(quote.venta))
        })
    }
}

/// One timestamped scrape, as appended to the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRecord {
    /// UTC, ISO-8601 with milliseconds.
    pub timestamp: String,
    /// IANA zone name of the scraping host.
    pub timezone: String,
    pub source: String,
    pub data: RateData,
}
