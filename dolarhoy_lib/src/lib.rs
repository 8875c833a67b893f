//! Extraction pipeline and history for DolarHoy exchange-rate quotes.
//!
//! A rendered page goes through the Card Locator, Field Extractor and Price
//! Parser to become a [`ScrapeRecord`]; records with at least one number are
//! appended to a JSON [`HistoryStore`]. [`ScrapeCycle`] ties this to a
//! [`dolarhoy_page::Renderer`] and [`Scheduler`] runs it periodically.

pub mod assemble;
pub mod cycle;
pub mod engine;
pub mod error;
pub mod extract;
pub mod history;
pub mod locate;
pub mod price;
pub mod record;
pub mod scheduler;
pub mod settings;
pub mod validate;

pub use dolarhoy_page;

pub use assemble::Assembler;
pub use cycle::ScrapeCycle;
pub use engine::{Engine, SiteRenderer};
pub use error::CycleError;
pub use extract::{FieldLabel, FieldStrategy, RawQuote, VentaStrategy};
pub use history::{HistoryError, HistoryStore, Latest};
pub use locate::{find_card, find_card_any};
pub use price::parse_price;
pub use record::{RateCategory, RateData, RateQuote, ScrapeRecord, VentaQuote};
pub use scheduler::Scheduler;
pub use settings::{resolve_timezone, ScraperSettings};
pub use validate::has_numeric_value;
