//! Page acquisition for the DolarHoy scraper.
//!
//! Turns the target URL into an immutable element tree ([`DomNode`]) that the
//! extraction code can walk without a live browser. Two renderers are
//! provided: [`ChromeRenderer`] for the script-rendered site and
//! [`HttpRenderer`] for plain server-side HTML.

mod browser;
mod client;
pub mod dom;
mod errors;
pub mod html;
mod render;
pub mod user_agent;

pub use self::browser::ChromeRenderer;
pub use self::client::HttpRenderer;
pub use self::dom::{Document, DomNode, ElementNode, ElementRef, FlatNode};
pub use self::errors::Error;
pub use self::html::parse_html;
pub use self::render::{quotes_visible, RenderOptions, Renderer};
