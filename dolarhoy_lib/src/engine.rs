//! Renderer selection.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use dolarhoy_page::{ChromeRenderer, DomNode, Error, HttpRenderer, Renderer};

use crate::settings::ScraperSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    /// Headless Chrome; needed for the live, script-rendered site.
    #[default]
    Chrome,
    /// Plain HTTP GET; static HTML only.
    Http,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chrome => write!(f, "chrome"),
            Self::Http => write!(f, "http"),
        }
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chrome" | "browser" => Ok(Self::Chrome),
            "http" => Ok(Self::Http),
            other => Err(format!("unknown engine '{}', expected chrome or http", other)),
        }
    }
}

/// The renderer picked by [`Engine`].
pub enum SiteRenderer {
    Chrome(ChromeRenderer),
    Http(HttpRenderer),
}

impl SiteRenderer {
    pub fn from_settings(settings: &ScraperSettings) -> Self {
        let options = settings.render_options();
        match settings.engine {
            Engine::Chrome => {
                let chrome = ChromeRenderer::new(options);
                match &settings.chrome_path {
                    Some(path) => Self::Chrome(chrome.with_executable(path)),
                    None => Self::Chrome(chrome),
                }
            }
            Engine::Http => Self::Http(HttpRenderer::new(options)),
        }
    }
}

impl Renderer for SiteRenderer {
    fn render(&self, url: &str) -> impl Future<Output = Result<DomNode, Error>> + Send {
        async move {
            match self {
                Self::Chrome(r) => r.render(url).await,
                Self::Http(r) => r.render(url).await,
            }
        }
    }
}
