//! The seam between page acquisition and extraction.

use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tokio::time::{sleep, timeout};

use crate::dom::DomNode;
use crate::user_agent::{get_user_agent, ACCEPT_LANGUAGE};
use crate::Error;

/// Identity and time bounds applied to every render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Fixed user agent. When unset every render picks one from the pool.
    pub user_agent: Option<String>,
    pub accept_language: String,
    /// Upper bound for navigation until the `load` event.
    pub navigation_timeout: Duration,
    /// Upper bound for the quotes-visible condition.
    pub wait_timeout: Duration,
    /// How often the quotes-visible condition is re-checked.
    pub poll_interval: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            accept_language: ACCEPT_LANGUAGE.to_string(),
            navigation_timeout: Duration::from_secs(60),
            wait_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
        }
    }
}

impl RenderOptions {
    /// User agent for the next request.
    pub fn agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or_else(|| get_user_agent())
    }
}

/// Something that turns a URL into a rendered element tree.
///
/// Implementations own whatever native resources they need for the duration
/// of a single call and must release them before returning, on success and
/// on failure alike.
pub trait Renderer: Send + Sync {
    fn render(&self, url: &str) -> impl Future<Output = Result<DomNode, Error>> + Send;
}

/// True once the page text shows both quote labels and at least one number.
pub fn quotes_visible(text: &str) -> bool {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new(r"\d[\d.,]+").expect("valid digits regex"));
    text.contains("Compra") && text.contains("Venta") && digits.is_match(text)
}

/// Re-reads the page text every `poll` until [`quotes_visible`] holds.
///
/// Gives up with `Timeout { stage: "quotes visible" }` once `wait` elapses.
/// Read errors end the wait immediately.
pub(crate) async fn wait_for_quotes<F, Fut>(mut read_text: F, wait: Duration, poll: Duration) -> Result<(), Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, Error>>,
{
    timeout(wait, poll_until_visible(&mut read_text, poll))
        .await
        .map_err(|_| Error::Timeout {
            stage: "quotes visible",
            after: wait,
        })?
}

async fn poll_until_visible<F, Fut>(read_text: &mut F, poll: Duration) -> Result<(), Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, Error>>,
{
    loop {
        let text = read_text().await?;
        if quotes_visible(&text) {
            return Ok(());
        }
        sleep(poll).await;
    }
}
