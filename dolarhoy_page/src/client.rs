//! Plain HTTP renderer: one GET, no script execution.

use url::Url;

use crate::{
    dom::{Document, DomNode},
    html::parse_html,
    render::{quotes_visible, RenderOptions, Renderer},
    Error,
};

/// Renderer that fetches server-side HTML with `reqwest`.
///
/// Cheaper than a browser and good enough whenever the site ships its quotes
/// in the initial document. Visibility comes from inline styles only.
pub struct HttpRenderer {
    options: RenderOptions,
}

impl Default for HttpRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl HttpRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Fetches the raw document body.
    pub async fn fetch_html(&self, url: &str) -> Result<String, Error> {
        let url = Url::parse(url).map_err(|e| {
            tracing::error!("Invalid target URL {}: {}", url, e);
            Error::Config(format!("invalid url {}: {}", url, e))
        })?;
        let client = reqwest::Client::builder()
            .user_agent(self.options.agent())
            .timeout(self.options.navigation_timeout)
            .build()?;

        let resp = client
            .get(url)
            .header("accept", "text/html,application/xhtml+xml")
            .header("accept-language", self.options.accept_language.as_str())
            .header("cache-control", "no-cache")
            .header("pragma", "no-cache")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::error!("Target answered with status {}", status);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                stage: "navigation",
                after: self.options.navigation_timeout,
            }
        } else {
            Error::Http(err)
        }
    }
}

impl Renderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<DomNode, Error> {
        tracing::debug!(url, "Fetching page over HTTP");
        let html = self.fetch_html(url).await?;
        let root = parse_html(&html);
        let text = Document::new(&root).body().text_content();
        if !quotes_visible(&text) {
            return Err(Error::ConditionNotMet);
        }
        Ok(root)
    }
}
