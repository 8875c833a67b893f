//! Headless Chrome renderer using chromiumoxide.

use std::path::PathBuf;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::dom::{DomNode, FlatNode};
use crate::render::{wait_for_quotes, RenderOptions, Renderer};
use crate::Error;

const BODY_TEXT_JS: &str = "document.body ? (document.body.textContent || '') : ''";

/// Captures the live DOM as a preorder list of nodes with parent indices.
///
/// A flat list keeps the CDP payload shallow no matter how deep the page nests.
const SNAPSHOT_JS: &str = r#"(() => {
  const SKIP = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE']);
  const nodes = [];
  const stack = [[document.documentElement, null]];
  while (stack.length > 0) {
    const [node, parent] = stack.pop();
    if (node.nodeType === Node.TEXT_NODE) {
      nodes.push({ parent, text: node.nodeValue || '' });
      continue;
    }
    if (node.nodeType !== Node.ELEMENT_NODE || SKIP.has(node.tagName)) {
      continue;
    }
    const style = window.getComputedStyle(node);
    const attributes = {};
    for (const attr of node.attributes) {
      attributes[attr.name] = attr.value;
    }
    const id = nodes.length;
    nodes.push({
      parent,
      tag: node.tagName.toLowerCase(),
      attributes,
      visible: !(style.display === 'none' || style.visibility === 'hidden' || style.opacity === '0'),
    });
    const children = node.childNodes;
    for (let i = children.length - 1; i >= 0; i--) {
      stack.push([children[i], id]);
    }
  }
  return nodes;
})()"#;

/// Renderer that drives a fresh headless Chrome per call.
///
/// Browser, page and the CDP handler task live only for one `render` call
/// and are torn down on every exit path.
pub struct ChromeRenderer {
    options: RenderOptions,
    executable: Option<PathBuf>,
}

impl ChromeRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            executable: None,
        }
    }

    /// Uses a specific Chrome/Chromium binary instead of auto-detection.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), Error> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--mute-audio")
            .window_size(1920, 1080);
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(Error::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Launch(e.to_string()))?;

        // The handler must be polled for the browser to make progress.
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler error: {}", e);
                }
            }
        });

        Ok((browser, handle))
    }

    async fn render_in(&self, browser: &Browser, url: &str) -> Result<DomNode, Error> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::Launch(e.to_string()))?;

        let result = self.capture(&page, url).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close page: {}", e);
        }
        result
    }

    async fn capture(&self, page: &Page, url: &str) -> Result<DomNode, Error> {
        let identity = SetUserAgentOverrideParams::builder()
            .user_agent(self.options.agent())
            .accept_language(self.options.accept_language.clone())
            .build()
            .map_err(Error::Config)?;
        page.execute(identity)
            .await
            .map_err(|e| Error::Navigation(e.to_string()))?;

        tracing::info!(url, "Navigating to target");
        timeout(self.options.navigation_timeout, page.goto(url))
            .await
            .map_err(|_| Error::Timeout {
                stage: "navigation",
                after: self.options.navigation_timeout,
            })?
            .map_err(|e| Error::Navigation(e.to_string()))?;

        wait_for_quotes(
            || evaluate::<String>(page, BODY_TEXT_JS),
            self.options.wait_timeout,
            self.options.poll_interval,
        )
        .await?;

        let nodes: Vec<FlatNode> = evaluate(page, SNAPSHOT_JS).await?;
        DomNode::from_preorder(nodes)
    }
}

impl Renderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<DomNode, Error> {
        let (mut browser, handle) = self.launch().await?;

        let result = self.render_in(&browser, url).await;

        if let Err(e) = browser.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::warn!("Failed to reap browser process: {}", e);
        }
        handle.abort();

        result
    }
}

async fn evaluate<T: DeserializeOwned>(page: &Page, script: &str) -> Result<T, Error> {
    let params = EvaluateParams::builder()
        .expression(script)
        .return_by_value(true)
        .await_promise(true)
        .build()
        .map_err(Error::Evaluate)?;
    let result = page
        .evaluate_expression(params)
        .await
        .map_err(|e| Error::Evaluate(e.to_string()))?;
    Ok(result.into_value()?)
}
