//! One scrape-and-append cycle, serialized across all callers.

use dolarhoy_page::Renderer;
use tokio::sync::Mutex;

use crate::assemble::Assembler;
use crate::error::CycleError;
use crate::history::HistoryStore;
use crate::record::ScrapeRecord;
use crate::settings::ScraperSettings;
use crate::validate::has_numeric_value;

/// Render, assemble, validate and (optionally) append.
///
/// Only one cycle runs at a time per instance. A trigger that arrives while
/// another cycle is in flight is dropped with [`CycleError::AlreadyRunning`],
/// so two appends never race on the history file.
pub struct ScrapeCycle<R> {
    renderer: R,
    url: String,
    assembler: Assembler,
    store: HistoryStore,
    persist: bool,
    slot: Mutex<()>,
}

impl<R: Renderer> ScrapeCycle<R> {
    pub fn new(renderer: R, url: impl Into<String>, store: HistoryStore, timezone: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            renderer,
            assembler: Assembler::new(url.clone(), timezone),
            url,
            store,
            persist: true,
            slot: Mutex::new(()),
        }
    }

    pub fn from_settings(renderer: R, settings: &ScraperSettings) -> Self {
        Self::new(
            renderer,
            settings.url.clone(),
            HistoryStore::new(&settings.data_file),
            settings.resolved_timezone(),
        )
    }

    /// With persistence off, successful cycles return the record without
    /// touching the history file.
    pub fn with_persistence(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn persists(&self) -> bool {
        self.persist
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub async fn run(&self) -> Result<ScrapeRecord, CycleError> {
        self.execute(self.persist).await
    }

    /// Runs the cycle without appending, regardless of the persistence flag.
    pub async fn preview(&self) -> Result<ScrapeRecord, CycleError> {
        self.execute(false).await
    }

    async fn execute(&self, persist: bool) -> Result<ScrapeRecord, CycleError> {
        let Ok(_slot) = self.slot.try_lock() else {
            tracing::warn!(url = %self.url, "Scrape already in progress, skipping trigger");
            return Err(CycleError::AlreadyRunning);
        };

        tracing::info!(url = %self.url, "Navigating");
        let page = self.renderer.render(&self.url).await.map_err(|e| {
            tracing::error!(url = %self.url, error = %e, "Error during scraping");
            e
        })?;

        let record = self.assembler.assemble(&page);
        if !has_numeric_value(&record) {
            tracing::error!(url = %self.url, "No valid data extracted");
            return Err(CycleError::NoValues);
        }

        if persist {
            let saved = record.clone();
            self.store
                .offload(move |store| store.append(&saved))
                .await
                .map_err(|e| {
                    tracing::error!(path = %self.store.path().display(), error = %e, "Could not save data");
                    e
                })?;
        } else {
            tracing::info!(timestamp = %record.timestamp, "Scrape completed without persisting");
        }
        Ok(record)
    }
}
