// SPDX-License-Identifier: Apache-2.0

//! Ports onto the embedding host. A browser shell backs these with the
//! history API, `fetch`, and the DOM; tests and native hosts plug in the
//! in-memory implementations.

use crate::{Page, ShellError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tutorswap_routing::RouteArgs;

/// Structured state stored with a history entry, so going back can skip
/// re-parsing the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub route: String,
    pub args: RouteArgs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Location as the address bar shows it, prefix included.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<HistoryState>,
}

/// Append-only view of the host's navigation stack. Back/forward motion
/// comes back in through `Router::handle_pop`, not through this port.
pub trait HistorySink: Send + Sync {
    fn push(&self, entry: HistoryEntry);
}

/// In-memory history for tests and headless hosts.
#[derive(Debug, Default)]
pub struct RecordingHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl RecordingHistory {
    #[must_use]
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn last(&self) -> Option<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl HistorySink for RecordingHistory {
    fn push(&self, entry: HistoryEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

/// Text asset retrieval, typically HTTP `fetch` against the app origin.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, ShellError>;
}

/// Fixture fetcher serving from a map.
#[derive(Debug, Default)]
pub struct MemoryAssets {
    texts: BTreeMap<String, String>,
}

impl MemoryAssets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.insert(url.into(), text.into());
        self
    }
}

#[async_trait]
impl AssetFetcher for MemoryAssets {
    async fn fetch_text(&self, url: &str) -> Result<String, ShellError> {
        self.texts
            .get(url)
            .cloned()
            .ok_or_else(|| ShellError::new(format!("no asset at '{url}'")))
    }
}

/// Markup asset location for a page file.
#[must_use]
pub fn markup_url(file: &str) -> String {
    format!("/pages/{file}.html")
}

/// Stylesheet asset location for a page file.
#[must_use]
pub fn style_url(file: &str) -> String {
    format!("/styles/pages/{file}.css")
}

/// Memoizing layer over an [`AssetFetcher`]. The lock is held across the
/// fetch, so concurrent requests for one url coalesce on a single trip.
/// Only successful fetches are remembered; a failure is retried next time.
pub struct AssetCache {
    fetcher: Arc<dyn AssetFetcher>,
    memo: AsyncMutex<BTreeMap<String, String>>,
}

impl AssetCache {
    #[must_use]
    pub fn new(fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            fetcher,
            memo: AsyncMutex::new(BTreeMap::new()),
        }
    }

    pub async fn text(&self, url: &str) -> Result<String, ShellError> {
        let mut memo = self.memo.lock().await;
        if let Some(text) = memo.get(url) {
            return Ok(text.clone());
        }
        let text = self.fetcher.fetch_text(url).await?;
        memo.insert(url.to_string(), text.clone());
        Ok(text)
    }
}

/// Render-target side of the host: indicators and style application. The
/// shell never touches a DOM; it tells the surface what to show.
pub trait Surface: Send + Sync {
    fn set_loading(&self, active: bool);
    fn set_render_target(&self, file: &str);
    fn apply_style(&self, file: &str, css: &str);
    fn set_offline(&self, offline: bool);
}

/// Surface that swallows everything, for headless use.
#[derive(Debug, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn set_loading(&self, _active: bool) {}
    fn set_render_target(&self, _file: &str) {}
    fn apply_style(&self, _file: &str, _css: &str) {}
    fn set_offline(&self, _offline: bool) {}
}

/// Resolves a route's page file to its module. Browser hosts back this
/// with dynamic import; everything else registers modules up front.
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load(&self, file: &str) -> Result<Arc<dyn Page>, ShellError>;
}

/// Loader over a fixed registration map.
#[derive(Default)]
pub struct StaticPageSet {
    pages: BTreeMap<String, Arc<dyn Page>>,
}

impl StaticPageSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, file: impl Into<String>, page: Arc<dyn Page>) -> Self {
        self.pages.insert(file.into(), page);
        self
    }

    pub fn insert(&mut self, file: impl Into<String>, page: Arc<dyn Page>) {
        self.pages.insert(file.into(), page);
    }
}

#[async_trait]
impl PageLoader for StaticPageSet {
    async fn load(&self, file: &str) -> Result<Arc<dyn Page>, ShellError> {
        self.pages
            .get(file)
            .cloned()
            .ok_or_else(|| ShellError::new(format!("no page module registered for '{file}'")))
    }
}
