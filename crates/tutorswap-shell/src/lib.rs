// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Application shell for the TutorSwap client: a path-addressed router
//! over pluggable host ports, and the link behavior that drives it.
//!
//! The router runs one navigation pipeline at a time: guards first, then
//! the page module and its assets, then the outgoing page's unload, and
//! only then the new page's entry. Everything host-specific comes in
//! through the [`HistorySink`], [`AssetFetcher`], [`Surface`], and
//! [`PageLoader`] ports, so a browser shell, a native host, and a test
//! harness all drive the same core.

mod app;
mod error;
mod hosts;
mod link;
mod page;
mod router;
mod telemetry;

pub use app::{app_route_table, AppConfig, AppContext, AppHosts};
pub use error::{PageError, ShellError};
pub use hosts::{
    markup_url, style_url, AssetCache, AssetFetcher, HistoryEntry, HistorySink, HistoryState,
    MemoryAssets, NullSurface, PageLoader, RecordingHistory, StaticPageSet, Surface,
};
pub use link::{ClickModifiers, ClickOutcome, LinkView, Navigable, RouteLink};
pub use page::{NavTarget, Page, PageFlow, RoutePage};
pub use router::{
    HandleId, NavOptions, NavOutcome, NavPhase, NavRequest, Router, RouterConfig,
    DEFAULT_PATH_PREFIX,
};
pub use telemetry::init_tracing;

pub const CRATE_NAME: &str = "tutorswap-shell";
