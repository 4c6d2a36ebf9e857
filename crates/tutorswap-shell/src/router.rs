// SPDX-License-Identifier: Apache-2.0

//! Client-side router: one navigation at a time, assets gathered before
//! entry, the outgoing page gone before the incoming one runs.

use crate::hosts::{
    markup_url, style_url, AssetCache, AssetFetcher, HistoryEntry, HistorySink, HistoryState,
    PageLoader, Surface,
};
use crate::{NavTarget, PageFlow, RoutePage, ShellError};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tutorswap_routing::{parse_query, split_target, PathError, Query, Route, RouteArgs, RouteTable};

/// Address-bar prefix client routes mount under.
pub const DEFAULT_PATH_PREFIX: &str = "/#";

/// Redirect chains longer than this abort the navigation.
const MAX_REDIRECT_HOPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPhase {
    Idle,
    Loading,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Done,
    /// A guard vetoed the navigation before it had any effect.
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
pub struct NavOptions {
    /// Whether the navigation appends a history entry. Redirect-style
    /// loads pass `false`.
    pub push: bool,
}

impl Default for NavOptions {
    fn default() -> Self {
        Self { push: true }
    }
}

/// What a guard gets to look at before a navigation commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavRequest {
    pub route: String,
    pub args: RouteArgs,
    pub query: Query,
}

/// Registration receipt for guards and navigation callbacks. Removal with
/// a handle that was already removed is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

type Guard = Arc<dyn Fn(&NavRequest) -> bool + Send + Sync>;
type AfterNavigation = Arc<dyn Fn(&RoutePage) + Send + Sync>;

#[derive(Default)]
struct Hooks {
    next_handle: u64,
    guards: BTreeMap<u64, Guard>,
    after: BTreeMap<u64, AfterNavigation>,
}

impl Hooks {
    fn allocate(&mut self) -> u64 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }
}

struct NavState {
    phase: NavPhase,
    current: Option<RoutePage>,
    previous: Option<RoutePage>,
    generation: u64,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            phase: NavPhase::Idle,
            current: None,
            previous: None,
            generation: 0,
        }
    }
}

pub struct RouterConfig {
    pub table: Arc<RouteTable>,
    pub pages: Arc<dyn PageLoader>,
    pub assets: Arc<dyn AssetFetcher>,
    pub history: Arc<dyn HistorySink>,
    pub surface: Arc<dyn Surface>,
    pub path_prefix: String,
}

pub struct Router {
    table: Arc<RouteTable>,
    loader: Arc<dyn PageLoader>,
    assets: AssetCache,
    history: Arc<dyn HistorySink>,
    surface: Arc<dyn Surface>,
    path_prefix: String,
    nav_lock: AsyncMutex<()>,
    state: Mutex<NavState>,
    hooks: Mutex<Hooks>,
}

impl Router {
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        Self {
            table: config.table,
            loader: config.pages,
            assets: AssetCache::new(config.assets),
            history: config.history,
            surface: config.surface,
            path_prefix: config.path_prefix,
            nav_lock: AsyncMutex::new(()),
            state: Mutex::new(NavState::default()),
            hooks: Mutex::new(Hooks::default()),
        }
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    #[must_use]
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    #[must_use]
    pub fn phase(&self) -> NavPhase {
        self.lock_state().phase
    }

    #[must_use]
    pub fn current(&self) -> Option<RoutePage> {
        self.lock_state().current.clone()
    }

    #[must_use]
    pub fn previous(&self) -> Option<RoutePage> {
        self.lock_state().previous.clone()
    }

    /// Whether `page` is still the published occupant. Continuations that
    /// outlive their navigation check this before touching the surface.
    #[must_use]
    pub fn is_current(&self, page: &RoutePage) -> bool {
        self.lock_state()
            .current
            .as_ref()
            .is_some_and(|current| current.generation() == page.generation())
    }

    pub fn add_guard(&self, guard: impl Fn(&NavRequest) -> bool + Send + Sync + 'static) -> HandleId {
        let mut hooks = self.lock_hooks();
        let id = hooks.allocate();
        hooks.guards.insert(id, Arc::new(guard));
        HandleId(id)
    }

    pub fn remove_guard(&self, handle: HandleId) -> bool {
        self.lock_hooks().guards.remove(&handle.0).is_some()
    }

    pub fn on_navigated(&self, callback: impl Fn(&RoutePage) + Send + Sync + 'static) -> HandleId {
        let mut hooks = self.lock_hooks();
        let id = hooks.allocate();
        hooks.after.insert(id, Arc::new(callback));
        HandleId(id)
    }

    pub fn off_navigated(&self, handle: HandleId) -> bool {
        self.lock_hooks().after.remove(&handle.0).is_some()
    }

    pub async fn navigate(
        &self,
        name: &str,
        args: RouteArgs,
        query: Query,
    ) -> Result<NavOutcome, ShellError> {
        self.navigate_with(name, args, query, NavOptions::default())
            .await
    }

    pub async fn navigate_with(
        &self,
        name: &str,
        args: RouteArgs,
        query: Query,
        options: NavOptions,
    ) -> Result<NavOutcome, ShellError> {
        self.navigate_target(
            NavTarget {
                route: name.to_string(),
                args,
                query,
            },
            options,
        )
        .await
    }

    /// Loads whatever `raw` points at. This reacts to a location, so it
    /// never appends history.
    pub async fn load_path(&self, raw: &str) -> Result<NavOutcome, ShellError> {
        let location = raw.strip_prefix(&self.path_prefix).unwrap_or(raw);
        let (path, query) = split_target(location);
        let flow = match self.table.resolve(path) {
            Some((route, args)) => {
                tracing::debug!(route = %route.name, path = %path, "loading location");
                let query = query.map(parse_query).unwrap_or_default();
                self.perform_load(route, args, query, path.to_string(), raw.to_string())
                    .await?
            }
            None => self.load_not_found(raw).await?,
        };
        self.follow(flow).await
    }

    /// Back/forward re-entry. Stored state wins; a state that no longer
    /// routes (or a state-less entry) falls back to the literal path.
    pub async fn handle_pop(&self, entry: &HistoryEntry) -> Result<NavOutcome, ShellError> {
        if let Some(state) = &entry.state {
            if let Some(route) = self.table.route(&state.route) {
                if let Ok(path) = self.table.build_path(&state.route, &state.args, &Query::new()) {
                    let raw = format!("{}{}", self.path_prefix, path);
                    let flow = self
                        .perform_load(route, state.args.clone(), Query::new(), path, raw)
                        .await?;
                    return self.follow(flow).await;
                }
            }
            tracing::warn!(
                route = %state.route,
                "stored history state no longer routes, falling back to the path"
            );
        }
        self.load_path(&entry.path).await
    }

    /// Initial load. Reacts to the location like a pop, so nothing is
    /// pushed.
    pub async fn start(&self, initial_path: &str) -> Result<NavOutcome, ShellError> {
        self.load_path(initial_path).await
    }

    async fn navigate_target(
        &self,
        target: NavTarget,
        options: NavOptions,
    ) -> Result<NavOutcome, ShellError> {
        let mut target = target;
        let mut push = options.push;
        for _ in 0..MAX_REDIRECT_HOPS {
            let request = NavRequest {
                route: target.route.clone(),
                args: target.args.clone(),
                query: target.query.clone(),
            };
            if !self.guards_allow(&request) {
                tracing::debug!(route = %request.route, "navigation vetoed by a guard");
                return Ok(NavOutcome::Cancelled);
            }
            let flow = match self
                .table
                .build_path(&target.route, &target.args, &target.query)
            {
                Ok(path) => {
                    let route = self.table.route(&target.route).ok_or_else(|| {
                        ShellError::new(format!("route '{}' vanished from the table", target.route))
                    })?;
                    tracing::debug!(route = %target.route, path = %path, "navigating");
                    let raw = format!("{}{}", self.path_prefix, path);
                    if push {
                        self.history.push(HistoryEntry {
                            path: raw.clone(),
                            state: Some(HistoryState {
                                route: target.route.clone(),
                                args: target.args.clone(),
                            }),
                        });
                    }
                    let canonical = split_target(&path).0.to_string();
                    self.perform_load(route, target.args.clone(), target.query.clone(), canonical, raw)
                        .await?
                }
                Err(err @ PathError::MissingArg { .. }) => {
                    return Err(ShellError::new(err.to_string()));
                }
                Err(err) => {
                    // Unknown and hidden names load the not-found page and
                    // leave history alone.
                    tracing::warn!(route = %target.route, error = %err, "unroutable target, showing not-found");
                    self.load_not_found(&format!("{}/{}", self.path_prefix, target.route))
                        .await?
                }
            };
            match flow {
                PageFlow::Stay => return Ok(NavOutcome::Done),
                PageFlow::Redirect(next) => {
                    target = next;
                    push = true;
                }
            }
        }
        Err(ShellError::new("redirect chain exceeded the hop limit"))
    }

    async fn follow(&self, flow: PageFlow) -> Result<NavOutcome, ShellError> {
        match flow {
            PageFlow::Stay => Ok(NavOutcome::Done),
            PageFlow::Redirect(target) => {
                self.navigate_target(target, NavOptions { push: true }).await
            }
        }
    }

    async fn load_not_found(&self, raw: &str) -> Result<PageFlow, ShellError> {
        let location = raw.strip_prefix(&self.path_prefix).unwrap_or(raw);
        let (path, query) = split_target(location);
        let query = query.map(parse_query).unwrap_or_default();
        let route = self.table.not_found_route();
        self.perform_load(route, RouteArgs::new(), query, path.to_string(), raw.to_string())
            .await
    }

    /// One load at a time: the lock spans assets, unload, publish, and
    /// entry, so competing navigations queue and their effects land in
    /// order.
    async fn perform_load(
        &self,
        route: &Route,
        args: RouteArgs,
        query: Query,
        path: String,
        raw: String,
    ) -> Result<PageFlow, ShellError> {
        let _nav = self.nav_lock.lock().await;
        let generation = {
            let mut state = self.lock_state();
            state.generation += 1;
            state.phase = NavPhase::Loading;
            state.generation
        };
        self.surface.set_loading(true);
        let result = self
            .run_pipeline(route, args, query, path, raw, generation)
            .await;
        self.surface.set_loading(false);
        if result.is_err() {
            let mut state = self.lock_state();
            state.phase = if state.current.is_some() {
                NavPhase::Loaded
            } else {
                NavPhase::Idle
            };
        }
        result
    }

    async fn run_pipeline(
        &self,
        route: &Route,
        args: RouteArgs,
        query: Query,
        path: String,
        raw: String,
        generation: u64,
    ) -> Result<PageFlow, ShellError> {
        let (module, markup, style) = tokio::join!(
            self.loader.load(&route.file),
            self.fetch_markup(route),
            self.fetch_style(route),
        );
        let page = module.map_err(|err| {
            ShellError::new(format!("page module '{}' failed to load: {err}", route.file))
        })?;

        let incoming = RoutePage::new(
            route.name.clone(),
            route.file.clone(),
            args,
            path,
            query,
            raw,
            page,
            generation,
        );

        let outgoing = self.lock_state().current.clone();
        if let Some(prev) = &outgoing {
            prev.page().leave(prev, &incoming).await;
        }

        {
            let mut state = self.lock_state();
            state.previous = state.current.take();
            state.current = Some(incoming.clone());
            state.phase = NavPhase::Loaded;
        }
        self.surface.set_render_target(&route.file);
        if let Some(css) = &style {
            self.surface.apply_style(&route.file, css);
        }

        let flow = incoming
            .page()
            .enter(&incoming, markup.as_deref())
            .await
            .map_err(|err| ShellError::new(format!("page '{}' failed to enter: {err}", route.file)))?;

        self.notify_navigated(&incoming);
        incoming
            .page()
            .after_enter(incoming.route_name(), incoming.args())
            .await;

        Ok(flow)
    }

    async fn fetch_markup(&self, route: &Route) -> Option<String> {
        if !route.has_markup {
            return None;
        }
        match self.assets.text(&markup_url(&route.file)).await {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(file = %route.file, error = %err, "markup unavailable, entering without it");
                None
            }
        }
    }

    async fn fetch_style(&self, route: &Route) -> Option<String> {
        if !route.has_style {
            return None;
        }
        match self.assets.text(&style_url(&route.file)).await {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(file = %route.file, error = %err, "stylesheet unavailable, skipping it");
                None
            }
        }
    }

    fn guards_allow(&self, request: &NavRequest) -> bool {
        let guards: Vec<Guard> = self.lock_hooks().guards.values().cloned().collect();
        guards.iter().all(|guard| guard(request))
    }

    fn notify_navigated(&self, page: &RoutePage) {
        let callbacks: Vec<AfterNavigation> =
            self.lock_hooks().after.values().cloned().collect();
        for callback in callbacks {
            callback(page);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, NavState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_hooks(&self) -> MutexGuard<'_, Hooks> {
        self.hooks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
