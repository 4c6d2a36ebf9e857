// SPDX-License-Identifier: Apache-2.0

use crate::hosts::{AssetFetcher, HistorySink, PageLoader, Surface};
use crate::router::{NavOutcome, Router, RouterConfig, DEFAULT_PATH_PREFIX};
use crate::ShellError;
use std::path::PathBuf;
use std::sync::Arc;
use tutorswap_client::{
    Connectivity, LocalMirror, MirrorConfig, OnlineSignal, RemoteApi, RemoteApiConfig, Resources,
    Session,
};
use tutorswap_routing::{Route, RouteTable, ValidationError};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Origin of the API server.
    pub api_base: String,
    /// Mirror database location; `None` keeps it in memory.
    pub mirror_path: Option<PathBuf>,
    /// Address-bar prefix client routes mount under.
    pub path_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: RemoteApiConfig::default().base_url,
            mirror_path: None,
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
        }
    }
}

/// Host implementations the shell is bootstrapped over.
pub struct AppHosts {
    pub history: Arc<dyn HistorySink>,
    pub assets: Arc<dyn AssetFetcher>,
    pub surface: Arc<dyn Surface>,
    pub pages: Arc<dyn PageLoader>,
    pub online: Arc<dyn OnlineSignal>,
}

/// The wired application: data layer plus router, ready to start.
pub struct AppContext {
    pub net: Arc<Connectivity>,
    pub mirror: LocalMirror,
    pub resources: Resources,
    pub session: Arc<Session>,
    pub router: Arc<Router>,
}

impl AppContext {
    /// Wires the data layer and the router over the given hosts. A
    /// sign-out an earlier session recorded while offline is completed
    /// here, before anything loads.
    pub async fn bootstrap(config: AppConfig, hosts: AppHosts) -> Result<Self, ShellError> {
        let mirror = LocalMirror::open(&MirrorConfig {
            path: config.mirror_path.clone(),
        })
        .await
        .map_err(|err| ShellError::new(format!("mirror unavailable: {err}")))?;
        let net = Arc::new(Connectivity::new(hosts.online));
        let api = RemoteApi::new(&RemoteApiConfig {
            base_url: config.api_base.clone(),
        })
        .map_err(|err| ShellError::new(format!("api client unavailable: {err}")))?;
        let resources = Resources::new(Arc::clone(&net), api.clone(), mirror.clone());
        let session = Arc::new(Session::new(Arc::clone(&net), api, mirror.clone()));

        let table = app_route_table()
            .map_err(|err| ShellError::new(format!("route table invalid: {err}")))?;
        let router = Arc::new(Router::new(RouterConfig {
            table: Arc::new(table),
            pages: hosts.pages,
            assets: hosts.assets,
            history: hosts.history,
            surface: Arc::clone(&hosts.surface),
            path_prefix: config.path_prefix,
        }));

        // The offline indicator follows the connectivity assessment as
        // pages come and go.
        {
            let net = Arc::clone(&net);
            let surface = Arc::clone(&hosts.surface);
            router.on_navigated(move |_| surface.set_offline(net.is_offline()));
        }
        hosts.surface.set_offline(net.is_offline());

        if session.finish_deferred_logout().await.map_err(|err| {
            ShellError::new(format!("deferred sign-out bookkeeping failed: {err}"))
        })? {
            tracing::info!("completed a sign-out recorded by an earlier session");
        }

        Ok(Self {
            net,
            mirror,
            resources,
            session,
            router,
        })
    }

    /// Loads the initial location without touching history.
    pub async fn start(&self, initial_path: &str) -> Result<NavOutcome, ShellError> {
        self.router.start(initial_path).await
    }
}

/// TutorSwap's route set. Declaration order matters: fixed segments come
/// before placeholder routes that would otherwise match the same segment
/// count. `conversation` and `user` reuse the `messages` and `profile`
/// page modules; the id argument decides which view those pages render.
pub fn app_route_table() -> Result<RouteTable, ValidationError> {
    RouteTable::new(
        vec![
            Route::new("home", "/", "home")?,
            Route::new("dashboard", "/dashboard", "dashboard")?,
            Route::new("browse", "/browse", "browse")?,
            Route::new("messages", "/messages", "messages")?,
            Route::new("conversation", "/messages/:id", "messages")?,
            Route::new("profile", "/profile", "profile")?,
            Route::new("user", "/profile/:id", "profile")?,
            Route::new("login", "/login", "login")?,
            Route::new("signup", "/signup", "signup")?,
            Route::new("logout", "/logout", "logout")?,
            Route::hidden("not_found", "not-found"),
        ],
        "not_found",
    )
}
