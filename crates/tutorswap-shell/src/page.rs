// SPDX-License-Identifier: Apache-2.0

use crate::PageError;
use async_trait::async_trait;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tutorswap_routing::{Query, RouteArgs};

/// Named navigation destination, as a page would express a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavTarget {
    pub route: String,
    pub args: RouteArgs,
    pub query: Query,
}

impl NavTarget {
    #[must_use]
    pub fn to(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            args: RouteArgs::new(),
            query: Query::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.set(name, value);
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

/// What the router does after a page has entered. Pages express redirects
/// as data instead of calling back into the router, which keeps navigation
/// single-file under the router's lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFlow {
    Stay,
    Redirect(NavTarget),
}

/// One resolved occupant of the surface: the route it came from, the
/// arguments and query it was reached with, and the module that renders it.
#[derive(Clone)]
pub struct RoutePage {
    route_name: String,
    file: String,
    args: RouteArgs,
    path: String,
    query: Query,
    raw_location: String,
    page: Arc<dyn Page>,
    generation: u64,
}

impl RoutePage {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        route_name: String,
        file: String,
        args: RouteArgs,
        path: String,
        query: Query,
        raw_location: String,
        page: Arc<dyn Page>,
        generation: u64,
    ) -> Self {
        Self {
            route_name,
            file,
            args,
            path,
            query,
            raw_location,
            page,
            generation,
        }
    }

    #[must_use]
    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[must_use]
    pub fn args(&self) -> &RouteArgs {
        &self.args
    }

    /// Canonical path without the host prefix or query.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Location exactly as it was requested, host prefix included.
    #[must_use]
    pub fn raw_location(&self) -> &str {
        &self.raw_location
    }

    #[must_use]
    pub(crate) fn page(&self) -> &Arc<dyn Page> {
        &self.page
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Debug for RoutePage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutePage")
            .field("route_name", &self.route_name)
            .field("file", &self.file)
            .field("args", &self.args)
            .field("path", &self.path)
            .field("raw_location", &self.raw_location)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// A page module. `enter` runs once the page is already published as
/// current, so it may consult the router's accessors; `leave` runs on the
/// outgoing page before anything of its successor, and `after_enter` runs
/// last, after the navigation callbacks.
#[async_trait]
pub trait Page: Send + Sync {
    async fn enter(&self, page: &RoutePage, markup: Option<&str>) -> Result<PageFlow, PageError>;

    async fn leave(&self, _prev: &RoutePage, _next: &RoutePage) {}

    async fn after_enter(&self, _route: &str, _args: &RouteArgs) {}
}
