// SPDX-License-Identifier: Apache-2.0

use crate::{HandleId, NavOutcome, RoutePage, Router, ShellError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tutorswap_routing::{encode_query, Query, RouteArgs};

/// How a pointer event reached the link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
    /// The host element targets a new tab or window.
    pub opens_new_context: bool,
}

impl ClickModifiers {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    fn bypasses_router(&self) -> bool {
        self.ctrl || self.meta || self.shift || self.alt || self.opens_new_context
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The link consumed the click and routed client side.
    Routed(NavOutcome),
    /// The click keeps its default browser behavior.
    DefaultBrowser,
}

/// Snapshot handed to the change listener whenever the link recomputes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkView {
    /// Prefixed location, absent when the target does not route.
    pub href: Option<String>,
    pub active: bool,
}

/// Anything that presents itself as a navigation affordance.
pub trait Navigable {
    fn resolved_path(&self) -> Option<String>;

    /// Whether the affordance points at what is currently showing.
    fn is_active(&self, current: Option<&RoutePage>) -> bool;
}

struct LinkTarget {
    route: String,
    args: RouteArgs,
    query: Option<Query>,
}

/// A routed link. Recomputes its href and active flag when its target or
/// the current page changes, and turns plain clicks into navigations; any
/// UI toolkit renders a view over it.
pub struct RouteLink {
    router: Arc<Router>,
    target: Mutex<LinkTarget>,
    listener: Mutex<Option<Arc<dyn Fn(LinkView) + Send + Sync>>>,
    subscription: Mutex<Option<HandleId>>,
}

impl RouteLink {
    #[must_use]
    pub fn new(router: Arc<Router>, route: impl Into<String>) -> Self {
        Self {
            router,
            target: Mutex::new(LinkTarget {
                route: route.into(),
                args: RouteArgs::new(),
                query: None,
            }),
            listener: Mutex::new(None),
            subscription: Mutex::new(None),
        }
    }

    pub fn set_route(&self, route: impl Into<String>) {
        self.lock_target().route = route.into();
        self.refresh();
    }

    pub fn set_arg(&self, name: impl Into<String>, value: impl Into<String>) {
        self.lock_target().args.set(name, value);
        self.refresh();
    }

    /// A link that sets a query is only active when the current query
    /// matches it; a link without one ignores the current query entirely.
    pub fn set_query(&self, query: Option<Query>) {
        self.lock_target().query = query;
        self.refresh();
    }

    /// Registers the change listener and emits the current view to it.
    pub fn on_change(&self, listener: impl Fn(LinkView) + Send + Sync + 'static) {
        *self.lock_listener() = Some(Arc::new(listener));
        self.refresh();
    }

    #[must_use]
    pub fn view(&self) -> LinkView {
        self.compute_view(self.router.current().as_ref())
    }

    /// Follows every navigation so the active flag tracks the current
    /// page. Re-attaching replaces the previous subscription.
    pub fn attach(self: &Arc<Self>) {
        let weak: Weak<RouteLink> = Arc::downgrade(self);
        let handle = self.router.on_navigated(move |page| {
            if let Some(link) = weak.upgrade() {
                let view = link.compute_view(Some(page));
                link.emit(view);
            }
        });
        let replaced = self.lock_subscription().replace(handle);
        if let Some(old) = replaced {
            self.router.off_navigated(old);
        }
    }

    pub fn detach(&self) {
        if let Some(handle) = self.lock_subscription().take() {
            self.router.off_navigated(handle);
        }
    }

    /// Routes a plain click; clicks carrying a modifier or aimed at a new
    /// browsing context keep their default behavior.
    pub async fn click(&self, modifiers: &ClickModifiers) -> Result<ClickOutcome, ShellError> {
        if modifiers.bypasses_router() {
            return Ok(ClickOutcome::DefaultBrowser);
        }
        let (route, args, query) = {
            let target = self.lock_target();
            (
                target.route.clone(),
                target.args.clone(),
                target.query.clone().unwrap_or_default(),
            )
        };
        let outcome = self.router.navigate(&route, args, query).await?;
        Ok(ClickOutcome::Routed(outcome))
    }

    fn compute_view(&self, current: Option<&RoutePage>) -> LinkView {
        let target = self.lock_target();
        let query = target.query.clone().unwrap_or_default();
        let href = self
            .router
            .table()
            .build_path(&target.route, &target.args, &query)
            .ok()
            .map(|path| format!("{}{}", self.router.path_prefix(), path));
        let active = current.is_some_and(|page| {
            page.route_name() == target.route
                && *page.args() == target.args
                && target
                    .query
                    .as_ref()
                    .map_or(true, |q| encode_query(q) == encode_query(page.query()))
        });
        LinkView { href, active }
    }

    fn refresh(&self) {
        let current = self.router.current();
        let view = self.compute_view(current.as_ref());
        self.emit(view);
    }

    fn emit(&self, view: LinkView) {
        let listener = self.lock_listener().clone();
        if let Some(listener) = listener {
            listener(view);
        }
    }

    fn lock_target(&self) -> MutexGuard<'_, LinkTarget> {
        self.target.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listener(&self) -> MutexGuard<'_, Option<Arc<dyn Fn(LinkView) + Send + Sync>>> {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscription(&self) -> MutexGuard<'_, Option<HandleId>> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigable for RouteLink {
    fn resolved_path(&self) -> Option<String> {
        self.compute_view(None).href
    }

    fn is_active(&self, current: Option<&RoutePage>) -> bool {
        self.compute_view(current).active
    }
}

impl Drop for RouteLink {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_modifier_bypasses_the_router() {
        assert!(!ClickModifiers::none().bypasses_router());
        let cases = [
            ClickModifiers {
                ctrl: true,
                ..ClickModifiers::none()
            },
            ClickModifiers {
                meta: true,
                ..ClickModifiers::none()
            },
            ClickModifiers {
                shift: true,
                ..ClickModifiers::none()
            },
            ClickModifiers {
                alt: true,
                ..ClickModifiers::none()
            },
            ClickModifiers {
                opens_new_context: true,
                ..ClickModifiers::none()
            },
        ];
        for case in cases {
            assert!(case.bypasses_router());
        }
    }
}
