// SPDX-License-Identifier: Apache-2.0

use crate::ApiError;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Host assessment of whether the network is reachable at all. Browser
/// shells feed `navigator.onLine` style events into an implementation;
/// tests flip it directly.
pub trait OnlineSignal: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Signal for contexts without a host hook.
#[derive(Debug, Default)]
pub struct AlwaysOnline;

impl OnlineSignal for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Settable signal, for hosts that push reachability changes and for tests.
#[derive(Debug)]
pub struct ToggleSignal(AtomicBool);

impl ToggleSignal {
    #[must_use]
    pub fn new(online: bool) -> Self {
        Self(AtomicBool::new(online))
    }

    pub fn set_online(&self, online: bool) {
        self.0.store(online, Ordering::Relaxed);
    }
}

impl OnlineSignal for ToggleSignal {
    fn is_online(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Connectivity policy: decides per call whether the live operation runs at
/// all, and remembers whether the last live attempt died in transit.
///
/// The pre-dispatch check consults the host signal alone; the failed-call
/// flag only feeds the offline assessment surfaced to the UI and is cleared
/// by the next live call that completes.
pub struct Connectivity {
    signal: Arc<dyn OnlineSignal>,
    last_call_failed: AtomicBool,
}

impl Connectivity {
    #[must_use]
    pub fn new(signal: Arc<dyn OnlineSignal>) -> Self {
        Self {
            signal,
            last_call_failed: AtomicBool::new(false),
        }
    }

    /// Whether a live call would be attempted right now.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.signal.is_online()
    }

    /// Whether the UI should present the session as offline.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        !self.is_online() || self.last_call_failed.load(Ordering::Relaxed)
    }

    fn record_success(&self) {
        self.last_call_failed.store(false, Ordering::Relaxed);
    }

    fn record_transport_failure(&self) {
        self.last_call_failed.store(true, Ordering::Relaxed);
    }

    /// Runs `live` unless the signal is down, in which case `fallback` runs
    /// without `live` ever being polled. A transport failure from `live`
    /// flips the failed-call flag and falls back; any other error propagates
    /// unchanged.
    pub async fn with_fallback<T, L, F>(&self, live: L, fallback: F) -> Result<T, ApiError>
    where
        L: Future<Output = Result<T, ApiError>>,
        F: Future<Output = Result<T, ApiError>>,
    {
        if !self.is_online() {
            return fallback.await;
        }
        match live.await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(err) if err.is_transport() => {
                tracing::warn!(error = %err, "live call died in transit, using mirror");
                self.record_transport_failure();
                fallback.await
            }
            Err(err) => Err(err),
        }
    }

    /// Runs `live` unless the signal is down; offline (or a transport
    /// failure) yields the fixed offline error without any fallback.
    pub async fn without_fallback<T, L>(&self, live: L) -> Result<T, ApiError>
    where
        L: Future<Output = Result<T, ApiError>>,
    {
        if !self.is_online() {
            return Err(ApiError::offline());
        }
        match live.await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(err) if err.is_transport() => {
                self.record_transport_failure();
                Err(ApiError::offline())
            }
            Err(err) => Err(err),
        }
    }
}
