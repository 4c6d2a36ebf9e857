// SPDX-License-Identifier: Apache-2.0

use crate::{
    ApiError, Connectivity, FlagStore, LocalMirror, RemoteApi, FORCE_LOGOUT_FLAG,
    LOGGED_IN_USER_MARKER,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tutorswap_model::{Credentials, RecordId, SignupForm, User};

/// What the session cache currently knows about the signed-in user.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// Nothing determined yet; the next `current` call will find out.
    Undetermined,
    Absent,
    Present(User),
}

/// Cache of the signed-in user. The slot lock is held across the whole
/// determination, so concurrent `current` callers coalesce on one remote
/// round trip instead of racing their own.
pub struct Session {
    net: Arc<Connectivity>,
    api: RemoteApi,
    mirror: LocalMirror,
    flags: FlagStore,
    slot: Mutex<SessionState>,
}

impl Session {
    #[must_use]
    pub fn new(net: Arc<Connectivity>, api: RemoteApi, mirror: LocalMirror) -> Self {
        let flags = mirror.flags();
        Self {
            net,
            api,
            mirror,
            flags,
            slot: Mutex::new(SessionState::Undetermined),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.slot.lock().await.clone()
    }

    /// The signed-in user, determining it on first use. A determination
    /// that cannot complete leaves the slot undetermined so a later call
    /// retries.
    pub async fn current(&self) -> Result<Option<User>, ApiError> {
        let mut slot = self.slot.lock().await;
        match &*slot {
            SessionState::Present(user) => return Ok(Some(user.clone())),
            SessionState::Absent => return Ok(None),
            SessionState::Undetermined => {}
        }
        let determined = self
            .net
            .with_fallback(self.live_lookup(), self.cached_lookup())
            .await?;
        *slot = match &determined {
            Some(user) => SessionState::Present(user.clone()),
            None => SessionState::Absent,
        };
        Ok(determined)
    }

    /// Live determination. A 401/403 is a definitive "nobody is signed in",
    /// not an error; it also clears the stale marker.
    async fn live_lookup(&self) -> Result<Option<User>, ApiError> {
        match self.api.fetch_me().await {
            Ok(user) => {
                self.mirror.put(&user).await?;
                self.mirror
                    .set_marker(LOGGED_IN_USER_MARKER, user.id.as_str())
                    .await?;
                Ok(Some(user))
            }
            Err(err) if err.is_unauthorized() => {
                self.mirror.remove_marker(LOGGED_IN_USER_MARKER).await?;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn cached_lookup(&self) -> Result<Option<User>, ApiError> {
        let Some(raw) = self.mirror.marker(LOGGED_IN_USER_MARKER).await? else {
            return Ok(None);
        };
        let Ok(id) = RecordId::parse(&raw) else {
            return Ok(None);
        };
        self.mirror.get::<User>(&id).await
    }

    /// Direct slot write, for callers that already know the answer.
    pub async fn set_current(&self, user: Option<User>) {
        let mut slot = self.slot.lock().await;
        *slot = match user {
            Some(user) => SessionState::Present(user),
            None => SessionState::Absent,
        };
    }

    /// Forgets the determination so the next `current` call asks again.
    pub async fn reset(&self) {
        let mut slot = self.slot.lock().await;
        *slot = SessionState::Undetermined;
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let user = self
            .net
            .without_fallback(self.api.login(credentials))
            .await?;
        self.seed(&user).await?;
        Ok(user)
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<User, ApiError> {
        let user = self.net.without_fallback(self.api.signup(form)).await?;
        self.seed(&user).await?;
        Ok(user)
    }

    async fn seed(&self, user: &User) -> Result<(), ApiError> {
        self.mirror.put(user).await?;
        self.mirror
            .set_marker(LOGGED_IN_USER_MARKER, user.id.as_str())
            .await?;
        self.set_current(Some(user.clone())).await;
        Ok(())
    }

    /// Signs out. When the server is unreachable the sign-out still
    /// succeeds locally: state is wiped now and a durable flag defers the
    /// server side to the next startup.
    pub async fn logout(&self) -> Result<(), ApiError> {
        match self.net.without_fallback(self.api.logout()).await {
            Ok(()) => self.clear_local().await,
            Err(err) if err.is_offline() => {
                self.flags.set_true(FORCE_LOGOUT_FLAG).await?;
                self.clear_local().await?;
                tracing::info!("sign-out deferred until the server is reachable");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn clear_local(&self) -> Result<(), ApiError> {
        self.mirror.remove_marker(LOGGED_IN_USER_MARKER).await?;
        self.mirror.clear_records().await?;
        self.set_current(None).await;
        Ok(())
    }

    /// Completes a sign-out recorded while offline. Local state is wiped
    /// again regardless; the server call is only attempted when the host
    /// reports connectivity, and the flag stays put until the server has
    /// seen the sign-out or rejected it outright. Returns whether a
    /// deferred sign-out was pending.
    pub async fn finish_deferred_logout(&self) -> Result<bool, ApiError> {
        if !self.flags.is_set(FORCE_LOGOUT_FLAG).await? {
            return Ok(false);
        }
        self.clear_local().await?;
        if !self.net.is_online() {
            tracing::info!("deferred sign-out still pending, host offline");
            return Ok(true);
        }
        match self.net.without_fallback(self.api.logout()).await {
            Ok(()) => self.flags.remove(FORCE_LOGOUT_FLAG).await?,
            Err(err) if err.is_offline() => {
                tracing::warn!(error = %err, "deferred sign-out still unreachable, keeping flag");
            }
            Err(err) => {
                tracing::warn!(error = %err, "deferred sign-out rejected, dropping flag");
                self.flags.remove(FORCE_LOGOUT_FLAG).await?;
            }
        }
        Ok(true)
    }
}
