// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Offline-first data access for the TutorSwap client.
//!
//! The crate layers three pieces: a [`RemoteApi`] wrapper over the HTTP
//! API, a [`LocalMirror`] of previously seen records in an embedded
//! database, and a [`Connectivity`] dispatcher deciding per call whether
//! the live API is consulted at all. [`Resources`] composes the three into
//! read-through accessors that fall back to the mirror, and [`Session`]
//! caches the signed-in user, including a durable flag that finishes an
//! offline sign-out on the next startup.

mod connectivity;
mod error;
mod flags;
mod mirror;
mod remote;
mod resources;
mod session;

pub use connectivity::{AlwaysOnline, Connectivity, OnlineSignal, ToggleSignal};
pub use error::{ApiError, ApiErrorKind, OFFLINE_MESSAGE};
pub use flags::{FlagStore, FORCE_LOGOUT_FLAG};
pub use mirror::{Bucket, LocalMirror, MirrorConfig, MirrorRecord, LOGGED_IN_USER_MARKER};
pub use remote::{RemoteApi, RemoteApiConfig};
pub use resources::Resources;
pub use session::{Session, SessionState};

pub const CRATE_NAME: &str = "tutorswap-client";
