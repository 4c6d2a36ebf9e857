// SPDX-License-Identifier: Apache-2.0

use std::fmt::{Display, Formatter};

/// The fixed message shown when an action has no offline fallback.
pub const OFFLINE_MESSAGE: &str = "You cannot perform this action while offline.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApiErrorKind {
    /// The action is unavailable while offline.
    Offline,
    /// The request never reached the server.
    Transport,
    /// The server answered with a non-2xx status.
    Status(u16),
    /// The server answered but the payload did not decode.
    Decode,
    /// The local mirror failed.
    Mirror,
}

impl ApiErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Transport => "transport",
            Self::Status(_) => "status",
            Self::Decode => "decode",
            Self::Mirror => "mirror",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn offline() -> Self {
        Self {
            kind: ApiErrorKind::Offline,
            message: OFFLINE_MESSAGE.to_string(),
        }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Status(status),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn mirror(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Mirror,
            message: message.into(),
        }
    }

    /// A fallback read that found nothing mirrored.
    #[must_use]
    pub fn not_cached() -> Self {
        Self::status(404, "Not found in the offline cache")
    }

    /// Classifies a live-call failure. An error carrying no HTTP status and
    /// not stemming from body decoding never reached the server; everything
    /// else happened after a response arrived.
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::status(status.as_u16(), err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }

    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Transport)
    }

    #[must_use]
    pub fn is_offline(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Offline)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Status(401 | 403))
    }

    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self.kind {
            ApiErrorKind::Status(status) => Some(status),
            _ => None,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
