// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

pub const RECORD_ID_MAX_LEN: usize = 128;

/// Identifier of a remote record (`_id` on the wire).
///
/// `parse` is the checked constructor. Deserialization is transparent and
/// deliberately unchecked: payloads mirrored from the remote store may carry
/// an empty id, and the mirror decides what to do with those.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct RecordId(String);

impl RecordId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.trim().is_empty() {
            return Err(ValidationError("record id must not be empty".to_string()));
        }
        if input.len() > RECORD_ID_MAX_LEN {
            return Err(ValidationError(format!(
                "record id exceeds max length {RECORD_ID_MAX_LEN}"
            )));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote revision token (`_rev` on the wire). Only ever produced by the
/// remote store; nothing on the client side fabricates one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct Revision(String);

impl Revision {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("revision must not be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Revision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_rejects_empty_and_whitespace() {
        assert!(RecordId::parse("").is_err());
        assert!(RecordId::parse("   ").is_err());
        assert!(RecordId::parse("\t\n").is_err());
    }

    #[test]
    fn record_id_accepts_opaque_values() {
        let id = RecordId::parse("8f2b9c-0001").expect("id");
        assert_eq!(id.as_str(), "8f2b9c-0001");
        assert!(!id.is_empty());
    }

    #[test]
    fn record_id_rejects_oversized_values() {
        let long = "a".repeat(RECORD_ID_MAX_LEN + 1);
        assert!(RecordId::parse(&long).is_err());
    }

    #[test]
    fn deserialized_record_id_may_be_empty() {
        let id: RecordId = serde_json::from_str("\"\"").expect("deserialize");
        assert!(id.is_empty());
    }

    #[test]
    fn revision_trims_and_rejects_empty() {
        assert!(Revision::parse("  ").is_err());
        let rev = Revision::parse(" 3-abc ").expect("rev");
        assert_eq!(rev.as_str(), "3-abc");
    }
}
