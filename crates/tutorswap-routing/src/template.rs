// SPDX-License-Identifier: Apache-2.0

use crate::RouteArgs;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use tutorswap_model::ValidationError;

/// Prefix marking a template segment as a placeholder.
pub const PLACEHOLDER_MARKER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed path pattern such as `/profile/:id`. Placeholder names are
/// non-empty and unique within one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if !input.starts_with('/') {
            return Err(ValidationError(format!(
                "path template '{input}' must start with '/'"
            )));
        }
        let mut segments = Vec::new();
        let mut seen = BTreeSet::new();
        for part in input.split('/') {
            if let Some(name) = part.strip_prefix(PLACEHOLDER_MARKER) {
                if name.is_empty() {
                    return Err(ValidationError(format!(
                        "placeholder in '{input}' must have a name"
                    )));
                }
                if !seen.insert(name.to_string()) {
                    return Err(ValidationError(format!(
                        "duplicate placeholder ':{name}' in '{input}'"
                    )));
                }
                segments.push(Segment::Param(name.to_string()));
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }
        Ok(Self {
            raw: input.to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Captures placeholder values if `path` fits this template. An empty
    /// path counts as the root path; segment counts must agree exactly.
    /// Never fails on foreign input, it just does not match.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<RouteArgs> {
        let path = if path.is_empty() { "/" } else { path };
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut args = RouteArgs::new();
        for (segment, part) in self.segments.iter().zip(parts.iter()) {
            match segment {
                Segment::Literal(lit) if lit.as_str() == *part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => args.set(name.clone(), (*part).to_string()),
            }
        }
        Some(args)
    }
}

impl Display for PathTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literals_and_placeholders() {
        let t = PathTemplate::parse("/profile/:id").expect("template");
        assert_eq!(
            t.segments(),
            &[
                Segment::Literal(String::new()),
                Segment::Literal("profile".to_string()),
                Segment::Param("id".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_missing_leading_slash() {
        assert!(PathTemplate::parse("profile/:id").is_err());
    }

    #[test]
    fn rejects_unnamed_placeholder() {
        assert!(PathTemplate::parse("/profile/:").is_err());
    }

    #[test]
    fn rejects_duplicate_placeholder_names() {
        assert!(PathTemplate::parse("/swap/:id/with/:id").is_err());
    }

    #[test]
    fn matches_and_captures() {
        let t = PathTemplate::parse("/messages/:id").expect("template");
        let args = t.match_path("/messages/u42").expect("match");
        assert_eq!(args.get("id"), Some("u42"));
    }

    #[test]
    fn empty_path_is_the_root_path() {
        let root = PathTemplate::parse("/").expect("template");
        assert!(root.match_path("").is_some());
        assert!(root.match_path("/").is_some());
    }

    #[test]
    fn differing_segment_count_never_matches() {
        let t = PathTemplate::parse("/messages/:id").expect("template");
        assert!(t.match_path("/messages").is_none());
        assert!(t.match_path("/messages/a/b").is_none());
        assert!(t.match_path("").is_none());
    }

    #[test]
    fn literal_mismatch_does_not_match() {
        let t = PathTemplate::parse("/profile/:id").expect("template");
        assert!(t.match_path("/messages/u42").is_none());
    }
}
