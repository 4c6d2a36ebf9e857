use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder values captured from (or substituted into) a path. Values
/// stay exactly as extracted; nothing coerces them to numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteArgs(BTreeMap<String, String>);

impl RouteArgs {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for RouteArgs {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_insertion_order() {
        let a = RouteArgs::new().with("id", "42").with("tab", "about");
        let b = RouteArgs::new().with("tab", "about").with("id", "42");
        assert_eq!(a, b);
    }

    #[test]
    fn set_replaces_existing_values() {
        let mut args = RouteArgs::new().with("id", "1");
        args.set("id", "2");
        assert_eq!(args.get("id"), Some("2"));
        assert_eq!(args.len(), 1);
    }
}
