// SPDX-License-Identifier: Apache-2.0

use crate::query::{encode_query, Query};
use crate::template::{PathTemplate, Segment};
use crate::RouteArgs;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use tutorswap_model::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PathError {
    /// No route is declared under this name.
    UnknownRoute(String),
    /// The route exists but has no path template to build from.
    NotNavigable(String),
    /// The template has a placeholder the arguments do not cover.
    MissingArg { route: String, name: String },
}

impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRoute(name) => write!(f, "route '{name}' does not exist"),
            Self::NotNavigable(name) => write!(f, "route '{name}' has no path"),
            Self::MissingArg { route, name } => {
                write!(f, "route '{route}' needs argument '{name}'")
            }
        }
    }
}

impl std::error::Error for PathError {}

/// One entry of the route table. A route without a template (the not-found
/// page) can only be loaded by name, never matched from a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub template: Option<PathTemplate>,
    /// Page module reference; also names the markup and stylesheet assets.
    pub file: String,
    pub has_markup: bool,
    pub has_style: bool,
}

impl Route {
    pub fn new(
        name: impl Into<String>,
        template: &str,
        file: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: name.into(),
            template: Some(PathTemplate::parse(template)?),
            file: file.into(),
            has_markup: true,
            has_style: true,
        })
    }

    /// A route reachable only by name, with no path of its own.
    #[must_use]
    pub fn hidden(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: None,
            file: file.into(),
            has_markup: true,
            has_style: true,
        }
    }
}

/// Declaration-ordered route set. Matching walks the table in order and the
/// first fitting template wins, so more specific templates must be declared
/// before templates that could ambiguously match the same segment count.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    by_name: BTreeMap<String, usize>,
    not_found: usize,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>, not_found: &str) -> Result<Self, ValidationError> {
        let mut by_name = BTreeMap::new();
        for (idx, route) in routes.iter().enumerate() {
            if route.name.trim().is_empty() {
                return Err(ValidationError("route name must not be empty".to_string()));
            }
            if by_name.insert(route.name.clone(), idx).is_some() {
                return Err(ValidationError(format!(
                    "duplicate route name '{}'",
                    route.name
                )));
            }
        }
        let not_found_idx = by_name.get(not_found).copied().ok_or_else(|| {
            ValidationError(format!("not-found route '{not_found}' is not in the table"))
        })?;
        Ok(Self {
            routes,
            by_name,
            not_found: not_found_idx,
        })
    }

    #[must_use]
    pub fn route(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|idx| &self.routes[*idx])
    }

    #[must_use]
    pub fn not_found_route(&self) -> &Route {
        &self.routes[self.not_found]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// First declared route whose template matches `path`. Routes without a
    /// template never match.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<(&Route, RouteArgs)> {
        self.routes.iter().find_map(|route| {
            let template = route.template.as_ref()?;
            template.match_path(path).map(|args| (route, args))
        })
    }

    /// Canonical path for `name`, with `query` appended in sorted key order.
    /// Extra arguments are ignored; a missing one is an error.
    pub fn build_path(
        &self,
        name: &str,
        args: &RouteArgs,
        query: &Query,
    ) -> Result<String, PathError> {
        let route = self
            .route(name)
            .ok_or_else(|| PathError::UnknownRoute(name.to_string()))?;
        let template = route
            .template
            .as_ref()
            .ok_or_else(|| PathError::NotNavigable(name.to_string()))?;
        let mut path = String::new();
        for (i, segment) in template.segments().iter().enumerate() {
            if i > 0 {
                path.push('/');
            }
            match segment {
                Segment::Literal(lit) => path.push_str(lit),
                Segment::Param(param) => match args.get(param) {
                    Some(value) => path.push_str(value),
                    None => {
                        return Err(PathError::MissingArg {
                            route: name.to_string(),
                            name: param.clone(),
                        })
                    }
                },
            }
        }
        if !query.is_empty() {
            path.push('?');
            path.push_str(&encode_query(query));
        }
        Ok(path)
    }
}
