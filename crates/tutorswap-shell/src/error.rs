// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error from the shell's routing and loading machinery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellError(pub String);

impl ShellError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl Display for ShellError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for ShellError {}

/// Error a page raises when it cannot take the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError(pub String);

impl PageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl Display for PageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for PageError {}
