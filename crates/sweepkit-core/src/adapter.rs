//! Resource adapter and client factory traits
//!
//! These are the seams to the outside world. The core never builds API
//! clients or request shapes itself: a [`RegionalClientFactory`] produces an
//! authenticated client for a scope, and one [`ResourceAdapter`] per resource
//! type knows how to list and delete instances with that client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Region/account boundary for one sweep invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    pub fn new(scope: impl Into<String>) -> Self {
        Self(scope.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scope {
    fn from(scope: &str) -> Self {
        Self::new(scope)
    }
}

impl From<String> for Scope {
    fn from(scope: String) -> Self {
        Self(scope)
    }
}

/// One page of a list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Identifiers of live resources on this page
    pub items: Vec<String>,

    /// Continuation marker; `None` or empty means this was the last page
    pub next_token: Option<String>,
}

impl Page {
    /// A final page.
    pub fn last(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            next_token: None,
        }
    }

    /// A page followed by another one.
    pub fn more(
        items: impl IntoIterator<Item = impl Into<String>>,
        next_token: impl Into<String>,
    ) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            next_token: Some(next_token.into()),
        }
    }

    /// Token to request next, if any.
    pub fn continuation(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Per resource type list/delete logic.
///
/// `C` is the client type handed out by the [`RegionalClientFactory`].
#[async_trait]
pub trait ResourceAdapter<C>: Send + Sync {
    /// List one page of live resources. `page_token` is `None` for the first page.
    async fn list(&self, client: &C, scope: &Scope, page_token: Option<&str>)
    -> anyhow::Result<Page>;

    /// Delete one resource.
    async fn delete(&self, client: &C, scope: &Scope, identifier: &str) -> anyhow::Result<()>;
}

/// Produces an authenticated client for a scope.
#[async_trait]
pub trait RegionalClientFactory<C>: Send + Sync {
    async fn client(&self, scope: &Scope) -> anyhow::Result<C>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_ends_pagination() {
        assert_eq!(Page::more(["a"], "t1").continuation(), Some("t1"));
        assert_eq!(Page::more(["a"], "").continuation(), None);
        assert_eq!(Page::last(["a"]).continuation(), None);
    }

    #[test]
    fn scope_display() {
        let scope = Scope::from("us-west-2");
        assert_eq!(scope.to_string(), "us-west-2");
        assert_eq!(scope.as_str(), "us-west-2");
        assert_eq!(serde_json::to_string(&scope).unwrap(), "\"us-west-2\"");
    }
}
