//! Paginated discovery of live resources
//!
//! Pages are requested one at a time, following the continuation token until
//! the adapter stops returning one or the page cap is reached. Every returned
//! identifier becomes a [`SweepableUnit`]. Units from pages that were already
//! listed are kept when a later page fails. A skip on any page means the type
//! is unavailable, so [`DiscoveryDriver::discover_all`] drops them instead.

use crate::adapter::{ResourceAdapter, Scope};
use crate::classify::{Classified, ErrorClassifier};
use crate::error::{Phase, SweepError};
use crate::options::SweepOptions;
use crate::unit::SweepableUnit;
use futures_util::stream::{self, Stream, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Item produced by a discovery stream.
#[derive(Debug)]
pub enum Discovered {
    /// A live resource, ready to be deleted
    Unit(SweepableUnit),
    /// The type is unavailable in this scope; discovery stopped without error
    Skipped(String),
    /// Discovery stopped with an error
    Failed(SweepError),
}

/// Everything one discovery pass produced, materialized.
#[derive(Debug, Default)]
pub struct DiscoveryOutcome {
    pub units: Vec<SweepableUnit>,
    pub skipped: Option<String>,
    pub error: Option<SweepError>,
}

/// Lists every live resource of one type.
pub struct DiscoveryDriver<C> {
    resource_type: String,
    adapter: Arc<dyn ResourceAdapter<C>>,
    client: Arc<C>,
    classifier: Arc<dyn ErrorClassifier>,
}

impl<C> Clone for DiscoveryDriver<C> {
    fn clone(&self) -> Self {
        Self {
            resource_type: self.resource_type.clone(),
            adapter: self.adapter.clone(),
            client: self.client.clone(),
            classifier: self.classifier.clone(),
        }
    }
}

impl<C> DiscoveryDriver<C>
where
    C: Send + Sync + 'static,
{
    pub fn new(
        resource_type: impl Into<String>,
        adapter: Arc<dyn ResourceAdapter<C>>,
        client: Arc<C>,
        classifier: Arc<dyn ErrorClassifier>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            adapter,
            client,
            classifier,
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Lazily list resources. The stream is finite and not restartable;
    /// call again to re-list from the first page.
    pub fn discover(
        &self,
        scope: &Scope,
        options: &SweepOptions,
    ) -> impl Stream<Item = Discovered> + Send + 'static {
        let cursor = Cursor {
            driver: self.clone(),
            scope: scope.clone(),
            options: options.clone(),
            next: Next::First,
            pages: 0,
        };

        stream::unfold(cursor, |mut cursor| async move {
            let token = match std::mem::replace(&mut cursor.next, Next::Done) {
                Next::Done => return None,
                Next::First => None,
                Next::Token(token) => Some(token),
            };
            let batch = cursor.fetch(token).await;
            Some((batch, cursor))
        })
        .flat_map(stream::iter)
    }

    /// Run discovery to completion, dropping repeated identifiers.
    ///
    /// A skip empties the outcome: the type counts as having nothing live.
    pub async fn discover_all(&self, scope: &Scope, options: &SweepOptions) -> DiscoveryOutcome {
        let mut outcome = DiscoveryOutcome::default();
        let mut seen = HashSet::new();
        let mut items = Box::pin(self.discover(scope, options));

        while let Some(item) = items.next().await {
            match item {
                Discovered::Unit(unit) => {
                    if seen.insert(unit.identifier().to_string()) {
                        outcome.units.push(unit);
                    } else {
                        debug!(
                            resource_type = %self.resource_type,
                            identifier = %unit.identifier(),
                            "Duplicate identifier across pages"
                        );
                    }
                }
                Discovered::Skipped(reason) => {
                    if !outcome.units.is_empty() {
                        debug!(
                            resource_type = %self.resource_type,
                            dropped = outcome.units.len(),
                            "Dropping units listed before skip"
                        );
                    }
                    outcome.units.clear();
                    outcome.skipped = Some(reason);
                }
                Discovered::Failed(err) => outcome.error = Some(err),
            }
        }

        outcome
    }
}

enum Next {
    First,
    Token(String),
    Done,
}

struct Cursor<C> {
    driver: DiscoveryDriver<C>,
    scope: Scope,
    options: SweepOptions,
    next: Next,
    pages: usize,
}

impl<C> Cursor<C>
where
    C: Send + Sync + 'static,
{
    async fn fetch(&mut self, token: Option<String>) -> Vec<Discovered> {
        let resource_type = self.driver.resource_type.clone();

        if self.options.is_cancelled() {
            warn!(resource_type = %resource_type, scope = %self.scope, "Discovery cancelled");
            return vec![Discovered::Failed(SweepError::Discovery {
                resource_type: resource_type.clone(),
                scope: self.scope.to_string(),
                source: anyhow::anyhow!("sweep cancelled before page {}", self.pages + 1),
            })];
        }

        if self.pages >= self.options.max_pages {
            error!(
                resource_type = %resource_type,
                scope = %self.scope,
                max_pages = self.options.max_pages,
                "Page limit reached, adapter keeps returning a continuation token"
            );
            return vec![Discovered::Failed(SweepError::PageLimitExceeded {
                resource_type: resource_type.clone(),
                scope: self.scope.to_string(),
                max_pages: self.options.max_pages,
            })];
        }

        self.pages += 1;
        let listed = tokio::time::timeout(
            self.options.call_timeout,
            self.driver
                .adapter
                .list(&self.driver.client, &self.scope, token.as_deref()),
        )
        .await;

        let page = match listed {
            Ok(Ok(page)) => page,
            Ok(Err(err)) => {
                return match self.driver.classifier.classify(err) {
                    Classified::Skip { reason } => {
                        warn!(
                            resource_type = %resource_type,
                            scope = %self.scope,
                            reason = %reason,
                            "Skipping sweep"
                        );
                        vec![Discovered::Skipped(reason)]
                    }
                    Classified::Fatal(source) => {
                        error!(
                            resource_type = %resource_type,
                            scope = %self.scope,
                            page = self.pages,
                            error = ?source,
                            "Error reading resources"
                        );
                        vec![Discovered::Failed(SweepError::Discovery {
                            resource_type: resource_type.clone(),
                            scope: self.scope.to_string(),
                            source,
                        })]
                    }
                };
            }
            Err(_) => {
                error!(
                    resource_type = %resource_type,
                    scope = %self.scope,
                    page = self.pages,
                    "List call timed out"
                );
                return vec![Discovered::Failed(SweepError::Timeout {
                    phase: Phase::List,
                    target: format!("page {}", self.pages),
                    resource_type: resource_type.clone(),
                    after: self.options.call_timeout,
                })];
            }
        };

        if let Some(token) = page.continuation() {
            self.next = Next::Token(token.to_string());
        }

        debug!(
            resource_type = %resource_type,
            scope = %self.scope,
            page = self.pages,
            count = page.items.len(),
            more = page.continuation().is_some(),
            "Listed page"
        );

        page.items
            .into_iter()
            .map(|identifier| {
                Discovered::Unit(SweepableUnit::from_adapter(
                    resource_type.clone(),
                    identifier,
                    self.driver.adapter.clone(),
                    self.driver.client.clone(),
                ))
            })
            .collect()
    }
}
