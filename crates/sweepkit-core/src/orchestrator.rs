//! Bulk teardown with isolated per-unit failure handling
//!
//! Every unit is deleted independently. A failing, hanging or panicking
//! deletion is recorded against its own unit and never prevents another unit
//! from being attempted.

use crate::adapter::Scope;
use crate::classify::{Classified, ErrorClassifier};
use crate::error::{Phase, SweepError};
use crate::options::SweepOptions;
use crate::report::{SweepOutcome, SweepReport};
use crate::unit::SweepableUnit;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Executes deletions for a batch of units.
pub struct SweepOrchestrator {
    classifier: Arc<dyn ErrorClassifier>,
    options: SweepOptions,
}

impl SweepOrchestrator {
    pub fn new(classifier: Arc<dyn ErrorClassifier>, options: SweepOptions) -> Self {
        Self {
            classifier,
            options,
        }
    }

    pub fn options(&self) -> &SweepOptions {
        &self.options
    }

    /// Delete every unit, at most `concurrency` at a time, in no particular order.
    pub async fn sweep<I>(&self, scope: &Scope, units: I) -> SweepReport
    where
        I: IntoIterator<Item = SweepableUnit>,
    {
        let units: Vec<SweepableUnit> = units.into_iter().collect();
        let start = Instant::now();
        let mut report = SweepReport::new();

        if units.is_empty() {
            debug!(scope = %scope, "Nothing to sweep");
            return report;
        }

        info!(
            scope = %scope,
            count = units.len(),
            concurrency = self.options.concurrency,
            dry_run = self.options.dry_run,
            "Sweeping resources"
        );

        let mut outcomes = stream::iter(units)
            .map(|unit| self.sweep_unit(scope.clone(), unit))
            .buffer_unordered(self.options.concurrency);

        while let Some((resource_type, outcome)) = outcomes.next().await {
            report.record(&resource_type, outcome);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }

    async fn sweep_unit(&self, scope: Scope, unit: SweepableUnit) -> (String, SweepOutcome) {
        let (resource_type, identifier, delete) = unit.into_parts();

        if self.options.is_cancelled() {
            warn!(
                resource_type = %resource_type,
                identifier = %identifier,
                "Sweep cancelled, not deleting"
            );
            let err = SweepError::Cancelled {
                resource_type: resource_type.clone(),
                identifier,
            };
            return (resource_type, SweepOutcome::Failed(err));
        }

        if self.options.dry_run {
            info!(
                resource_type = %resource_type,
                identifier = %identifier,
                "[DRY RUN] Would delete"
            );
            return (resource_type, SweepOutcome::Skipped("dry run".to_string()));
        }

        let call_timeout = self.options.call_timeout;
        let task = tokio::spawn(async move { tokio::time::timeout(call_timeout, delete(scope)).await });

        let outcome = match task.await {
            Ok(Ok(Ok(()))) => {
                info!(resource_type = %resource_type, identifier = %identifier, "Deleted");
                SweepOutcome::Deleted
            }
            Ok(Ok(Err(err))) => match self.classifier.classify(err) {
                Classified::Skip { reason } => {
                    debug!(
                        resource_type = %resource_type,
                        identifier = %identifier,
                        reason = %reason,
                        "Already deleted or unavailable"
                    );
                    SweepOutcome::Skipped(reason)
                }
                Classified::Fatal(source) => {
                    warn!(
                        resource_type = %resource_type,
                        identifier = %identifier,
                        error = ?source,
                        "Failed to delete"
                    );
                    SweepOutcome::Failed(SweepError::Delete {
                        resource_type: resource_type.clone(),
                        identifier,
                        source,
                    })
                }
            },
            Ok(Err(_)) => {
                warn!(
                    resource_type = %resource_type,
                    identifier = %identifier,
                    timeout = ?call_timeout,
                    "Delete timed out"
                );
                SweepOutcome::Failed(SweepError::Timeout {
                    phase: Phase::Delete,
                    target: identifier,
                    resource_type: resource_type.clone(),
                    after: call_timeout,
                })
            }
            Err(join_err) => {
                warn!(
                    resource_type = %resource_type,
                    identifier = %identifier,
                    error = %join_err,
                    "Delete task aborted"
                );
                SweepOutcome::Failed(SweepError::Delete {
                    resource_type: resource_type.clone(),
                    identifier,
                    source: anyhow::anyhow!("delete task aborted: {join_err}"),
                })
            }
        };

        (resource_type, outcome)
    }
}
