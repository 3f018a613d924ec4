//! Aggregated sweep outcome

use crate::error::{AggregateError, SweepError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-unit result of a deletion.
#[derive(Debug)]
pub enum SweepOutcome {
    Deleted,
    /// Skip condition (already gone, dry run); counts as success
    Skipped(String),
    Failed(SweepError),
}

/// Counters for one resource type, or for a whole report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepCounts {
    pub discovered: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SweepCounts {
    pub fn add(&mut self, other: &SweepCounts) {
        self.discovered += other.discovered;
        self.deleted += other.deleted;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    pub fn is_empty(&self) -> bool {
        *self == SweepCounts::default()
    }
}

impl std::fmt::Display for SweepCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "discovered={} deleted={} skipped={} failed={}",
            self.discovered, self.deleted, self.skipped, self.failed
        )
    }
}

/// Counters for one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeReport {
    pub resource_type: String,
    pub counts: SweepCounts,

    /// Set when discovery hit a skip condition (type unavailable in scope)
    pub discovery_skipped: Option<String>,
}

impl TypeReport {
    fn new(resource_type: &str) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            counts: SweepCounts::default(),
            discovery_skipped: None,
        }
    }
}

/// Outcome of a sweep: counts per resource type plus every unresolved failure.
#[derive(Debug)]
pub struct SweepReport {
    /// Scope the report covers, when produced by a registry run
    pub scope: Option<String>,

    /// When the sweep started
    pub started_at: DateTime<Utc>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,

    types: Vec<TypeReport>,
    failures: Vec<SweepError>,
}

impl Default for SweepReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepReport {
    pub fn new() -> Self {
        Self {
            scope: None,
            started_at: Utc::now(),
            duration_ms: 0,
            types: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn for_scope(scope: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            ..Self::new()
        }
    }

    fn type_mut(&mut self, resource_type: &str) -> &mut TypeReport {
        let index = match self
            .types
            .iter()
            .position(|t| t.resource_type == resource_type)
        {
            Some(index) => index,
            None => {
                self.types.push(TypeReport::new(resource_type));
                self.types.len() - 1
            }
        };
        &mut self.types[index]
    }

    /// Make sure a type shows up in the report even when nothing was found.
    pub fn touch(&mut self, resource_type: &str) {
        self.type_mut(resource_type);
    }

    pub fn record_discovered(&mut self, resource_type: &str, count: usize) {
        self.type_mut(resource_type).counts.discovered += count;
    }

    pub fn record_discovery_skipped(&mut self, resource_type: &str, reason: impl Into<String>) {
        self.type_mut(resource_type).discovery_skipped = Some(reason.into());
    }

    /// Record one unit's outcome.
    pub fn record(&mut self, resource_type: &str, outcome: SweepOutcome) {
        match outcome {
            SweepOutcome::Deleted => self.type_mut(resource_type).counts.deleted += 1,
            SweepOutcome::Skipped(_) => self.type_mut(resource_type).counts.skipped += 1,
            SweepOutcome::Failed(err) => {
                self.type_mut(resource_type).counts.failed += 1;
                self.failures.push(err);
            }
        }
    }

    /// Record a failure that is not tied to one unit (discovery, configuration).
    pub fn record_failure(&mut self, err: SweepError) {
        if let Some(resource_type) = err.resource_type() {
            let resource_type = resource_type.to_string();
            self.type_mut(&resource_type).counts.failed += 1;
        }
        self.failures.push(err);
    }

    /// Fold another report into this one, keeping type order and failure order.
    pub fn merge(&mut self, other: SweepReport) {
        for theirs in other.types {
            let ours = self.type_mut(&theirs.resource_type);
            ours.counts.add(&theirs.counts);
            if theirs.discovery_skipped.is_some() {
                ours.discovery_skipped = theirs.discovery_skipped;
            }
        }
        self.failures.extend(other.failures);
        self.duration_ms += other.duration_ms;
    }

    pub fn types(&self) -> &[TypeReport] {
        &self.types
    }

    pub fn type_report(&self, resource_type: &str) -> Option<&TypeReport> {
        self.types.iter().find(|t| t.resource_type == resource_type)
    }

    /// Counts for a type; zero when the type never appeared.
    pub fn counts(&self, resource_type: &str) -> SweepCounts {
        self.type_report(resource_type)
            .map(|t| t.counts)
            .unwrap_or_default()
    }

    pub fn totals(&self) -> SweepCounts {
        let mut totals = SweepCounts::default();
        for t in &self.types {
            totals.add(&t.counts);
        }
        totals
    }

    pub fn failures(&self) -> &[SweepError] {
        &self.failures
    }

    /// One line per failure, naming resource type and identifier.
    pub fn failure_lines(&self) -> Vec<String> {
        self.failures.iter().map(|e| e.to_string()).collect()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Ok` iff no non-skip failure was recorded.
    pub fn into_result(self) -> Result<SweepReport, AggregateError> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(AggregateError {
                failures: self.failures,
            })
        }
    }

    /// Serializable view for JSON output.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            scope: self.scope.clone(),
            started_at: self.started_at,
            duration_ms: self.duration_ms,
            totals: self.totals(),
            types: self.types.clone(),
            failures: self.failure_lines(),
        }
    }
}

/// Serializable snapshot of a [`SweepReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub scope: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub totals: SweepCounts,
    pub types: Vec<TypeReport>,
    pub failures: Vec<String>,
}
