//! Sweepkit core
//!
//! Bulk teardown of leftover cloud resources, one region or account at a
//! time. Resource types register an adapter that can list and delete their
//! instances; the core pages through every list call, turns each identifier
//! into a deferred deletion and runs those deletions concurrently with
//! per-unit failure isolation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    sweep CLI                    │
//! │                (sweep run / list)               │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                  sweepkit-core                  │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Registry (dependency order, selectors)  │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐             │
//! │  │  Discovery   │  │ Orchestrator │             │
//! │  └──────────────┘  └──────────────┘             │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │ trait ResourceAdapter / ErrorClassifier  │   │
//! │  └──────────────────────────────────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │    appsync    │
//!           │    adapters   │
//!           └───────────────┘
//! ```
//!
//! Only a failing client factory or a broken registry aborts a scope. Every
//! other failure is collected in the [`SweepReport`], which can be turned into
//! a single [`AggregateError`] with [`SweepReport::into_result`].

pub mod adapter;
pub mod classify;
pub mod discovery;
pub mod error;
pub mod options;
pub mod orchestrator;
pub mod registry;
pub mod report;
pub mod unit;

// Re-exports
pub use adapter::{Page, RegionalClientFactory, ResourceAdapter, Scope};
pub use classify::{Classified, ErrorClassifier, FnClassifier, NeverSkip, SkipRule, SkipRules};
pub use discovery::{Discovered, DiscoveryDriver, DiscoveryOutcome};
pub use error::{AggregateError, ApiError, ConfigurationError, Phase, Result, SweepError};
pub use options::{DEFAULT_CALL_TIMEOUT, DEFAULT_CONCURRENCY, DEFAULT_MAX_PAGES, SweepOptions};
pub use orchestrator::SweepOrchestrator;
pub use registry::{Registry, Selector, SweeperEntry};
pub use report::{ReportSummary, SweepCounts, SweepOutcome, SweepReport, TypeReport};
pub use unit::SweepableUnit;
