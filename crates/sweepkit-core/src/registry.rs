//! Sweeper registry and dependency ordering
//!
//! A registry is built once at startup and can then sweep any number of
//! scopes. Each entry names a resource type, the adapter that lists and
//! deletes it, and the types that must be swept before it.

use crate::adapter::{RegionalClientFactory, ResourceAdapter, Scope};
use crate::classify::{ErrorClassifier, SkipRules};
use crate::discovery::DiscoveryDriver;
use crate::error::{ConfigurationError, SweepError};
use crate::options::SweepOptions;
use crate::orchestrator::SweepOrchestrator;
use crate::report::SweepReport;
use futures_util::future::join_all;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Registration for one resource type.
pub struct SweeperEntry<C> {
    name: String,
    adapter: Arc<dyn ResourceAdapter<C>>,
    dependencies: Vec<String>,
}

impl<C> SweeperEntry<C> {
    pub fn new(name: impl Into<String>, adapter: impl ResourceAdapter<C> + 'static) -> Self {
        Self::from_shared(name, Arc::new(adapter))
    }

    pub fn from_shared(name: impl Into<String>, adapter: Arc<dyn ResourceAdapter<C>>) -> Self {
        Self {
            name: name.into(),
            adapter,
            dependencies: Vec::new(),
        }
    }

    /// Types that must be fully swept before this one starts.
    pub fn depends_on(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for name in names {
            let name = name.into();
            if !self.dependencies.contains(&name) {
                self.dependencies.push(name);
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

impl<C> std::fmt::Debug for SweeperEntry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweeperEntry")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Which sweepers a run covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector {
    #[default]
    All,
    /// The named sweepers plus everything they depend on
    Only(Vec<String>),
}

impl Selector {
    pub fn only(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Selector::Only(names.into_iter().map(Into::into).collect())
    }

    /// `All` when the list is empty.
    pub fn from_names(names: Vec<String>) -> Self {
        if names.is_empty() {
            Selector::All
        } else {
            Selector::Only(names)
        }
    }
}

/// Registration table mapping resource types to their sweepers.
pub struct Registry<C> {
    entries: Vec<SweeperEntry<C>>,
    index: HashMap<String, usize>,
    classifier: Arc<dyn ErrorClassifier>,
}

impl<C> Default for Registry<C>
where
    C: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Registry<C>
where
    C: Send + Sync + 'static,
{
    /// An empty registry using the default skip rules.
    pub fn new() -> Self {
        Self::with_classifier(SkipRules::default())
    }

    pub fn with_classifier(classifier: impl ErrorClassifier + 'static) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            classifier: Arc::new(classifier),
        }
    }

    pub fn classifier(&self) -> Arc<dyn ErrorClassifier> {
        self.classifier.clone()
    }

    /// Register one sweeper. Its dependencies must already be registered.
    pub fn register(&mut self, entry: SweeperEntry<C>) -> Result<(), ConfigurationError> {
        if self.index.contains_key(&entry.name) {
            return Err(ConfigurationError::DuplicateSweeper(entry.name));
        }
        if entry.dependencies.contains(&entry.name) {
            return Err(ConfigurationError::Cycle(vec![
                entry.name.clone(),
                entry.name.clone(),
            ]));
        }
        if let Some(missing) = entry
            .dependencies
            .iter()
            .find(|d| !self.index.contains_key(d.as_str()))
        {
            return Err(ConfigurationError::UnknownDependency {
                sweeper: entry.name.clone(),
                dependency: missing.clone(),
            });
        }

        self.push(entry);
        Ok(())
    }

    /// Register a batch whose entries may reference each other in any order.
    ///
    /// The batch is checked as a whole (dangling references and cycles) and
    /// nothing is registered if the check fails.
    pub fn register_all(
        &mut self,
        entries: impl IntoIterator<Item = SweeperEntry<C>>,
    ) -> Result<(), ConfigurationError> {
        let entries: Vec<SweeperEntry<C>> = entries.into_iter().collect();

        let mut batch = HashSet::new();
        for entry in &entries {
            if self.index.contains_key(&entry.name) || !batch.insert(entry.name.as_str()) {
                return Err(ConfigurationError::DuplicateSweeper(entry.name.clone()));
            }
        }
        for entry in &entries {
            if let Some(missing) = entry
                .dependencies
                .iter()
                .find(|d| !self.index.contains_key(d.as_str()) && !batch.contains(d.as_str()))
            {
                return Err(ConfigurationError::UnknownDependency {
                    sweeper: entry.name.clone(),
                    dependency: missing.clone(),
                });
            }
        }

        let registered = self.entries.len();
        for entry in entries {
            self.push(entry);
        }

        if let Err(err) = self.validate() {
            for entry in self.entries.drain(registered..) {
                self.index.remove(&entry.name);
            }
            return Err(err);
        }
        Ok(())
    }

    fn push(&mut self, entry: SweeperEntry<C>) {
        self.index.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
    }

    pub fn get(&self, name: &str) -> Option<&SweeperEntry<C>> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the whole dependency graph for cycles and dangling references.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.order(&Selector::All).map(|_| ())
    }

    /// Selected sweepers with dependencies before dependents.
    ///
    /// Ties are broken by registration order.
    pub fn order(&self, selector: &Selector) -> Result<Vec<&SweeperEntry<C>>, ConfigurationError> {
        let selected = self.select(selector)?;

        let mut in_degree: HashMap<usize, usize> = HashMap::new();
        let mut dependents: HashMap<usize, Vec<usize>> = HashMap::new();
        for &i in &selected {
            let deps = self.dependency_indices(i)?;
            in_degree.insert(i, deps.len());
            for d in deps {
                dependents.entry(d).or_default().push(i);
            }
        }

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .filter(|(_, n)| **n == 0)
            .map(|(&i, _)| i)
            .collect();
        let mut ordered = Vec::with_capacity(selected.len());

        while let Some(i) = ready.pop_first() {
            ordered.push(i);
            for &dependent in dependents.get(&i).into_iter().flatten() {
                if let Some(n) = in_degree.get_mut(&dependent) {
                    *n -= 1;
                    if *n == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        if ordered.len() < selected.len() {
            let done: HashSet<usize> = ordered.iter().copied().collect();
            let stuck: BTreeSet<usize> = selected.difference(&done).copied().collect();
            return Err(ConfigurationError::Cycle(self.cycle_path(&stuck)));
        }

        Ok(ordered.into_iter().map(|i| &self.entries[i]).collect())
    }

    fn dependency_indices(&self, i: usize) -> Result<Vec<usize>, ConfigurationError> {
        let entry = &self.entries[i];
        entry
            .dependencies
            .iter()
            .map(|d| {
                self.index
                    .get(d)
                    .copied()
                    .ok_or_else(|| ConfigurationError::UnknownDependency {
                        sweeper: entry.name.clone(),
                        dependency: d.clone(),
                    })
            })
            .collect()
    }

    fn select(&self, selector: &Selector) -> Result<HashSet<usize>, ConfigurationError> {
        let roots: Vec<usize> = match selector {
            Selector::All => return Ok((0..self.entries.len()).collect()),
            Selector::Only(names) => names
                .iter()
                .map(|n| {
                    self.index
                        .get(n)
                        .copied()
                        .ok_or_else(|| ConfigurationError::UnknownSweeper(n.clone()))
                })
                .collect::<Result<_, _>>()?,
        };

        let mut selected = HashSet::new();
        let mut pending = roots;
        while let Some(i) = pending.pop() {
            if selected.insert(i) {
                pending.extend(self.dependency_indices(i)?);
            }
        }
        Ok(selected)
    }

    /// Every stuck node still waits on another stuck node, so walking
    /// dependencies from any of them ends in a loop.
    fn cycle_path(&self, stuck: &BTreeSet<usize>) -> Vec<String> {
        let Some(&start) = stuck.first() else {
            return Vec::new();
        };
        let mut path = vec![start];
        let mut current = start;
        loop {
            let next = self.entries[current]
                .dependencies
                .iter()
                .filter_map(|d| self.index.get(d).copied())
                .find(|d| stuck.contains(d));
            let Some(next) = next else { break };
            if let Some(pos) = path.iter().position(|&p| p == next) {
                let mut cycle: Vec<String> = path[pos..]
                    .iter()
                    .map(|&p| self.entries[p].name.clone())
                    .collect();
                cycle.push(self.entries[next].name.clone());
                return cycle;
            }
            path.push(next);
            current = next;
        }
        path.into_iter().map(|p| self.entries[p].name.clone()).collect()
    }

    /// Sweep one scope.
    ///
    /// Configuration errors are reported before any remote call. A failing
    /// client factory aborts the scope. Everything else lands in the report:
    /// each type is fully swept before the next one in dependency order is
    /// discovered, and a failed type never stops later types from running.
    pub async fn run<F>(
        &self,
        factory: &F,
        scope: &Scope,
        selector: &Selector,
        options: &SweepOptions,
    ) -> Result<SweepReport, SweepError>
    where
        F: RegionalClientFactory<C> + ?Sized,
    {
        let ordered = self.order(selector)?;
        let start = Instant::now();

        let client = factory
            .client(scope)
            .await
            .map_err(|source| SweepError::ClientAcquisition {
                scope: scope.to_string(),
                source,
            })?;
        let client = Arc::new(client);

        let orchestrator = SweepOrchestrator::new(self.classifier.clone(), options.clone());
        let mut report = SweepReport::for_scope(scope.as_str());

        for entry in ordered {
            let swept = self.sweep_entry(entry, &client, scope, &orchestrator).await;
            report.merge(swept);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            scope = %scope,
            totals = %report.totals(),
            failures = report.failures().len(),
            "Sweep finished"
        );
        Ok(report)
    }

    async fn sweep_entry(
        &self,
        entry: &SweeperEntry<C>,
        client: &Arc<C>,
        scope: &Scope,
        orchestrator: &SweepOrchestrator,
    ) -> SweepReport {
        info!(sweeper = %entry.name, scope = %scope, "Running sweeper");

        let driver = DiscoveryDriver::new(
            entry.name.clone(),
            entry.adapter.clone(),
            client.clone(),
            self.classifier.clone(),
        );
        let outcome = driver.discover_all(scope, orchestrator.options()).await;

        let mut report = SweepReport::new();
        report.touch(&entry.name);
        report.record_discovered(&entry.name, outcome.units.len());
        if let Some(reason) = outcome.skipped {
            report.record_discovery_skipped(&entry.name, reason);
        }
        if let Some(err) = outcome.error {
            report.record_failure(err);
        }

        report.merge(orchestrator.sweep(scope, outcome.units).await);

        let counts = report.counts(&entry.name);
        if counts.failed > 0 {
            error!(sweeper = %entry.name, scope = %scope, counts = %counts, "Sweeper finished with errors");
        } else {
            info!(sweeper = %entry.name, scope = %scope, counts = %counts, "Sweeper finished");
        }
        report
    }

    /// Sweep several scopes concurrently; each scope's result is independent.
    pub async fn run_scopes<F>(
        &self,
        factory: &F,
        scopes: &[Scope],
        selector: &Selector,
        options: &SweepOptions,
    ) -> Vec<(Scope, Result<SweepReport, SweepError>)>
    where
        F: RegionalClientFactory<C> + ?Sized,
    {
        let runs = scopes.iter().map(|scope| async move {
            let result = self.run(factory, scope, selector, options).await;
            if let Err(err) = &result {
                error!(scope = %scope, error = %err, "Sweep aborted");
            }
            (scope.clone(), result)
        });
        join_all(runs).await
    }
}
