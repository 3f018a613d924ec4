//! Runtime limits for one sweep invocation

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default cap on pages requested per resource type
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Default number of deletions in flight per batch
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default bound on a single list or delete call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(300);

/// Options shared by discovery and orchestration.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Maximum list pages per resource type before discovery gives up
    pub max_pages: usize,

    /// Maximum deletions running at once
    pub concurrency: usize,

    /// Bound on each remote call
    pub call_timeout: Duration,

    /// Discover but do not delete
    pub dry_run: bool,

    /// Once cancelled, no new pages are requested and no new units start
    pub cancel: CancellationToken,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            concurrency: DEFAULT_CONCURRENCY,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            dry_run: false,
            cancel: CancellationToken::new(),
        }
    }
}

impl SweepOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_clamp_to_one() {
        let options = SweepOptions::new().with_concurrency(0).with_max_pages(0);
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.max_pages, 1);
    }

    #[test]
    fn cancel_is_shared_with_caller() {
        let token = CancellationToken::new();
        let options = SweepOptions::new().with_cancel(token.clone());
        assert!(!options.is_cancelled());
        token.cancel();
        assert!(options.is_cancelled());
    }
}
