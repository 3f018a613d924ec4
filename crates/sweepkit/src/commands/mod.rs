pub mod list;
pub mod run;

use sweepkit_appsync::AppSyncClient;
use sweepkit_core::Registry;

/// Registry with every sweeper this binary knows about.
pub fn build_registry() -> anyhow::Result<Registry<AppSyncClient>> {
    let mut registry = Registry::new();
    sweepkit_appsync::register_sweepers(&mut registry)?;
    Ok(registry)
}
