//! AWS AppSync sweepers
//!
//! Registers three resource types:
//!
//! - `aws_appsync_graphql_api`
//! - `aws_appsync_domain_name_api_association`
//! - `aws_appsync_domain_name` (after its API associations are removed)

pub mod client;
pub mod domain_name;
pub mod error;
pub mod graphql_api;

pub use aws_sdk_appsync::Client as AppSyncClient;
pub use client::AppSyncClientFactory;
pub use domain_name::{
    DOMAIN_NAME, DOMAIN_NAME_API_ASSOCIATION, DomainNameApiAssociationSweeper, DomainNameSweeper,
};
pub use error::AppSyncError;
pub use graphql_api::{GRAPHQL_API, GraphqlApiSweeper};

use aws_sdk_appsync::Client;
use sweepkit_core::{ConfigurationError, Registry, SweeperEntry};

/// Add every AppSync sweeper to the registry.
pub fn register_sweepers(registry: &mut Registry<Client>) -> Result<(), ConfigurationError> {
    registry.register(SweeperEntry::new(GRAPHQL_API, GraphqlApiSweeper))?;
    registry.register(SweeperEntry::new(
        DOMAIN_NAME_API_ASSOCIATION,
        DomainNameApiAssociationSweeper,
    ))?;
    registry.register(
        SweeperEntry::new(DOMAIN_NAME, DomainNameSweeper).depends_on([DOMAIN_NAME_API_ASSOCIATION]),
    )?;
    Ok(())
}
