//! Regional AppSync client factory

use crate::error::AppSyncError;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_appsync::Client;
use aws_sdk_appsync::config::Region;
use sweepkit_core::{RegionalClientFactory, Scope};
use tracing::debug;

/// Builds one AppSync client per region from a shared base configuration.
#[derive(Debug, Clone)]
pub struct AppSyncClientFactory {
    base: SdkConfig,
}

impl AppSyncClientFactory {
    pub fn new(base: SdkConfig) -> Self {
        Self { base }
    }

    /// Load credentials and settings from the standard AWS environment chain.
    pub async fn from_env() -> Self {
        Self::new(aws_config::defaults(BehaviorVersion::latest()).load().await)
    }
}

#[async_trait]
impl RegionalClientFactory<Client> for AppSyncClientFactory {
    async fn client(&self, scope: &Scope) -> anyhow::Result<Client> {
        if self.base.credentials_provider().is_none() {
            return Err(AppSyncError::MissingCredentials {
                region: scope.to_string(),
            }
            .into());
        }

        let config = aws_sdk_appsync::config::Builder::from(&self.base)
            .region(Region::new(scope.to_string()))
            .build();
        debug!(region = %scope, "Created AppSync client");
        Ok(Client::from_conf(config))
    }
}
