//! GraphQL APIs

use crate::error::sdk_error;
use async_trait::async_trait;
use aws_sdk_appsync::Client;
use sweepkit_core::{Page, ResourceAdapter, Scope};

pub const GRAPHQL_API: &str = "aws_appsync_graphql_api";

/// Lists GraphQL APIs by ID and deletes them.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphqlApiSweeper;

#[async_trait]
impl ResourceAdapter<Client> for GraphqlApiSweeper {
    async fn list(
        &self,
        client: &Client,
        _scope: &Scope,
        page_token: Option<&str>,
    ) -> anyhow::Result<Page> {
        let output = client
            .list_graphql_apis()
            .set_next_token(page_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| sdk_error("ListGraphqlApis", e))?;

        Ok(Page {
            items: output
                .graphql_apis()
                .iter()
                .filter_map(|api| api.api_id())
                .map(str::to_string)
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn delete(&self, client: &Client, _scope: &Scope, identifier: &str) -> anyhow::Result<()> {
        client
            .delete_graphql_api()
            .api_id(identifier)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteGraphqlApi", e))?;
        Ok(())
    }
}
