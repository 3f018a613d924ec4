//! Custom domain names and their API associations
//!
//! Both sweepers list the same domain name configurations. An association
//! is removed by disassociating the domain, and a domain can only be deleted
//! once nothing is associated with it.

use crate::error::sdk_error;
use async_trait::async_trait;
use aws_sdk_appsync::Client;
use sweepkit_core::{Page, ResourceAdapter, Scope};

pub const DOMAIN_NAME: &str = "aws_appsync_domain_name";
pub const DOMAIN_NAME_API_ASSOCIATION: &str = "aws_appsync_domain_name_api_association";

async fn list_domain_names(client: &Client, page_token: Option<&str>) -> anyhow::Result<Page> {
    let output = client
        .list_domain_names()
        .set_next_token(page_token.map(str::to_string))
        .send()
        .await
        .map_err(|e| sdk_error("ListDomainNames", e))?;

    Ok(Page {
        items: output
            .domain_name_configs()
            .iter()
            .filter_map(|config| config.domain_name())
            .map(str::to_string)
            .collect(),
        next_token: output.next_token().map(str::to_string),
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DomainNameSweeper;

#[async_trait]
impl ResourceAdapter<Client> for DomainNameSweeper {
    async fn list(
        &self,
        client: &Client,
        _scope: &Scope,
        page_token: Option<&str>,
    ) -> anyhow::Result<Page> {
        list_domain_names(client, page_token).await
    }

    async fn delete(&self, client: &Client, _scope: &Scope, identifier: &str) -> anyhow::Result<()> {
        client
            .delete_domain_name()
            .domain_name(identifier)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteDomainName", e))?;
        Ok(())
    }
}

/// Identified by domain name; deleting means disassociating its API.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainNameApiAssociationSweeper;

#[async_trait]
impl ResourceAdapter<Client> for DomainNameApiAssociationSweeper {
    async fn list(
        &self,
        client: &Client,
        _scope: &Scope,
        page_token: Option<&str>,
    ) -> anyhow::Result<Page> {
        list_domain_names(client, page_token).await
    }

    async fn delete(&self, client: &Client, _scope: &Scope, identifier: &str) -> anyhow::Result<()> {
        client
            .disassociate_api()
            .domain_name(identifier)
            .send()
            .await
            .map_err(|e| sdk_error("DisassociateApi", e))?;
        Ok(())
    }
}
