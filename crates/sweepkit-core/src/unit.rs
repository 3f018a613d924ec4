//! Deferred deletion of one discovered resource

use crate::adapter::{ResourceAdapter, Scope};
use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type DeleteFn = Box<dyn FnOnce(Scope) -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// One discovered resource bound to the operation that deletes it.
///
/// Nothing runs until [`delete`](SweepableUnit::delete) is called, which
/// consumes the unit.
pub struct SweepableUnit {
    resource_type: String,
    identifier: String,
    delete: DeleteFn,
}

impl SweepableUnit {
    pub fn new<F, Fut>(resource_type: impl Into<String>, identifier: impl Into<String>, delete: F) -> Self
    where
        F: FnOnce(Scope) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
            delete: Box::new(move |scope| Box::pin(delete(scope))),
        }
    }

    /// Bind an identifier to an adapter's delete operation.
    pub fn from_adapter<C>(
        resource_type: impl Into<String>,
        identifier: impl Into<String>,
        adapter: Arc<dyn ResourceAdapter<C>>,
        client: Arc<C>,
    ) -> Self
    where
        C: Send + Sync + 'static,
    {
        let identifier = identifier.into();
        let id = identifier.clone();
        Self::new(resource_type, identifier, move |scope| async move {
            adapter.delete(&client, &scope, &id).await
        })
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Run the deletion.
    pub async fn delete(self, scope: Scope) -> anyhow::Result<()> {
        (self.delete)(scope).await
    }

    pub(crate) fn into_parts(self) -> (String, String, DeleteFn) {
        (self.resource_type, self.identifier, self.delete)
    }
}

impl fmt::Debug for SweepableUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SweepableUnit")
            .field("resource_type", &self.resource_type)
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}
