//! Handler contracts. One handler per message type; resolved from the container by the executors.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::DispatchError;
use crate::ddd::{Command, Query};

/// Handler for command `C`. Implement this, list it in a [`crate::TypeCatalog`] and register the catalog.
/// The cancellation token is advisory: honoring it is up to the handler.
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, command: &C, cancel: &CancellationToken) -> Result<(), DispatchError>;
}

/// Handler for query `Q`.
#[async_trait]
pub trait QueryHandler<Q>: Send + Sync
where
    Q: Query,
{
    async fn handle(&self, query: &Q, cancel: &CancellationToken) -> Result<Q::Result, DispatchError>;
}
