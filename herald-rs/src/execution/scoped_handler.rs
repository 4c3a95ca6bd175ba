//! Per-invocation handler scopes: resolve and run the real handler inside its own nested scope.

use std::marker::PhantomData;

use async_trait::async_trait;
use herald_core::ScopeFactory;
use tokio_util::sync::CancellationToken;

use crate::core::DispatchError;
use crate::ddd::{Command, CommandHandler, Query, QueryHandler};
use crate::execution::factory::ResolveHandler;

/// Handles any command `C` by resolving its real handler in a nested scope, disposed before returning.
pub struct ScopedCommandHandler<C> {
    scopes: ScopeFactory,
    _command: PhantomData<fn(&C)>,
}

impl<C> ScopedCommandHandler<C> {
    pub fn new(scopes: ScopeFactory) -> Self {
        Self {
            scopes,
            _command: PhantomData,
        }
    }
}

#[async_trait]
impl<C: Command> CommandHandler<C> for ScopedCommandHandler<C> {
    async fn handle(&self, command: &C, cancel: &CancellationToken) -> Result<(), DispatchError> {
        let scope = self.scopes.begin_scope();
        let result = match scope.command_handler::<C>() {
            Ok(handler) => handler.handle(command, cancel).await,
            Err(e) => Err(e),
        };
        scope.dispose();
        result
    }
}

/// Handles any query `Q` by resolving its real handler in a nested scope, disposed before returning.
pub struct ScopedQueryHandler<Q> {
    scopes: ScopeFactory,
    _query: PhantomData<fn(&Q)>,
}

impl<Q> ScopedQueryHandler<Q> {
    pub fn new(scopes: ScopeFactory) -> Self {
        Self {
            scopes,
            _query: PhantomData,
        }
    }
}

#[async_trait]
impl<Q: Query> QueryHandler<Q> for ScopedQueryHandler<Q> {
    async fn handle(&self, query: &Q, cancel: &CancellationToken) -> Result<Q::Result, DispatchError> {
        let scope = self.scopes.begin_scope();
        let result = match scope.query_handler::<Q>() {
            Ok(handler) => handler.handle(query, cancel).await,
            Err(e) => Err(e),
        };
        scope.dispose();
        result
    }
}
