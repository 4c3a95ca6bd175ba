//! Executors: resolve the handler for a message and invoke it once.

use std::any::type_name;
use std::sync::Arc;

use herald_core::{ContainerError, Injectable, Scope};
use tokio_util::sync::CancellationToken;

use crate::core::DispatchError;
use crate::ddd::{Command, Query};
use crate::execution::factory::{CommandHandlerFactory, QueryHandlerFactory};
use crate::execution::scope::{CommandHandlerScopeFactory, QueryHandlerScopeFactory};

/// Dispatches commands. Resolve it from a scope; it never outlives that scope.
pub struct CommandExecutor {
    factory: Arc<CommandHandlerFactory>,
    scopes: Arc<CommandHandlerScopeFactory>,
}

impl CommandExecutor {
    pub fn new(factory: Arc<CommandHandlerFactory>, scopes: Arc<CommandHandlerScopeFactory>) -> Self {
        Self { factory, scopes }
    }

    /// Resolve the handler for `C` and invoke it. The handler's result is returned unchanged.
    pub async fn execute<C: Command>(&self, command: &C, cancel: &CancellationToken) -> Result<(), DispatchError> {
        let handler = self.factory.create_handler::<C>()?;
        tracing::trace!(command = type_name::<C>(), "executing command");
        handler.handle(command, cancel).await
    }

    /// Execute inside a fresh scope with a fresh executor. The scope is disposed before returning.
    pub async fn execute_scoped<C: Command>(
        &self,
        command: &C,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        let scope = self.scopes.create_scope();
        tracing::debug!(command = type_name::<C>(), scope = scope.id(), "executing command in scope");
        let result = match scope.create_executor() {
            Ok(executor) => executor.execute(command, cancel).await,
            Err(e) => Err(e),
        };
        scope.dispose();
        result
    }
}

impl Injectable for CommandExecutor {
    fn inject(scope: &Scope) -> Result<Self, ContainerError> {
        Ok(Self::new(scope.resolve()?, scope.resolve()?))
    }
}

/// Dispatches queries. Resolve it from a scope; it never outlives that scope.
pub struct QueryExecutor {
    factory: Arc<QueryHandlerFactory>,
    scopes: Arc<QueryHandlerScopeFactory>,
}

impl QueryExecutor {
    pub fn new(factory: Arc<QueryHandlerFactory>, scopes: Arc<QueryHandlerScopeFactory>) -> Self {
        Self { factory, scopes }
    }

    pub async fn execute<Q: Query>(&self, query: &Q, cancel: &CancellationToken) -> Result<Q::Result, DispatchError> {
        let handler = self.factory.create_handler::<Q>()?;
        tracing::trace!(query = type_name::<Q>(), "executing query");
        handler.handle(query, cancel).await
    }

    pub async fn execute_scoped<Q: Query>(
        &self,
        query: &Q,
        cancel: &CancellationToken,
    ) -> Result<Q::Result, DispatchError> {
        let scope = self.scopes.create_scope();
        tracing::debug!(query = type_name::<Q>(), scope = scope.id(), "executing query in scope");
        let result = match scope.create_executor() {
            Ok(executor) => executor.execute(query, cancel).await,
            Err(e) => Err(e),
        };
        scope.dispose();
        result
    }
}

impl Injectable for QueryExecutor {
    fn inject(scope: &Scope) -> Result<Self, ContainerError> {
        Ok(Self::new(scope.resolve()?, scope.resolve()?))
    }
}
