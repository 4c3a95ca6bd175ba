//! Executor scopes: a fresh unit of work with its own executor, disposed by its owner.

use std::any::type_name;
use std::marker::PhantomData;
use std::sync::Arc;

use herald_core::{ScopeFactory, ScopeHandle};

use crate::core::DispatchError;
use crate::execution::executor::{CommandExecutor, QueryExecutor};

pub type CommandHandlerScope = ExecutorScope<CommandExecutor>;
pub type CommandHandlerScopeFactory = ExecutorScopeFactory<CommandExecutor>;
pub type QueryHandlerScope = ExecutorScope<QueryExecutor>;
pub type QueryHandlerScopeFactory = ExecutorScopeFactory<QueryExecutor>;

/// Owns one resolution scope and hands out executors bound to it.
/// Disposed by [`ExecutorScope::dispose`] or, failing that, on drop.
pub struct ExecutorScope<E> {
    handle: ScopeHandle,
    _executor: PhantomData<fn() -> E>,
}

impl<E: Send + Sync + 'static> ExecutorScope<E> {
    pub fn create_executor(&self) -> Result<Arc<E>, DispatchError> {
        self.handle
            .resolve::<E>()
            .map_err(|source| DispatchError::DependencyResolution {
                target: type_name::<E>(),
                source,
            })
    }

    pub fn id(&self) -> u64 {
        self.handle.id()
    }

    pub fn dispose(self) {
        self.handle.dispose();
    }
}

/// Creates [`ExecutorScope`]s on the container it was resolved from.
pub struct ExecutorScopeFactory<E> {
    scopes: ScopeFactory,
    _executor: PhantomData<fn() -> E>,
}

impl<E> ExecutorScopeFactory<E> {
    pub fn new(scopes: ScopeFactory) -> Self {
        Self {
            scopes,
            _executor: PhantomData,
        }
    }

    pub fn create_scope(&self) -> ExecutorScope<E> {
        ExecutorScope {
            handle: self.scopes.begin_scope(),
            _executor: PhantomData,
        }
    }
}
