//! Handler factories: resolve the handler for one message type from the executor's scope.

use std::any::type_name;
use std::sync::Arc;

use herald_core::{Scope, ScopeHandle};

use crate::core::{DispatchError, HandlerScope};
use crate::ddd::{Command, CommandHandler, Query, QueryHandler};
use crate::execution::scoped_handler::{ScopedCommandHandler, ScopedQueryHandler};

/// Resolve handlers straight from a scope: closed registration first, then the message's open handler.
pub trait ResolveHandler {
    fn command_handler<C: Command>(&self) -> Result<Arc<dyn CommandHandler<C>>, DispatchError>;
    fn query_handler<Q: Query>(&self) -> Result<Arc<dyn QueryHandler<Q>>, DispatchError>;
}

impl ResolveHandler for Scope {
    fn command_handler<C: Command>(&self) -> Result<Arc<dyn CommandHandler<C>>, DispatchError> {
        let specialization = C::open_handler();
        self.resolve_or_specialize::<dyn CommandHandler<C>>(specialization.as_ref())
            .map_err(|e| DispatchError::from_resolution(type_name::<C>(), type_name::<dyn CommandHandler<C>>(), e))
    }

    fn query_handler<Q: Query>(&self) -> Result<Arc<dyn QueryHandler<Q>>, DispatchError> {
        let specialization = Q::open_handler();
        self.resolve_or_specialize::<dyn QueryHandler<Q>>(specialization.as_ref())
            .map_err(|e| DispatchError::from_resolution(type_name::<Q>(), type_name::<dyn QueryHandler<Q>>(), e))
    }
}

/// Creates command handlers for the executor. Registered with the handlers' lifetime.
pub struct CommandHandlerFactory {
    scope: Scope,
    handler_scope: HandlerScope,
    _owned: Option<ScopeHandle>,
}

impl CommandHandlerFactory {
    pub fn new(scope: Scope, handler_scope: HandlerScope) -> Self {
        Self {
            scope,
            handler_scope,
            _owned: None,
        }
    }

    /// Factory owning its own scope, released when the factory drops. Used for singleton factories.
    pub fn detached(handle: ScopeHandle, handler_scope: HandlerScope) -> Self {
        Self {
            scope: handle.scope().clone(),
            handler_scope,
            _owned: Some(handle),
        }
    }

    pub fn create_handler<C: Command>(&self) -> Result<Arc<dyn CommandHandler<C>>, DispatchError> {
        match self.handler_scope {
            HandlerScope::Ambient => self.scope.command_handler::<C>(),
            HandlerScope::PerInvocation => {
                let handler: Arc<dyn CommandHandler<C>> =
                    Arc::new(ScopedCommandHandler::<C>::new(self.scope.scope_factory()));
                Ok(handler)
            }
        }
    }
}

/// Creates query handlers for the executor. Registered with the handlers' lifetime.
pub struct QueryHandlerFactory {
    scope: Scope,
    handler_scope: HandlerScope,
    _owned: Option<ScopeHandle>,
}

impl QueryHandlerFactory {
    pub fn new(scope: Scope, handler_scope: HandlerScope) -> Self {
        Self {
            scope,
            handler_scope,
            _owned: None,
        }
    }

    /// Factory owning its own scope, released when the factory drops. Used for singleton factories.
    pub fn detached(handle: ScopeHandle, handler_scope: HandlerScope) -> Self {
        Self {
            scope: handle.scope().clone(),
            handler_scope,
            _owned: Some(handle),
        }
    }

    pub fn create_handler<Q: Query>(&self) -> Result<Arc<dyn QueryHandler<Q>>, DispatchError> {
        match self.handler_scope {
            HandlerScope::Ambient => self.scope.query_handler::<Q>(),
            HandlerScope::PerInvocation => {
                let handler: Arc<dyn QueryHandler<Q>> = Arc::new(ScopedQueryHandler::<Q>::new(self.scope.scope_factory()));
                Ok(handler)
            }
        }
    }
}
