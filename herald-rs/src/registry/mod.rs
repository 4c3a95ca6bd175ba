//! Registry: install discovered handlers, their factories and executors, and interceptors on a container.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use herald_core::{Container, Dependency, Lifetime};
use tokio_util::sync::CancellationToken;

use crate::core::{DispatchError, RegistryOptions};
use crate::ddd::{Command, CommandHandler, Query, QueryHandler};
use crate::discovery::TypeCatalog;
use crate::execution::{
    CommandExecutor, CommandHandlerFactory, CommandHandlerScopeFactory, QueryExecutor, QueryHandlerFactory,
    QueryHandlerScopeFactory,
};
use crate::interception;

/// Handler registration on [`Container`].
///
/// ```ignore
/// let mut container = Container::new();
/// container
///     .register_command_handlers(&catalog)
///     .register_command_interceptor::<PlaceOrder, _>(|command, inner, cancel| {
///         Box::pin(async move { inner.handle(command, cancel).await })
///     });
/// let executor = container.resolve::<CommandExecutor>()?;
/// ```
pub trait HandlerRegistry {
    /// Register every command handler in `catalog` with the default options.
    fn register_command_handlers(&mut self, catalog: &TypeCatalog) -> &mut Self;

    /// Register every command handler in `catalog`, then the factory, scope factory and executor if absent.
    fn register_command_handlers_with(&mut self, catalog: &TypeCatalog, options: RegistryOptions) -> &mut Self;

    fn register_query_handlers(&mut self, catalog: &TypeCatalog) -> &mut Self;

    fn register_query_handlers_with(&mut self, catalog: &TypeCatalog, options: RegistryOptions) -> &mut Self;

    /// Wrap the handler for `C`. The interceptor calls `inner.handle(..)` or short-circuits.
    fn register_command_interceptor<C, F>(&mut self, interceptor: F) -> &mut Self
    where
        C: Command,
        F: for<'a> Fn(
                &'a C,
                &'a Arc<dyn CommandHandler<C>>,
                &'a CancellationToken,
            ) -> BoxFuture<'a, Result<(), DispatchError>>
            + Send
            + Sync
            + 'static;

    /// Wrap the handler for `C` with an interceptor that needs `D`: an `Arc<T>` or a tuple of them.
    fn register_command_interceptor_with<C, D, F>(&mut self, interceptor: F) -> &mut Self
    where
        C: Command,
        D: Dependency,
        F: for<'a> Fn(
                &'a C,
                &'a Arc<dyn CommandHandler<C>>,
                &'a D,
                &'a CancellationToken,
            ) -> BoxFuture<'a, Result<(), DispatchError>>
            + Send
            + Sync
            + 'static;

    fn register_query_interceptor<Q, F>(&mut self, interceptor: F) -> &mut Self
    where
        Q: Query,
        F: for<'a> Fn(
                &'a Q,
                &'a Arc<dyn QueryHandler<Q>>,
                &'a CancellationToken,
            ) -> BoxFuture<'a, Result<Q::Result, DispatchError>>
            + Send
            + Sync
            + 'static;

    fn register_query_interceptor_with<Q, D, F>(&mut self, interceptor: F) -> &mut Self
    where
        Q: Query,
        D: Dependency,
        F: for<'a> Fn(
                &'a Q,
                &'a Arc<dyn QueryHandler<Q>>,
                &'a D,
                &'a CancellationToken,
            ) -> BoxFuture<'a, Result<Q::Result, DispatchError>>
            + Send
            + Sync
            + 'static;
}

impl HandlerRegistry for Container {
    fn register_command_handlers(&mut self, catalog: &TypeCatalog) -> &mut Self {
        self.register_command_handlers_with(catalog, RegistryOptions::default())
    }

    fn register_command_handlers_with(&mut self, catalog: &TypeCatalog, options: RegistryOptions) -> &mut Self {
        let RegistryOptions { lifetime, handler_scope } = options;
        let descriptors = catalog.command_handler_descriptors();
        for descriptor in &descriptors {
            descriptor.register(self, lifetime);
        }
        if !self.is_registered::<CommandHandlerFactory>() {
            self.register::<CommandHandlerFactory, _>(lifetime, move |scope| {
                let factory = match lifetime {
                    Lifetime::Singleton => CommandHandlerFactory::detached(scope.begin_scope(), handler_scope),
                    _ => CommandHandlerFactory::new(scope.clone(), handler_scope),
                };
                Ok(Arc::new(factory))
            });
        }
        if !self.is_registered::<CommandHandlerScopeFactory>() {
            self.register::<CommandHandlerScopeFactory, _>(Lifetime::Singleton, |scope| {
                Ok(Arc::new(CommandHandlerScopeFactory::new(scope.scope_factory())))
            });
        }
        if !self.is_registered::<CommandExecutor>() {
            self.register_injectable::<CommandExecutor>(lifetime);
        }
        tracing::debug!(handlers = descriptors.len(), ?lifetime, ?handler_scope, "registered command handlers");
        self
    }

    fn register_query_handlers(&mut self, catalog: &TypeCatalog) -> &mut Self {
        self.register_query_handlers_with(catalog, RegistryOptions::default())
    }

    fn register_query_handlers_with(&mut self, catalog: &TypeCatalog, options: RegistryOptions) -> &mut Self {
        let RegistryOptions { lifetime, handler_scope } = options;
        let descriptors = catalog.query_handler_descriptors();
        for descriptor in &descriptors {
            descriptor.register(self, lifetime);
        }
        if !self.is_registered::<QueryHandlerFactory>() {
            self.register::<QueryHandlerFactory, _>(lifetime, move |scope| {
                let factory = match lifetime {
                    Lifetime::Singleton => QueryHandlerFactory::detached(scope.begin_scope(), handler_scope),
                    _ => QueryHandlerFactory::new(scope.clone(), handler_scope),
                };
                Ok(Arc::new(factory))
            });
        }
        if !self.is_registered::<QueryHandlerScopeFactory>() {
            self.register::<QueryHandlerScopeFactory, _>(Lifetime::Singleton, |scope| {
                Ok(Arc::new(QueryHandlerScopeFactory::new(scope.scope_factory())))
            });
        }
        if !self.is_registered::<QueryExecutor>() {
            self.register_injectable::<QueryExecutor>(lifetime);
        }
        tracing::debug!(handlers = descriptors.len(), ?lifetime, ?handler_scope, "registered query handlers");
        self
    }

    fn register_command_interceptor<C, F>(&mut self, interceptor: F) -> &mut Self
    where
        C: Command,
        F: for<'a> Fn(
                &'a C,
                &'a Arc<dyn CommandHandler<C>>,
                &'a CancellationToken,
            ) -> BoxFuture<'a, Result<(), DispatchError>>
            + Send
            + Sync
            + 'static,
    {
        interception::intercept_command::<C, F>(self, interceptor);
        self
    }

    fn register_command_interceptor_with<C, D, F>(&mut self, interceptor: F) -> &mut Self
    where
        C: Command,
        D: Dependency,
        F: for<'a> Fn(
                &'a C,
                &'a Arc<dyn CommandHandler<C>>,
                &'a D,
                &'a CancellationToken,
            ) -> BoxFuture<'a, Result<(), DispatchError>>
            + Send
            + Sync
            + 'static,
    {
        interception::intercept_command_with::<C, D, F>(self, interceptor);
        self
    }

    fn register_query_interceptor<Q, F>(&mut self, interceptor: F) -> &mut Self
    where
        Q: Query,
        F: for<'a> Fn(
                &'a Q,
                &'a Arc<dyn QueryHandler<Q>>,
                &'a CancellationToken,
            ) -> BoxFuture<'a, Result<Q::Result, DispatchError>>
            + Send
            + Sync
            + 'static,
    {
        interception::intercept_query::<Q, F>(self, interceptor);
        self
    }

    fn register_query_interceptor_with<Q, D, F>(&mut self, interceptor: F) -> &mut Self
    where
        Q: Query,
        D: Dependency,
        F: for<'a> Fn(
                &'a Q,
                &'a Arc<dyn QueryHandler<Q>>,
                &'a D,
                &'a CancellationToken,
            ) -> BoxFuture<'a, Result<Q::Result, DispatchError>>
            + Send
            + Sync
            + 'static,
    {
        interception::intercept_query_with::<Q, D, F>(self, interceptor);
        self
    }
}
