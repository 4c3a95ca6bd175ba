//! Intercepting handlers: one interceptor layer around an inner handler.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::core::DispatchError;
use crate::ddd::{Command, CommandHandler, Query, QueryHandler};

/// Command interceptor body: gets the message, the inner handler and the token.
/// It must call `inner.handle(..)` itself or deliberately return without it.
pub trait CommandInterceptor<C: Command>:
    for<'a> Fn(&'a C, &'a Arc<dyn CommandHandler<C>>, &'a CancellationToken) -> BoxFuture<'a, Result<(), DispatchError>>
    + Send
    + Sync
    + 'static
{
}

impl<C, F> CommandInterceptor<C> for F
where
    C: Command,
    F: for<'a> Fn(&'a C, &'a Arc<dyn CommandHandler<C>>, &'a CancellationToken) -> BoxFuture<'a, Result<(), DispatchError>>
        + Send
        + Sync
        + 'static,
{
}

/// Command interceptor body that also receives its resolved dependencies `D`.
pub trait CommandInterceptorWith<C: Command, D>:
    for<'a> Fn(
        &'a C,
        &'a Arc<dyn CommandHandler<C>>,
        &'a D,
        &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), DispatchError>>
    + Send
    + Sync
    + 'static
{
}

impl<C, D, F> CommandInterceptorWith<C, D> for F
where
    C: Command,
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
}

pub trait QueryInterceptor<Q: Query>:
    for<'a> Fn(&'a Q, &'a Arc<dyn QueryHandler<Q>>, &'a CancellationToken) -> BoxFuture<'a, Result<Q::Result, DispatchError>>
    + Send
    + Sync
    + 'static
{
}

impl<Q, F> QueryInterceptor<Q> for F
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
}

pub trait QueryInterceptorWith<Q: Query, D>:
    for<'a> Fn(
        &'a Q,
        &'a Arc<dyn QueryHandler<Q>>,
        &'a D,
        &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Q::Result, DispatchError>>
    + Send
    + Sync
    + 'static
{
}

impl<Q, D, F> QueryInterceptorWith<Q, D> for F
where
    Q: Query,
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
}

pub struct InterceptingCommandHandler<C: Command, F> {
    inner: Arc<dyn CommandHandler<C>>,
    implementation: Arc<F>,
}

impl<C: Command, F> InterceptingCommandHandler<C, F> {
    pub fn new(inner: Arc<dyn CommandHandler<C>>, implementation: Arc<F>) -> Self {
        Self { inner, implementation }
    }
}

#[async_trait]
impl<C, F> CommandHandler<C> for InterceptingCommandHandler<C, F>
where
    C: Command,
    F: CommandInterceptor<C>,
{
    async fn handle(&self, command: &C, cancel: &CancellationToken) -> Result<(), DispatchError> {
        (self.implementation)(command, &self.inner, cancel).await
    }
}

/// Interceptor layer carrying dependencies resolved when the layer was built.
pub struct InterceptingCommandHandlerWith<C: Command, D, F> {
    inner: Arc<dyn CommandHandler<C>>,
    dependency: D,
    implementation: Arc<F>,
}

impl<C: Command, D, F> InterceptingCommandHandlerWith<C, D, F> {
    pub fn new(inner: Arc<dyn CommandHandler<C>>, dependency: D, implementation: Arc<F>) -> Self {
        Self {
            inner,
            dependency,
            implementation,
        }
    }
}

#[async_trait]
impl<C, D, F> CommandHandler<C> for InterceptingCommandHandlerWith<C, D, F>
where
    C: Command,
    D: Send + Sync + 'static,
    F: CommandInterceptorWith<C, D>,
{
    async fn handle(&self, command: &C, cancel: &CancellationToken) -> Result<(), DispatchError> {
        (self.implementation)(command, &self.inner, &self.dependency, cancel).await
    }
}

pub struct InterceptingQueryHandler<Q: Query, F> {
    inner: Arc<dyn QueryHandler<Q>>,
    implementation: Arc<F>,
}

impl<Q: Query, F> InterceptingQueryHandler<Q, F> {
    pub fn new(inner: Arc<dyn QueryHandler<Q>>, implementation: Arc<F>) -> Self {
        Self { inner, implementation }
    }
}

#[async_trait]
impl<Q, F> QueryHandler<Q> for InterceptingQueryHandler<Q, F>
where
    Q: Query,
    F: QueryInterceptor<Q>,
{
    async fn handle(&self, query: &Q, cancel: &CancellationToken) -> Result<Q::Result, DispatchError> {
        (self.implementation)(query, &self.inner, cancel).await
    }
}

pub struct InterceptingQueryHandlerWith<Q: Query, D, F> {
    inner: Arc<dyn QueryHandler<Q>>,
    dependency: D,
    implementation: Arc<F>,
}

impl<Q: Query, D, F> InterceptingQueryHandlerWith<Q, D, F> {
    pub fn new(inner: Arc<dyn QueryHandler<Q>>, dependency: D, implementation: Arc<F>) -> Self {
        Self {
            inner,
            dependency,
            implementation,
        }
    }
}

#[async_trait]
impl<Q, D, F> QueryHandler<Q> for InterceptingQueryHandlerWith<Q, D, F>
where
    Q: Query,
    D: Send + Sync + 'static,
    F: QueryInterceptorWith<Q, D>,
{
    async fn handle(&self, query: &Q, cancel: &CancellationToken) -> Result<Q::Result, DispatchError> {
        (self.implementation)(query, &self.inner, &self.dependency, cancel).await
    }
}
