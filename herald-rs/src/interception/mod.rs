//! Interceptor decoration: wrap a handler contract in ordered interceptor layers.
//!
//! Layers are container decorators on `dyn CommandHandler<C>` / `dyn QueryHandler<Q>`, so every
//! resolution of the contract, closed or open, gets them. The last registered layer is outermost.

mod intercepting;

pub use intercepting::{
    CommandInterceptor, CommandInterceptorWith, InterceptingCommandHandler, InterceptingCommandHandlerWith,
    InterceptingQueryHandler, InterceptingQueryHandlerWith, QueryInterceptor, QueryInterceptorWith,
};

use std::any::type_name;
use std::sync::Arc;

use herald_core::{Container, Dependency};

use crate::ddd::{Command, CommandHandler, Query, QueryHandler};

pub(crate) fn intercept_command<C, F>(container: &mut Container, interceptor: F)
where
    C: Command,
    F: CommandInterceptor<C>,
{
    let implementation = Arc::new(interceptor);
    container.decorate::<dyn CommandHandler<C>, _>(move |_scope, inner| {
        let handler: Arc<dyn CommandHandler<C>> =
            Arc::new(InterceptingCommandHandler::new(inner, Arc::clone(&implementation)));
        Ok(handler)
    });
    tracing::debug!(command = type_name::<C>(), "registered command interceptor");
}

/// `D` is resolved from the resolving scope each time the layer is built.
/// Missing concrete dependencies are bound transient now; abstract ones must be bound by the caller.
pub(crate) fn intercept_command_with<C, D, F>(container: &mut Container, interceptor: F)
where
    C: Command,
    D: Dependency,
    F: CommandInterceptorWith<C, D>,
{
    D::register_defaults(container);
    let implementation = Arc::new(interceptor);
    container.decorate::<dyn CommandHandler<C>, _>(move |scope, inner| {
        let dependency = D::resolve(scope)?;
        let handler: Arc<dyn CommandHandler<C>> = Arc::new(InterceptingCommandHandlerWith::new(
            inner,
            dependency,
            Arc::clone(&implementation),
        ));
        Ok(handler)
    });
    tracing::debug!(
        command = type_name::<C>(),
        dependencies = type_name::<D>(),
        "registered command interceptor"
    );
}

pub(crate) fn intercept_query<Q, F>(container: &mut Container, interceptor: F)
where
    Q: Query,
    F: QueryInterceptor<Q>,
{
    let implementation = Arc::new(interceptor);
    container.decorate::<dyn QueryHandler<Q>, _>(move |_scope, inner| {
        let handler: Arc<dyn QueryHandler<Q>> =
            Arc::new(InterceptingQueryHandler::new(inner, Arc::clone(&implementation)));
        Ok(handler)
    });
    tracing::debug!(query = type_name::<Q>(), "registered query interceptor");
}

pub(crate) fn intercept_query_with<Q, D, F>(container: &mut Container, interceptor: F)
where
    Q: Query,
    D: Dependency,
    F: QueryInterceptorWith<Q, D>,
{
    D::register_defaults(container);
    let implementation = Arc::new(interceptor);
    container.decorate::<dyn QueryHandler<Q>, _>(move |scope, inner| {
        let dependency = D::resolve(scope)?;
        let handler: Arc<dyn QueryHandler<Q>> = Arc::new(InterceptingQueryHandlerWith::new(
            inner,
            dependency,
            Arc::clone(&implementation),
        ));
        Ok(handler)
    });
    tracing::debug!(
        query = type_name::<Q>(),
        dependencies = type_name::<D>(),
        "registered query interceptor"
    );
}
