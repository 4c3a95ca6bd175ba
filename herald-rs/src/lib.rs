//! Herald for Rust: command/query dispatch on herald-core.
//!
//! Describe handlers in a [`TypeCatalog`], install them with [`HandlerRegistry`], wrap them with
//! interceptors and dispatch through [`CommandExecutor`] / [`QueryExecutor`], either in the ambient
//! scope or in a fresh scope per call.

pub mod core;
pub mod ddd;
pub mod discovery;
pub mod execution;
pub mod interception;
pub mod registry;

pub use crate::core::{DispatchError, HandlerScope, IntoDispatchError, RegistryOptions};
pub use ddd::{Command, CommandHandler, Query, QueryHandler};
pub use discovery::{
    open_command_handler, open_query_handler, ContractType, Discoverable, HandlerDescriptor, HandlerKind, TypeCatalog,
};
pub use execution::{
    CommandExecutor, CommandHandlerFactory, CommandHandlerScope, CommandHandlerScopeFactory, ExecutorScope,
    ExecutorScopeFactory, QueryExecutor, QueryHandlerFactory, QueryHandlerScope, QueryHandlerScopeFactory,
    ResolveHandler, ScopedCommandHandler, ScopedQueryHandler,
};
pub use interception::{
    InterceptingCommandHandler, InterceptingCommandHandlerWith, InterceptingQueryHandler, InterceptingQueryHandlerWith,
};
pub use registry::HandlerRegistry;

pub use futures_util::future::BoxFuture;
pub use herald_core::{
    BoxError, Container, ContainerError, Dependency, GenericShape, Injectable, Lifetime, Open, Scope, ScopeFactory,
    ScopeHandle, Service, ServiceInfo, Specialization,
};
pub use herald_rs_macros::{Command, Injectable, Query};
pub use tokio_util::sync::CancellationToken;
