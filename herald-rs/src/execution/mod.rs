//! Execution: executors, handler factories and scopes.

pub mod executor;
pub mod factory;
pub mod scope;
pub mod scoped_handler;

pub use executor::{CommandExecutor, QueryExecutor};
pub use factory::{CommandHandlerFactory, QueryHandlerFactory, ResolveHandler};
pub use scope::{
    CommandHandlerScope, CommandHandlerScopeFactory, ExecutorScope, ExecutorScopeFactory, QueryHandlerScope,
    QueryHandlerScopeFactory,
};
pub use scoped_handler::{ScopedCommandHandler, ScopedQueryHandler};
