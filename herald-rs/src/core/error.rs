//! Dispatch errors surfaced by executors.

use herald_core::{BoxError, ContainerError};
use thiserror::Error;

/// Everything `execute` / `execute_scoped` can fail with.
///
/// Handler and interceptor bodies return their own `DispatchError`; executors pass it through untouched.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No closed or open handler is registered for the message type.
    #[error("no handler registered for {message}")]
    UnresolvedHandler {
        message: &'static str,
        #[source]
        source: ContainerError,
    },
    /// The handler contract is bound but something it needs is not: typically an interceptor's abstract dependency.
    #[error("failed to resolve {target}: {source}")]
    DependencyResolution {
        target: &'static str,
        #[source]
        source: ContainerError,
    },
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
    #[error("operation cancelled")]
    Cancelled,
}

impl DispatchError {
    /// Sort a resolution failure for `message`: a missing `contract` binding is an unresolved handler,
    /// anything else is a dependency failure.
    pub(crate) fn from_resolution(message: &'static str, contract: &'static str, source: ContainerError) -> Self {
        match source {
            ContainerError::NotRegistered { contract: missing } if missing == contract => {
                DispatchError::UnresolvedHandler { message, source }
            }
            source => DispatchError::DependencyResolution { target: message, source },
        }
    }

    pub fn is_unresolved_handler(&self) -> bool {
        matches!(self, DispatchError::UnresolvedHandler { .. })
    }
}
