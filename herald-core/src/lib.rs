//! Herald core: dependency container with lifetimes, scopes, decoration and open-generic specialization.

pub mod container;
pub mod lifetime;
pub mod scope;
pub mod service;
pub mod shape;

pub use container::{Container, ServiceInfo};
pub use lifetime::Lifetime;
pub use scope::{Scope, ScopeFactory, ScopeHandle};
pub use service::{Dependency, Injectable, Service};
pub use shape::{GenericShape, Open, Specialization};

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("no registration for {contract}")]
    NotRegistered { contract: &'static str },
    #[error("scope {scope} has been disposed")]
    ScopeDisposed { scope: u64 },
    #[error("instance registered for {contract} has a different type")]
    TypeMismatch { contract: &'static str },
    #[error("factory for {contract} failed: {source}")]
    Factory {
        contract: &'static str,
        #[source]
        source: BoxError,
    },
}

impl ContainerError {
    /// Wrap a custom factory failure.
    pub fn factory<T: ?Sized>(source: impl Into<BoxError>) -> Self {
        ContainerError::Factory {
            contract: std::any::type_name::<T>(),
            source: source.into(),
        }
    }
}
