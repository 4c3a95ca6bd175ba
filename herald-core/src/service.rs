//! Injection traits: what the container can build, and what a constructor or interceptor can ask for.

use std::sync::Arc;

use crate::container::Container;
use crate::scope::Scope;
use crate::ContainerError;

/// A contract the container hands out as `Arc<Self>`.
///
/// Abstract contracts (`dyn Trait`) implement this with the default, which adds no binding:
///
/// ```ignore
/// impl Service for dyn Clock {}
/// ```
///
/// `#[derive(Injectable)]` implements it for concrete types so they bind themselves (transient) on demand.
pub trait Service: Send + Sync + 'static {
    /// Add a default binding for this contract. Abstract contracts have none.
    fn register_default(_container: &mut Container) {}
}

/// A concrete type the container can build from a scope.
pub trait Injectable: Sized + Send + Sync + 'static {
    fn inject(scope: &Scope) -> Result<Self, ContainerError>;
}

/// A value resolved from a scope for a constructor or interceptor: `Arc<T>` or a tuple of dependencies.
pub trait Dependency: Sized + Send + Sync + 'static {
    fn resolve(scope: &Scope) -> Result<Self, ContainerError>;

    /// Bind missing concrete dependencies. Abstract ones are left for the caller to bind.
    fn register_defaults(container: &mut Container);
}

impl<T: Service + ?Sized> Dependency for Arc<T> {
    fn resolve(scope: &Scope) -> Result<Self, ContainerError> {
        scope.resolve::<T>()
    }

    fn register_defaults(container: &mut Container) {
        if !container.is_registered::<T>() {
            T::register_default(container);
        }
    }
}

impl Dependency for () {
    fn resolve(_scope: &Scope) -> Result<Self, ContainerError> {
        Ok(())
    }

    fn register_defaults(_container: &mut Container) {}
}

// Elements resolve left to right.
macro_rules! tuple_dependency {
    ($($name:ident),+) => {
        impl<$($name: Dependency),+> Dependency for ($($name,)+) {
            fn resolve(scope: &Scope) -> Result<Self, ContainerError> {
                Ok(($($name::resolve(scope)?,)+))
            }

            fn register_defaults(container: &mut Container) {
                $($name::register_defaults(container);)+
            }
        }
    };
}

tuple_dependency!(A);
tuple_dependency!(A, B);
tuple_dependency!(A, B, C);
tuple_dependency!(A, B, C, D);
