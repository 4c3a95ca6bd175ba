//! Generic shapes: identify a generic type definition independent of its type arguments.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::scope::Scope;
use crate::ContainerError;

/// Identity of a generic type definition, e.g. `app::Handler` for both `app::Handler<A>` and `app::Handler<B>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenericShape(&'static str);

impl GenericShape {
    pub fn of<T: ?Sized>() -> Self {
        let name = type_name::<T>();
        Self(name.split_once('<').map_or(name, |(head, _)| head))
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for GenericShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Placeholder type argument used to name an open generic definition, e.g. `MyHandler<Open>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Open;

/// Closes one open registration over a concrete contract `T`.
///
/// The container only uses `factory` when an open registration for
/// `(definition, implementation)` exists; otherwise resolution of `T` fails as unregistered.
pub struct Specialization<T: ?Sized> {
    definition: GenericShape,
    implementation: GenericShape,
    factory: fn(&Scope) -> Result<Arc<T>, ContainerError>,
}

impl<T: ?Sized> Specialization<T> {
    pub fn new(
        definition: GenericShape,
        implementation: GenericShape,
        factory: fn(&Scope) -> Result<Arc<T>, ContainerError>,
    ) -> Self {
        Self {
            definition,
            implementation,
            factory,
        }
    }

    pub fn definition(&self) -> GenericShape {
        self.definition
    }

    pub fn implementation(&self) -> GenericShape {
        self.implementation
    }

    pub(crate) fn create(&self, scope: &Scope) -> Result<Arc<T>, ContainerError> {
        (self.factory)(scope)
    }
}

impl<T: ?Sized> Clone for Specialization<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Specialization<T> {}

impl<T: ?Sized> fmt::Debug for Specialization<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specialization")
            .field("definition", &self.definition)
            .field("implementation", &self.implementation)
            .finish()
    }
}
