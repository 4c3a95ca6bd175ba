//! Dependency container: register factories by contract type, decorate them, resolve through scopes.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::lifetime::Lifetime;
use crate::scope::{Scope, ScopeFactory, ScopeHandle};
use crate::service::Injectable;
use crate::shape::GenericShape;
use crate::ContainerError;

/// Type-erased `Arc<T>`.
pub(crate) type Erased = Box<dyn Any + Send + Sync>;
pub(crate) type Factory = Arc<dyn Fn(&Scope) -> Result<Erased, ContainerError> + Send + Sync>;
pub(crate) type Decorator = Arc<dyn Fn(&Scope, Erased) -> Result<Erased, ContainerError> + Send + Sync>;

#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) contract: &'static str,
    pub(crate) implementation: &'static str,
    pub(crate) lifetime: Lifetime,
    pub(crate) factory: Factory,
    seq: u64,
}

#[derive(Clone, Copy)]
pub(crate) struct OpenRegistration {
    pub(crate) lifetime: Lifetime,
    seq: u64,
}

/// Build-time state shared by the container and every scope.
#[derive(Default)]
pub(crate) struct Registry {
    services: HashMap<TypeId, Vec<Registration>>,
    open: HashMap<(GenericShape, GenericShape), OpenRegistration>,
    decorators: HashMap<TypeId, Vec<Decorator>>,
    next_seq: u64,
}

impl Registry {
    /// Last registration wins.
    pub(crate) fn latest(&self, contract: TypeId) -> Option<&Registration> {
        self.services.get(&contract).and_then(|all| all.last())
    }

    pub(crate) fn open_lifetime(&self, definition: GenericShape, implementation: GenericShape) -> Option<Lifetime> {
        self.open
            .get(&(definition, implementation))
            .map(|open| open.lifetime)
    }

    pub(crate) fn decorators(&self, contract: TypeId) -> Vec<Decorator> {
        self.decorators.get(&contract).cloned().unwrap_or_default()
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

pub(crate) struct Shared {
    pub(crate) registry: RwLock<Registry>,
    pub(crate) singletons: Mutex<HashMap<TypeId, Erased>>,
    pub(crate) next_scope: AtomicU64,
    pub(crate) live_scopes: AtomicUsize,
}

/// One binding as reported by [`Container::available_services`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceInfo {
    pub contract: &'static str,
    pub implementation: &'static str,
    pub lifetime: Lifetime,
    /// `true` for open-generic registrations; `contract` is then the definition shape.
    pub open: bool,
}

/// Dependency container: register factories by contract type, decorate, resolve through scopes.
///
/// Contracts are any `'static` type, sized or not, so `dyn Trait` contracts resolve as `Arc<dyn Trait>`.
/// Registering a contract again adds a binding; the most recent binding is the one resolved.
/// Registering or decorating after resolution evicts the root scope's and the singleton cache's instance of
/// that contract; scopes begun earlier keep what they already built.
pub struct Container {
    shared: Arc<Shared>,
    root: ScopeHandle,
}

impl Container {
    pub fn new() -> Self {
        let shared = Arc::new(Shared {
            registry: RwLock::new(Registry::default()),
            singletons: Mutex::new(HashMap::new()),
            next_scope: AtomicU64::new(0),
            live_scopes: AtomicUsize::new(0),
        });
        let root = ScopeFactory::new(Arc::clone(&shared)).begin_scope();
        Self { shared, root }
    }

    /// Register a factory for contract `T`.
    pub fn register<T, F>(&mut self, lifetime: Lifetime, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Scope) -> Result<Arc<T>, ContainerError> + Send + Sync + 'static,
    {
        self.register_implementation::<T, F>(type_name::<T>(), lifetime, factory);
    }

    /// Register a factory for contract `T`, recording the implementing type's name for introspection.
    pub fn register_implementation<T, F>(&mut self, implementation: &'static str, lifetime: Lifetime, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Scope) -> Result<Arc<T>, ContainerError> + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |scope: &Scope| {
            let instance = factory(scope)?;
            Ok(Box::new(instance) as Erased)
        });
        let mut registry = self.shared.registry.write();
        let seq = registry.next_seq();
        registry
            .services
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Registration {
                contract: type_name::<T>(),
                implementation,
                lifetime,
                factory,
                seq,
            });
        drop(registry);
        self.invalidate(TypeId::of::<T>());
        tracing::trace!(contract = type_name::<T>(), implementation, ?lifetime, "registered service");
    }

    /// Self-binding: register `T` against itself, built with [`Injectable::inject`].
    pub fn register_injectable<T: Injectable>(&mut self, lifetime: Lifetime) {
        self.register_implementation::<T, _>(type_name::<T>(), lifetime, |scope| Ok(Arc::new(T::inject(scope)?)));
    }

    /// Register a ready-made instance as a singleton.
    pub fn register_instance<T: ?Sized + Send + Sync + 'static>(&mut self, instance: Arc<T>) {
        self.register::<T, _>(Lifetime::Singleton, move |_| Ok(Arc::clone(&instance)));
    }

    /// Register an open-generic implementation against an open contract definition.
    /// Closed requests are mapped to it at resolution time through a [`crate::Specialization`].
    pub fn register_open(&mut self, definition: GenericShape, implementation: GenericShape, lifetime: Lifetime) {
        let mut registry = self.shared.registry.write();
        let seq = registry.next_seq();
        registry
            .open
            .insert((definition, implementation), OpenRegistration { lifetime, seq });
        tracing::trace!(%definition, %implementation, ?lifetime, "registered open generic");
    }

    /// Wrap whatever `T` resolves to. Decorators apply in registration order: the last one is outermost.
    pub fn decorate<T, F>(&mut self, decorator: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Scope, Arc<T>) -> Result<Arc<T>, ContainerError> + Send + Sync + 'static,
    {
        let decorator: Decorator = Arc::new(move |scope: &Scope, inner: Erased| {
            let inner = inner
                .downcast::<Arc<T>>()
                .map_err(|_| ContainerError::TypeMismatch {
                    contract: type_name::<T>(),
                })?;
            let outer = decorator(scope, *inner)?;
            Ok(Box::new(outer) as Erased)
        });
        self.shared
            .registry
            .write()
            .decorators
            .entry(TypeId::of::<T>())
            .or_default()
            .push(decorator);
        self.invalidate(TypeId::of::<T>());
        tracing::trace!(contract = type_name::<T>(), "registered decorator");
    }

    /// Drop instances of `contract` cached before its bindings changed: singletons and the root scope's.
    fn invalidate(&self, contract: TypeId) {
        let stale = self.shared.singletons.lock().remove(&contract);
        drop(stale);
        self.root.forget(contract);
    }

    /// Whether a closed binding exists for `T`.
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.shared
            .registry
            .read()
            .services
            .contains_key(&TypeId::of::<T>())
    }

    /// Number of closed bindings for `T`.
    pub fn registration_count<T: ?Sized + 'static>(&self) -> usize {
        self.shared
            .registry
            .read()
            .services
            .get(&TypeId::of::<T>())
            .map_or(0, Vec::len)
    }

    pub fn is_open_registered(&self, definition: GenericShape, implementation: GenericShape) -> bool {
        self.shared
            .registry
            .read()
            .open_lifetime(definition, implementation)
            .is_some()
    }

    /// Every binding, closed and open, in registration order.
    pub fn available_services(&self) -> Vec<ServiceInfo> {
        let registry = self.shared.registry.read();
        let mut all: Vec<(u64, ServiceInfo)> = registry
            .services
            .values()
            .flatten()
            .map(|r| {
                (
                    r.seq,
                    ServiceInfo {
                        contract: r.contract,
                        implementation: r.implementation,
                        lifetime: r.lifetime,
                        open: false,
                    },
                )
            })
            .chain(registry.open.iter().map(|((definition, implementation), open)| {
                (
                    open.seq,
                    ServiceInfo {
                        contract: definition.name(),
                        implementation: implementation.name(),
                        lifetime: open.lifetime,
                        open: true,
                    },
                )
            }))
            .collect();
        all.sort_by_key(|(seq, _)| *seq);
        all.into_iter().map(|(_, info)| info).collect()
    }

    /// Resolve `T` in the root scope.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ContainerError> {
        self.root.resolve::<T>()
    }

    /// Root scope: lives as long as the container.
    pub fn root(&self) -> &Scope {
        &self.root
    }

    pub fn begin_scope(&self) -> ScopeHandle {
        self.scope_factory().begin_scope()
    }

    pub fn scope_factory(&self) -> ScopeFactory {
        ScopeFactory::new(Arc::clone(&self.shared))
    }

    /// Scopes created from this container and not yet disposed, the root included.
    pub fn live_scopes(&self) -> usize {
        self.shared.live_scopes.load(Ordering::Acquire)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        self.root.dispose_in_place();
        let singletons = std::mem::take(&mut *self.shared.singletons.lock());
        drop(singletons);
    }
}
