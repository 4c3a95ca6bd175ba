//! Scopes: units of work that own scoped instances and resolve through the shared registry.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::container::{Erased, Shared};
use crate::lifetime::Lifetime;
use crate::shape::Specialization;
use crate::ContainerError;

struct ScopeInner {
    id: u64,
    shared: Arc<Shared>,
    instances: Mutex<HashMap<TypeId, Erased>>,
    disposed: AtomicBool,
}

/// Resolver bound to one scope. Cheap to clone; clones share the same scoped instances.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

enum Source<'a, T: ?Sized> {
    Registered(crate::container::Factory),
    Specialized(&'a Specialization<T>),
}

impl Scope {
    fn new(shared: Arc<Shared>) -> Self {
        let id = shared.next_scope.fetch_add(1, Ordering::Relaxed);
        shared.live_scopes.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(scope = id, "scope started");
        Self {
            inner: Arc::new(ScopeInner {
                id,
                shared,
                instances: Mutex::new(HashMap::new()),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Resolve the most recent binding of `T`, applying its decorators.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ContainerError> {
        self.resolve_or_specialize::<T>(None)
    }

    /// Resolve `T`; when no closed binding exists, fall back to the open registration named by `specialization`.
    pub fn resolve_or_specialize<T: ?Sized + Send + Sync + 'static>(
        &self,
        specialization: Option<&Specialization<T>>,
    ) -> Result<Arc<T>, ContainerError> {
        if self.is_disposed() {
            return Err(ContainerError::ScopeDisposed { scope: self.id() });
        }
        let contract_id = TypeId::of::<T>();
        let contract = type_name::<T>();

        let (lifetime, source, decorators) = {
            let registry = self.inner.shared.registry.read();
            let decorators = registry.decorators(contract_id);
            match registry.latest(contract_id) {
                Some(registration) => (
                    registration.lifetime,
                    Source::Registered(Arc::clone(&registration.factory)),
                    decorators,
                ),
                None => {
                    let open = specialization.and_then(|s| {
                        registry
                            .open_lifetime(s.definition(), s.implementation())
                            .map(|lifetime| (lifetime, s))
                    });
                    match open {
                        Some((lifetime, s)) => (lifetime, Source::Specialized(s), decorators),
                        None => return Err(ContainerError::NotRegistered { contract }),
                    }
                }
            }
        };

        let cache = match lifetime {
            Lifetime::Transient => None,
            Lifetime::Scoped => Some(&self.inner.instances),
            Lifetime::Singleton => Some(&self.inner.shared.singletons),
        };
        if let Some(cache) = cache {
            if let Some(hit) = cache.lock().get(&contract_id) {
                return downcast::<T>(hit);
            }
        }

        // Factories and decorators run unlocked so they can resolve their own dependencies.
        let mut instance: Erased = match source {
            Source::Registered(factory) => factory(self)?,
            Source::Specialized(s) => Box::new(s.create(self)?) as Erased,
        };
        for decorator in &decorators {
            instance = decorator(self, instance)?;
        }
        tracing::trace!(scope = self.id(), contract, ?lifetime, decorators = decorators.len(), "created instance");

        match cache {
            Some(cache) => {
                let mut cache = cache.lock();
                // `dispose` flags the scope before draining it; anything inserted after that would never be released.
                if lifetime == Lifetime::Scoped && self.is_disposed() {
                    drop(cache);
                    drop(instance);
                    return Err(ContainerError::ScopeDisposed { scope: self.id() });
                }
                let cached = cache.entry(contract_id).or_insert(instance);
                downcast::<T>(cached)
            }
            None => instance
                .downcast::<Arc<T>>()
                .map(|arc| *arc)
                .map_err(|_| ContainerError::TypeMismatch { contract }),
        }
    }

    /// Begin a sibling scope on the same container.
    pub fn begin_scope(&self) -> ScopeHandle {
        self.scope_factory().begin_scope()
    }

    pub fn scope_factory(&self) -> ScopeFactory {
        ScopeFactory::new(Arc::clone(&self.inner.shared))
    }

    /// Drop the cached instance of `contract`, if any, so the next resolution rebuilds it.
    pub(crate) fn forget(&self, contract: TypeId) {
        let stale = self.inner.instances.lock().remove(&contract);
        drop(stale);
    }

    /// Release every scoped instance. Returns `false` when already disposed.
    fn dispose(&self) -> bool {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        let released = std::mem::take(&mut *self.inner.instances.lock());
        self.inner.shared.live_scopes.fetch_sub(1, Ordering::AcqRel);
        tracing::debug!(scope = self.id(), released = released.len(), "scope disposed");
        drop(released);
        true
    }
}

fn downcast<T: ?Sized + 'static>(erased: &Erased) -> Result<Arc<T>, ContainerError> {
    erased
        .downcast_ref::<Arc<T>>()
        .map(Arc::clone)
        .ok_or(ContainerError::TypeMismatch {
            contract: type_name::<T>(),
        })
}

/// Owns one scope and disposes it exactly once: on [`ScopeHandle::dispose`] or on drop.
pub struct ScopeHandle {
    scope: Scope,
}

impl ScopeHandle {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn dispose(self) {
        self.dispose_in_place();
    }

    pub(crate) fn dispose_in_place(&self) {
        self.scope.dispose();
    }
}

impl Deref for ScopeHandle {
    type Target = Scope;

    fn deref(&self) -> &Scope {
        &self.scope
    }
}

impl Drop for ScopeHandle {
    fn drop(&mut self) {
        self.scope.dispose();
    }
}

/// Creates scopes on one container. Cheap to clone.
#[derive(Clone)]
pub struct ScopeFactory {
    shared: Arc<Shared>,
}

impl ScopeFactory {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub fn begin_scope(&self) -> ScopeHandle {
        ScopeHandle {
            scope: Scope::new(Arc::clone(&self.shared)),
        }
    }
}
