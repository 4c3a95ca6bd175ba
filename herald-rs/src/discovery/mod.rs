//! Discovery: candidate types in, handler descriptors out.

mod descriptor;

pub use descriptor::{open_command_handler, open_query_handler, ContractType, HandlerDescriptor, HandlerKind};

use std::any::TypeId;

/// A type offered to handler discovery.
///
/// Handlers list the contracts they implement; other types (dependencies, abstract contracts) list none.
pub trait Discoverable: 'static {
    /// `false` for abstract contracts and other types the container cannot build.
    const INSTANTIABLE: bool = true;

    fn handler_contracts() -> Vec<HandlerDescriptor>;
}

#[derive(Clone)]
struct Candidate {
    type_id: TypeId,
    instantiable: bool,
    contracts: fn() -> Vec<HandlerDescriptor>,
}

/// Set of candidate types to scan, e.g. every handler of one bounded context.
#[derive(Clone, Default)]
pub struct TypeCatalog {
    candidates: Vec<Candidate>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate type. Adding the same type twice keeps the first entry.
    pub fn with<T: Discoverable + ?Sized>(mut self) -> Self {
        self.add::<T>();
        self
    }

    pub fn add<T: Discoverable + ?Sized>(&mut self) -> &mut Self {
        let type_id = TypeId::of::<T>();
        if !self.candidates.iter().any(|c| c.type_id == type_id) {
            self.candidates.push(Candidate {
                type_id,
                instantiable: T::INSTANTIABLE,
                contracts: T::handler_contracts,
            });
        }
        self
    }

    /// Every candidate of `other` not already present, in order.
    pub fn merge(mut self, other: &TypeCatalog) -> Self {
        for candidate in &other.candidates {
            if !self.candidates.iter().any(|c| c.type_id == candidate.type_id) {
                self.candidates.push(candidate.clone());
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Descriptors of every instantiable candidate: catalog order, then each type's contract order.
    pub fn handler_descriptors(&self) -> Vec<HandlerDescriptor> {
        self.candidates
            .iter()
            .filter(|c| c.instantiable)
            .flat_map(|c| (c.contracts)())
            .collect()
    }

    pub fn command_handler_descriptors(&self) -> Vec<HandlerDescriptor> {
        self.descriptors_of(HandlerKind::Command)
    }

    pub fn query_handler_descriptors(&self) -> Vec<HandlerDescriptor> {
        self.descriptors_of(HandlerKind::Query)
    }

    fn descriptors_of(&self, kind: HandlerKind) -> Vec<HandlerDescriptor> {
        self.handler_descriptors()
            .into_iter()
            .filter(|d| d.kind() == kind)
            .collect()
    }
}
