//! Handler descriptors: which contract an implementing type is registered against.

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use herald_core::{Container, ContainerError, GenericShape, Injectable, Lifetime, Open, Scope, Specialization};

use crate::ddd::{Command, CommandHandler, Query, QueryHandler};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Command,
    Query,
}

/// Contract a handler is registered against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractType {
    /// `CommandHandler<Concrete>` / `QueryHandler<Concrete>`.
    Closed { type_id: TypeId, name: &'static str },
    /// The unparameterized handler contract; specialized per message type at resolution time.
    Open { definition: GenericShape },
}

/// `{ contract, implementing type }` pair produced by discovery.
#[derive(Clone)]
pub struct HandlerDescriptor {
    kind: HandlerKind,
    contract: ContractType,
    implementing: &'static str,
    shape: GenericShape,
    install: fn(&mut Container, Lifetime),
}

pub(crate) fn command_handler_definition() -> GenericShape {
    GenericShape::of::<dyn CommandHandler<Open>>()
}

pub(crate) fn query_handler_definition() -> GenericShape {
    GenericShape::of::<dyn QueryHandler<Open>>()
}

impl HandlerDescriptor {
    /// `H` handles the concrete command `C`.
    pub fn command<C, H>() -> Self
    where
        C: Command,
        H: CommandHandler<C> + Injectable,
    {
        Self {
            kind: HandlerKind::Command,
            contract: ContractType::Closed {
                type_id: TypeId::of::<dyn CommandHandler<C>>(),
                name: type_name::<dyn CommandHandler<C>>(),
            },
            implementing: type_name::<H>(),
            shape: GenericShape::of::<H>(),
            install: install_command::<C, H>,
        }
    }

    /// `H` handles the concrete query `Q`.
    pub fn query<Q, H>() -> Self
    where
        Q: Query,
        H: QueryHandler<Q> + Injectable,
    {
        Self {
            kind: HandlerKind::Query,
            contract: ContractType::Closed {
                type_id: TypeId::of::<dyn QueryHandler<Q>>(),
                name: type_name::<dyn QueryHandler<Q>>(),
            },
            implementing: type_name::<H>(),
            shape: GenericShape::of::<H>(),
            install: install_query::<Q, H>,
        }
    }

    /// `H` is a generic command handler named with placeholder arguments, e.g. `MyHandler<Open>`.
    /// Commands reach it through their `open_handler` hook.
    pub fn open_command<H: ?Sized + 'static>() -> Self {
        Self {
            kind: HandlerKind::Command,
            contract: ContractType::Open {
                definition: command_handler_definition(),
            },
            implementing: type_name::<H>(),
            shape: GenericShape::of::<H>(),
            install: install_open_command::<H>,
        }
    }

    /// `H` is a generic query handler named with placeholder arguments.
    pub fn open_query<H: ?Sized + 'static>() -> Self {
        Self {
            kind: HandlerKind::Query,
            contract: ContractType::Open {
                definition: query_handler_definition(),
            },
            implementing: type_name::<H>(),
            shape: GenericShape::of::<H>(),
            install: install_open_query::<H>,
        }
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    pub fn contract(&self) -> ContractType {
        self.contract
    }

    pub fn implementing_type(&self) -> &'static str {
        self.implementing
    }

    pub fn implementing_shape(&self) -> GenericShape {
        self.shape
    }

    pub fn is_open(&self) -> bool {
        matches!(self.contract, ContractType::Open { .. })
    }

    /// Register the implementing type against the contract with `lifetime`.
    pub fn register(&self, container: &mut Container, lifetime: Lifetime) {
        (self.install)(container, lifetime);
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("kind", &self.kind)
            .field("contract", &self.contract)
            .field("implementing", &self.implementing)
            .finish()
    }
}

fn install_command<C, H>(container: &mut Container, lifetime: Lifetime)
where
    C: Command,
    H: CommandHandler<C> + Injectable,
{
    container.register_implementation::<dyn CommandHandler<C>, _>(type_name::<H>(), lifetime, |scope| {
        let handler: Arc<dyn CommandHandler<C>> = Arc::new(H::inject(scope)?);
        Ok(handler)
    });
}

fn install_query<Q, H>(container: &mut Container, lifetime: Lifetime)
where
    Q: Query,
    H: QueryHandler<Q> + Injectable,
{
    container.register_implementation::<dyn QueryHandler<Q>, _>(type_name::<H>(), lifetime, |scope| {
        let handler: Arc<dyn QueryHandler<Q>> = Arc::new(H::inject(scope)?);
        Ok(handler)
    });
}

fn install_open_command<H: ?Sized + 'static>(container: &mut Container, lifetime: Lifetime) {
    container.register_open(command_handler_definition(), GenericShape::of::<H>(), lifetime);
}

fn install_open_query<H: ?Sized + 'static>(container: &mut Container, lifetime: Lifetime) {
    container.register_open(query_handler_definition(), GenericShape::of::<H>(), lifetime);
}

/// Specialization for command `C` serviced by the open handler definition `H`.
/// Returned from [`Command::open_handler`]; `#[command(handler = H)]` writes it for you.
pub fn open_command_handler<C, H>() -> Specialization<dyn CommandHandler<C>>
where
    C: Command,
    H: CommandHandler<C> + Injectable,
{
    Specialization::new(command_handler_definition(), GenericShape::of::<H>(), specialize_command::<C, H>)
}

/// Specialization for query `Q` serviced by the open handler definition `H`.
pub fn open_query_handler<Q, H>() -> Specialization<dyn QueryHandler<Q>>
where
    Q: Query,
    H: QueryHandler<Q> + Injectable,
{
    Specialization::new(query_handler_definition(), GenericShape::of::<H>(), specialize_query::<Q, H>)
}

fn specialize_command<C, H>(scope: &Scope) -> Result<Arc<dyn CommandHandler<C>>, ContainerError>
where
    C: Command,
    H: CommandHandler<C> + Injectable,
{
    let handler: Arc<dyn CommandHandler<C>> = Arc::new(H::inject(scope)?);
    Ok(handler)
}

fn specialize_query<Q, H>(scope: &Scope) -> Result<Arc<dyn QueryHandler<Q>>, ContainerError>
where
    Q: Query,
    H: QueryHandler<Q> + Injectable,
{
    let handler: Arc<dyn QueryHandler<Q>> = Arc::new(H::inject(scope)?);
    Ok(handler)
}
