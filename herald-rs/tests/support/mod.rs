#![allow(dead_code)]

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use herald_rs::{
    CancellationToken, Command, CommandHandler, Discoverable, DispatchError, HandlerDescriptor, Injectable,
    IntoDispatchError, Query, QueryHandler, Service, TypeCatalog,
};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Command, Default)]
pub struct SampleCommand {
    pub handled: AtomicBool,
    pub calls: AtomicUsize,
}

#[derive(Injectable)]
pub struct SampleCommandHandler;

#[async_trait]
impl CommandHandler<SampleCommand> for SampleCommandHandler {
    async fn handle(&self, command: &SampleCommand, _cancel: &CancellationToken) -> Result<(), DispatchError> {
        command.calls.fetch_add(1, Ordering::SeqCst);
        command.handled.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Discoverable for SampleCommandHandler {
    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![HandlerDescriptor::command::<SampleCommand, Self>()]
    }
}

/// Command nobody handles.
#[derive(Command, Default)]
pub struct UnknownCommand;

/// Records the order in which interceptors and the handler ran.
#[derive(Command, Default)]
pub struct TracedCommand {
    pub log: Mutex<Vec<&'static str>>,
}

impl TracedCommand {
    pub fn push(&self, entry: &'static str) {
        self.log.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().clone()
    }
}

#[derive(Injectable)]
pub struct TracedCommandHandler;

#[async_trait]
impl CommandHandler<TracedCommand> for TracedCommandHandler {
    async fn handle(&self, command: &TracedCommand, _cancel: &CancellationToken) -> Result<(), DispatchError> {
        command.push("handler");
        Ok(())
    }
}

impl Discoverable for TracedCommandHandler {
    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![HandlerDescriptor::command::<TracedCommand, Self>()]
    }
}

/// Waits for cancellation.
#[derive(Command, Default)]
pub struct Stall;

#[derive(Injectable)]
pub struct StallHandler;

#[async_trait]
impl CommandHandler<Stall> for StallHandler {
    async fn handle(&self, _command: &Stall, cancel: &CancellationToken) -> Result<(), DispatchError> {
        cancel.cancelled().await;
        Err(DispatchError::Cancelled)
    }
}

impl Discoverable for StallHandler {
    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![HandlerDescriptor::command::<Stall, Self>()]
    }
}

#[derive(Debug, thiserror::Error)]
#[error("order {0} is out of stock")]
pub struct OutOfStock(pub u32);

#[derive(Command)]
pub struct PlaceOrder {
    pub order_id: u32,
    pub in_stock: bool,
}

#[derive(Injectable)]
pub struct PlaceOrderHandler;

#[async_trait]
impl CommandHandler<PlaceOrder> for PlaceOrderHandler {
    async fn handle(&self, command: &PlaceOrder, cancel: &CancellationToken) -> Result<(), DispatchError> {
        if cancel.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }
        if !command.in_stock {
            return Err(OutOfStock(command.order_id).into_dispatch_error());
        }
        Ok(())
    }
}

impl Discoverable for PlaceOrderHandler {
    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![HandlerDescriptor::command::<PlaceOrder, Self>()]
    }
}

#[derive(Query)]
#[query(result = String)]
pub struct Greet {
    pub name: String,
}

#[derive(Injectable)]
pub struct GreetHandler;

#[async_trait]
impl QueryHandler<Greet> for GreetHandler {
    async fn handle(&self, query: &Greet, _cancel: &CancellationToken) -> Result<String, DispatchError> {
        Ok(format!("hello {}", query.name))
    }
}

impl Discoverable for GreetHandler {
    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![HandlerDescriptor::query::<Greet, Self>()]
    }
}

/// Query nobody handles.
#[derive(Query)]
#[query(result = u32)]
pub struct UnknownQuery;

/// Clock abstraction: never bound by default.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

impl Service for dyn Clock {}

pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

/// Concrete dependency: bound transient on demand.
#[derive(Injectable, Default)]
pub struct Audit {
    #[inject(default)]
    pub entries: Mutex<Vec<String>>,
}

impl Audit {
    pub fn record(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

/// Scoped resource; the handler below reports a weak reference to it.
#[derive(Injectable)]
pub struct Connection {
    #[inject(default)]
    pub opened: AtomicBool,
}

#[derive(Command, Default)]
pub struct UseConnection {
    pub fail: bool,
    pub seen: Mutex<Option<Weak<Connection>>>,
}

impl UseConnection {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn connection(&self) -> Option<Arc<Connection>> {
        self.seen.lock().unwrap().as_ref().and_then(Weak::upgrade)
    }
}

#[derive(Injectable)]
pub struct UseConnectionHandler {
    connection: Arc<Connection>,
}

#[async_trait]
impl CommandHandler<UseConnection> for UseConnectionHandler {
    async fn handle(&self, command: &UseConnection, _cancel: &CancellationToken) -> Result<(), DispatchError> {
        self.connection.opened.store(true, Ordering::SeqCst);
        *command.seen.lock().unwrap() = Some(Arc::downgrade(&self.connection));
        if command.fail {
            return Err(DispatchError::Handler("connection reset".into()));
        }
        Ok(())
    }
}

impl Discoverable for UseConnectionHandler {
    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![HandlerDescriptor::command::<UseConnection, Self>()]
    }
}

/// Command generic over its payload, serviced by one open handler definition.
#[derive(Command)]
#[command(handler = GenericCommandHandler<T>)]
pub struct GenericCommand<T> {
    pub payload: T,
    pub handled_by: Mutex<Option<&'static str>>,
}

impl<T> GenericCommand<T> {
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            handled_by: Mutex::new(None),
        }
    }

    pub fn handled_by(&self) -> Option<&'static str> {
        *self.handled_by.lock().unwrap()
    }
}

#[derive(Injectable)]
pub struct GenericCommandHandler<T> {
    #[inject(default)]
    _payload: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T: Send + Sync + 'static> CommandHandler<GenericCommand<T>> for GenericCommandHandler<T> {
    async fn handle(&self, command: &GenericCommand<T>, _cancel: &CancellationToken) -> Result<(), DispatchError> {
        *command.handled_by.lock().unwrap() = Some(std::any::type_name::<T>());
        Ok(())
    }
}

impl<T: Send + Sync + 'static> Discoverable for GenericCommandHandler<T> {
    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![HandlerDescriptor::open_command::<Self>()]
    }
}

/// Closed handler for one instantiation of `GenericCommand`; wins over the open definition.
#[derive(Injectable)]
pub struct U16CommandHandler;

#[async_trait]
impl CommandHandler<GenericCommand<u16>> for U16CommandHandler {
    async fn handle(&self, command: &GenericCommand<u16>, _cancel: &CancellationToken) -> Result<(), DispatchError> {
        *command.handled_by.lock().unwrap() = Some("closed u16");
        Ok(())
    }
}

impl Discoverable for U16CommandHandler {
    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![HandlerDescriptor::command::<GenericCommand<u16>, Self>()]
    }
}

/// Query generic over its key, serviced by one open handler definition.
#[derive(Query)]
#[query(result = String, handler = DescribeHandler<K>)]
pub struct Describe<K: std::fmt::Debug> {
    pub key: K,
}

#[derive(Injectable)]
pub struct DescribeHandler<K> {
    #[inject(default)]
    _key: PhantomData<fn() -> K>,
}

#[async_trait]
impl<K: std::fmt::Debug + Send + Sync + 'static> QueryHandler<Describe<K>> for DescribeHandler<K> {
    async fn handle(&self, query: &Describe<K>, _cancel: &CancellationToken) -> Result<String, DispatchError> {
        Ok(format!("{:?}", query.key))
    }
}

impl<K: std::fmt::Debug + Send + Sync + 'static> Discoverable for DescribeHandler<K> {
    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![HandlerDescriptor::open_query::<Self>()]
    }
}

/// Handles a command and a query: discovered as two descriptors.
#[derive(Injectable)]
pub struct ReportingHandler;

#[async_trait]
impl CommandHandler<SampleCommand> for ReportingHandler {
    async fn handle(&self, command: &SampleCommand, _cancel: &CancellationToken) -> Result<(), DispatchError> {
        command.handled.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl QueryHandler<Greet> for ReportingHandler {
    async fn handle(&self, query: &Greet, _cancel: &CancellationToken) -> Result<String, DispatchError> {
        Ok(format!("report for {}", query.name))
    }
}

impl Discoverable for ReportingHandler {
    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![
            HandlerDescriptor::command::<SampleCommand, Self>(),
            HandlerDescriptor::query::<Greet, Self>(),
        ]
    }
}

/// Abstract candidate: discovery skips it whatever it reports.
pub trait AbstractHandler: Send + Sync {}

impl Discoverable for dyn AbstractHandler {
    const INSTANTIABLE: bool = false;

    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![HandlerDescriptor::command::<SampleCommand, SampleCommandHandler>()]
    }
}

pub fn command_catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with::<SampleCommandHandler>()
        .with::<TracedCommandHandler>()
        .with::<PlaceOrderHandler>()
        .with::<UseConnectionHandler>()
        .with::<StallHandler>()
}

pub fn query_catalog() -> TypeCatalog {
    TypeCatalog::new().with::<GreetHandler>()
}
