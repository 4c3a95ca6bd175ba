//! Example: orders bounded context with an audit interceptor and scoped dispatch.
//!
//! Run with `RUST_LOG=herald_rs=debug,herald_core=debug cargo run --example orders`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use herald_rs::{
    CancellationToken, Command, CommandExecutor, CommandHandler, Container, Discoverable, DispatchError,
    HandlerDescriptor, HandlerRegistry, Injectable, Lifetime, Query, QueryExecutor, QueryHandler, RegistryOptions,
    Service, TypeCatalog,
};
use tracing_subscriber::EnvFilter;

trait OrderRepository: Send + Sync {
    fn save(&self, order_id: &str, status: &str);
    fn status(&self, order_id: &str) -> Option<String>;
}

impl Service for dyn OrderRepository {}

#[derive(Default)]
struct InMemoryOrders {
    orders: Mutex<HashMap<String, String>>,
}

impl OrderRepository for InMemoryOrders {
    fn save(&self, order_id: &str, status: &str) {
        if let Ok(mut orders) = self.orders.lock() {
            orders.insert(order_id.to_string(), status.to_string());
        }
    }

    fn status(&self, order_id: &str) -> Option<String> {
        self.orders.lock().ok()?.get(order_id).cloned()
    }
}

#[derive(Debug, Command)]
struct CreateOrder {
    order_id: String,
}

#[derive(Debug, Query)]
#[query(result = Option<String>)]
struct GetOrder {
    order_id: String,
}

#[derive(Injectable)]
struct CreateOrderHandler {
    orders: Arc<dyn OrderRepository>,
}

#[async_trait]
impl CommandHandler<CreateOrder> for CreateOrderHandler {
    async fn handle(&self, command: &CreateOrder, cancel: &CancellationToken) -> Result<(), DispatchError> {
        if cancel.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }
        self.orders.save(&command.order_id, "created");
        Ok(())
    }
}

impl Discoverable for CreateOrderHandler {
    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![HandlerDescriptor::command::<CreateOrder, Self>()]
    }
}

#[derive(Injectable)]
struct GetOrderHandler {
    orders: Arc<dyn OrderRepository>,
}

#[async_trait]
impl QueryHandler<GetOrder> for GetOrderHandler {
    async fn handle(&self, query: &GetOrder, _cancel: &CancellationToken) -> Result<Option<String>, DispatchError> {
        Ok(self.orders.status(&query.order_id))
    }
}

impl Discoverable for GetOrderHandler {
    fn handler_contracts() -> Vec<HandlerDescriptor> {
        vec![HandlerDescriptor::query::<GetOrder, Self>()]
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let catalog = TypeCatalog::new()
        .with::<CreateOrderHandler>()
        .with::<GetOrderHandler>();

    let mut container = Container::new();
    container.register_instance::<dyn OrderRepository>(Arc::new(InMemoryOrders::default()));
    container
        .register_command_handlers_with(&catalog, RegistryOptions::with_lifetime(Lifetime::Scoped))
        .register_query_handlers(&catalog)
        .register_command_interceptor::<CreateOrder, _>(|command, inner, cancel| {
            Box::pin(async move {
                tracing::info!(?command, "audit: before");
                let result = inner.handle(command, cancel).await;
                tracing::info!(ok = result.is_ok(), "audit: after");
                result
            })
        });

    for service in container.available_services() {
        let lifetime = format!("{:?}", service.lifetime);
        println!("{lifetime:<10} {} -> {}", service.contract, service.implementation);
    }

    let cancel = CancellationToken::new();
    let commands = container.resolve::<CommandExecutor>()?;
    commands
        .execute_scoped(
            &CreateOrder {
                order_id: "A-1".to_string(),
            },
            &cancel,
        )
        .await?;

    let queries = container.resolve::<QueryExecutor>()?;
    let status = queries
        .execute(
            &GetOrder {
                order_id: "A-1".to_string(),
            },
            &cancel,
        )
        .await?;
    println!("order A-1: {}", status.as_deref().unwrap_or("unknown"));
    Ok(())
}
