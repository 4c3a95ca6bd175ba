//! Interceptors: ordering, dependency injection, short-circuiting and query interception.

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use herald_rs::{
    CancellationToken, CommandExecutor, Container, ContainerError, DispatchError, HandlerRegistry, Lifetime,
    QueryExecutor,
};
use support::{command_catalog, query_catalog, Audit, Clock, FixedClock, Greet, SampleCommand, TracedCommand};

#[tokio::test]
async fn last_registered_interceptor_is_outermost() {
    let mut container = Container::new();
    container
        .register_command_handlers(&command_catalog())
        .register_command_interceptor::<TracedCommand, _>(|command, inner, cancel| {
            Box::pin(async move {
                command.push("first before");
                let result = inner.handle(command, cancel).await;
                command.push("first after");
                result
            })
        })
        .register_command_interceptor::<TracedCommand, _>(|command, inner, cancel| {
            Box::pin(async move {
                command.push("second before");
                let result = inner.handle(command, cancel).await;
                command.push("second after");
                result
            })
        });

    let executor = container.resolve::<CommandExecutor>().unwrap();
    let command = TracedCommand::default();
    executor.execute(&command, &CancellationToken::new()).await.unwrap();
    assert_eq!(
        command.entries(),
        vec!["second before", "first before", "handler", "first after", "second after"]
    );
}

#[tokio::test]
async fn interceptor_can_short_circuit() {
    let mut container = Container::new();
    container
        .register_command_handlers(&command_catalog())
        .register_command_interceptor::<SampleCommand, _>(|_command, _inner, _cancel| {
            Box::pin(async move { Err(DispatchError::Handler("rejected".into())) })
        });

    let executor = container.resolve::<CommandExecutor>().unwrap();
    let command = SampleCommand::default();
    assert!(executor.execute(&command, &CancellationToken::new()).await.is_err());
    assert!(!command.handled.load(Ordering::SeqCst));
}

#[tokio::test]
async fn interceptor_dependencies_are_injected() {
    let mut container = Container::new();
    container.register_instance::<dyn Clock>(Arc::new(FixedClock(42)));
    container.register_injectable::<Audit>(Lifetime::Singleton);
    container
        .register_command_handlers(&command_catalog())
        .register_command_interceptor_with::<SampleCommand, (Arc<dyn Clock>, Arc<Audit>), _>(
            |command, inner, deps, cancel| {
                Box::pin(async move {
                    let (clock, audit) = deps;
                    audit.record(format!("at {}", clock.now()));
                    inner.handle(command, cancel).await
                })
            },
        );

    let executor = container.resolve::<CommandExecutor>().unwrap();
    let command = SampleCommand::default();
    executor.execute(&command, &CancellationToken::new()).await.unwrap();
    assert!(command.handled.load(Ordering::SeqCst));
    assert_eq!(container.resolve::<Audit>().unwrap().entries(), vec!["at 42".to_string()]);
}

#[tokio::test]
async fn concrete_dependencies_are_bound_but_abstract_ones_are_not() {
    let mut container = Container::new();
    container
        .register_command_handlers(&command_catalog())
        .register_command_interceptor_with::<SampleCommand, (Arc<Audit>, Arc<dyn Clock>), _>(
            |command, inner, _deps, cancel| Box::pin(async move { inner.handle(command, cancel).await }),
        );
    assert!(container.is_registered::<Audit>());
    assert!(!container.is_registered::<dyn Clock>());
}

#[tokio::test]
async fn missing_abstract_dependency_fails_at_dispatch() {
    let mut container = Container::new();
    container
        .register_command_handlers(&command_catalog())
        .register_command_interceptor_with::<SampleCommand, Arc<dyn Clock>, _>(|command, inner, _clock, cancel| {
            Box::pin(async move { inner.handle(command, cancel).await })
        });

    let executor = container.resolve::<CommandExecutor>().unwrap();
    let command = SampleCommand::default();
    let err = executor.execute(&command, &CancellationToken::new()).await.err().unwrap();
    match err {
        DispatchError::DependencyResolution {
            source: ContainerError::NotRegistered { contract },
            ..
        } => assert!(contract.contains("Clock")),
        _ => panic!("expected DependencyResolution"),
    }
    assert!(!command.handled.load(Ordering::SeqCst));
}

#[tokio::test]
async fn query_interceptors_can_rewrite_results() {
    let mut container = Container::new();
    container.register_instance::<dyn Clock>(Arc::new(FixedClock(7)));
    container
        .register_query_handlers(&query_catalog())
        .register_query_interceptor::<Greet, _>(|query, inner, cancel| {
            Box::pin(async move { Ok(inner.handle(query, cancel).await?.to_uppercase()) })
        })
        .register_query_interceptor_with::<Greet, Arc<dyn Clock>, _>(|query, inner, clock, cancel| {
            Box::pin(async move {
                let greeting = inner.handle(query, cancel).await?;
                Ok(format!("{greeting} @{}", clock.now()))
            })
        });

    let executor = container.resolve::<QueryExecutor>().unwrap();
    let query = Greet {
        name: "herald".to_string(),
    };
    let cancel = CancellationToken::new();
    assert_eq!(executor.execute(&query, &cancel).await.unwrap(), "HELLO HERALD @7");
}

#[tokio::test]
async fn auto_bound_dependency_reaches_the_interceptor() {
    let mut container = Container::new();
    container
        .register_command_handlers(&command_catalog())
        .register_command_interceptor_with::<TracedCommand, Arc<Audit>, _>(|command, inner, audit, cancel| {
            Box::pin(async move {
                audit.record("seen".to_string());
                if audit.entries() == vec!["seen".to_string()] {
                    command.push("audited");
                }
                inner.handle(command, cancel).await
            })
        });
    let services = container.available_services();
    let audit = services.iter().find(|s| s.contract.ends_with("Audit")).unwrap();
    assert_eq!(audit.lifetime, Lifetime::Transient);

    let executor = container.resolve::<CommandExecutor>().unwrap();
    let command = TracedCommand::default();
    executor.execute(&command, &CancellationToken::new()).await.unwrap();
    assert_eq!(command.entries(), vec!["audited", "handler"]);
}

#[tokio::test]
async fn query_interceptors_never_bind_abstract_dependencies() {
    let mut container = Container::new();
    container
        .register_query_handlers(&query_catalog())
        .register_query_interceptor_with::<Greet, (Arc<Audit>, Arc<dyn Clock>), _>(|query, inner, _deps, cancel| {
            Box::pin(async move { inner.handle(query, cancel).await })
        });
    assert!(container.is_registered::<Audit>());
    assert!(!container.is_registered::<dyn Clock>());

    let executor = container.resolve::<QueryExecutor>().unwrap();
    let query = Greet {
        name: "herald".to_string(),
    };
    match executor.execute(&query, &CancellationToken::new()).await {
        Err(DispatchError::DependencyResolution {
            source: ContainerError::NotRegistered { contract },
            ..
        }) => assert!(contract.contains("Clock")),
        _ => panic!("expected DependencyResolution"),
    }
}

#[tokio::test]
async fn query_interceptor_receives_a_tuple_of_dependencies() {
    let mut container = Container::new();
    container.register_instance::<dyn Clock>(Arc::new(FixedClock(9)));
    container.register_injectable::<Audit>(Lifetime::Singleton);
    container
        .register_query_handlers(&query_catalog())
        .register_query_interceptor_with::<Greet, (Arc<dyn Clock>, Arc<Audit>), _>(|query, inner, deps, cancel| {
            Box::pin(async move {
                let (clock, audit) = deps;
                let greeting = inner.handle(query, cancel).await?;
                audit.record(greeting.clone());
                Ok(format!("{greeting} #{}", clock.now()))
            })
        });

    let executor = container.resolve::<QueryExecutor>().unwrap();
    let query = Greet {
        name: "herald".to_string(),
    };
    assert_eq!(executor.execute(&query, &CancellationToken::new()).await.unwrap(), "hello herald #9");
    assert_eq!(container.resolve::<Audit>().unwrap().entries(), vec!["hello herald".to_string()]);
}
