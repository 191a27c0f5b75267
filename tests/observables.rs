mod custom_error;
mod generate_observable;
mod register_emissions;

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use custom_error::CustomError;
use generate_observable::generate_u32_observable;
use register_emissions::register_emissions_handlers;
use rxcore::{
    subscribe::{Handlers, Teardown},
    Observable, Observer, StreamError, Subscribeable, Unsubscribeable,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[test]
fn from_delivers_values_then_completes() {
    init_tracing();
    let (handlers, emissions) = register_emissions_handlers();

    let teardowns = Arc::new(Mutex::new(0));
    let teardowns_c = Arc::clone(&teardowns);
    let source = Observable::from([1, 2, 3]);

    // Forward `from` through an outer producer so its teardown can be counted.
    let observable = Observable::new(move |o| {
        let o = Arc::new(Mutex::new(o));
        let o_next = Arc::clone(&o);
        let o_complete = Arc::clone(&o);
        let inner = source.subscribe(
            Handlers::new()
                .on_next(move |v| o_next.lock().unwrap().next(v))
                .on_complete(move || o_complete.lock().unwrap().complete()),
        );
        let teardowns = Arc::clone(&teardowns_c);
        Teardown::logic(move || {
            inner.unsubscribe();
            *teardowns.lock().unwrap() += 1;
        })
    });

    let subscription = observable.subscribe(handlers);

    assert_eq!(emissions.nexts(), vec![1, 2, 3]);
    assert_eq!(emissions.completes(), 1);
    assert!(emissions.errors().is_empty());
    assert_eq!(*teardowns.lock().unwrap(), 1);

    subscription.unsubscribe();
    assert_eq!(*teardowns.lock().unwrap(), 1);
}

#[test]
fn error_ends_the_subscription() {
    init_tracing();
    let (handlers, emissions) = register_emissions_handlers();

    let observable = Observable::new(|mut o| {
        o.next(1);
        o.error(StreamError::message("x").into_value());
        o.next(2);
        Teardown::Nil
    });
    let subscription = observable.subscribe(handlers);

    assert_eq!(emissions.nexts(), vec![1]);
    assert_eq!(emissions.errors(), vec!["x".to_string()]);
    assert_eq!(emissions.completes(), 0);
    assert!(subscription.is_unsubscribed());
}

#[test]
fn custom_error_reaches_handler() {
    let (handlers, emissions) = register_emissions_handlers();

    Observable::new(|mut o| {
        o.fail(CustomError);
        o.complete();
        Teardown::Nil
    })
    .subscribe(handlers);

    assert_eq!(emissions.errors(), vec!["Custom error occurred".to_string()]);
    assert_eq!(emissions.completes(), 0);
}

#[test]
fn error_value_is_shared_across_subscriptions() {
    let error = StreamError::message("shared").into_value();
    let observable: Observable<u32> = Observable::failed(error);

    let (first, first_emissions) = register_emissions_handlers();
    let (second, second_emissions) = register_emissions_handlers();
    observable.subscribe(first);
    observable.subscribe(second);

    assert_eq!(first_emissions.errors(), vec!["shared".to_string()]);
    assert_eq!(second_emissions.errors(), vec!["shared".to_string()]);
}

#[test]
fn unsubscribe_right_after_subscribe_suppresses_async_emissions() {
    init_tracing();
    let (last_tx, last_rx) = mpsc::channel();
    let last_tx = Mutex::new(last_tx);
    let (handlers, emissions) = register_emissions_handlers();

    let observable = Observable::new(move |mut o| {
        let last_tx = last_tx.lock().unwrap().clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            if o.is_unsubscribed() {
                let _ = last_tx.send(None);
                return;
            }
            o.next(1);
            o.complete();
            let _ = last_tx.send(Some(1));
        });
        Teardown::Nil
    });

    let subscription = observable.subscribe(handlers);
    subscription.unsubscribe();

    assert_eq!(last_rx.recv().unwrap(), None);
    assert!(emissions.nexts().is_empty());
    assert_eq!(emissions.completes(), 0);
}

#[test]
fn unsubscribe_stops_threaded_observable() {
    init_tracing();
    let (last_tx, last_rx) = mpsc::channel();
    let (handlers, emissions) = register_emissions_handlers();

    let subscription = generate_u32_observable(10_000, last_tx).subscribe(handlers);
    std::thread::sleep(Duration::from_millis(30));
    subscription.unsubscribe();

    let last = last_rx.recv().unwrap();
    let seen = emissions.nexts();

    assert!(last < 10_000, "generator should stop early, last emit {}", last);
    assert!(seen.len() as u32 <= last + 1);
    assert_eq!(seen, (0..seen.len() as u32).collect::<Vec<_>>());
    // Unsubscribing is a silent cancellation.
    assert_eq!(emissions.completes(), 0);
}

#[test]
fn sibling_subscriptions_are_independent() {
    init_tracing();
    let (first_tx, first_rx) = mpsc::channel();
    let (second_tx, second_rx) = mpsc::channel();
    let (first, first_emissions) = register_emissions_handlers();
    let (second, second_emissions) = register_emissions_handlers();

    let first_subscription = generate_u32_observable(10_000, first_tx).subscribe(first);
    let observable = generate_u32_observable(20, second_tx);
    let _second_subscription = observable.subscribe(second);

    first_subscription.unsubscribe();

    assert_eq!(second_rx.recv().unwrap(), 20);
    assert!(first_rx.recv().unwrap() < 10_000);
    assert_eq!(second_emissions.nexts(), (0..=20).collect::<Vec<_>>());
    assert_eq!(second_emissions.completes(), 1);
    assert_eq!(first_emissions.completes(), 0);
}

#[test]
fn same_observable_replays_for_every_subscriber() {
    let observable: Observable<u32> = vec![4, 5, 6].into_iter().collect();

    for _ in 0..3 {
        let (handlers, emissions) = register_emissions_handlers();
        observable.subscribe(handlers);
        assert_eq!(emissions.nexts(), vec![4, 5, 6]);
        assert_eq!(emissions.completes(), 1);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn tokio_producer_with_async_teardown() {
    init_tracing();
    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    let (done_tx, mut done_rx) = tokio::sync::mpsc::channel::<u32>(1);
    let (handlers, emissions) = register_emissions_handlers();
    let stop_tx = Arc::new(stop_tx);

    let observable = Observable::new(move |mut o| {
        let stop_rx = stop_rx.clone();
        let done_tx = done_tx.clone();
        tokio::task::spawn(async move {
            let mut emitted = 0;
            for i in 0..=10_000 {
                let stop = *stop_rx.borrow();
                if stop {
                    break;
                }
                o.next(i);
                emitted += 1;
                tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;
            }
            o.complete();
            let _ = done_tx.send(emitted).await;
        });

        let stop_tx = Arc::clone(&stop_tx);
        Teardown::future(async move {
            let _ = stop_tx.send(true);
        })
    });

    let subscription = observable.subscribe(handlers);
    tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
    subscription.unsubscribe();

    let emitted = done_rx.recv().await.unwrap();
    assert!(emitted < 10_001);
    assert!(emissions.nexts().len() as u32 <= emitted);
    assert_eq!(emissions.completes(), 0);
}
