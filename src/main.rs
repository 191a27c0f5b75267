use std::sync::{Arc, Mutex};
use std::time::Duration;

use rxcore::subscribe::{Handlers, Teardown};
use rxcore::{Observable, Observer, StreamError, Subscribeable, Unsubscribeable};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Request {
    method: &'static str,
    path: &'static str,
}

const FIXTURES: [Request; 3] = [
    Request { method: "GET", path: "/users" },
    Request { method: "POST", path: "/users" },
    Request { method: "GET", path: "/users/7" },
];

fn lookup(path: &'static str) -> Observable<String> {
    Observable::new(move |mut o| {
        if path.ends_with("/404") {
            o.fail(StreamError::message(format!("no route for {}", path)));
        } else {
            o.next(format!("body of {}", path));
            o.complete();
        }
        Teardown::Nil
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    Observable::from(FIXTURES).subscribe(
        Handlers::new()
            .on_next(|r: Request| info!(method = r.method, path = r.path, "request"))
            .on_complete(|| info!("all requests handled")),
    );

    let status = Arc::new(Mutex::new(200_u16));
    let status_c = Arc::clone(&status);
    lookup("/users/404").subscribe(
        Handlers::new()
            .on_next(|body: String| info!(%body, "response"))
            .on_error(move |e| {
                error!(error = %e, "request failed");
                if let Ok(mut status) = status_c.lock() {
                    *status = 404;
                }
            }),
    );
    if let Ok(status) = status.lock() {
        info!(status = *status, "status code");
    }

    let ticks = Observable::new(|mut o| {
        tokio::spawn(async move {
            let mut i = 0_u64;
            while !o.is_unsubscribed() {
                o.next(i);
                i += 1;
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });
        Teardown::logic(|| info!("ticker stopped"))
    });
    let subscription = ticks.subscribe(Handlers::new().on_next(|i: u64| info!(tick = i, "tick")));
    tokio::time::sleep(Duration::from_millis(55)).await;
    subscription.unsubscribe();
}
