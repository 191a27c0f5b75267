use std::{
    sync::{mpsc, Arc, Mutex},
    time::Duration,
};

use rxcore::{subscribe::Teardown, Observable, Observer};

/// Emits `0..=end` from an OS thread, one value per millisecond, stopping early
/// once the subscription is cancelled. The last value emitted by each run is
/// sent through `last_emit`.
pub fn generate_u32_observable(end: u32, last_emit: mpsc::Sender<u32>) -> Observable<u32> {
    let last_emit = Arc::new(Mutex::new(last_emit));

    Observable::new(move |mut o| {
        let last_emit = last_emit.lock().unwrap().clone();

        std::thread::spawn(move || {
            let mut last = 0;

            for i in 0..=end {
                if o.is_unsubscribed() {
                    break;
                }
                last = i;
                o.next(i);
                std::thread::sleep(Duration::from_millis(1));
            }
            o.complete();
            let _ = last_emit.send(last);
        });

        Teardown::logic(|| tracing::debug!("generator released"))
    })
}
