use std::sync::{Arc, Mutex};

use rxcore::subscribe::Handlers;

pub struct Emissions {
    pub nexts: Arc<Mutex<Vec<u32>>>,
    pub errors: Arc<Mutex<Vec<String>>>,
    pub completes: Arc<Mutex<u32>>,
}

impl Emissions {
    pub fn nexts(&self) -> Vec<u32> {
        self.nexts.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn completes(&self) -> u32 {
        *self.completes.lock().unwrap()
    }
}

/// Handlers that record every signal they receive.
pub fn register_emissions_handlers() -> (Handlers<u32>, Emissions) {
    let nexts = Arc::new(Mutex::new(Vec::with_capacity(5)));
    let nexts_c = Arc::clone(&nexts);

    let errors = Arc::new(Mutex::new(Vec::new()));
    let errors_c = Arc::clone(&errors);

    let completes = Arc::new(Mutex::new(0));
    let completes_c = Arc::clone(&completes);

    let handlers = Handlers::all(
        move |n| {
            // Track next() calls.
            nexts_c.lock().unwrap().push(n);
        },
        move |e| {
            // Track error() calls.
            errors_c.lock().unwrap().push(e.to_string());
        },
        move || {
            // Track complete() calls.
            *completes_c.lock().unwrap() += 1;
        },
    );
    (
        handlers,
        Emissions {
            nexts,
            errors,
            completes,
        },
    )
}
