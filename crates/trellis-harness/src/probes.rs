#![forbid(unsafe_code)]

//! Handler probes.
//!
//! Tests mostly want to know two things about a handler: how many times
//! it fired, and with what. These constructors return the handler
//! together with the shared cell it writes into.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use trellis_core::{Event, Handler};

/// A handler that counts invocations.
#[must_use]
pub fn counting_handler() -> (Handler, Rc<Cell<usize>>) {
    let hits = Rc::new(Cell::new(0));
    let handler = {
        let hits = Rc::clone(&hits);
        Handler::new(move |_| hits.set(hits.get() + 1))
    };
    (handler, hits)
}

/// A handler that records every event it receives, in order.
#[must_use]
pub fn recording_handler() -> (Handler, Rc<RefCell<Vec<Event>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let handler = {
        let seen = Rc::clone(&seen);
        Handler::new(move |event| seen.borrow_mut().push(event.clone()))
    };
    (handler, seen)
}
