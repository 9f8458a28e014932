//! Native-function name registry.
//!
//! Native functions are identified only by Rc identity; the runtime registers
//! a display name here when it installs one, and the renderer looks the name
//! up when it needs to print the function. The registry is thread-local, so
//! concurrent renders on other threads see their own consistent snapshot.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use lasso::Spur;

use crate::value::{intern, NativeFn};

thread_local! {
    static REGISTRY: RefCell<HashMap<usize, Spur>> = RefCell::new(HashMap::new());
}

fn key(f: &Rc<NativeFn>) -> usize {
    Rc::as_ptr(f) as usize
}

/// Associate a display name with a native function.
pub fn register(f: &Rc<NativeFn>, name: &str) {
    REGISTRY.with(|r| r.borrow_mut().insert(key(f), intern(name)));
}

/// Look up the display name registered for a native function.
pub fn lookup(f: &Rc<NativeFn>) -> Option<Spur> {
    REGISTRY.with(|r| r.borrow().get(&key(f)).copied())
}

/// Drop a registration, e.g. when the runtime unloads the function.
pub fn unregister(f: &Rc<NativeFn>) {
    REGISTRY.with(|r| r.borrow_mut().remove(&key(f)));
}
