//! Fan-out layer for the tracking channel
//!
//! One hub task owns the subscriber registry. It consumes registry events and
//! subscribe/unsubscribe commands, so a subscriber's snapshot and its first
//! live update are always ordered. Delivery to a subscriber never blocks the
//! hub: a viewer that cannot keep up is dropped and heals by re-subscribing.

mod hub;
mod subscriber;

pub use hub::*;
pub use subscriber::*;
