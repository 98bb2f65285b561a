//! Hosted document database over REST.
//!
//! Writes are committed with server-timestamp transforms, queries go through
//! `runQuery`, and live subscriptions are emulated by polling.

mod store;
mod value;

pub use store::{FirestoreRestStore, FirestoreSettings};
