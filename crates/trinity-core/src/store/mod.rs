//! Document store domain module.
//!
//! Contracts for the hierarchical document database every view reads from
//! and writes to.
//!
//! # Module Structure
//!
//! - `document`: `Document` snapshots and `Write` payloads
//! - `query`: Collection queries (equality filter, ordering, limit)
//! - `subscription`: Cancellable full-snapshot streams
//! - `repository`: The `DocumentStore` trait
//! - `paths`: Per-user path layout

mod document;
pub mod paths;
mod query;
mod repository;
mod subscription;

pub use document::{Document, Write};
pub use query::{Direction, FieldFilter, OrderBy, Query};
pub use repository::DocumentStore;
pub use subscription::{CollectionSubscription, DocumentSubscription, Subscription};
