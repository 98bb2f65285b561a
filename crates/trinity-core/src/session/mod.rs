//! Session domain module.
//!
//! An authenticated identity's runtime handle and the gateway trait that
//! creates and destroys it.
//!
//! # Module Structure
//!
//! - `model`: The `Session` handle passed to every data-access call
//! - `gateway`: The `AuthGateway` trait implemented by identity backends

mod gateway;
mod model;

pub use gateway::{AuthGateway, SessionWatch};
pub use model::Session;
