pub mod catalog;
pub mod chat;
pub mod journal;
pub mod progress;
