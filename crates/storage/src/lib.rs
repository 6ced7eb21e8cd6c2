#![forbid(unsafe_code)]

//! SQLite-backed task store.
//!
//! Every task insert, update and delete runs through a [`ProcessorChain`]
//! that validates the write, derives status fields, emulates list moves for
//! sync origins, and keeps the instance projection and the n-gram search
//! index in step with the task row, all inside one transaction.

mod store;

pub use store::*;
