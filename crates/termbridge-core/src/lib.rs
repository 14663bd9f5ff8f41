//! Core types and services for the termbridge terminology service.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the NAMASTE ↔ ICD-11 TM2 translation engine, the mock ABHA
//! credential directory, session tokens, the local-terminology search, and the
//! [`HistoryLedger`](ledger::HistoryLedger) abstraction that storage backends
//! implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod directory;
pub mod error;
pub mod ledger;
pub mod mapping;
pub mod session;
pub mod terminology;
pub mod translate;

pub use error::{Error, Result, TokenRejection};
