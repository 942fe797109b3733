//! # easel-client
//!
//! Caller-side access to provider artwork tables.
//!
//! [`RegistryClient`] wraps any [`ContentStore`](easel_store::ContentStore)
//! and offers the four artwork operations: read the newest record, add one,
//! atomically replace the whole collection with one, and list everything.
//! Replacement goes through [`BatchExecutor`], which checks a plan before
//! handing it to the store as a single transaction.

pub mod batch;
pub mod client;
pub mod error;

pub use batch::BatchExecutor;
pub use client::RegistryClient;
pub use error::{BatchFailure, ClientError};
