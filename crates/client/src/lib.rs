//! Storage console API client.
//!
//! This crate is the single source of truth for the console wire
//! contract: environments, products, folders, dataset preview/save,
//! staged file analysis, small and resumable uploads, pipeline runs,
//! and remote event logging.
//!
//! Blocking reqwest client (no Tokio runtime required). Auth is soft:
//! a bearer token is attached when one is saved, and its absence does
//! not prevent calls from being issued.

mod client;
mod progress;
mod search;

pub use client::{
    ApiError, ConsoleClient, DatasetPreview, Environment, ProductInfo, TableEntry,
    RESUMABLE_THRESHOLD,
};
pub use progress::ProgressReader;
pub use search::{SearchEntry, SearchIndex};
