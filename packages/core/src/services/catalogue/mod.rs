//! Service Catalogue client.
//!
//! Layered bottom-up: `query` builds URLs, `fetch` retries a single GET,
//! `pagination` walks collection pages, and `records`, `teams` and `jobs`
//! build the record-level operations on top.

pub mod client;
pub mod fetch;
pub mod jobs;
pub mod pagination;
pub mod query;
pub mod records;
pub mod retry;
pub mod teams;
pub mod types;

pub use client::CatalogueClient;
pub use fetch::FetchOutcome;
pub use jobs::{Job, JobContext, SUCCEEDED};
pub use retry::RetryPolicy;
pub use types::{Component, Env, Record, ScheduledJob};
