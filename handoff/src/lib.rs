//! Producer-side client for a background job system.
//!
//! A submission gets a fresh [`JobId`], its arguments are materialized into a
//! flat text mapping, it runs through the configured [`ClientFilter`] chain and
//! finally reaches the [`storage::Storage`] either as an immediately enqueued
//! job or as a job scheduled for a later instant.
//!
//! ```ignore
//! use handoff::{storage::memory::MemoryStorage, Client, Config, Job, JobArgs};
//!
//! #[derive(Job)]
//! struct EmailJob;
//!
//! #[derive(JobArgs)]
//! struct EmailArgs {
//!     recipient: String,
//! }
//!
//! let client = Client::new(
//!     Config::builder()
//!         .storage(Box::new(MemoryStorage::new()))
//!         .build(),
//! );
//!
//! let id = client.enqueue_with::<EmailJob>(&EmailArgs {
//!     recipient: "a@x.com".into(),
//! })?;
//! let later = client.enqueue_delayed::<EmailJob>(chrono::Duration::minutes(10))?;
//! ```
extern crate self as handoff;

use std::fmt::Display;

pub use anyhow;
pub use handoff_derive::{ArgText, Job, JobArgs};
pub use serde_json;

pub mod args;
mod chain;
mod client;
mod config;
pub mod core;
mod encoder;
mod error;
pub mod filter;
mod gateway;
#[cfg(feature = "redis")]
mod id;
mod metrics;
mod models;
pub mod registry;
pub mod storage;

pub use args::{ArgTextError, Args, ArgsBuilder, ArgsError, ToArgText};
pub use client::Client;
pub use config::Config;
pub use crate::core::{Job, JobArgs};
pub use error::SubmitError;
pub use filter::{ClientFilter, FilterContext};
pub use models::{JobDescriptor, JobType};
pub use registry::{
    enqueue, enqueue_delayed, enqueue_delayed_with, enqueue_type, enqueue_type_delayed,
    enqueue_with,
};

pub type UtcDateTime = chrono::DateTime<chrono::Utc>;

#[derive(serde_derive::Serialize, serde_derive::Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generates a random (v4) UUID in its 36 character hyphenated form.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn new_job_id() -> JobId {
    JobId(generate_id())
}
