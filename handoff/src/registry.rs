//! Explicit process-wide default client.
//!
//! Nothing is registered until [`init`] is called, and [`teardown`] removes
//! the client again. Code that can be handed a [`Client`] should take one
//! instead of going through this registry.
//!
//! ```ignore
//! handoff::registry::init(Client::new(config))?;
//! handoff::enqueue::<EmailJob>()?;
//! if let Some(client) = handoff::registry::teardown() {
//!     // last reference: release the storage connection
//!     if let Ok(client) = std::sync::Arc::try_unwrap(client) {
//!         client.close()?;
//!     }
//! }
//! ```

use std::sync::{Arc, RwLock};

use chrono::Duration;
use lazy_static::lazy_static;

use crate::{
    client::Client,
    core::{Job, JobArgs},
    error::SubmitError,
    models::JobType,
    JobId,
};

lazy_static! {
    static ref DEFAULT: RwLock<Option<Arc<Client>>> = RwLock::new(None);
}

/// Registers `client` as the default. Fails when one is already registered.
pub fn init(client: Client) -> anyhow::Result<Arc<Client>> {
    let mut default = DEFAULT.write().map_err(|e| anyhow::anyhow!("{}", e))?;
    if let Some(existing) = default.as_ref() {
        return Err(anyhow::anyhow!(
            "default client `{}` is already registered",
            existing.name()
        ));
    }

    let client = Arc::new(client);
    *default = Some(client.clone());
    tracing::info!("Registered default client {}", client.name());

    Ok(client)
}

pub fn get() -> Option<Arc<Client>> {
    DEFAULT.read().ok().and_then(|default| default.clone())
}

/// Unregisters the default client and hands it back.
pub fn teardown() -> Option<Arc<Client>> {
    let client = match DEFAULT.write() {
        Ok(mut default) => default.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    };
    if let Some(client) = &client {
        tracing::info!("Unregistered default client {}", client.name());
    }

    client
}

fn default_client() -> Result<Arc<Client>, SubmitError> {
    get().ok_or(SubmitError::NoDefaultClient)
}

pub fn enqueue<J: Job>() -> Result<JobId, SubmitError> {
    default_client()?.enqueue::<J>()
}

pub fn enqueue_with<J: Job>(args: &impl JobArgs) -> Result<JobId, SubmitError> {
    default_client()?.enqueue_with::<J>(args)
}

pub fn enqueue_type(job_type: &JobType, args: Option<&dyn JobArgs>) -> Result<JobId, SubmitError> {
    default_client()?.enqueue_type(job_type, args)
}

pub fn enqueue_delayed<J: Job>(interval: Duration) -> Result<JobId, SubmitError> {
    default_client()?.enqueue_delayed::<J>(interval)
}

pub fn enqueue_delayed_with<J: Job>(
    interval: Duration,
    args: &impl JobArgs,
) -> Result<JobId, SubmitError> {
    default_client()?.enqueue_delayed_with::<J>(interval, args)
}

pub fn enqueue_type_delayed(
    interval: Duration,
    job_type: &JobType,
    args: Option<&dyn JobArgs>,
) -> Result<JobId, SubmitError> {
    default_client()?.enqueue_type_delayed(interval, job_type, args)
}
