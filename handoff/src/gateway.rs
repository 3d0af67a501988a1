use std::sync::Mutex;

use chrono::Duration;

use crate::{
    error::{StorageFailure, SubmitError},
    filter::Next,
    models::{JobDescriptor, JobType},
    storage::Storage,
    JobId, UtcDateTime,
};

/// Where a submission is going to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dispatch {
    Enqueue { queue: String },
    Schedule { at: UtcDateTime },
}

impl Dispatch {
    pub fn path(&self) -> &'static str {
        match self {
            Dispatch::Enqueue { .. } => "enqueue",
            Dispatch::Schedule { .. } => "schedule",
        }
    }
}

/// Owns the storage and serializes every write to it.
///
/// All writes of one client go through a single lock, so storage never sees
/// two writes at the same time. This trades write throughput for simplicity;
/// finer grained locking (per queue, per connection) would only change this
/// type.
pub(crate) struct Gateway {
    storage: Mutex<Box<dyn Storage>>,
}

impl Gateway {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage: Mutex::new(storage),
        }
    }

    /// Decides between the immediate and the delayed path.
    ///
    /// A zero delay takes the immediate path. The schedule time is fixed
    /// here, at submission, rather than when the commit eventually runs.
    pub fn plan(
        &self,
        job_type: &JobType,
        delay: Option<Duration>,
    ) -> Result<Dispatch, SubmitError> {
        match delay {
            Some(delay) if delay < Duration::zero() => Err(SubmitError::invalid(
                "interval",
                "Interval value can not be negative.",
            )),
            Some(delay) if delay > Duration::zero() => {
                let at = chrono::Utc::now()
                    .checked_add_signed(delay)
                    .ok_or_else(|| {
                        SubmitError::invalid("interval", "Error calculating enqueue time")
                    })?;

                Ok(Dispatch::Schedule { at })
            }
            _ => Ok(Dispatch::Enqueue {
                queue: job_type.queue().to_string(),
            }),
        }
    }

    /// The deferred storage write for one submission.
    pub fn commit_action<'a>(
        &'a self,
        dispatch: &'a Dispatch,
        job_id: &'a JobId,
        job: &'a JobDescriptor,
    ) -> Next<'a> {
        Box::new(move || {
            self.write(dispatch, job_id, job)
                .map_err(|e| anyhow::Error::from(StorageFailure::new(e)))
        })
    }

    fn write(
        &self,
        dispatch: &Dispatch,
        job_id: &JobId,
        job: &JobDescriptor,
    ) -> anyhow::Result<()> {
        let mut storage = self.storage.lock().map_err(|e| anyhow::anyhow!("{}", e))?;

        match dispatch {
            Dispatch::Enqueue { queue } => {
                tracing::debug!("Enqueue job {} on {}", job_id, queue);
                storage.enqueue(queue, job_id, job)
            }
            Dispatch::Schedule { at } => {
                tracing::debug!("Schedule job {} at {}", job_id, at);
                storage.schedule(job_id, job, *at)
            }
        }
    }

    /// Releases the storage connection.
    pub fn close(self) -> anyhow::Result<()> {
        self.storage
            .into_inner()
            .map_err(|e| anyhow::anyhow!("{}", e))?
            .close()
    }
}
