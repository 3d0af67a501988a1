#[cfg(feature = "redis")]
pub mod redis;

pub mod memory;


use crate::{models::JobDescriptor, JobId, UtcDateTime};

/// The queue storage jobs are handed to.
///
/// The connection is acquired when the storage is constructed and released
/// by [`Storage::close`] or when the storage is dropped. Calls are never made
/// concurrently: the client serializes all writes.
pub trait Storage: Send {
    /// Makes the job available on `queue` right away.
    fn enqueue(&mut self, queue: &str, job_id: &JobId, job: &JobDescriptor) -> anyhow::Result<()>;

    /// Keeps the job until `at`, then makes it available.
    fn schedule(&mut self, job_id: &JobId, job: &JobDescriptor, at: UtcDateTime)
        -> anyhow::Result<()>;

    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn enqueue(&mut self, queue: &str, job_id: &JobId, job: &JobDescriptor) -> anyhow::Result<()> {
        (**self).enqueue(queue, job_id, job)
    }

    fn schedule(
        &mut self,
        job_id: &JobId,
        job: &JobDescriptor,
        at: UtcDateTime,
    ) -> anyhow::Result<()> {
        (**self).schedule(job_id, job, at)
    }

    fn close(&mut self) -> anyhow::Result<()> {
        (**self).close()
    }
}
