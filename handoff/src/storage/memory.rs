use std::sync::{Arc, Mutex};

use super::Storage;
use crate::{models::JobDescriptor, JobId, UtcDateTime};

/// A storage call as observed by [`MemoryStorage`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoredJob {
    Enqueued {
        queue: String,
        id: JobId,
        job: JobDescriptor,
    },
    Scheduled {
        id: JobId,
        job: JobDescriptor,
        at: UtcDateTime,
    },
}

impl StoredJob {
    pub fn id(&self) -> &JobId {
        match self {
            StoredJob::Enqueued { id, .. } | StoredJob::Scheduled { id, .. } => id,
        }
    }

    pub fn job(&self) -> &JobDescriptor {
        match self {
            StoredJob::Enqueued { job, .. } | StoredJob::Scheduled { job, .. } => job,
        }
    }
}

/// Keeps every submitted job in memory.
///
/// Clones share the same records, so a clone kept aside can inspect what a
/// client wrote.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    jobs: Arc<Mutex<Vec<StoredJob>>>,
    closed: Arc<Mutex<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> Vec<StoredJob> {
        self.jobs
            .lock()
            .map(|jobs| jobs.clone())
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.lock().map(|c| *c).unwrap_or(false)
    }

    fn push(&self, job: StoredJob) -> anyhow::Result<()> {
        if self.is_closed() {
            return Err(anyhow::anyhow!("memory storage is closed"));
        }

        self.jobs
            .lock()
            .map_err(|e| anyhow::anyhow!("{}", e))?
            .push(job);
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn enqueue(&mut self, queue: &str, job_id: &JobId, job: &JobDescriptor) -> anyhow::Result<()> {
        self.push(StoredJob::Enqueued {
            queue: queue.to_string(),
            id: job_id.clone(),
            job: job.clone(),
        })
    }

    fn schedule(
        &mut self,
        job_id: &JobId,
        job: &JobDescriptor,
        at: UtcDateTime,
    ) -> anyhow::Result<()> {
        self.push(StoredJob::Scheduled {
            id: job_id.clone(),
            job: job.clone(),
            at,
        })
    }

    fn close(&mut self) -> anyhow::Result<()> {
        *self.closed.lock().map_err(|e| anyhow::anyhow!("{}", e))? = true;
        Ok(())
    }
}
