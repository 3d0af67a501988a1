use std::sync::Arc;

use chrono::Duration;
use tracing::instrument;

use crate::{
    args, chain,
    config::Config,
    core::{Job, JobArgs},
    error::SubmitError,
    filter::ClientFilter,
    gateway::Gateway,
    metrics,
    models::{JobDescriptor, JobType},
    JobId,
};

/// Submits jobs to a storage.
///
/// A client is cheap to share behind an `Arc`; submissions from many threads
/// run their filters in parallel and only meet at the storage write.
pub struct Client {
    name: String,
    gateway: Gateway,
    filters: Vec<Arc<dyn ClientFilter>>,
}

impl Client {
    pub fn new(config: Config) -> Self {
        tracing::debug!(
            "Client {} created with {} filter(s)",
            config.name,
            config.filters.len()
        );

        Self {
            name: config.name,
            gateway: Gateway::new(config.storage),
            filters: config.filters,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueues a job of type `J` without arguments.
    pub fn enqueue<J: Job>(&self) -> Result<JobId, SubmitError> {
        self.submit(&J::job_type(), None, None)
    }

    pub fn enqueue_with<J: Job>(&self, args: &impl JobArgs) -> Result<JobId, SubmitError> {
        self.submit(&J::job_type(), Some(args as &dyn JobArgs), None)
    }

    pub fn enqueue_type(
        &self,
        job_type: &JobType,
        args: Option<&dyn JobArgs>,
    ) -> Result<JobId, SubmitError> {
        self.submit(job_type, args, None)
    }

    /// Schedules a job of type `J` to run after `interval`. A zero interval
    /// enqueues it right away.
    pub fn enqueue_delayed<J: Job>(&self, interval: Duration) -> Result<JobId, SubmitError> {
        self.submit(&J::job_type(), None, Some(interval))
    }

    pub fn enqueue_delayed_with<J: Job>(
        &self,
        interval: Duration,
        args: &impl JobArgs,
    ) -> Result<JobId, SubmitError> {
        self.submit(&J::job_type(), Some(args as &dyn JobArgs), Some(interval))
    }

    pub fn enqueue_type_delayed(
        &self,
        interval: Duration,
        job_type: &JobType,
        args: Option<&dyn JobArgs>,
    ) -> Result<JobId, SubmitError> {
        self.submit(job_type, args, Some(interval))
    }

    pub fn get_metrics(&self) -> anyhow::Result<String> {
        metrics::COUNTER.output()
    }

    /// Releases the storage connection. Dropping the client releases it too,
    /// but without reporting errors.
    pub fn close(self) -> anyhow::Result<()> {
        tracing::debug!("Client {} closing", self.name);
        self.gateway.close()
    }

    #[instrument(skip_all, fields(client = %self.name, job_type = %job_type.name()))]
    fn submit(
        &self,
        job_type: &JobType,
        args: Option<&dyn JobArgs>,
        interval: Option<Duration>,
    ) -> Result<JobId, SubmitError> {
        let result = self.submit_internal(job_type, args, interval);

        if let Err(e) = &result {
            metrics::COUNTER
                .submissions_failed
                .with_label_values(&[e.kind()])
                .inc();
            tracing::debug!("Submission failed: {}", e);
        }

        result
    }

    fn submit_internal(
        &self,
        job_type: &JobType,
        args: Option<&dyn JobArgs>,
        interval: Option<Duration>,
    ) -> Result<JobId, SubmitError> {
        validate(job_type)?;
        let dispatch = self.gateway.plan(job_type, interval)?;

        let job_id = crate::new_job_id();
        let job = JobDescriptor::new(job_type, args::materialize(args)?);

        metrics::COUNTER
            .submissions_all
            .with_label_values(&[dispatch.path()])
            .inc();

        let commit = self.gateway.commit_action(&dispatch, &job_id, &job);
        chain::run(&job_id, &job, commit, &self.filters)?;

        Ok(job_id)
    }
}

fn validate(job_type: &JobType) -> Result<(), SubmitError> {
    if job_type.name().trim().is_empty() {
        return Err(SubmitError::invalid("job_type", "Job type can not be empty."));
    }
    if job_type.queue().trim().is_empty() {
        return Err(SubmitError::invalid("queue", "Queue name can not be empty."));
    }

    Ok(())
}
