//! Client filters wrap the commit of every submission.
//!
//! Filters registered as `[A, B, C]` run as `A(B(C(commit)))`: `A` observes
//! the submission first and gets control back last.

use crate::{models::JobDescriptor, JobId};

/// The rest of the chain: the next filter, or the storage write itself.
pub(crate) type Next<'a> = Box<dyn FnOnce() -> anyhow::Result<()> + 'a>;

/// Middleware around the commit of a job.
///
/// An implementation calls [`FilterContext::proceed`] exactly once to let the
/// submission through. Returning without proceeding drops the job (the
/// caller gets [`SubmitError::NotCommitted`](crate::SubmitError::NotCommitted));
/// returning an error aborts the submission with that error.
pub trait ClientFilter: Send + Sync {
    fn on_submit(&self, ctx: FilterContext<'_>) -> anyhow::Result<()>;
}

/// Per-invocation view of a submission handed to a filter.
pub struct FilterContext<'a> {
    job_id: &'a JobId,
    job: &'a JobDescriptor,
    next: Next<'a>,
}

impl<'a> FilterContext<'a> {
    pub(crate) fn new(job_id: &'a JobId, job: &'a JobDescriptor, next: Next<'a>) -> Self {
        Self { job_id, job, next }
    }

    pub fn job_id(&self) -> &'a JobId {
        self.job_id
    }

    pub fn job(&self) -> &'a JobDescriptor {
        self.job
    }

    /// Runs the rest of the chain. Consumes the context, so the rest of the
    /// chain can only be run once.
    pub fn proceed(self) -> anyhow::Result<()> {
        (self.next)()
    }
}

/// Creates a filter from a closure.
///
/// ```ignore
/// let audit = handoff::filter::from_fn(|ctx| {
///     let id = ctx.job_id();
///     ctx.proceed()?;
///     tracing::info!("submitted {}", id);
///     Ok(())
/// });
/// ```
pub fn from_fn<F>(f: F) -> FnFilter<F>
where
    F: for<'a> Fn(FilterContext<'a>) -> anyhow::Result<()> + Send + Sync,
{
    FnFilter(f)
}

pub struct FnFilter<F>(F);

impl<F> ClientFilter for FnFilter<F>
where
    F: for<'a> Fn(FilterContext<'a>) -> anyhow::Result<()> + Send + Sync,
{
    fn on_submit(&self, ctx: FilterContext<'_>) -> anyhow::Result<()> {
        (self.0)(ctx)
    }
}

/// Emits a `tracing` event before and after the commit of each job.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingFilter;

impl ClientFilter for LoggingFilter {
    fn on_submit(&self, ctx: FilterContext<'_>) -> anyhow::Result<()> {
        let id = ctx.job_id();
        let job = ctx.job();

        tracing::debug!("Submitting job {} [Type: {}]", id, job.type_name());
        match ctx.proceed() {
            Ok(_) => {
                tracing::info!("Submitted job {} [Type: {}]", id, job.type_name());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to submit job {}: {:#}", id, e);
                Err(e)
            }
        }
    }
}
