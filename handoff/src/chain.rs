use std::{cell::Cell, sync::Arc};

use crate::{
    error::{StorageFailure, SubmitError},
    filter::{ClientFilter, FilterContext, Next},
    models::JobDescriptor,
    JobId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommitState {
    NotReached,
    Committed,
    Failed,
}

/// Wraps `commit` in `filters` and runs the whole chain on the calling thread.
///
/// The first registered filter is the outermost one. The chain is folded
/// starting from the last filter so that each filter receives the already
/// wrapped rest of the chain as its continuation.
pub(crate) fn run(
    job_id: &JobId,
    job: &JobDescriptor,
    commit: Next<'_>,
    filters: &[Arc<dyn ClientFilter>],
) -> Result<(), SubmitError> {
    let state = Cell::new(CommitState::NotReached);

    let mut current: Next<'_> = Box::new(|| {
        let result = commit();
        state.set(match &result {
            Ok(_) => CommitState::Committed,
            Err(_) => CommitState::Failed,
        });
        result
    });

    for filter in filters.iter().rev() {
        let next = current;
        current = Box::new(move || filter.on_submit(FilterContext::new(job_id, job, next)));
    }

    let result = current();
    outcome(job_id, state.get(), result)
}

fn outcome(
    job_id: &JobId,
    state: CommitState,
    result: anyhow::Result<()>,
) -> Result<(), SubmitError> {
    match (state, result) {
        (CommitState::Committed, Ok(_)) => Ok(()),
        (CommitState::Committed, Err(e)) => Err(SubmitError::FilterAfterCommit {
            job_id: job_id.clone(),
            source: e,
        }),
        (CommitState::NotReached | CommitState::Failed, Ok(_)) => {
            tracing::warn!("Job {} was not committed: a filter did not proceed", job_id);
            Err(SubmitError::NotCommitted(job_id.clone()))
        }
        (_, Err(e)) => match e.downcast::<StorageFailure>() {
            Ok(failure) => Err(SubmitError::Storage {
                job_id: job_id.clone(),
                source: failure.into_inner(),
            }),
            Err(e) => Err(SubmitError::Filter(e)),
        },
    }
}
