use crate::{args::ArgsError, JobId};

#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error(transparent)]
    Conversion(#[from] ArgsError),

    #[error("client filter failed: {0:#}")]
    Filter(#[source] anyhow::Error),

    #[error("storage failed to accept job {job_id}: {source:#}")]
    Storage {
        job_id: JobId,
        #[source]
        source: anyhow::Error,
    },

    #[error("job {0} was not committed to storage, a filter did not proceed")]
    NotCommitted(JobId),

    /// The job is in storage; only a filter running after the commit failed.
    #[error("client filter failed after job {job_id} was committed: {source:#}")]
    FilterAfterCommit {
        job_id: JobId,
        #[source]
        source: anyhow::Error,
    },

    #[error("no default client is registered")]
    NoDefaultClient,
}

impl SubmitError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Id of the job this error is about, when one was generated.
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Self::Storage { job_id, .. }
            | Self::NotCommitted(job_id)
            | Self::FilterAfterCommit { job_id, .. } => Some(job_id),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Conversion(_) => "conversion",
            Self::Filter(_) => "filter",
            Self::Storage { .. } => "storage",
            Self::NotCommitted(_) => "not_committed",
            Self::FilterAfterCommit { .. } => "filter_after_commit",
            Self::NoDefaultClient => "no_default_client",
        }
    }
}

/// Marks an error raised by the storage write so it can be told apart from
/// filter errors after travelling back up through the chain.
#[derive(thiserror::Error, Debug)]
#[error("{0:#}")]
pub(crate) struct StorageFailure(anyhow::Error);

impl StorageFailure {
    pub fn new(e: anyhow::Error) -> Self {
        Self(e)
    }

    pub fn into_inner(self) -> anyhow::Error {
        self.0
    }
}
