use super::Storage;
use crate::{
    id::IdOf,
    models::{JobDescriptor, ARGS_KEY, TYPE_KEY},
    JobId, UtcDateTime,
};
use redis::{Client, Connection};

pub const DEFAULT_PREFIX: &str = "handoff";

/// Redis backed storage.
///
/// A job is stored as the hash `{prefix}:job:{id}` with the `Type` and `Args`
/// fields. Enqueued ids are pushed onto `{prefix}:queue:{queue}` (and the
/// queue is registered in the `{prefix}:queues` set); scheduled ids go into
/// the `{prefix}:schedule` sorted set scored by their Unix timestamp.
pub struct Redis {
    _client: Client,
    connection: Option<Connection>,
    prefix: String,
}

impl Redis {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Self::with_prefix(url, DEFAULT_PREFIX)
    }

    pub fn with_prefix(url: &str, prefix: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = client.get_connection()?;

        Ok(Self {
            _client: client,
            connection: Some(connection),
            prefix: prefix.to_string(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn connection(&mut self) -> anyhow::Result<&mut Connection> {
        self.connection
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("redis connection is closed"))
    }

    fn job_fields(job: &JobDescriptor) -> Vec<(&'static str, &str)> {
        let mut fields = vec![(TYPE_KEY, job.type_name())];
        if let Some(args) = job.args() {
            fields.push((ARGS_KEY, args));
        }
        fields
    }
}

impl Storage for Redis {
    fn enqueue(&mut self, queue: &str, job_id: &JobId, job: &JobDescriptor) -> anyhow::Result<()> {
        let job_key = IdOf::Job(job_id).get_id(&self.prefix).to_string();
        let queue_key = IdOf::Queue(queue).get_id(&self.prefix).to_string();
        let queues_key = IdOf::Queues.get_id(&self.prefix).to_string();

        redis::pipe()
            .atomic()
            .hset_multiple(&job_key, &Self::job_fields(job))
            .ignore()
            .sadd(&queues_key, queue)
            .ignore()
            .lpush(&queue_key, job_id.as_str())
            .ignore()
            .query::<()>(self.connection()?)?;

        Ok(())
    }

    fn schedule(
        &mut self,
        job_id: &JobId,
        job: &JobDescriptor,
        at: UtcDateTime,
    ) -> anyhow::Result<()> {
        let job_key = IdOf::Job(job_id).get_id(&self.prefix).to_string();
        let schedule_key = IdOf::Schedule.get_id(&self.prefix).to_string();

        redis::pipe()
            .atomic()
            .hset_multiple(&job_key, &Self::job_fields(job))
            .ignore()
            .zadd(&schedule_key, job_id.as_str(), timestamp(at))
            .ignore()
            .query::<()>(self.connection()?)?;

        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.connection.take();
        Ok(())
    }
}

/// Unix timestamp in seconds, with the sub-second part as fraction.
pub(crate) fn timestamp(at: UtcDateTime) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}
