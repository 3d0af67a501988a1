#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use handoff::{
    filter::from_fn,
    storage::{memory::MemoryStorage, Storage},
    ArgText, Client, ClientFilter, Config, FilterContext, Job, JobArgs, JobDescriptor, JobId,
    UtcDateTime,
};

#[derive(Job)]
pub struct EmailJob;

#[derive(Job)]
#[job(queue = "reports")]
pub struct ReportJob;

#[derive(JobArgs)]
pub struct EmailArgs {
    #[arg(rename = "Recipient")]
    pub recipient: String,
}

#[derive(ArgText, Clone, Copy)]
pub enum Priority {
    Low,
    High,
}

#[derive(JobArgs)]
pub struct ReportArgs {
    pub title: String,
    pub pages: u32,
    pub ratio: f64,
    pub priority: Priority,
    pub due: Option<UtcDateTime>,
    #[arg(skip)]
    pub cache: Vec<u8>,
}

#[derive(JobArgs)]
pub struct NoArgs {}

pub fn create_client(filters: Vec<Arc<dyn ClientFilter>>) -> (Client, MemoryStorage) {
    let records = MemoryStorage::new();
    let client = create_client_with(Box::new(records.clone()), filters);

    (client, records)
}

pub fn create_client_with(
    storage: Box<dyn Storage>,
    filters: Vec<Arc<dyn ClientFilter>>,
) -> Client {
    Client::new(
        Config::builder()
            .name(format!("test-{}", handoff::generate_id()))
            .storage(storage)
            .filters(filters)
            .build(),
    )
}

pub fn filter<F>(f: F) -> Arc<dyn ClientFilter>
where
    F: for<'a> Fn(FilterContext<'a>) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(from_fn(f))
}

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Records `name:before` / `name:after` around the rest of the chain.
pub fn recording_filter(name: &'static str, log: CallLog) -> Arc<dyn ClientFilter> {
    filter(move |ctx| {
        log.lock().unwrap().push(format!("{}:before", name));
        let result = ctx.proceed();
        log.lock().unwrap().push(format!("{}:after", name));
        result
    })
}

/// Records `commit` in the call log, then stores the job in memory.
pub struct LoggingStorage {
    pub log: CallLog,
    pub inner: MemoryStorage,
}

impl Storage for LoggingStorage {
    fn enqueue(&mut self, queue: &str, job_id: &JobId, job: &JobDescriptor) -> anyhow::Result<()> {
        self.log.lock().unwrap().push("commit".to_string());
        self.inner.enqueue(queue, job_id, job)
    }

    fn schedule(
        &mut self,
        job_id: &JobId,
        job: &JobDescriptor,
        at: UtcDateTime,
    ) -> anyhow::Result<()> {
        self.log.lock().unwrap().push("commit".to_string());
        self.inner.schedule(job_id, job, at)
    }
}

/// Fails every write.
pub struct FailingStorage;

impl Storage for FailingStorage {
    fn enqueue(&mut self, _: &str, _: &JobId, _: &JobDescriptor) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("storage is down"))
    }

    fn schedule(&mut self, _: &JobId, _: &JobDescriptor, _: UtcDateTime) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("storage is down"))
    }
}

/// Builds every payload in several steps and fails if another write starts
/// while one is still in progress.
#[derive(Clone, Default)]
pub struct InterleavingDetector {
    in_flight: Arc<AtomicBool>,
    pub writes: Arc<Mutex<Vec<(JobId, String)>>>,
}

impl InterleavingDetector {
    fn write(&self, job_id: &JobId, job: &JobDescriptor) -> anyhow::Result<()> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(anyhow::anyhow!("interleaved write detected"));
        }

        let mut payload = String::new();
        payload.push_str(job_id.as_str());
        std::thread::sleep(Duration::from_micros(200));
        payload.push('|');
        payload.push_str(job.type_name());
        std::thread::sleep(Duration::from_micros(200));
        payload.push('|');
        payload.push_str(job.args().unwrap_or_default());

        self.writes.lock().unwrap().push((job_id.clone(), payload));
        self.in_flight.store(false, Ordering::SeqCst);

        Ok(())
    }
}

impl Storage for InterleavingDetector {
    fn enqueue(&mut self, _: &str, job_id: &JobId, job: &JobDescriptor) -> anyhow::Result<()> {
        self.write(job_id, job)
    }

    fn schedule(
        &mut self,
        job_id: &JobId,
        job: &JobDescriptor,
        _: UtcDateTime,
    ) -> anyhow::Result<()> {
        self.write(job_id, job)
    }
}
