use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    pub(crate) static ref COUNTER: Metrics = Metrics::new();
}

pub(crate) struct Metrics {
    pub submissions_all: IntCounterVec,
    pub submissions_failed: IntCounterVec,
}

impl Metrics {
    fn new() -> Self {
        let all = register_int_counter_vec!(
            "handoff_submissions_all",
            "total job submissions",
            &["path"]
        )
        .expect("register handoff_submissions_all");
        let failed = register_int_counter_vec!(
            "handoff_submissions_failed",
            "total job submissions that failed",
            &["kind"]
        )
        .expect("register handoff_submissions_failed");

        Metrics {
            submissions_all: all,
            submissions_failed: failed,
        }
    }

    pub fn output(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        encoder.encode(&metric_families, &mut buffer)?;

        Ok(String::from_utf8(buffer)?)
    }
}
