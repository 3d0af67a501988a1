use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};
use handoff::{
    args::decode_args, storage::memory::StoredJob, Args, Job, JobArgs, JobType, SubmitError,
    ToArgText,
};
use test_case::test_case;

mod common;
use common::*;

#[test]
fn enqueue_with_args_reaches_derived_queue() {
    let (client, records) = create_client(vec![]);

    let id = client
        .enqueue_with::<EmailJob>(&EmailArgs {
            recipient: "a@x.com".to_string(),
        })
        .expect("enqueue job");

    assert_eq!(36, id.as_str().len());
    match records.jobs().as_slice() {
        [StoredJob::Enqueued { queue, id: stored, job }] => {
            assert_eq!("email-job-queue", queue);
            assert_eq!(&id, stored);
            assert_eq!("submit::common::EmailJob", job.type_name());
            assert_eq!(Some(r#"{"recipient":"a@x.com"}"#), job.args());
        }
        other => panic!("unexpected storage calls {:?}", other),
    }
}

#[test]
fn enqueue_without_args_has_null_args() {
    let (client, records) = create_client(vec![]);

    client.enqueue::<EmailJob>().expect("enqueue job");

    assert_eq!(None, records.jobs()[0].job().args());
}

#[test]
fn args_without_fields_are_null() {
    let (client, records) = create_client(vec![]);

    client.enqueue_with::<EmailJob>(&NoArgs {}).expect("enqueue job");
    client
        .enqueue_with::<EmailJob>(&Args::new())
        .expect("enqueue job");

    assert!(records.jobs().iter().all(|j| j.job().args().is_none()));
}

#[test]
fn delayed_job_is_scheduled_from_submission_time() {
    let (client, records) = create_client(vec![]);
    let before = Utc::now();

    let id = client
        .enqueue_delayed::<EmailJob>(Duration::minutes(10))
        .expect("schedule job");

    let after = Utc::now();
    match records.jobs().as_slice() {
        [StoredJob::Scheduled { id: stored, job, at }] => {
            assert_eq!(&id, stored);
            assert_eq!(None, job.args());
            assert!(*at >= before + Duration::minutes(10));
            assert!(*at <= after + Duration::minutes(10));
        }
        other => panic!("unexpected storage calls {:?}", other),
    }
}

#[test]
fn zero_delay_is_indistinguishable_from_enqueue() {
    let (client, records) = create_client(vec![]);
    let args = EmailArgs {
        recipient: "a@x.com".to_string(),
    };

    client.enqueue_with::<EmailJob>(&args).expect("enqueue job");
    client
        .enqueue_delayed_with::<EmailJob>(Duration::zero(), &args)
        .expect("enqueue job");

    let jobs = records.jobs();
    match (&jobs[0], &jobs[1]) {
        (
            StoredJob::Enqueued {
                queue: q1, job: j1, ..
            },
            StoredJob::Enqueued {
                queue: q2, job: j2, ..
            },
        ) => {
            assert_eq!(q1, q2);
            assert_eq!(j1, j2);
        }
        other => panic!("unexpected storage calls {:?}", other),
    }
}

#[test_case(Duration::milliseconds(-1); "one millisecond")]
#[test_case(Duration::days(-3); "three days")]
fn negative_delay_is_rejected(interval: Duration) {
    let (client, records) = create_client(vec![]);

    let err = client
        .enqueue_delayed::<EmailJob>(interval)
        .expect_err("negative interval");

    assert!(matches!(
        err,
        SubmitError::InvalidArgument {
            name: "interval",
            ..
        }
    ));
    assert!(records.jobs().is_empty());
}

#[test]
fn unconvertible_argument_fails_before_storage() {
    let (client, records) = create_client(vec![]);

    let err = client
        .enqueue_with::<ReportJob>(&ReportArgs {
            title: "Q3".to_string(),
            pages: 12,
            ratio: f64::NAN,
            priority: Priority::High,
            due: None,
            cache: vec![],
        })
        .expect_err("NaN ratio");

    assert!(matches!(err, SubmitError::Conversion(_)));
    assert!(err.to_string().contains("`ratio`"));
    assert!(err.to_string().contains("f64"));
    assert!(records.jobs().is_empty());
}

#[test]
fn derived_args_use_invariant_text() {
    let (client, records) = create_client(vec![]);
    let due = Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap();

    client
        .enqueue_with::<ReportJob>(&ReportArgs {
            title: "Q3".to_string(),
            pages: 12,
            ratio: 0.5,
            priority: Priority::Low,
            due: Some(due),
            cache: vec![1, 2, 3],
        })
        .expect("enqueue job");

    let jobs = records.jobs();
    let args = decode_args(jobs[0].job().args().expect("args")).expect("decode args");
    assert_eq!(
        vec![
            ("due", Some("2024-07-01T09:30:00Z")),
            ("pages", Some("12")),
            ("priority", Some("Low")),
            ("ratio", Some("0.5")),
            ("title", Some("Q3")),
        ],
        args.iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
            .collect::<Vec<_>>()
    );
}

#[test]
fn queue_override_is_used() {
    let (client, records) = create_client(vec![]);

    client.enqueue::<ReportJob>().expect("enqueue job");

    match &records.jobs()[0] {
        StoredJob::Enqueued { queue, .. } => assert_eq!("reports", queue),
        other => panic!("unexpected storage call {:?}", other),
    }
}

#[test]
fn dynamic_job_type_and_args() {
    let (client, records) = create_client(vec![]);
    let job_type = JobType::new("billing::InvoiceJob");
    let args = Args::new().arg("Invoice", 42).arg("Currency", "EUR");

    client
        .enqueue_type(&job_type, Some(&args as &dyn JobArgs))
        .expect("enqueue job");
    client
        .enqueue_type_delayed(Duration::seconds(30), &job_type, None)
        .expect("schedule job");

    let jobs = records.jobs();
    match &jobs[0] {
        StoredJob::Enqueued { queue, job, .. } => {
            assert_eq!("invoice-job-queue", queue);
            assert_eq!("billing::InvoiceJob", job.type_name());
            assert_eq!(Some(r#"{"currency":"EUR","invoice":"42"}"#), job.args());
        }
        other => panic!("unexpected storage call {:?}", other),
    }
    assert!(matches!(jobs[1], StoredJob::Scheduled { .. }));
}

#[test]
fn missing_job_type_is_rejected() {
    let (client, records) = create_client(vec![]);

    let err = client
        .enqueue_type(&JobType::new(""), None)
        .expect_err("empty job type");

    assert!(matches!(
        err,
        SubmitError::InvalidArgument {
            name: "job_type",
            ..
        }
    ));
    assert!(records.jobs().is_empty());
}

#[test]
fn ids_are_unique() {
    let (client, records) = create_client(vec![]);

    let ids = (0..2_000)
        .map(|i| {
            if i % 2 == 0 {
                client.enqueue::<EmailJob>()
            } else {
                client.enqueue_delayed::<EmailJob>(Duration::seconds(i))
            }
        })
        .collect::<Result<HashSet<_>, _>>()
        .expect("submit jobs");

    assert_eq!(2_000, ids.len());
    assert_eq!(2_000, records.jobs().len());
}

#[test]
fn storage_failure_is_surfaced() {
    let client = create_client_with(Box::new(FailingStorage), vec![]);

    let err = client.enqueue::<EmailJob>().expect_err("storage is down");

    match err {
        SubmitError::Storage { job_id, source } => {
            assert_eq!(36, job_id.as_str().len());
            assert_eq!("storage is down", source.to_string());
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[derive(Job)]
#[job(queue = "critical")]
struct ChargeCard;

#[derive(Job)]
#[job(queue = "critical")]
struct RefundCard;

#[test]
fn job_types_can_share_a_queue() {
    let (client, records) = create_client(vec![]);

    client.enqueue::<ChargeCard>().expect("enqueue charge");
    client.enqueue::<RefundCard>().expect("enqueue refund");
    client.enqueue::<ChargeCard>().expect("enqueue charge");

    let stored = records
        .jobs()
        .iter()
        .map(|j| match j {
            StoredJob::Enqueued { queue, job, .. } => {
                (queue.clone(), job.type_name().to_string())
            }
            other => panic!("unexpected storage call {:?}", other),
        })
        .collect::<Vec<_>>();
    assert_eq!(
        vec![
            ("critical".to_string(), "submit::ChargeCard".to_string()),
            ("critical".to_string(), "submit::RefundCard".to_string()),
            ("critical".to_string(), "submit::ChargeCard".to_string()),
        ],
        stored
    );
}

#[test]
fn failed_submission_does_not_claim_its_queue() {
    let (client, records) = create_client(vec![]);
    let nan = Args::new().arg("Ratio", f64::NAN);

    let err = client
        .enqueue_type(&JobType::new("a::EmailJob"), Some(&nan as &dyn JobArgs))
        .expect_err("NaN ratio");
    assert!(matches!(err, SubmitError::Conversion(_)));

    client
        .enqueue_type(&JobType::new("b::EmailJob"), None)
        .expect("enqueue job");
    client
        .enqueue_type(&JobType::new("a::EmailJob"), None)
        .expect("enqueue job");

    assert_eq!(2, records.jobs().len());
}

#[derive(JobArgs)]
struct Tagged<T> {
    value: T,
    label: &'static str,
}

fn tagged_text<T: ToArgText>(value: T) -> Option<String> {
    let (client, records) = create_client(vec![]);

    client
        .enqueue_with::<EmailJob>(&Tagged {
            value,
            label: "retry",
        })
        .expect("enqueue job");

    let jobs = records.jobs();
    jobs[0].job().args().map(|a| a.to_string())
}

#[test]
fn generic_args_are_materialized() {
    assert_eq!(
        Some(r#"{"label":"retry","value":"3"}"#.to_string()),
        tagged_text(3u8)
    );
    assert_eq!(
        Some(r#"{"label":"retry","value":null}"#.to_string()),
        tagged_text(None::<String>)
    );
}
