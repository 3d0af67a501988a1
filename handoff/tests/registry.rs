use chrono::Duration;
use handoff::{registry, Args, JobArgs, JobType, SubmitError};

mod common;
use common::*;

// The default client is process-wide, so its whole lifecycle is one test.
#[test]
fn default_client_lifecycle() {
    assert!(registry::get().is_none());
    assert!(matches!(
        handoff::enqueue::<EmailJob>(),
        Err(SubmitError::NoDefaultClient)
    ));

    let (client, records) = create_client(vec![]);
    let name = client.name().to_string();
    registry::init(client).expect("register client");

    let (other, _) = create_client(vec![]);
    assert!(registry::init(other).is_err());
    assert_eq!(Some(name.as_str()), registry::get().as_deref().map(|c| c.name()));

    handoff::enqueue::<EmailJob>().expect("enqueue job");
    handoff::enqueue_with::<EmailJob>(&EmailArgs {
        recipient: "a@x.com".to_string(),
    })
    .expect("enqueue job");
    handoff::enqueue_delayed::<EmailJob>(Duration::minutes(5)).expect("schedule job");
    handoff::enqueue_delayed_with::<ReportJob>(Duration::minutes(5), &NoArgs {})
        .expect("schedule job");
    let args = Args::new().arg("Invoice", 7);
    handoff::enqueue_type(
        &JobType::new("billing::InvoiceJob"),
        Some(&args as &dyn JobArgs),
    )
    .expect("enqueue job");
    handoff::enqueue_type_delayed(
        Duration::seconds(1),
        &JobType::new("billing::InvoiceJob"),
        None,
    )
    .expect("schedule job");
    assert_eq!(6, records.jobs().len());

    let client = registry::teardown().expect("registered client");
    assert!(registry::get().is_none());
    assert!(matches!(
        handoff::enqueue::<EmailJob>(),
        Err(SubmitError::NoDefaultClient)
    ));

    std::sync::Arc::try_unwrap(client)
        .ok()
        .expect("last reference")
        .close()
        .expect("close client");
    assert!(records.is_closed());
}
