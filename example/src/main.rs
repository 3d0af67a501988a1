use std::sync::Arc;

use handoff::{
    filter::{from_fn, LoggingFilter},
    registry,
    storage::{memory::MemoryStorage, redis::Redis, Storage},
    ArgText, Client, ClientFilter, Config, Job, JobArgs,
};
use tracing_subscriber::{layer::SubscriberExt, Registry};

#[derive(Job)]
struct WelcomeEmail;

#[derive(Job)]
#[job(queue = "reports")]
struct MonthlyReport;

#[derive(JobArgs)]
struct WelcomeEmailArgs {
    recipient: String,
    attempt: u32,
}

#[derive(ArgText)]
enum Format {
    Pdf,
    Csv,
}

#[derive(JobArgs)]
struct MonthlyReportArgs {
    month: chrono::NaiveDate,
    format: Format,
    #[arg(rename = "Notify")]
    notify: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let subscriber = Registry::default()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string()),
        ))
        .with(tracing_subscriber::fmt::Layer::new());
    tracing::subscriber::set_global_default(subscriber)?;

    let storage: Box<dyn Storage> = match std::env::var("REDIS_URL") {
        Ok(url) => Box::new(Redis::new(&url)?),
        Err(_) => {
            tracing::info!("REDIS_URL is not set, jobs are kept in memory");
            Box::new(MemoryStorage::new())
        }
    };

    let audit: Arc<dyn ClientFilter> = Arc::new(from_fn(|ctx| {
        let id = ctx.job_id();
        let job_type = ctx.job().type_name();
        ctx.proceed()?;
        tracing::info!("Audit: {} accepted as {}", job_type, id);
        Ok(())
    }));

    let filters: Vec<Arc<dyn ClientFilter>> = vec![Arc::new(LoggingFilter), audit];
    let client = registry::init(Client::new(
        Config::builder()
            .name("handoff-example".into())
            .storage(storage)
            .filters(filters)
            .build(),
    ))?;

    let id = handoff::enqueue_with::<WelcomeEmail>(&WelcomeEmailArgs {
        recipient: "someone@example.com".into(),
        attempt: 1,
    })?;
    tracing::info!("Enqueued welcome email {}", id);

    let id = client.enqueue_delayed_with::<MonthlyReport>(
        chrono::Duration::minutes(10),
        &MonthlyReportArgs {
            month: chrono::Utc::now().date_naive(),
            format: Format::Pdf,
            notify: None,
        },
    )?;
    tracing::info!("Scheduled monthly report {}", id);

    client.enqueue_with::<MonthlyReport>(&MonthlyReportArgs {
        month: chrono::Utc::now().date_naive(),
        format: Format::Csv,
        notify: Some("finance@example.com".into()),
    })?;

    println!("{}", client.get_metrics()?);

    drop(client);
    if let Some(client) = registry::teardown() {
        if let Ok(client) = Arc::try_unwrap(client) {
            client.close()?;
        }
    }

    Ok(())
}
