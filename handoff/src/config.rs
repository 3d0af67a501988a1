use std::sync::Arc;

use crate::{filter::ClientFilter, storage::Storage};

/// Everything a [`Client`](crate::Client) is built from.
///
/// ```ignore
/// let config = handoff::Config::builder()
///     .name("billing".into())
///     .storage(Box::new(storage))
///     .filters(vec![Arc::new(handoff::filter::LoggingFilter)])
///     .build();
/// ```
#[derive(typed_builder::TypedBuilder)]
pub struct Config {
    /// Shows up in logs, handy when a process runs more than one client.
    #[builder(default = "default".to_string())]
    pub name: String,

    pub storage: Box<dyn Storage>,

    /// Filters in registration order; the first one is the outermost.
    #[builder(default)]
    pub filters: Vec<Arc<dyn ClientFilter>>,
}
