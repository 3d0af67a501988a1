use std::borrow::Cow;

use crate::core::Job;

pub(crate) const TYPE_KEY: &str = "Type";
pub(crate) const ARGS_KEY: &str = "Args";

/// What gets written to storage for one submission.
///
/// Built once per submission and only ever handed out by reference, so
/// filters observe exactly what storage receives.
#[derive(serde_derive::Serialize, serde_derive::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct JobDescriptor {
    #[serde(rename = "Type")]
    type_name: String,

    #[serde(rename = "Args")]
    args: Option<String>,
}

impl JobDescriptor {
    pub(crate) fn new(job_type: &JobType, args: Option<String>) -> Self {
        Self {
            type_name: job_type.name().to_string(),
            args,
        }
    }

    /// Fully qualified name of the work-item type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Encoded arguments, `None` when the job has none.
    pub fn args(&self) -> Option<&str> {
        self.args.as_deref()
    }

    /// The reserved `Type` and `Args` entries.
    pub fn fields(&self) -> [(&'static str, Option<&str>); 2] {
        [
            (TYPE_KEY, Some(self.type_name.as_str())),
            (ARGS_KEY, self.args()),
        ]
    }
}

/// Identity of a work-item type: its fully qualified name and its queue.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobType {
    name: Cow<'static, str>,
    queue: Cow<'static, str>,
}

impl JobType {
    pub fn of<J: Job>() -> Self {
        J::job_type()
    }

    /// A job type named `name`, using the queue derived from that name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        let queue = Cow::Owned(queue_name_for(&name));
        Self { name, queue }
    }

    pub fn with_queue(self, queue: impl Into<Cow<'static, str>>) -> Self {
        Self {
            queue: queue.into(),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }
}

/// `app::jobs::EmailJob` -> `email-job-queue`.
///
/// Generic arguments are dropped and only the last path segment is used.
pub fn queue_name_for(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    let short = base.rsplit("::").next().unwrap_or(base).trim();

    let chars = short.chars().collect::<Vec<_>>();
    let mut queue = String::with_capacity(short.len() + 8);
    for (i, c) in chars.iter().enumerate() {
        if *c == '_' || *c == '-' || c.is_whitespace() {
            if !queue.is_empty() && !queue.ends_with('-') {
                queue.push('-');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !queue.ends_with('-') {
                queue.push('-');
            }
        }

        queue.extend(c.to_lowercase());
    }

    if queue.is_empty() || queue.ends_with('-') {
        queue.push_str("queue");
    } else {
        queue.push_str("-queue");
    }
    queue
}
