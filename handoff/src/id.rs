use crate::JobId;

pub(crate) struct Id(String);
impl Id {
    pub fn to_string(&self) -> String {
        self.0.clone()
    }
}

pub(crate) enum IdOf<'a> {
    Job(&'a JobId),
    Queue(&'a str),
    Queues,
    Schedule,
}

impl IdOf<'_> {
    pub fn get_id(&self, prefix: &str) -> Id {
        match self {
            IdOf::Job(id) => Id(format!("{}:job:{}", prefix, id)),
            IdOf::Queue(name) => Id(format!("{}:queue:{}", prefix, name)),
            IdOf::Queues => Id(format!("{}:queues", prefix)),
            IdOf::Schedule => Id(format!("{}:schedule", prefix)),
        }
    }
}
