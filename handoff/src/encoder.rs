use serde::{de::DeserializeOwned, Serialize};

pub fn encode(input: impl Serialize) -> anyhow::Result<String> {
    Ok(serde_json::to_string(&input)?)
}

pub fn decode<T: DeserializeOwned>(input: &str) -> anyhow::Result<T> {
    Ok(serde_json::from_str(input)?)
}
