//! Argument materialization.
//!
//! Job arguments end up in the job descriptor as one JSON object mapping
//! lower-cased field names to invariant text (or `null`). Values get there
//! through [`ToArgText`], so only types with a canonical text form can be
//! used as arguments at all.

use std::{borrow::Cow, collections::BTreeMap};

use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::{core::JobArgs, encoder, JobId};

/// Flat argument mapping as stored in the `Args` field of a job.
pub type ArgsMap = BTreeMap<String, Option<String>>;

#[derive(thiserror::Error, Debug)]
pub enum ArgsError {
    #[error("unable to convert argument `{field}` of type `{type_name}` to text: {reason}")]
    Conversion {
        field: String,
        type_name: &'static str,
        reason: String,
    },

    #[error("argument `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("unable to encode job arguments")]
    Encode(#[source] anyhow::Error),
}

/// Why a value has no invariant text form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ArgTextError(String);

impl ArgTextError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Locale-invariant text form of an argument value. `Ok(None)` is an absent
/// value and is stored as `null`.
pub trait ToArgText {
    fn to_arg_text(&self) -> Result<Option<String>, ArgTextError>;
}

/// Collects the fields of one argument object.
///
/// The first failing field is kept and reported by [`ArgsBuilder::finish`];
/// fields written after it are ignored.
#[derive(Debug, Default)]
pub struct ArgsBuilder {
    values: ArgsMap,
    error: Option<ArgsError>,
}

impl ArgsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<V>(&mut self, name: &str, value: &V) -> &mut Self
    where
        V: ToArgText + ?Sized,
    {
        self.insert(name, std::any::type_name::<V>(), value.to_arg_text())
    }

    pub(crate) fn insert(
        &mut self,
        name: &str,
        type_name: &'static str,
        text: Result<Option<String>, ArgTextError>,
    ) -> &mut Self {
        if self.error.is_some() {
            return self;
        }

        let key = name.to_lowercase();
        match text {
            Ok(_) if self.values.contains_key(&key) => {
                self.error = Some(ArgsError::DuplicateField(key));
            }
            Ok(text) => {
                self.values.insert(key, text);
            }
            Err(e) => {
                self.error = Some(ArgsError::Conversion {
                    field: name.to_string(),
                    type_name,
                    reason: e.to_string(),
                });
            }
        }

        self
    }

    /// Encodes the collected fields. No fields at all is `None`, not `{}`.
    pub fn finish(self) -> Result<Option<String>, ArgsError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.values.is_empty() {
            return Ok(None);
        }

        encoder::encode(&self.values)
            .context("Unable to serialize the arguments to text")
            .map(Some)
            .map_err(ArgsError::Encode)
    }
}

/// Materializes an optional argument object into the `Args` text of a job.
pub fn materialize(args: Option<&dyn JobArgs>) -> Result<Option<String>, ArgsError> {
    match args {
        Some(args) => {
            let mut builder = ArgsBuilder::new();
            args.write_args(&mut builder);
            builder.finish()
        }
        None => Ok(None),
    }
}

/// Decodes the `Args` text of a job back into its flat mapping.
pub fn decode_args(text: &str) -> anyhow::Result<ArgsMap> {
    encoder::decode(text).context("Unable to decode job arguments")
}

/// Ad-hoc arguments, populated key by key.
///
/// ```ignore
/// let args = handoff::Args::new()
///     .arg("Recipient", "a@x.com")
///     .arg("Attempt", 3);
/// client.enqueue_with::<EmailJob>(&args)?;
/// ```
#[derive(Debug, Default, Clone)]
pub struct Args {
    entries: Vec<(String, &'static str, Result<Option<String>, ArgTextError>)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg<V: ToArgText>(mut self, name: impl Into<String>, value: V) -> Self {
        let text = value.to_arg_text();
        self.entries
            .push((name.into(), std::any::type_name::<V>(), text));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl JobArgs for Args {
    fn write_args(&self, args: &mut ArgsBuilder) {
        for (name, type_name, text) in &self.entries {
            args.insert(name, *type_name, text.clone());
        }
    }
}

impl ToArgText for str {
    fn to_arg_text(&self) -> Result<Option<String>, ArgTextError> {
        Ok(Some(self.to_string()))
    }
}

impl ToArgText for String {
    fn to_arg_text(&self) -> Result<Option<String>, ArgTextError> {
        Ok(Some(self.clone()))
    }
}

impl ToArgText for Cow<'_, str> {
    fn to_arg_text(&self) -> Result<Option<String>, ArgTextError> {
        Ok(Some(self.to_string()))
    }
}

impl<T: ToArgText + ?Sized> ToArgText for &T {
    fn to_arg_text(&self) -> Result<Option<String>, ArgTextError> {
        (**self).to_arg_text()
    }
}

impl<T: ToArgText> ToArgText for Option<T> {
    fn to_arg_text(&self) -> Result<Option<String>, ArgTextError> {
        match self {
            Some(value) => value.to_arg_text(),
            None => Ok(None),
        }
    }
}

macro_rules! display_arg_text {
    ($($ty:ty),+) => {
        $(
            impl ToArgText for $ty {
                fn to_arg_text(&self) -> Result<Option<String>, ArgTextError> {
                    Ok(Some(self.to_string()))
                }
            }
        )+
    };
}

display_arg_text!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, uuid::Uuid,
    JobId
);

macro_rules! float_arg_text {
    ($($ty:ty),+) => {
        $(
            impl ToArgText for $ty {
                fn to_arg_text(&self) -> Result<Option<String>, ArgTextError> {
                    if !self.is_finite() {
                        return Err(ArgTextError::new(format!(
                            "{} has no invariant text form",
                            self
                        )));
                    }
                    Ok(Some(self.to_string()))
                }
            }
        )+
    };
}

float_arg_text!(f32, f64);

impl ToArgText for DateTime<Utc> {
    fn to_arg_text(&self) -> Result<Option<String>, ArgTextError> {
        Ok(Some(self.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
    }
}

impl ToArgText for DateTime<FixedOffset> {
    fn to_arg_text(&self) -> Result<Option<String>, ArgTextError> {
        Ok(Some(self.to_rfc3339_opts(SecondsFormat::AutoSi, false)))
    }
}

impl ToArgText for NaiveDate {
    fn to_arg_text(&self) -> Result<Option<String>, ArgTextError> {
        Ok(Some(self.format("%Y-%m-%d").to_string()))
    }
}

impl ToArgText for NaiveDateTime {
    fn to_arg_text(&self) -> Result<Option<String>, ArgTextError> {
        Ok(Some(self.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
    }
}
