use crate::{args::ArgsBuilder, models::JobType};

/// A work-item type that can be submitted.
///
/// The identity ends up in the `Type` field of every stored job, so it has
/// to stay the same across builds. `#[derive(Job)]` uses the module path and
/// the type name; a hand-written impl should do the same:
///
/// ```ignore
/// struct EmailJob;
///
/// impl handoff::Job for EmailJob {
///     fn job_type() -> handoff::JobType {
///         handoff::JobType::new(concat!(module_path!(), "::EmailJob"))
///     }
/// }
/// ```
///
/// `std::any::type_name` is not a stable identifier and must not be used
/// here. The derive accepts `#[job(name = "..", queue = "..")]` overrides.
pub trait Job: 'static {
    fn job_type() -> JobType;
}

/// Arguments of a job, declared field by field.
///
/// Implementations write each field into the builder; the builder takes care
/// of the invariant text conversion and lower-casing of the names.
pub trait JobArgs {
    fn write_args(&self, args: &mut ArgsBuilder);
}

impl<T: JobArgs + ?Sized> JobArgs for &T {
    fn write_args(&self, args: &mut ArgsBuilder) {
        (**self).write_args(args)
    }
}
