//! Best-effort side lookups.
//!
//! Document names and retrieval traces decorate an answer but are never
//! required for it. [`Lookup`] turns a fallible remote call into a value the
//! caller must inspect, so failures stay out of the main resolution path.

use std::future::Future;

use tracing::debug;

/// Outcome of a best-effort lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The lookup succeeded.
    Found(T),
    /// The lookup failed; the reason is kept for diagnostics only.
    Missing(String),
}

impl<T> Lookup<T> {
    /// Await `fut`, converting any error into [`Lookup::Missing`].
    pub async fn attempt<F>(what: &str, fut: F) -> Self
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match fut.await {
            Ok(value) => Lookup::Found(value),
            Err(e) => {
                debug!(lookup = what, error = %e, "best-effort lookup failed");
                Lookup::Missing(format!("{:#}", e))
            }
        }
    }

    /// Convert into an `Option`, dropping the failure reason.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Missing(_) => None,
        }
    }

    /// Whether the lookup succeeded.
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Map the found value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::Missing(reason) => Lookup::Missing(reason),
        }
    }

    /// Found value or `default`.
    pub fn unwrap_or(self, default: T) -> T {
        self.found().unwrap_or(default)
    }
}

impl<T: Default> Lookup<T> {
    /// Found value or `T::default()` ("zero results").
    pub fn unwrap_or_default(self) -> T {
        self.found().unwrap_or_default()
    }
}
