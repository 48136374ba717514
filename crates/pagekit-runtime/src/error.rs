#![forbid(unsafe_code)]

//! Error types for lifecycle plumbing.
//!
//! Everything here is contained by the runtime: subscription errors are
//! logged at debug level and skipped, refresh errors are logged at warn
//! level and reported through [`RefreshOutcome`](crate::lifecycle::RefreshOutcome).
//! Errors raised by user code (data loaders, submit handlers) travel as
//! [`BoxError`].

use thiserror::Error;

/// Boxed error returned by user-supplied hooks.
pub type BoxError = Box<dyn std::error::Error + 'static>;

/// Failure to release a change subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// The guard was already released.
    #[error("subscription already released")]
    AlreadyReleased,

    /// The notifier was dropped before the guard was released.
    #[error("notifier dropped before subscription release")]
    NotifierDropped,
}

/// Failure during a best-effort refresh.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The data-loading hook returned an error.
    #[error("data reload failed: {0}")]
    Load(#[source] BoxError),

    /// No local spawner was configured, so the refresh could not be scheduled.
    #[error("no local spawner configured for refresh")]
    NoSpawner,

    /// The local spawner refused the refresh task.
    #[error("refresh could not be scheduled: {0}")]
    Spawn(#[from] futures::task::SpawnError),
}

/// Failure to load page configuration.
#[cfg(feature = "policy-config")]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}
