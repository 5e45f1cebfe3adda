//! Sequential loading of platform resources.
//!
//! Resources are brought to `Loaded` one at a time, front to back. Already
//! loaded resources are skipped. The first failure aborts the whole run and
//! is reduced to a two-value classification; the underlying error detail is
//! only logged.

use thiserror::Error;

use crate::error::AppError;
use crate::platform::{LoadStatus, Loadable};

/// Why [`load_all`] failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("no internet connection")]
    NoInternet,
    #[error("failed to load resource")]
    Generic,
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NoInternet => AppError::Connectivity,
            LoadError::Generic => AppError::GenericLoad {
                reason: "a map resource failed to load".to_string(),
            },
        }
    }
}

/// Load every resource in `resources`, in order, stopping at the first
/// failure.
///
/// Each resource's own `retry_load` is called at most once; failed
/// resources are not looped.
pub async fn load_all<R: Loadable>(resources: &[R]) -> Result<(), LoadError> {
    for resource in resources {
        if resource.load_status() == LoadStatus::Loaded {
            tracing::trace!(resource = resource.name(), "Already loaded, skipping");
            continue;
        }

        tracing::debug!(resource = resource.name(), "Loading resource");
        if let Err(err) = resource.retry_load().await {
            tracing::warn!(resource = resource.name(), error = %err, "Resource failed to load");
            return Err(if err.is_no_internet() {
                LoadError::NoInternet
            } else {
                LoadError::Generic
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct Fake {
        name: String,
        status: Mutex<LoadStatus>,
        outcome: Result<(), PlatformError>,
        calls: Mutex<u32>,
    }

    impl Fake {
        fn new(name: &str, status: LoadStatus, outcome: Result<(), PlatformError>) -> Self {
            Self {
                name: name.to_string(),
                status: Mutex::new(status),
                outcome,
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock()
        }
    }

    #[async_trait]
    impl Loadable for Fake {
        fn name(&self) -> &str {
            &self.name
        }

        fn load_status(&self) -> LoadStatus {
            *self.status.lock()
        }

        async fn retry_load(&self) -> Result<(), PlatformError> {
            *self.calls.lock() += 1;
            *self.status.lock() = match self.outcome {
                Ok(()) => LoadStatus::Loaded,
                Err(_) => LoadStatus::Failed,
            };
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn empty_sequence_succeeds() {
        let resources: Vec<Fake> = Vec::new();
        assert_eq!(load_all(&resources).await, Ok(()));
    }

    #[tokio::test]
    async fn loaded_resources_are_not_touched() {
        let resources = vec![
            Fake::new("a", LoadStatus::Loaded, Err(PlatformError::other("unused"))),
            Fake::new("b", LoadStatus::Loaded, Err(PlatformError::other("unused"))),
        ];
        assert_eq!(load_all(&resources).await, Ok(()));
        assert!(resources.iter().all(|r| r.calls() == 0));
    }

    #[tokio::test]
    async fn failed_resources_are_retried_once() {
        let resources = vec![Fake::new("a", LoadStatus::Failed, Ok(()))];
        assert_eq!(load_all(&resources).await, Ok(()));
        assert_eq!(resources[0].calls(), 1);
        assert_eq!(resources[0].load_status(), LoadStatus::Loaded);
    }

    #[tokio::test]
    async fn connectivity_failure_stops_the_run() {
        let resources = vec![
            Fake::new("a", LoadStatus::NotLoaded, Ok(())),
            Fake::new(
                "b",
                LoadStatus::NotLoaded,
                Err(PlatformError::no_internet("offline")),
            ),
            Fake::new("c", LoadStatus::NotLoaded, Ok(())),
        ];
        assert_eq!(load_all(&resources).await, Err(LoadError::NoInternet));
        assert_eq!(resources[0].calls(), 1);
        assert_eq!(resources[1].calls(), 1);
        assert_eq!(resources[2].calls(), 0);
    }

    #[tokio::test]
    async fn other_failures_are_generic() {
        let resources = vec![Fake::new(
            "a",
            LoadStatus::NotLoaded,
            Err(PlatformError::other("corrupt")),
        )];
        assert_eq!(load_all(&resources).await, Err(LoadError::Generic));
    }
}
