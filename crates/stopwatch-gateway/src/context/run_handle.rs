use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use stopwatch_core::Run;

/// Request-local handle to the current [`Run`].
///
/// Inserted into request extensions by the timing middleware and extracted
/// by handlers. A disabled handle (caller rejected by the access gate, or no
/// middleware installed) turns every call into a no-op.
#[derive(Clone, Default)]
pub struct RunHandle {
    inner: Option<Arc<Mutex<Run>>>,
}

impl RunHandle {
    pub fn active(run: Run) -> Self {
        Self {
            inner: Some(Arc::new(Mutex::new(run))),
        }
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    /// Same shape as [`Run::record_marker`] so `stopwatch_core::marker!` works on handles.
    pub fn record_marker(&self, source_location: impl Into<String>, annotation: Option<&str>) {
        self.with_run(|run| {
            run.record_marker(source_location, annotation);
        });
    }

    pub fn mark(&self, source_location: impl Into<String>) {
        self.record_marker(source_location, None);
    }

    /// Run `f` against the locked run. `None` when disabled or the lock is poisoned.
    pub fn with_run<R>(&self, f: impl FnOnce(&mut Run) -> R) -> Option<R> {
        let inner = self.inner.as_ref()?;
        // Poisoned means a handler panicked mid-update; skip rather than crash the request.
        match inner.lock() {
            Ok(mut run) => Some(f(&mut run)),
            Err(_) => {
                tracing::warn!("run lock poisoned; marker skipped");
                None
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RunHandle
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<RunHandle>().cloned().unwrap_or_default())
    }
}
