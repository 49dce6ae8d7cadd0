use metrics::counter;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{CartBackend, InMemoryCartBackend};
use crate::errors::ServiceError;

/// Which store the cart was set up to use at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// A durable store is configured and tried first on every call
    Durable,
    /// No durable store; everything lives in process memory
    Memory,
}

/// Runs cart operations against a primary backend with per-call fallback.
///
/// When the primary fails with a storage error the same logical operation is
/// rerun once against the fallback. The two stores are never reconciled:
/// lines written to one are invisible to the other.
#[derive(Clone)]
pub struct CompositeBackend {
    primary: Option<Arc<dyn CartBackend>>,
    fallback: Arc<dyn CartBackend>,
}

impl CompositeBackend {
    pub fn new(primary: Option<Arc<dyn CartBackend>>, fallback: Arc<dyn CartBackend>) -> Self {
        Self { primary, fallback }
    }

    /// Durable primary with an in-memory fallback
    pub fn durable(primary: Arc<dyn CartBackend>, fallback: Arc<InMemoryCartBackend>) -> Self {
        Self::new(Some(primary), fallback)
    }

    /// In-memory only
    pub fn memory_only(store: Arc<InMemoryCartBackend>) -> Self {
        Self::new(None, store)
    }

    pub fn mode(&self) -> BackendMode {
        if self.primary.is_some() {
            BackendMode::Durable
        } else {
            BackendMode::Memory
        }
    }

    /// Executes `op` against the active backend.
    ///
    /// Validation and not-found rejections from the primary are returned
    /// unchanged; only storage failures trigger the fallback.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, op: F) -> Result<T, ServiceError>
    where
        F: Fn(Arc<dyn CartBackend>) -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let Some(primary) = &self.primary else {
            return op(self.fallback.clone()).await;
        };

        match op(primary.clone()).await {
            Err(err) if err.is_backend_failure() => {
                warn!(
                    operation,
                    primary = primary.name(),
                    fallback = self.fallback.name(),
                    error = %err,
                    "Cart backend failed, retrying against fallback store"
                );
                counter!("giftcard_cart.backend.fallback", 1, "operation" => operation);
                op(self.fallback.clone()).await
            }
            result => {
                debug!(operation, backend = primary.name(), "Cart operation served");
                result
            }
        }
    }
}

impl std::fmt::Debug for CompositeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeBackend")
            .field("primary", &self.primary.as_ref().map(|b| b.name()))
            .field("fallback", &self.fallback.name())
            .finish()
    }
}
