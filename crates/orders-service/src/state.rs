//! Application state.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::async_trait;
use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use orders_store::{Deadline, MemoryStore, OrderStore, StoreError};

use crate::config::{ServiceConfig, StoreBackend};
use crate::error::ApiError;

/// How much earlier than the request timeout store calls must finish.
pub const STORE_DEADLINE_MARGIN: Duration = Duration::from_millis(250);

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The order store.
    pub store: Arc<dyn OrderStore>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn OrderStore>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    /// The store deadline for a request that entered the service at `start`.
    ///
    /// Ends [`STORE_DEADLINE_MARGIN`] before the request timeout measured from
    /// the same instant.
    #[must_use]
    pub fn deadline_from(&self, start: Instant) -> Deadline {
        let budget = Duration::from_secs(self.config.request_timeout_seconds)
            .saturating_sub(STORE_DEADLINE_MARGIN);
        start
            .checked_add(budget)
            .map_or_else(Deadline::none, Deadline::at)
    }

    /// Run a store operation on the blocking thread pool.
    ///
    /// Store calls block on the backend, so they are kept off the async
    /// workers. The operation receives `deadline`.
    pub async fn with_store<T, F>(&self, deadline: Deadline, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn OrderStore, &Deadline) -> orders_store::Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);

        tokio::task::spawn_blocking(move || op(store.as_ref(), &deadline))
            .await
            .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
            .map_err(ApiError::from)
    }
}

/// The instant a request entered the service, set by [`stamp_request_start`].
#[derive(Debug, Clone, Copy)]
pub struct RequestStart(pub Instant);

/// Middleware recording when each request arrived.
///
/// Installed just inside the timeout layer so that store deadlines and the
/// request timeout are measured from the same point.
pub async fn stamp_request_start(mut request: Request, next: Next) -> Response {
    request
        .extensions_mut()
        .insert(RequestStart(Instant::now()));
    next.run(request).await
}

/// Extractor yielding the store deadline for the current request.
///
/// Falls back to "now" as the start when the request was not stamped.
#[derive(Debug, Clone, Copy)]
pub struct RequestDeadline(pub Deadline);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestDeadline {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let start = parts
            .extensions
            .get::<RequestStart>()
            .map_or_else(Instant::now, |stamp| stamp.0);
        Ok(Self(state.deadline_from(start)))
    }
}

/// Open the store selected by the configuration.
///
/// # Errors
///
/// Returns an error if the `RocksDB` store cannot be opened, or if `RocksDB`
/// was requested but the service was built without it.
pub fn open_store(config: &ServiceConfig) -> Result<Arc<dyn OrderStore>, StoreError> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store - orders will not survive a restart");
            Ok(Arc::new(MemoryStore::in_memory()))
        }
        #[cfg(feature = "rocksdb-backend")]
        StoreBackend::RocksDb => {
            tracing::info!(path = %config.data_dir, "Opening RocksDB store");
            let store = orders_store::RocksStore::open(&config.data_dir)?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "rocksdb-backend"))]
        StoreBackend::RocksDb => Err(StoreError::Backend(
            "RocksDB backend not compiled in (enable the rocksdb-backend feature)".into(),
        )),
    }
}
