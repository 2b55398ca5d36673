//! Public client for the static network data.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::assemble::{TaskTrace, assemble};
use super::error::FeedError;
use crate::domain::Snapshot;
use crate::transport::{HttpTransport, Transport, TransportConfig, TransportError};

/// Client assembling [`Snapshot`]s of the network.
///
/// The client owns a single-slot snapshot cache. The slot guard is held
/// across an assembly run, so a concurrent call waits for the in-flight
/// run instead of racing it: with caching requested it then observes that
/// run's result, without caching it starts its own run afterwards. Every
/// successful run replaces the slot wholesale.
pub struct SnapshotClient<T: Transport> {
    transport: Arc<T>,
    cache: Mutex<Option<Arc<Snapshot>>>,
}

impl SnapshotClient<HttpTransport> {
    /// Creates a client over the production HTTP transport.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }
}

impl<T: Transport + 'static> SnapshotClient<T> {
    /// Creates a client over any transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            cache: Mutex::new(None),
        }
    }

    /// Assembles a snapshot of the network.
    ///
    /// With `use_cache` set, a previously assembled snapshot is returned
    /// without touching the network; otherwise the datasets are fetched
    /// and joined afresh and the cache slot is replaced. Either way the
    /// returned snapshot is immutable and shared.
    pub async fn snapshot(&self, use_cache: bool) -> Result<Arc<Snapshot>, FeedError> {
        let mut slot = self.cache.lock().await;

        if use_cache {
            if let Some(snapshot) = slot.as_ref() {
                tracing::debug!("serving cached snapshot");
                return Ok(Arc::clone(snapshot));
            }
        }

        let assembled = assemble(Arc::clone(&self.transport), TaskTrace::default()).await?;
        let snapshot = Arc::new(assembled);
        *slot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }
}
