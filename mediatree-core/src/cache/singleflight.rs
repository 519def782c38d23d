//! Load coalescing
//!
//! Wraps the `async_singleflight` crate so that concurrent loads of the same
//! node track share one fetch: the first caller runs it, everyone else
//! waits for that result.
//!
//! The group only hands the leader's `Err` to the leader itself, so the
//! load outcome travels as the shared value and every waiter sees the same
//! `Ok` or `Err`.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use crate::models::NodeId;
use crate::tree::LoadTrack;
use crate::{Error, Result};

/// Key of one in-flight load.
///
/// Carries the scope of the node's cache: the same item in another scope is
/// a different node and must not join its load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlightKey {
    pub scope: u64,
    pub node: NodeId,
    pub track: LoadTrack,
}

impl FlightKey {
    #[must_use]
    pub const fn new(scope: u64, node: NodeId, track: LoadTrack) -> Self {
        Self { scope, node, track }
    }
}

/// At most one running load per [`FlightKey`].
#[derive(Clone)]
pub struct LoadFlights {
    group: Arc<async_singleflight::Group<FlightKey, Result<()>, Infallible>>,
}

impl LoadFlights {
    #[must_use]
    pub fn new() -> Self {
        Self {
            group: Arc::new(async_singleflight::Group::new()),
        }
    }

    /// Run `load` unless a load for `key` is already running, in which case
    /// wait for that one and return its outcome.
    pub async fn run<Fut>(&self, key: FlightKey, load: Fut) -> Result<()>
    where
        Fut: Future<Output = Result<()>> + Send,
    {
        let shared = async move { Ok::<_, Infallible>(load.await) };

        // Err(None): the leader was dropped or panicked
        match self.group.work(&key, shared).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(node_id = %key.node, track = ?key.track, "Load leader abandoned");
                Err(Error::Unknown(format!("load of {} abandoned", key.node)))
            }
        }
    }
}

impl Default for LoadFlights {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoadFlights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadFlights").finish_non_exhaustive()
    }
}
