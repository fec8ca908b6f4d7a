//! Watch subscriptions for snapshot replacement.
//!
//! The xDS server does not poll: it holds a [`Watch`] per streaming node
//! and is notified whenever the config manager publishes a new snapshot
//! for that node. Channels are bounded and lossy — a slow receiver skips
//! intermediate snapshots and picks up the latest on its next receive.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use gateway_core::{GatewayError, NodeHash, Result};

use crate::snapshot::Snapshot;

/// Unique identifier for a watch subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl WatchId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric value of this watch id.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

/// A subscription receiving snapshot replacements for one node.
#[derive(Debug)]
pub struct Watch {
    id: WatchId,
    node: NodeHash,
    receiver: mpsc::Receiver<Arc<Snapshot>>,
}

impl Watch {
    /// This watch's identifier.
    #[inline]
    pub fn id(&self) -> WatchId {
        self.id
    }

    /// The node this watch is subscribed to.
    #[inline]
    pub fn node(&self) -> NodeHash {
        self.node
    }

    /// Receive the next published snapshot. Returns `None` once the watch
    /// is cancelled or its manager dropped.
    pub async fn recv(&mut self) -> Option<Arc<Snapshot>> {
        self.receiver.recv().await
    }

    /// Non-blocking receive.
    pub fn try_recv(&mut self) -> std::result::Result<Arc<Snapshot>, mpsc::error::TryRecvError> {
        self.receiver.try_recv()
    }
}

#[derive(Debug, Clone)]
struct WatchSender {
    id: WatchId,
    sender: mpsc::Sender<Arc<Snapshot>>,
}

impl WatchSender {
    fn try_send(&self, snapshot: Arc<Snapshot>) -> Result<()> {
        match self.sender.try_send(snapshot) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                // Receiver is behind; it will see the next replacement.
                trace!(watch_id = %self.id, "watch channel full, skipping snapshot");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(GatewayError::WatchClosed {
                watch_id: self.id.0,
            }),
        }
    }
}

/// Tracks watch subscriptions per node.
///
/// Uses a `Mutex` internally; every locked section is short and free of
/// I/O.
#[derive(Debug)]
pub struct WatchManager {
    watches: Mutex<HashMap<NodeHash, Vec<WatchSender>>>,
    channel_buffer: usize,
}

impl Default for WatchManager {
    fn default() -> Self {
        Self::with_buffer_size(16)
    }
}

impl WatchManager {
    /// Create a manager with a custom channel buffer size.
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            watches: Mutex::new(HashMap::new()),
            channel_buffer: buffer_size,
        }
    }

    /// Create a watch for a node.
    pub fn create_watch(&self, node: NodeHash) -> Watch {
        let id = WatchId::next();
        let (sender, receiver) = mpsc::channel(self.channel_buffer);

        {
            let mut watches = self.watches.lock().expect("watch lock poisoned");
            watches
                .entry(node)
                .or_default()
                .push(WatchSender { id, sender });
        }

        debug!(watch_id = %id, node = %node, "created watch");

        Watch { id, node, receiver }
    }

    /// Cancel a watch subscription.
    pub fn cancel_watch(&self, watch_id: WatchId) {
        let mut watches = self.watches.lock().expect("watch lock poisoned");
        for senders in watches.values_mut() {
            if let Some(pos) = senders.iter().position(|s| s.id == watch_id) {
                senders.swap_remove(pos);
                debug!(watch_id = %watch_id, "cancelled watch");
                return;
            }
        }
        warn!(watch_id = %watch_id, "attempted to cancel unknown watch");
    }

    /// Notify all watches for a node; closed watches are pruned.
    pub fn notify(&self, node: NodeHash, snapshot: Arc<Snapshot>) {
        let senders: Vec<WatchSender> = {
            let watches = self.watches.lock().expect("watch lock poisoned");
            watches.get(&node).cloned().unwrap_or_default()
        };

        if senders.is_empty() {
            return;
        }

        let mut closed = Vec::new();
        for sender in &senders {
            if let Err(GatewayError::WatchClosed { watch_id }) =
                sender.try_send(Arc::clone(&snapshot))
            {
                closed.push(WatchId(watch_id));
            }
        }

        if !closed.is_empty() {
            let mut watches = self.watches.lock().expect("watch lock poisoned");
            if let Some(senders) = watches.get_mut(&node) {
                senders.retain(|s| !closed.contains(&s.id));
            }
        }
    }

    /// Number of active watches for a node.
    pub fn watch_count(&self, node: NodeHash) -> usize {
        let watches = self.watches.lock().expect("watch lock poisoned");
        watches.get(&node).map_or(0, Vec::len)
    }
}
