//! # Snapshot Writer
//!
//! Background task mirroring cart snapshots to the durable store.
//!
//! ## Write Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Snapshot Writer Flow                                 │
//! │                                                                         │
//! │  CartStore (mutator)                                                   │
//! │   add_to_cart ──► submit(seq 1, "[…]") ─┐                              │
//! │   increment   ──► submit(seq 2, "[…]") ─┤  never blocks, never awaits  │
//! │   decrement   ──► submit(seq 3, "[…]") ─┤                              │
//! │                                          ▼                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          unbounded mpsc queue (FIFO)                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    SnapshotWriter::run                          │   │
//! │  │                                                                 │   │
//! │  │  Persist  → store.set(key, payload).await, one at a time       │   │
//! │  │             failure: logged, not retried, not surfaced         │   │
//! │  │  Flush    → ack once everything before it was attempted        │   │
//! │  │  Shutdown → stop after everything before it was attempted      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Because a single task drains the queue in order, an older snapshot   │
//! │  can never land after a newer one.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;

// =============================================================================
// Commands
// =============================================================================

/// A command for the writer task.
#[derive(Debug)]
pub enum WriteCommand {
    /// Write `payload` under the writer's key.
    Persist { seq: u64, payload: String },

    /// Acknowledge once all earlier commands have been processed.
    Flush(oneshot::Sender<()>),

    /// Stop after all earlier commands have been processed.
    Shutdown,
}

/// Counters reported when the writer stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Snapshots successfully written.
    pub written: u64,
    /// Snapshots whose write failed.
    pub failed: u64,
    /// Sequence number of the last snapshot successfully written.
    pub last_written_seq: Option<u64>,
}

// =============================================================================
// Writer Handle
// =============================================================================

/// Handle for submitting work to the writer.
#[derive(Debug, Clone)]
pub struct SnapshotWriterHandle {
    tx: mpsc::UnboundedSender<WriteCommand>,
}

impl SnapshotWriterHandle {
    /// Queues a snapshot for writing. Returns immediately.
    pub fn submit(&self, seq: u64, payload: String) -> StoreResult<()> {
        self.tx
            .send(WriteCommand::Persist { seq, payload })
            .map_err(|_| StoreError::WriterClosed)
    }

    /// Waits until every snapshot submitted before this call was attempted.
    pub async fn flush(&self) -> StoreResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(WriteCommand::Flush(ack_tx))
            .map_err(|_| StoreError::WriterClosed)?;
        ack_rx.await.map_err(|_| StoreError::WriterClosed)
    }

    /// Asks the writer to stop once the queue ahead of this call is drained.
    pub fn shutdown(&self) -> StoreResult<()> {
        self.tx
            .send(WriteCommand::Shutdown)
            .map_err(|_| StoreError::WriterClosed)
    }

    /// True once the writer task has stopped receiving.
    #[cfg(test)]
    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// =============================================================================
// Writer Task
// =============================================================================

/// Drains write commands in submission order.
pub struct SnapshotWriter {
    store: Arc<dyn KeyValueStore>,
    key: String,
    rx: mpsc::UnboundedReceiver<WriteCommand>,
    stats: WriterStats,
}

impl SnapshotWriter {
    /// Creates a writer for `key` and returns it with its handle.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> (Self, SnapshotWriterHandle) {
        let (tx, rx) = mpsc::unbounded_channel();

        let writer = SnapshotWriter {
            store,
            key: key.into(),
            rx,
            stats: WriterStats::default(),
        };

        (writer, SnapshotWriterHandle { tx })
    }

    /// Creates a writer and spawns it on the current tokio runtime.
    pub fn spawn(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
    ) -> (SnapshotWriterHandle, JoinHandle<WriterStats>) {
        let (writer, handle) = SnapshotWriter::new(store, key);
        let task = tokio::spawn(writer.run());
        (handle, task)
    }

    /// Runs the writer loop until shutdown or until every handle is dropped.
    pub async fn run(mut self) -> WriterStats {
        info!(key = %self.key, "Snapshot writer starting");

        while let Some(command) = self.rx.recv().await {
            match command {
                WriteCommand::Persist { seq, payload } => self.persist(seq, &payload).await,
                WriteCommand::Flush(ack) => {
                    // The flusher may have given up waiting.
                    let _ = ack.send(());
                }
                WriteCommand::Shutdown => {
                    info!("Snapshot writer shutting down");
                    break;
                }
            }
        }

        info!(
            written = self.stats.written,
            failed = self.stats.failed,
            "Snapshot writer stopped"
        );
        self.stats
    }

    async fn persist(&mut self, seq: u64, payload: &str) {
        match self.store.set(&self.key, payload).await {
            Ok(()) => {
                self.stats.written += 1;
                self.stats.last_written_seq = Some(seq);
                debug!(seq, bytes = payload.len(), "Snapshot persisted");
            }
            Err(e) => {
                // Best-effort durability: the in-memory cart stays authoritative.
                self.stats.failed += 1;
                error!(?e, seq, key = %self.key, "Failed to persist cart snapshot");
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
