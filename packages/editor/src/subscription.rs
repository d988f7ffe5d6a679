//! Change listeners
//!
//! Each listener owns the receiving half of an unbounded channel, so
//! notifying never blocks the edit that triggered it.

use lessondoc_document::Document;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Sent to every listener after a local edit is committed
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub version: u64,
    pub document: Arc<Document>,
    /// Serialized `document`, ready to persist
    pub json: String,
}

impl ChangeEvent {
    pub(crate) fn new(version: u64, document: Document, json: String) -> Self {
        Self {
            version,
            document: Arc::new(document),
            json,
        }
    }
}

/// Handle returned by `EditSurface::subscribe`
#[derive(Debug)]
pub struct Subscription {
    pub id: u64,
    pub receiver: UnboundedReceiver<ChangeEvent>,
}

#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    senders: Vec<(u64, UnboundedSender<ChangeEvent>)>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = unbounded_channel();
        let id = self.next_id;
        self.next_id += 1;
        self.senders.push((id, tx));
        Subscription { id, receiver: rx }
    }

    pub(crate) fn unsubscribe(&mut self, id: u64) -> bool {
        let before = self.senders.len();
        self.senders.retain(|(existing, _)| *existing != id);
        self.senders.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }

    /// Deliver to every live listener, pruning those whose receiver is gone
    pub(crate) fn notify(&mut self, event: ChangeEvent) {
        self.senders.retain(|(id, tx)| {
            let delivered = tx.send(event.clone()).is_ok();
            if !delivered {
                tracing::debug!("Dropping listener {}", id);
            }
            delivered
        });
    }
}
