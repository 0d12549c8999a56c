//! Timer chains that drive simulated replies.
//!
//! A chain fires two events for the contact that was active when the user
//! sent a message: first [`ConversationEvent::PeerTyping`], then
//! [`ConversationEvent::PeerReplied`]. Scheduled tasks never touch
//! conversation state themselves; they only deliver events to the loop
//! that owns the [`ConversationController`](crate::controller::ConversationController).

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::models::ContactId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub u64);

/// A pending simulated reply owned by one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyChain {
    pub id: ChainId,
    pub contact: ContactId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationEvent {
    PeerTyping(ReplyChain),
    PeerReplied(ReplyChain),
}

impl ConversationEvent {
    pub fn chain(&self) -> ReplyChain {
        match self {
            ConversationEvent::PeerTyping(chain) | ConversationEvent::PeerReplied(chain) => *chain,
        }
    }
}

/// Delays measured from the moment the local message was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTiming {
    pub typing_after: Duration,
    pub reply_after: Duration,
}

impl Default for ReplyTiming {
    fn default() -> Self {
        ReplyTiming {
            typing_after: Duration::from_millis(1000),
            reply_after: Duration::from_millis(3000),
        }
    }
}

pub trait ReplyScheduler: Send {
    /// Starts the timer chain for `chain`.
    fn schedule(&mut self, chain: ReplyChain);

    /// Stops every chain still running for `contact`.
    fn cancel(&mut self, contact: ContactId);

    /// Called once the reply for `chain` has been applied.
    fn complete(&mut self, _chain: ReplyChain) {}
}

/// Runs each chain as a tokio task that sleeps and posts events to a channel.
///
/// Must be used from within a tokio runtime.
pub struct TokioReplyScheduler {
    timing: ReplyTiming,
    tx: mpsc::Sender<ConversationEvent>,
    tasks: HashMap<ContactId, Vec<(ChainId, AbortHandle)>>,
}

impl TokioReplyScheduler {
    pub fn new(timing: ReplyTiming) -> (Self, mpsc::Receiver<ConversationEvent>) {
        let (tx, rx) = mpsc::channel(100);
        let scheduler = TokioReplyScheduler {
            timing,
            tx,
            tasks: HashMap::new(),
        };
        (scheduler, rx)
    }

    pub fn running(&self, contact: ContactId) -> usize {
        self.tasks.get(&contact).map_or(0, |handles| {
            handles.iter().filter(|(_, handle)| !handle.is_finished()).count()
        })
    }
}

impl ReplyScheduler for TokioReplyScheduler {
    fn schedule(&mut self, chain: ReplyChain) {
        let tx = self.tx.clone();
        let typing_after = self.timing.typing_after;
        let reply_gap = self.timing.reply_after.saturating_sub(typing_after);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(typing_after).await;
            if tx.send(ConversationEvent::PeerTyping(chain)).await.is_err() {
                debug!("Event loop gone, dropping reply chain {:?}", chain.id);
                return;
            }
            tokio::time::sleep(reply_gap).await;
            if tx.send(ConversationEvent::PeerReplied(chain)).await.is_err() {
                debug!("Event loop gone, dropping reply chain {:?}", chain.id);
            }
        });

        let handles = self.tasks.entry(chain.contact).or_default();
        handles.retain(|(_, h)| !h.is_finished());
        handles.push((chain.id, handle.abort_handle()));
        debug!("Scheduled reply chain {:?} for {}", chain.id, chain.contact);
    }

    fn cancel(&mut self, contact: ContactId) {
        if let Some(handles) = self.tasks.remove(&contact) {
            info!("Cancelling {} reply chain(s) for {}", handles.len(), contact);
            for (_, handle) in handles {
                handle.abort();
            }
        }
    }

    fn complete(&mut self, chain: ReplyChain) {
        if let Some(handles) = self.tasks.get_mut(&chain.contact) {
            handles.retain(|(id, _)| *id != chain.id);
            if handles.is_empty() {
                self.tasks.remove(&chain.contact);
            }
        }
    }
}

/// Scheduler that starts nothing: the caller fires events by hand through
/// `ConversationController::handle_event`.
#[derive(Debug, Default)]
pub struct ManualScheduler;

impl ReplyScheduler for ManualScheduler {
    fn schedule(&mut self, _chain: ReplyChain) {}

    fn cancel(&mut self, _contact: ContactId) {}
}
