//! Conversation controller: owns the directory, the message store and the
//! selection state, and applies user intents and timer events to them.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::directory::{ContactDirectory, UnreadUpdate};
use crate::models::{Contact, ContactId, DeliveryStatus, Message, MessageId, Sender};
use crate::responder::ResponseSource;
use crate::scheduler::{ChainId, ConversationEvent, ReplyChain, ReplyScheduler};
use crate::seed::SeedContact;
use crate::store::MessageStore;

/// What happens to pending replies when the user sends again to the same contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Every send gets its own reply; chains interleave freely.
    #[default]
    Interleave,
    /// A new send cancels the contact's pending chains, so only the latest replies.
    Coalesce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationPhase {
    Idle,
    AwaitingReply,
    PeerTyping,
}

#[derive(Debug, Clone, Copy)]
struct PendingReply {
    contact: ContactId,
    typing: bool,
}

pub struct ConversationController {
    directory: ContactDirectory,
    store: MessageStore,
    selected: Option<ContactId>,
    sidebar_open: bool,
    peer_typing: bool,
    pending: BTreeMap<ChainId, PendingReply>,
    last_chain: u64,
    overlap: OverlapPolicy,
    scheduler: Box<dyn ReplyScheduler>,
    responder: Box<dyn ResponseSource>,
    clock: Box<dyn Clock>,
}

impl ConversationController {
    /// Builds the directory and threads from `seed`; every preview starts out
    /// as the last message of its seeded history. Nothing is selected yet.
    pub fn new(
        seed: Vec<SeedContact>,
        scheduler: Box<dyn ReplyScheduler>,
        responder: Box<dyn ResponseSource>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let mut store = MessageStore::new();
        let mut contacts = Vec::with_capacity(seed.len());

        for entry in seed {
            let mut contact = entry.contact;
            for message in &entry.history {
                let status = match message.sender {
                    Sender::User => DeliveryStatus::Sent,
                    Sender::Contact => DeliveryStatus::Delivered,
                };
                store.append(contact.id, message.text, message.sender, message.time, status);
            }
            if let Some(last) = store.last_message(contact.id) {
                contact.last_message = last.text.clone();
                contact.time = last.time.clone();
            }
            contacts.push(contact);
        }

        info!(
            "Conversation state ready: {} contacts, {} seeded messages",
            contacts.len(),
            store.total_messages()
        );

        ConversationController {
            directory: ContactDirectory::new(contacts),
            store,
            selected: None,
            sidebar_open: true,
            peer_typing: false,
            pending: BTreeMap::new(),
            last_chain: 0,
            overlap: OverlapPolicy::default(),
            scheduler,
            responder,
            clock,
        }
    }

    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    // Read models

    pub fn list_contacts(&self) -> &[Contact] {
        self.directory.list_contacts()
    }

    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.directory.get(id)
    }

    pub fn selected_id(&self) -> Option<ContactId> {
        self.selected
    }

    pub fn selected_contact(&self) -> Option<&Contact> {
        self.selected.and_then(|id| self.directory.get(id))
    }

    pub fn thread(&self, id: ContactId) -> &[Message] {
        self.store.thread(id)
    }

    /// Thread of the selected contact, empty when nothing is selected.
    pub fn active_thread(&self) -> &[Message] {
        match self.selected {
            Some(id) => self.store.thread(id),
            None => &[],
        }
    }

    pub fn is_peer_typing(&self) -> bool {
        self.peer_typing
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn pending_chains(&self) -> Vec<ReplyChain> {
        self.pending
            .iter()
            .map(|(id, reply)| ReplyChain { id: *id, contact: reply.contact })
            .collect()
    }

    pub fn conversation_phase(&self, contact: ContactId) -> ConversationPhase {
        let mut phase = ConversationPhase::Idle;
        for reply in self.pending.values().filter(|r| r.contact == contact) {
            if reply.typing {
                return ConversationPhase::PeerTyping;
            }
            phase = ConversationPhase::AwaitingReply;
        }
        phase
    }

    // Intents

    /// Makes `id` the active contact and clears its unread counter.
    /// Unknown ids leave the state untouched.
    pub fn select_contact(&mut self, id: ContactId) {
        if !self.directory.mark_read(id) {
            debug!("Ignoring selection of unknown {}", id);
            return;
        }
        if self.selected != Some(id) {
            info!("Selected {}", id);
        }
        self.selected = Some(id);
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
        debug!("Sidebar {}", if self.sidebar_open { "opened" } else { "closed" });
    }

    /// Appends `text` to the active thread and starts a simulated reply.
    ///
    /// Returns `None` without touching any state when no contact is selected
    /// or `text` is blank.
    pub fn send_message(&mut self, text: &str) -> Option<MessageId> {
        let Some(contact) = self.selected else {
            debug!("Dropping message: no contact selected");
            return None;
        };
        if text.trim().is_empty() {
            debug!("Dropping blank message for {}", contact);
            return None;
        }

        let time = self.clock.time_label();
        let message = self.store.append(contact, text, Sender::User, &time, DeliveryStatus::Sent);
        self.directory
            .update_preview(contact, &message.text, &message.time, UnreadUpdate::Reset);

        if self.overlap == OverlapPolicy::Coalesce {
            self.cancel_pending(contact);
        }

        self.last_chain += 1;
        let chain = ReplyChain { id: ChainId(self.last_chain), contact };
        self.pending.insert(chain.id, PendingReply { contact, typing: false });
        self.scheduler.schedule(chain);

        info!("Sent message {:?} to {} (reply chain {:?})", message.id, contact, chain.id);
        Some(message.id)
    }

    /// Applies a timer event. Events for chains that are no longer pending
    /// (cancelled or already applied) are ignored; returns whether the event
    /// changed anything.
    pub fn handle_event(&mut self, event: ConversationEvent) -> bool {
        match event {
            ConversationEvent::PeerTyping(chain) => {
                let Some(reply) = self.pending.get_mut(&chain.id) else {
                    debug!("Ignoring typing event for stale chain {:?}", chain.id);
                    return false;
                };
                reply.typing = true;
                self.peer_typing = true;
                debug!("{} is typing", chain.contact);
                true
            }
            ConversationEvent::PeerReplied(chain) => {
                let Some(reply) = self.pending.remove(&chain.id) else {
                    debug!("Ignoring reply event for stale chain {:?}", chain.id);
                    return false;
                };
                self.peer_typing = false;
                self.deliver_reply(reply.contact);
                self.scheduler.complete(chain);
                true
            }
        }
    }

    fn deliver_reply(&mut self, contact: ContactId) {
        let text = self.responder.next_response();
        let time = self.clock.time_label();
        let message = self
            .store
            .append(contact, &text, Sender::Contact, &time, DeliveryStatus::Delivered);

        let unread = if self.selected == Some(contact) {
            UnreadUpdate::Reset
        } else {
            UnreadUpdate::Increment
        };
        self.directory
            .update_preview(contact, &message.text, &message.time, unread);
        info!("Reply {:?} from {} ({:?})", message.id, contact, unread);
    }

    fn cancel_pending(&mut self, contact: ContactId) {
        let before = self.pending.len();
        self.pending.retain(|_, reply| reply.contact != contact);
        if self.pending.len() == before {
            return;
        }
        self.scheduler.cancel(contact);
        self.peer_typing = self.pending.values().any(|reply| reply.typing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::responder::{CannedResponder, CANNED_RESPONSES};
    use crate::scheduler::ManualScheduler;
    use crate::seed::{default_seed, empty_seed};

    const DHRUV: ContactId = ContactId(1);
    const VATSAL: ContactId = ContactId(2);

    fn controller(seed: Vec<SeedContact>) -> ConversationController {
        ConversationController::new(
            seed,
            Box::new(ManualScheduler),
            Box::new(CannedResponder::from_seed(1)),
            Box::new(FixedClock("09:30 AM".to_string())),
        )
    }

    fn fire_all(ctl: &mut ConversationController) {
        for chain in ctl.pending_chains() {
            ctl.handle_event(ConversationEvent::PeerTyping(chain));
            ctl.handle_event(ConversationEvent::PeerReplied(chain));
        }
    }

    #[test]
    fn test_seed_history_sets_previews() {
        let ctl = controller(default_seed());
        let dhruv = ctl.contact(DHRUV).unwrap();
        assert_eq!(dhruv.last_message, "That sounds interesting! What kind of projects?");
        assert_eq!(dhruv.time, "02:28 PM");
        assert_eq!(ctl.thread(DHRUV).len(), 3);
        assert!(ctl.selected_id().is_none());
        assert!(ctl.is_sidebar_open());
    }

    #[test]
    fn test_send_without_selection_is_rejected() {
        let mut ctl = controller(empty_seed());
        assert_eq!(ctl.send_message("hello"), None);
        assert!(ctl.list_contacts().iter().all(|c| !c.has_preview()));
        assert!(ctl.pending_chains().is_empty());
    }

    #[test]
    fn test_blank_message_changes_nothing() {
        let mut ctl = controller(default_seed());
        ctl.select_contact(DHRUV);
        let before = ctl.contact(DHRUV).unwrap().clone();

        assert_eq!(ctl.send_message("   \t "), None);
        assert_eq!(ctl.send_message(""), None);

        assert_eq!(ctl.thread(DHRUV).len(), 3);
        assert_eq!(ctl.contact(DHRUV).unwrap(), &before);
        assert_eq!(ctl.conversation_phase(DHRUV), ConversationPhase::Idle);
    }

    #[test]
    fn test_send_walks_through_phases() {
        let mut ctl = controller(empty_seed());
        ctl.select_contact(DHRUV);

        ctl.send_message("hello").unwrap();
        assert_eq!(ctl.thread(DHRUV).len(), 1);
        assert_eq!(ctl.conversation_phase(DHRUV), ConversationPhase::AwaitingReply);
        assert!(!ctl.is_peer_typing());

        let chain = ctl.pending_chains()[0];
        assert!(ctl.handle_event(ConversationEvent::PeerTyping(chain)));
        assert_eq!(ctl.conversation_phase(DHRUV), ConversationPhase::PeerTyping);
        assert!(ctl.is_peer_typing());
        assert_eq!(ctl.thread(DHRUV).len(), 1);

        assert!(ctl.handle_event(ConversationEvent::PeerReplied(chain)));
        assert_eq!(ctl.conversation_phase(DHRUV), ConversationPhase::Idle);
        assert!(!ctl.is_peer_typing());

        let thread = ctl.thread(DHRUV);
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].text, "hello");
        assert_eq!(thread[0].sender, Sender::User);
        assert_eq!(thread[0].status, DeliveryStatus::Sent);
        assert_eq!(thread[1].sender, Sender::Contact);
        assert_eq!(thread[1].status, DeliveryStatus::Delivered);
        assert!(CANNED_RESPONSES.contains(&thread[1].text.as_str()));

        let dhruv = ctl.contact(DHRUV).unwrap();
        assert_eq!(dhruv.last_message, thread[1].text);
        assert_eq!(dhruv.unread, 0);
    }

    #[test]
    fn test_message_text_is_kept_as_typed() {
        let mut ctl = controller(empty_seed());
        ctl.select_contact(DHRUV);
        ctl.send_message("  padded  ").unwrap();
        assert_eq!(ctl.thread(DHRUV)[0].text, "  padded  ");
        assert_eq!(ctl.contact(DHRUV).unwrap().last_message, "  padded  ");
    }

    #[test]
    fn test_reply_after_navigating_away_counts_as_unread() {
        let mut ctl = controller(empty_seed());
        ctl.select_contact(DHRUV);
        ctl.send_message("are you there?").unwrap();
        ctl.select_contact(VATSAL);

        fire_all(&mut ctl);

        assert_eq!(ctl.contact(DHRUV).unwrap().unread, 1);
        assert_eq!(ctl.contact(VATSAL).unwrap().unread, 0);
        assert_eq!(ctl.thread(DHRUV).len(), 2);
        assert!(ctl.thread(VATSAL).is_empty());

        ctl.select_contact(DHRUV);
        assert_eq!(ctl.contact(DHRUV).unwrap().unread, 0);
    }

    #[test]
    fn test_unread_does_not_come_back_after_reselect() {
        let mut ctl = controller(empty_seed());
        ctl.select_contact(VATSAL);
        for text in ["one", "two", "three"] {
            ctl.send_message(text).unwrap();
        }
        ctl.select_contact(DHRUV);
        fire_all(&mut ctl);
        assert_eq!(ctl.contact(VATSAL).unwrap().unread, 3);

        ctl.select_contact(VATSAL);
        assert_eq!(ctl.contact(VATSAL).unwrap().unread, 0);
        ctl.select_contact(DHRUV);
        ctl.select_contact(VATSAL);
        assert_eq!(ctl.contact(VATSAL).unwrap().unread, 0);
    }

    #[test]
    fn test_unknown_contact_selection_is_noop() {
        let mut ctl = controller(empty_seed());
        ctl.select_contact(DHRUV);
        ctl.select_contact(ContactId(99));
        assert_eq!(ctl.selected_id(), Some(DHRUV));
    }

    #[test]
    fn test_overlapping_sends_interleave() {
        let mut ctl = controller(empty_seed());
        ctl.select_contact(DHRUV);
        ctl.send_message("first").unwrap();
        ctl.send_message("second").unwrap();
        assert_eq!(ctl.pending_chains().len(), 2);

        fire_all(&mut ctl);
        let senders: Vec<Sender> = ctl.thread(DHRUV).iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::User, Sender::Contact, Sender::Contact]);
        let ids: Vec<MessageId> = ctl.thread(DHRUV).iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_coalesce_keeps_only_latest_chain() {
        let mut ctl = controller(empty_seed()).with_overlap(OverlapPolicy::Coalesce);
        ctl.select_contact(DHRUV);
        ctl.send_message("first").unwrap();
        let stale = ctl.pending_chains()[0];
        ctl.handle_event(ConversationEvent::PeerTyping(stale));
        assert!(ctl.is_peer_typing());

        ctl.send_message("second").unwrap();
        assert!(!ctl.is_peer_typing());
        assert_eq!(ctl.pending_chains().len(), 1);

        assert!(!ctl.handle_event(ConversationEvent::PeerReplied(stale)));
        fire_all(&mut ctl);
        assert_eq!(ctl.thread(DHRUV).len(), 3);
    }

    #[test]
    fn test_sidebar_toggle_leaves_data_alone() {
        let mut ctl = controller(default_seed());
        ctl.select_contact(DHRUV);
        ctl.toggle_sidebar();
        assert!(!ctl.is_sidebar_open());
        ctl.toggle_sidebar();
        assert!(ctl.is_sidebar_open());
        assert_eq!(ctl.selected_id(), Some(DHRUV));
        assert_eq!(ctl.thread(DHRUV).len(), 3);
    }
}
