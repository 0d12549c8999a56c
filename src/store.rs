//! Append-only message threads keyed by contact.

use std::collections::HashMap;

use crate::models::{ContactId, DeliveryStatus, Message, MessageId, Sender};

#[derive(Debug, Default)]
pub struct MessageStore {
    threads: HashMap<ContactId, Vec<Message>>,
    last_id: u64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new message to the thread of `contact` and returns a copy of it.
    /// Ids come from one counter shared by every thread.
    pub fn append(
        &mut self,
        contact: ContactId,
        text: &str,
        sender: Sender,
        time: &str,
        status: DeliveryStatus,
    ) -> Message {
        self.last_id += 1;
        let message = Message {
            id: MessageId(self.last_id),
            text: text.to_string(),
            sender,
            time: time.to_string(),
            status,
        };
        self.threads.entry(contact).or_default().push(message.clone());
        message
    }

    pub fn thread(&self, contact: ContactId) -> &[Message] {
        self.threads.get(&contact).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn last_message(&self, contact: ContactId) -> Option<&Message> {
        self.thread(contact).last()
    }

    pub fn total_messages(&self) -> usize {
        self.threads.values().map(Vec::len).sum()
    }
}
