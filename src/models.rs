use std::fmt;

/// Identity of a contact in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactId(pub u32);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contact#{}", self.0)
    }
}

/// Store-wide message identity, strictly increasing in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub avatar: String,       // Single emoji glyph
    pub last_message: String, // Preview text, empty when the thread is empty
    pub time: String,         // Preview time label
    pub unread: u32,
}

impl Contact {
    pub fn new(id: ContactId, name: &str, avatar: &str) -> Self {
        Contact {
            id,
            name: name.to_string(),
            avatar: avatar.to_string(),
            last_message: String::new(),
            time: String::new(),
            unread: 0,
        }
    }

    pub fn has_preview(&self) -> bool {
        !self.last_message.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,    // The local user
    Contact, // The remote party of the thread
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DeliveryStatus {
    Sent,      // Shown as a single tick
    Delivered, // Shown as a double tick
}

impl DeliveryStatus {
    pub fn glyph(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "✓",
            DeliveryStatus::Delivered => "✓✓",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub time: String,
    pub status: DeliveryStatus,
}

impl Message {
    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}
