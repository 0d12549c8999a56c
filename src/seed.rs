//! Startup data: the fixed contact list and each contact's opening history.

use crate::models::{Contact, ContactId, Sender};

pub struct SeedMessage {
    pub text: &'static str,
    pub sender: Sender,
    pub time: &'static str,
}

pub struct SeedContact {
    pub contact: Contact,
    pub history: Vec<SeedMessage>,
}

impl SeedContact {
    pub fn new(id: u32, name: &str, avatar: &str) -> Self {
        SeedContact {
            contact: Contact::new(ContactId(id), name, avatar),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<SeedMessage>) -> Self {
        self.history = history;
        self
    }
}

fn from_contact(text: &'static str, time: &'static str) -> SeedMessage {
    SeedMessage { text, sender: Sender::Contact, time }
}

fn from_user(text: &'static str, time: &'static str) -> SeedMessage {
    SeedMessage { text, sender: Sender::User, time }
}

/// The stock directory with its opening conversations.
pub fn default_seed() -> Vec<SeedContact> {
    vec![
        SeedContact::new(1, "Dhruv", "👩‍💼").with_history(vec![
            from_contact("Hey, how are you doing?", "02:25 PM"),
            from_user("I'm good! Just working on some projects.", "02:27 PM"),
            from_contact("That sounds interesting! What kind of projects?", "02:28 PM"),
        ]),
        SeedContact::new(2, "Vatsal", "👨‍💻").with_history(vec![
            from_contact("Can we schedule a meeting?", "01:40 PM"),
            from_user("Sure! How about tomorrow at 3 PM?", "01:42 PM"),
        ]),
        SeedContact::new(3, "Om", "👩‍🎨").with_history(vec![
            from_contact("Thanks for your help!", "12:10 PM"),
            from_user("You're welcome! Happy to help anytime.", "12:12 PM"),
        ]),
        SeedContact::new(4, "Parth", "👨‍🔬").with_history(vec![
            from_contact("See you tomorrow", "11:25 AM"),
            from_user("Looking forward to it!", "11:27 AM"),
        ]),
        SeedContact::new(5, "Lax", "👩‍🏫").with_history(vec![
            from_contact("Great presentation today!", "10:15 AM"),
            from_user("Thank you! I put a lot of effort into it.", "10:17 AM"),
            from_contact("It really showed! The data visualization was excellent.", "10:18 AM"),
        ]),
    ]
}

/// The stock directory with every thread empty.
pub fn empty_seed() -> Vec<SeedContact> {
    default_seed()
        .into_iter()
        .map(|seed| seed.with_history(Vec::new()))
        .collect()
}
