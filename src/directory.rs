//! Contact directory: the fixed list of conversation partners and their
//! sidebar preview fields.

use log::debug;

use crate::models::{Contact, ContactId};

/// How an `update_preview` call treats the unread counter.
///
/// At most one of increment/reset applies per update, so this is an enum
/// rather than a pair of flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnreadUpdate {
    #[default]
    Keep,
    Increment,
    Reset,
}

#[derive(Debug, Clone, Default)]
pub struct ContactDirectory {
    contacts: Vec<Contact>,
}

impl ContactDirectory {
    pub fn new(contacts: Vec<Contact>) -> Self {
        ContactDirectory { contacts }
    }

    /// Contacts in stable insertion order.
    pub fn list_contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// Clears the unread counter of `id`. Returns false for unknown ids.
    pub fn mark_read(&mut self, id: ContactId) -> bool {
        match self.get_mut(id) {
            Some(contact) => {
                contact.unread = 0;
                true
            }
            None => false,
        }
    }

    pub fn update_preview(&mut self, id: ContactId, text: &str, time: &str, unread: UnreadUpdate) {
        let Some(contact) = self.get_mut(id) else {
            debug!("Ignoring preview update for unknown {}", id);
            return;
        };
        contact.last_message = text.to_string();
        contact.time = time.to_string();
        match unread {
            UnreadUpdate::Keep => {}
            UnreadUpdate::Increment => contact.unread = contact.unread.saturating_add(1),
            UnreadUpdate::Reset => contact.unread = 0,
        }
    }

    fn get_mut(&mut self, id: ContactId) -> Option<&mut Contact> {
        self.contacts.iter_mut().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> ContactDirectory {
        ContactDirectory::new(vec![
            Contact::new(ContactId(1), "Dhruv", "👩‍💼"),
            Contact::new(ContactId(2), "Vatsal", "👨‍💻"),
        ])
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let dir = directory();
        let names: Vec<&str> = dir.list_contacts().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Dhruv", "Vatsal"]);
    }

    #[test]
    fn test_update_preview_unread_modes() {
        let mut dir = directory();
        let id = ContactId(2);

        dir.update_preview(id, "hi", "10:00 AM", UnreadUpdate::Increment);
        dir.update_preview(id, "again", "10:01 AM", UnreadUpdate::Increment);
        assert_eq!(dir.get(id).unwrap().unread, 2);

        dir.update_preview(id, "still", "10:02 AM", UnreadUpdate::Keep);
        let contact = dir.get(id).unwrap();
        assert_eq!(contact.unread, 2);
        assert_eq!(contact.last_message, "still");
        assert_eq!(contact.time, "10:02 AM");

        dir.update_preview(id, "read", "10:03 AM", UnreadUpdate::Reset);
        assert_eq!(dir.get(id).unwrap().unread, 0);
    }

    #[test]
    fn test_unknown_contact_is_ignored() {
        let mut dir = directory();
        dir.update_preview(ContactId(42), "ghost", "", UnreadUpdate::Increment);
        assert!(!dir.mark_read(ContactId(42)));
        assert!(dir.list_contacts().iter().all(|c| c.unread == 0 && !c.has_preview()));
    }
}
