//! Sender allow-list applied at the remote boundary.
//!
//! Messages from senders not on the list are dropped before they reach
//! the command processor.  No reply is sent, so an unknown sender learns
//! nothing about the device.

use heapless::String;
use log::warn;

use crate::app::ports::MAX_SENDER_LEN;

/// Maximum number of configured senders.
pub const MAX_ALLOWED_SENDERS: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct AllowList {
    ids: heapless::Vec<String<MAX_SENDER_LEN>, MAX_ALLOWED_SENDERS>,
}

impl AllowList {
    /// Build from configured ids.  Blank entries are skipped; entries
    /// beyond capacity or longer than a sender id are dropped with a
    /// warning.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for id in ids {
            let id = id.as_ref().trim();
            if id.is_empty() {
                continue;
            }
            let mut s = String::new();
            if s.push_str(id).is_err() || list.ids.push(s).is_err() {
                warn!("AllowList: dropping sender id '{}'", id);
            }
        }
        list
    }

    /// An empty list allows everyone.
    pub fn is_allowed(&self, sender: &str) -> bool {
        self.ids.is_empty() || self.ids.iter().any(|id| id.as_str() == sender)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
