//! Virtual BLE sessions.
//!
//! The BC127 only knows link ids, which exist while a connection is up.
//! Sessions are fabricated on the host so that tests can address a peer
//! before it connects and keep addressing it across reconnections.

use crate::capability::{Bdaddr, BleSession};

/// Highest virtual session id.
pub const MAX_SESSIONS: u32 = 15;

/// Link id of a session without a connection.
pub const NO_LINK: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
struct VirtualSession {
    session_id: u32,
    bdaddr: Bdaddr,
    link_id: u32,
}

#[derive(Debug, Default)]
pub struct VirtualSessions {
    entries: Vec<VirtualSession>,
}

impl VirtualSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowest id in `1..=MAX_SESSIONS` not taken by a session.
    fn unused_id(&self) -> Option<u32> {
        (1..=MAX_SESSIONS).find(|id| self.entries.iter().all(|s| s.session_id != *id))
    }

    fn entry(&self, session_id: u32) -> Option<&VirtualSession> {
        self.entries.iter().find(|s| s.session_id == session_id)
    }

    /// New session for `bdaddr`; `None` when one exists already or every
    /// id is taken.
    pub fn create(&mut self, bdaddr: &Bdaddr) -> Option<BleSession> {
        if self.session_for(bdaddr).is_some() {
            return None;
        }
        let session_id = self.unused_id()?;
        self.entries.push(VirtualSession {
            session_id,
            bdaddr: bdaddr.clone(),
            link_id: NO_LINK,
        });
        Some(BleSession {
            session_id,
            bdaddr: bdaddr.clone(),
        })
    }

    pub fn delete(&mut self, session_id: u32) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.session_id != session_id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn session_for(&self, bdaddr: &Bdaddr) -> Option<u32> {
        self.entries
            .iter()
            .find(|s| &s.bdaddr == bdaddr)
            .map(|s| s.session_id)
    }

    pub fn bdaddr(&self, session_id: u32) -> Option<&Bdaddr> {
        self.entry(session_id).map(|s| &s.bdaddr)
    }

    /// Link id of a session, [`NO_LINK`] while disconnected.
    pub fn link(&self, session_id: u32) -> Option<u32> {
        self.entry(session_id).map(|s| s.link_id)
    }

    pub fn set_link(&mut self, session_id: u32, link_id: u32) -> bool {
        match self.entries.iter_mut().find(|s| s.session_id == session_id) {
            Some(session) => {
                session.link_id = link_id;
                true
            }
            None => false,
        }
    }

    /// Bind `link_id` to the session of `bdaddr`, creating the session when
    /// the peer connected on its own.
    pub fn attach_link(&mut self, bdaddr: &Bdaddr, link_id: u32) -> Option<u32> {
        let session_id = match self.session_for(bdaddr) {
            Some(id) => id,
            None => self.create(bdaddr)?.session_id,
        };
        self.set_link(session_id, link_id);
        Some(session_id)
    }

    pub fn sessions(&self) -> Vec<BleSession> {
        self.entries
            .iter()
            .map(|s| BleSession {
                session_id: s.session_id,
                bdaddr: s.bdaddr.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
