//! Enable the test_helpers feature to expose an in-memory mailbox for testing code that uses
//! a [`Session`](crate::Session) without a server.
//!
//! To use add a dev-dependency on the crate adding the feature "test_helpers"
//! e.g.
//!
//! ```toml
//! [dependencies]
//! imap-courier = { version = "0.1" }
//!
//! [dev-dependencies]
//! # mirror the same configuration your dependencies and add test_helpers
//! imap-courier = { version = "0.1", features = ["test_helpers"] }
//! ```
//!
//! ```
//! use imap_courier::testing::{MemoryConnector, MemoryMessage};
//! use imap_courier::{Locator, Session};
//!
//! let memory = MemoryConnector::default();
//! memory.push(MemoryMessage::new(
//!     1,
//!     "fred@example.com",
//!     "hello",
//!     chrono::DateTime::parse_from_rfc3339("2024-03-01T08:00:00Z").unwrap(),
//! ));
//!
//! let mut session = Session::with_connector(memory.clone(), "u", "p", Locator::new("mail", 993));
//! assert_eq!(session.read(0, 1, false, false)[0].subject, "hello");
//! assert_eq!(memory.requests(), vec!["SELECT", "FETCH 1:1"]);
//! ```

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, FixedOffset};

use crate::error::{AppendError, ConnectionError, FetchError};
use crate::locator::Locator;
use crate::store::{Connector, Credentials, Store};
use crate::types::{BodyPart, Overview, Uid};

/// A message held by a [`MemoryConnector`].
#[derive(Clone, Debug)]
pub struct MemoryMessage {
    pub uid: Uid,
    /// The `From` value as a server would render it.
    pub from: String,
    pub subject: String,
    pub date: DateTime<FixedOffset>,
    /// `None` makes structure fetches fail.
    pub structure: Option<BodyPart>,
    /// Raw (still transfer-encoded) content by section number.
    pub sections: HashMap<String, Vec<u8>>,
}

impl MemoryMessage {
    pub fn new<F: Into<String>, S: Into<String>>(
        uid: Uid,
        from: F,
        subject: S,
        date: DateTime<FixedOffset>,
    ) -> Self {
        MemoryMessage {
            uid,
            from: from.into(),
            subject: subject.into(),
            date,
            structure: None,
            sections: HashMap::new(),
        }
    }

    pub fn with_structure(mut self, structure: BodyPart) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn with_section<S: Into<String>, D: Into<Vec<u8>>>(mut self, section: S, data: D) -> Self {
        self.sections.insert(section.into(), data.into());
        self
    }
}

#[derive(Debug)]
struct Mailbox {
    messages: Vec<MemoryMessage>,
    folders: Vec<String>,
    appended: Vec<(String, Vec<u8>)>,
    requests: Vec<String>,
    connections: usize,
    fail_connections: bool,
    fail_fetches: bool,
}

/// A [`Connector`] whose stores all share one in-memory mailbox.
///
/// Clones share the mailbox too, so a test can keep one clone to inspect what a session did
/// with the other. Every store call is recorded in [`requests`](Self::requests) under the name
/// of the IMAP command it stands for.
#[derive(Clone, Debug)]
pub struct MemoryConnector {
    mailbox: Arc<Mutex<Mailbox>>,
}

impl Default for MemoryConnector {
    fn default() -> Self {
        MemoryConnector {
            mailbox: Arc::new(Mutex::new(Mailbox {
                messages: Vec::new(),
                folders: vec!["INBOX".to_string()],
                appended: Vec::new(),
                requests: Vec::new(),
                connections: 0,
                fail_connections: false,
                fail_fetches: false,
            })),
        }
    }
}

impl MemoryConnector {
    fn lock(&self) -> MutexGuard<'_, Mailbox> {
        self.mailbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a message at the end of the mailbox.
    pub fn push(&self, message: MemoryMessage) {
        self.lock().messages.push(message);
    }

    pub fn add_folder<S: Into<String>>(&self, name: S) {
        self.lock().folders.push(name.into());
    }

    /// Make every connection attempt fail.
    pub fn fail_connections(&self, fail: bool) {
        self.lock().fail_connections = fail;
    }

    /// Make every count, overview and list request fail.
    pub fn fail_fetches(&self, fail: bool) {
        self.lock().fail_fetches = fail;
    }

    /// The folders and messages appended so far.
    pub fn appended(&self) -> Vec<(String, Vec<u8>)> {
        self.lock().appended.clone()
    }

    /// Every command issued so far, e.g. `FETCH 8:1` or `UID FETCH 42 BODY[2.1]`.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    /// How many connections have been opened.
    pub fn connections(&self) -> usize {
        self.lock().connections
    }
}

impl Connector for MemoryConnector {
    type Store = MemoryStore;

    fn connect(
        &self,
        _locator: &Locator,
        _credentials: &Credentials,
    ) -> Result<MemoryStore, ConnectionError> {
        let mut mailbox = self.lock();
        if mailbox.fail_connections {
            return Err(unavailable("connection refused").into());
        }
        mailbox.connections += 1;
        Ok(MemoryStore {
            connector: self.clone(),
        })
    }
}

/// The [`Store`] handed out by a [`MemoryConnector`].
#[derive(Debug)]
pub struct MemoryStore {
    connector: MemoryConnector,
}

impl MemoryStore {
    /// Record `request` and fail if fetches are set to fail.
    fn request(&self, request: String) -> Result<MutexGuard<'_, Mailbox>, FetchError> {
        let mut mailbox = self.connector.lock();
        mailbox.requests.push(request);
        if mailbox.fail_fetches {
            return Err(unavailable("fetch failed").into());
        }
        Ok(mailbox)
    }
}

impl Store for MemoryStore {
    fn message_count(&mut self) -> Result<u32, FetchError> {
        let mailbox = self.request("SELECT".to_string())?;
        Ok(mailbox.messages.len() as u32)
    }

    fn overview(&mut self, sequence_set: &str) -> Result<Vec<Overview>, FetchError> {
        let mailbox = self.request(format!("FETCH {}", sequence_set))?;
        let (low, high) = bounds(sequence_set);
        Ok(mailbox
            .messages
            .iter()
            .zip(1..)
            .filter(|(_, seq)| *seq >= low && *seq <= high)
            .map(|(m, seq)| Overview {
                message: seq,
                uid: m.uid,
                from: m.from.clone(),
                subject: m.subject.clone(),
                date: m.date,
            })
            .collect())
    }

    fn structure(&mut self, uid: Uid) -> Result<BodyPart, FetchError> {
        let mailbox = self.request(format!("UID FETCH {} BODYSTRUCTURE", uid))?;
        mailbox
            .messages
            .iter()
            .find(|m| m.uid == uid)
            .and_then(|m| m.structure.clone())
            .ok_or_else(|| FetchError::Missing {
                item: "BODYSTRUCTURE".to_string(),
                uid,
            })
    }

    fn body(&mut self, uid: Uid, section: &str) -> Result<Vec<u8>, FetchError> {
        let item = format!("BODY[{}]", section);
        let mailbox = self.request(format!("UID FETCH {} {}", uid, item))?;
        mailbox
            .messages
            .iter()
            .find(|m| m.uid == uid)
            .and_then(|m| m.sections.get(section).cloned())
            .ok_or(FetchError::Missing { item, uid })
    }

    fn folders(&mut self) -> Result<Vec<String>, FetchError> {
        let mailbox = self.request("LIST".to_string())?;
        Ok(mailbox.folders.clone())
    }

    fn append(&mut self, folder: &str, message: &[u8]) -> Result<(), AppendError> {
        let mut mailbox = self.connector.lock();
        mailbox.requests.push(format!("APPEND {}", folder));
        if !mailbox.folders.iter().any(|f| f == folder) {
            return Err(AppendError::Imap(unavailable("no such mailbox")));
        }
        mailbox.appended.push((folder.to_string(), message.to_vec()));
        Ok(())
    }

    fn logout(&mut self) -> Result<(), ConnectionError> {
        self.connector.lock().requests.push("LOGOUT".to_string());
        Ok(())
    }
}

fn unavailable(what: &str) -> imap::Error {
    imap::Error::Io(io::Error::new(io::ErrorKind::Other, what.to_string()))
}

/// The inclusive bounds of an `a:b` sequence set, in either order.
fn bounds(sequence_set: &str) -> (u32, u32) {
    let mut ends = sequence_set.split(':').map(|n| n.parse::<u32>().unwrap_or(0));
    let a = ends.next().unwrap_or(0);
    let b = ends.next().unwrap_or(a);
    (a.min(b), a.max(b))
}
