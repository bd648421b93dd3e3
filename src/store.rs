//! The boundary between a [`Session`](crate::Session) and the IMAP client library.
//!
//! Everything a session does to the server goes through one of the [`Store`] methods, each of
//! which is a single IMAP command. [`ImapStore`] implements them with the `imap` crate; the
//! in-memory store in [`testing`](crate::testing) implements them without a server.

use std::io::{Read, Write};

use imap::{ClientBuilder, Connection, ConnectionMode};
use imap_proto::types::SectionPath;
use tracing::{debug, warn};

use crate::authenticator::Anonymous;
use crate::error::{AppendError, ConnectionError, FetchError};
use crate::locator::{Flag, Locator};
use crate::types::{BodyPart, Overview, Uid};
use crate::utils::{format_address, lossy};

/// What the session logs in with.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(user: U, password: P) -> Self {
        Credentials {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An open, authenticated mailbox.
pub trait Store {
    /// The number of messages in the mailbox, queried afresh.
    fn message_count(&mut self) -> Result<u32, FetchError>;

    /// Summaries of the messages in `sequence_set` (e.g. `8:1`).
    fn overview(&mut self, sequence_set: &str) -> Result<Vec<Overview>, FetchError>;

    /// The MIME structure of the message with the given UID.
    fn structure(&mut self, uid: Uid) -> Result<BodyPart, FetchError>;

    /// The raw, still transfer-encoded content of one body part (e.g. `2.1`).
    fn body(&mut self, uid: Uid, section: &str) -> Result<Vec<u8>, FetchError>;

    /// The names of every folder on the server.
    fn folders(&mut self) -> Result<Vec<String>, FetchError>;

    /// Add `message` to the end of `folder`.
    fn append(&mut self, folder: &str, message: &[u8]) -> Result<(), AppendError>;

    /// End the IMAP session.
    fn logout(&mut self) -> Result<(), ConnectionError>;

    /// Server messages that arrived outside of a command response (alerts, `BYE`, ...), oldest
    /// first. Each call returns only what arrived since the previous one.
    fn diagnostics(&mut self) -> Vec<String> {
        Vec::new()
    }
}

/// Something that can open a [`Store`].
pub trait Connector {
    type Store: Store;

    /// Connect to the server named by `locator`, authenticate and open its mailbox.
    fn connect(
        &self,
        locator: &Locator,
        credentials: &Credentials,
    ) -> Result<Self::Store, ConnectionError>;
}

/// Connects with the `imap` crate, honoring the locator's flags.
///
/// | flag              | effect                                            |
/// |-------------------|---------------------------------------------------|
/// | `ssl`             | TLS from the first byte                           |
/// | `tls`             | `STARTTLS`, failing if the server does not offer it |
/// | `notls`           | plaintext                                         |
/// | (none)            | `STARTTLS` when offered, plaintext otherwise      |
/// | `novalidate-cert` | accept any certificate                            |
/// | `secure`          | refuse to log in over plaintext                   |
/// | `anonymous`       | SASL `ANONYMOUS` with the user name as trace      |
/// | `readonly`        | `EXAMINE` instead of `SELECT`                     |
/// | `debug`           | the `imap` crate's protocol trace on stderr       |
/// | `nntp`            | rejected                                          |
#[derive(Clone, Copy, Debug, Default)]
pub struct ImapConnector;

impl Connector for ImapConnector {
    type Store = ImapStore<Connection>;

    fn connect(
        &self,
        locator: &Locator,
        credentials: &Credentials,
    ) -> Result<Self::Store, ConnectionError> {
        if locator.has(&Flag::Nntp) {
            return Err(ConnectionError::UnsupportedService("nntp".to_string()));
        }
        let mode = connection_mode(locator)?;
        debug!(host = locator.host(), port = locator.port(), ?mode, "connecting");

        let builder = ClientBuilder::new(locator.host(), locator.port()).mode(mode);
        #[cfg(any(feature = "native-tls", feature = "rustls-tls"))]
        let builder = builder.danger_skip_tls_verify(locator.has(&Flag::NoValidateCert));
        let client = builder.connect()?;

        let mut session = if locator.has(&Flag::Anonymous) {
            client
                .authenticate("ANONYMOUS", &Anonymous::new(credentials.user.as_str()))
                .map_err(|(e, _)| e)?
        } else {
            client
                .login(&credentials.user, &credentials.password)
                .map_err(|(e, _)| e)?
        };
        session.debug = locator.has(&Flag::Debug);

        ImapStore::open(session, locator.mailbox(), locator.has(&Flag::ReadOnly))
    }
}

fn connection_mode(locator: &Locator) -> Result<ConnectionMode, ConnectionError> {
    let secure = locator.has(&Flag::Secure);
    #[cfg(any(feature = "native-tls", feature = "rustls-tls"))]
    {
        if locator.has(&Flag::Ssl) {
            return Ok(ConnectionMode::Tls);
        }
        if locator.has(&Flag::Tls) || (secure && !locator.has(&Flag::NoTls)) {
            return Ok(ConnectionMode::StartTls);
        }
    }
    #[cfg(not(any(feature = "native-tls", feature = "rustls-tls")))]
    {
        if locator.has(&Flag::Ssl) || locator.has(&Flag::Tls) {
            return Err(ConnectionError::UnsupportedService("tls".to_string()));
        }
    }
    if secure {
        return Err(ConnectionError::Insecure);
    }
    if locator.has(&Flag::NoTls) {
        Ok(ConnectionMode::Plaintext)
    } else {
        Ok(ConnectionMode::Auto)
    }
}

/// A [`Store`] backed by an authenticated [`imap::Session`].
pub struct ImapStore<T: Read + Write> {
    session: imap::Session<T>,
    mailbox: String,
    readonly: bool,
}

impl<T: Read + Write> ImapStore<T> {
    /// Select (or, when `readonly`, examine) `mailbox` on an already authenticated session.
    pub fn open(
        session: imap::Session<T>,
        mailbox: &str,
        readonly: bool,
    ) -> Result<Self, ConnectionError> {
        let mut store = ImapStore {
            session,
            mailbox: mailbox.to_string(),
            readonly,
        };
        store.select()?;
        Ok(store)
    }

    fn select(&mut self) -> imap::error::Result<imap::types::Mailbox> {
        if self.readonly {
            self.session.examine(&self.mailbox)
        } else {
            self.session.select(&self.mailbox)
        }
    }
}

impl<T: Read + Write> Store for ImapStore<T> {
    fn message_count(&mut self) -> Result<u32, FetchError> {
        Ok(self.select()?.exists)
    }

    fn overview(&mut self, sequence_set: &str) -> Result<Vec<Overview>, FetchError> {
        debug!(sequence_set, "FETCH overview");
        let fetches = self
            .session
            .fetch(sequence_set, "(UID INTERNALDATE ENVELOPE)")?;

        let mut rows = Vec::with_capacity(fetches.len());
        for fetch in fetches.iter() {
            let (uid, date) = match (fetch.uid, fetch.internal_date()) {
                (Some(uid), Some(date)) => (uid, date),
                _ => {
                    warn!(message = fetch.message, "overview row without UID or INTERNALDATE");
                    continue;
                }
            };
            let envelope = fetch.envelope();
            let from = envelope
                .and_then(|e| e.from.as_ref())
                .and_then(|addrs| addrs.first())
                .map(format_address)
                .unwrap_or_default();
            let subject = envelope
                .map(|e| lossy(e.subject.as_deref()).into_owned())
                .unwrap_or_default();
            rows.push(Overview {
                message: fetch.message,
                uid,
                from,
                subject,
                date,
            });
        }
        Ok(rows)
    }

    fn structure(&mut self, uid: Uid) -> Result<BodyPart, FetchError> {
        debug!(uid, "UID FETCH BODYSTRUCTURE");
        let fetches = self.session.uid_fetch(uid.to_string(), "BODYSTRUCTURE")?;
        let structure = fetches
            .iter()
            .find_map(|f| f.bodystructure())
            .map(BodyPart::from);
        structure.ok_or_else(|| FetchError::Missing {
            item: "BODYSTRUCTURE".to_string(),
            uid,
        })
    }

    fn body(&mut self, uid: Uid, section: &str) -> Result<Vec<u8>, FetchError> {
        let item = format!("BODY[{}]", section);
        let missing = || FetchError::Missing {
            item: item.clone(),
            uid,
        };
        let path = section
            .split('.')
            .map(|n| n.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map(|parts| SectionPath::Part(parts, None))
            .map_err(|_| missing())?;

        debug!(uid, section, "UID FETCH body part");
        let fetches = self.session.uid_fetch(uid.to_string(), &item)?;
        let data = fetches
            .iter()
            .find_map(|f| f.section(&path).map(|d| d.to_vec()));
        data.ok_or_else(missing)
    }

    fn folders(&mut self) -> Result<Vec<String>, FetchError> {
        let names = self.session.list(None, Some("*"))?;
        Ok(names.iter().map(|n| n.name().to_string()).collect())
    }

    fn append(&mut self, folder: &str, message: &[u8]) -> Result<(), AppendError> {
        debug!(folder, size = message.len(), "APPEND");
        self.session.append(folder, message).finish()?;
        Ok(())
    }

    fn logout(&mut self) -> Result<(), ConnectionError> {
        self.session.logout()?;
        Ok(())
    }

    fn diagnostics(&mut self) -> Vec<String> {
        self.session
            .unsolicited_responses
            .try_iter()
            .map(|r| format!("{:?}", r))
            .collect()
    }
}
