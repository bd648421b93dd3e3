use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Local, Offset};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::encoding::TransferEncoding;
use crate::error::{AppendError, ConnectionError, Error, FetchError, Result};
use crate::locator::Locator;
use crate::store::{Connector, Credentials, ImapConnector, Store};
use crate::types::{Download, Email, Part, Uid};
use crate::utils::sender_address;
use crate::walk::{walk_message, Walk};

/// The zone message dates are reported in unless [`Session::set_timezone`] says otherwise.
const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Rome;

/// A mailbox on an IMAP server, opened on demand.
///
/// A `Session` holds the credentials and [`Locator`] of one mailbox together with at most one
/// connection to it. Every operation that needs the server opens the connection first if it is
/// not open yet; [`close`](Session::close) (or dropping the session) logs out.
///
/// ```no_run
/// use imap_courier::{Locator, Session};
///
/// let locator = Locator::parse("{imap.example.com:993/imap/ssl/novalidate-cert}INBOX").unwrap();
/// let mut session = Session::new("user@example.com", "password", locator);
/// session.add_rejects(["daticert.xml", "smime.p7s"]);
///
/// for email in session.read(1, 2, true, false) {
///     println!("{} {} {}", email.date, email.from, email.subject);
///     for part in &email.messages {
///         println!("{}", part.text().unwrap_or_default());
///     }
/// }
/// ```
pub struct Session<C: Connector = ImapConnector> {
    connector: C,
    credentials: Credentials,
    locator: Locator,
    store: Option<C::Store>,
    total: Option<u32>,
    folders: Vec<String>,
    rejects: HashSet<String>,
    timezone: Tz,
    verbose: bool,
    errors: Vec<String>,
}

impl Session<ImapConnector> {
    /// A session that connects with the `imap` crate. Nothing is sent until the first operation.
    pub fn new<U: Into<String>, P: Into<String>>(user: U, password: P, locator: Locator) -> Self {
        Session::with_connector(ImapConnector, user, password, locator)
    }
}

impl<C: Connector> Session<C> {
    /// A session that opens its connection through `connector`.
    pub fn with_connector<U: Into<String>, P: Into<String>>(
        connector: C,
        user: U,
        password: P,
        locator: Locator,
    ) -> Self {
        Session {
            connector,
            credentials: Credentials::new(user, password),
            locator,
            store: None,
            total: None,
            folders: Vec::new(),
            rejects: HashSet::new(),
            timezone: DEFAULT_TIMEZONE,
            verbose: false,
            errors: Vec::new(),
        }
    }

    /// Connect, authenticate and open the mailbox, unless that has already happened.
    pub fn open(&mut self) -> Result<()> {
        if self.store.is_some() {
            return Ok(());
        }
        if self.locator.host().is_empty() {
            return Err(self.record(ConnectionError::MissingLocator).into());
        }

        match self.connector.connect(&self.locator, &self.credentials) {
            Ok(store) => {
                info!(mailbox = %self.locator, user = %self.credentials.user, "opened");
                self.store = Some(store);
                Ok(())
            }
            Err(e) => Err(self.record(e).into()),
        }
    }

    /// Log out and drop the connection. Does nothing if it is not open.
    pub fn close(&mut self) {
        if let Some(mut store) = self.store.take() {
            if self.verbose {
                self.errors.extend(store.diagnostics());
            }
            match store.logout() {
                Ok(()) => info!(mailbox = %self.locator, "closed"),
                Err(e) => {
                    self.record(e);
                }
            }
        }
    }

    /// Close the connection and open a new one, e.g. after changing the locator.
    pub fn reopen(&mut self) -> Result<()> {
        self.close();
        self.open()
    }

    /// Whether a connection is currently open.
    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// The number of messages in the mailbox.
    ///
    /// The last known count is returned as is unless `refresh` is set or nothing is known yet,
    /// in which case the server is asked. If that fails the last known count (if any) is kept.
    pub fn total(&mut self, refresh: bool) -> Option<u32> {
        if !refresh && self.total.is_some() {
            return self.total;
        }
        if let Err(e) = self.refresh_total() {
            warn!(error = %e, "unable to count messages");
        }
        self.total
    }

    fn refresh_total(&mut self) -> Result<u32> {
        self.open()?;
        let count = self.store()?.message_count();
        let count = self.checked(count)?;
        self.total = Some(count);
        Ok(count)
    }

    /// Read a page of messages, newest last.
    ///
    /// `from` and `to` count backwards from the newest message, which is `0`; the page holds
    /// every message from `to` up to `from` inclusive. With `details` each message's plain-text
    /// bodies and attachment descriptions are filled in, and with `attachments` as well the
    /// attachments' content.
    ///
    /// Failures are not reported: an unreachable or empty mailbox gives an empty page, and a
    /// body that cannot be fetched is left without data. Use [`try_read`](Self::try_read) to
    /// see what went wrong.
    pub fn read(&mut self, from: u32, to: u32, details: bool, attachments: bool) -> Vec<Email> {
        match self.try_read(from, to, details, attachments) {
            Ok(emails) => emails,
            Err(e) => {
                warn!(error = %e, from, to, "unable to read mailbox");
                Vec::new()
            }
        }
    }

    /// Like [`read`](Self::read), but reports failure to open the mailbox, count its messages
    /// or fetch the page.
    pub fn try_read(
        &mut self,
        from: u32,
        to: u32,
        details: bool,
        attachments: bool,
    ) -> Result<Vec<Email>> {
        let total = self.refresh_total()?;
        let range = match page_range(total, from, to) {
            Some(range) => range,
            None => return Ok(Vec::new()),
        };

        debug!(total, from, to, %range, "reading page");
        let rows = self.store()?.overview(&range);
        let mut rows = self.checked(rows)?;
        rows.sort_by_key(|r| r.message);

        let mut emails = Vec::with_capacity(rows.len());
        for row in rows {
            let walk = if details {
                self.details(row.uid, attachments)
            } else {
                Walk::default()
            };
            emails.push(Email {
                uid: row.uid,
                from: sender_address(&row.from),
                subject: row.subject,
                date: localize(row.date, self.timezone),
                messages: walk.messages,
                attachments: walk.attachments,
            });
        }
        Ok(emails)
    }

    /// Walk the structure of one message and fetch the bodies asked for.
    fn details(&mut self, uid: Uid, attachments: bool) -> Walk {
        let structure = self
            .store()
            .and_then(|s| s.structure(uid).map_err(Error::from));
        let structure = match structure {
            Ok(structure) => structure,
            Err(e) => {
                warn!(uid, error = %e, "unable to fetch structure");
                self.note(&e);
                return Walk::default();
            }
        };

        let mut walk = walk_message(&structure, &self.rejects);
        for part in walk.messages.iter_mut() {
            self.fill(uid, part);
        }
        if attachments {
            for part in walk.attachments.iter_mut() {
                self.fill(uid, part);
            }
        }
        walk
    }

    fn fill(&mut self, uid: Uid, part: &mut Part) {
        match self.fetch_decoded(uid, &part.number, &part.encoding) {
            Ok(data) => part.data = Some(data),
            Err(e) => {
                warn!(uid, section = %part.number, error = %e, "unable to fetch body part");
                self.note(&e);
            }
        }
    }

    fn fetch_decoded(
        &mut self,
        uid: Uid,
        section: &str,
        encoding: &TransferEncoding,
    ) -> Result<Vec<u8>> {
        let raw = self.store()?.body(uid, section);
        let raw = self.checked(raw)?;
        encoding
            .decode(raw)
            .map_err(|e| Error::Fetch(FetchError::Decode(e)))
    }

    /// Fetch one body part and undo its transfer encoding.
    ///
    /// `number` is a [`Part::number`], and `encoding` its [`Part::encoding`] or the numeric
    /// code of one (see [`TransferEncoding::from_code`]). When no `filename` is given the
    /// download is named after the current time.
    pub fn attachment<E: Into<TransferEncoding>>(
        &mut self,
        uid: Uid,
        number: &str,
        encoding: E,
        filename: Option<&str>,
    ) -> Result<Download> {
        self.open()?;
        let data = self.fetch_decoded(uid, number, &encoding.into())?;
        let filename = match filename {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => Local::now().format("%Y%m%d%H%M%S").to_string(),
        };
        Ok(Download { filename, data })
    }

    /// The fully qualified names of every folder on the server, e.g.
    /// `{imap.example.com:993/imap/ssl}INBOX`.
    pub fn folders(&mut self) -> Result<Vec<String>> {
        self.open()?;
        let names = self.store()?.folders();
        let names = self.checked(names)?;
        self.folders = names.iter().map(|n| self.locator.folder(n)).collect();
        Ok(self.folders.clone())
    }

    /// Append `message` (a complete RFC 5322 message) to `folder`, which must exist.
    pub fn to_folder(&mut self, folder: &str, message: &[u8]) -> Result<()> {
        let qualified = self.locator.folder(folder);
        if !self.folders()?.contains(&qualified) {
            return Err(AppendError::FolderNotFound(folder.to_string()).into());
        }
        let appended = self.store()?.append(folder, message);
        if let Err(ref e) = appended {
            if self.verbose {
                self.errors.push(e.to_string());
            }
        }
        Ok(appended?)
    }

    /// Skip parts with any of these file names when collecting attachments.
    pub fn add_rejects<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rejects.extend(names.into_iter().map(Into::into));
        self
    }

    /// Stop skipping `name`. Returns whether it was being skipped.
    pub fn remove_reject(&mut self, name: &str) -> bool {
        self.rejects.remove(name)
    }

    pub fn clear_rejects(&mut self) -> &mut Self {
        self.rejects.clear();
        self
    }

    /// File names skipped when collecting attachments.
    pub fn rejects(&self) -> &HashSet<String> {
        &self.rejects
    }

    /// In verbose mode failures and unsolicited server responses are kept for
    /// [`take_errors`](Self::take_errors).
    pub fn set_verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = verbose;
        self
    }

    /// Report message dates in `timezone`. The default is `Europe/Rome`.
    pub fn set_timezone(&mut self, timezone: Tz) -> &mut Self {
        self.timezone = timezone;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Change the locator. The change takes effect the next time the connection is opened; see
    /// [`reopen`](Self::reopen).
    pub fn locator_mut(&mut self) -> &mut Locator {
        &mut self.locator
    }

    pub fn user(&self) -> &str {
        &self.credentials.user
    }

    /// Everything kept in verbose mode since the last call, oldest first.
    pub fn take_errors(&mut self) -> Vec<String> {
        if self.verbose {
            if let Some(store) = self.store.as_mut() {
                self.errors.extend(store.diagnostics());
            }
        }
        std::mem::take(&mut self.errors)
    }

    fn store(&mut self) -> Result<&mut C::Store> {
        self.store
            .as_mut()
            .ok_or(Error::Connection(ConnectionError::NotConnected))
    }

    fn record(&mut self, e: ConnectionError) -> ConnectionError {
        warn!(mailbox = %self.locator, error = %e, "connection failed");
        if self.verbose {
            self.errors.push(e.to_string());
            if let Some(store) = self.store.as_mut() {
                self.errors.extend(store.diagnostics());
            }
        }
        e
    }

    fn note(&mut self, e: &Error) {
        if self.verbose {
            self.errors.push(e.to_string());
        }
    }

    fn checked<T>(&mut self, r: std::result::Result<T, FetchError>) -> Result<T> {
        r.map_err(|e| {
            let e = Error::Fetch(e);
            self.note(&e);
            e
        })
    }
}

impl<C: Connector> Drop for Session<C> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<C: Connector> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credentials", &self.credentials)
            .field("locator", &self.locator)
            .field("open", &self.is_open())
            .field("total", &self.total)
            .field("rejects", &self.rejects)
            .finish()
    }
}

/// `date` as the wall clock in `timezone` showed it, with the offset in effect at the time.
fn localize(date: DateTime<FixedOffset>, timezone: Tz) -> DateTime<FixedOffset> {
    let local = date.with_timezone(&timezone);
    local.with_timezone(&local.offset().fix())
}

/// The sequence set holding the messages `to` through `from` counted back from the newest of
/// `total`, or `None` for an empty mailbox.
///
/// `from` is clamped to `0..total`, `to` to `1..total`.
fn page_range(total: u32, from: u32, to: u32) -> Option<String> {
    if total == 0 {
        return None;
    }
    let last = total - 1;
    let from = from.min(last);
    let to = to.max(1).min(last);
    Some(format!("{}:{}", total - from, total - to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryConnector, MemoryMessage};
    use crate::types::{BodyPart, MediaType};
    use chrono::{DateTime, TimeZone, Timelike, Utc};

    fn date(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn mailbox(n: u32) -> MemoryConnector {
        let memory = MemoryConnector::default();
        for uid in 1..=n {
            memory.push(MemoryMessage::new(
                100 + uid,
                format!("sender{}@example.com", uid),
                format!("message {}", uid),
                date("2024-03-01T08:00:00Z"),
            ));
        }
        memory
    }

    fn session(memory: &MemoryConnector) -> Session<MemoryConnector> {
        Session::with_connector(
            memory.clone(),
            "user",
            "pass",
            Locator::parse("{imap.example.com:993/imap/ssl}").unwrap(),
        )
    }

    #[test]
    fn ranges() {
        assert_eq!(page_range(0, 0, 5), None);
        assert_eq!(page_range(10, 0, 3).as_deref(), Some("10:7"));
        assert_eq!(page_range(10, 2, 15).as_deref(), Some("8:1"));
        assert_eq!(page_range(10, 20, 0).as_deref(), Some("1:9"));
        assert_eq!(page_range(1, 0, 0).as_deref(), Some("1:1"));
    }

    #[test]
    fn read_clamps_the_range() {
        let memory = mailbox(10);
        let mut s = session(&memory);
        let emails = s.read(2, 15, false, false);
        assert!(memory.requests().contains(&"FETCH 8:1".to_string()));
        assert_eq!(emails.len(), 8);
        let uids: Vec<_> = emails.iter().map(|e| e.uid).collect();
        assert_eq!(uids, (101..=108).collect::<Vec<_>>());
    }

    #[test]
    fn read_newest() {
        let memory = mailbox(5);
        let mut s = session(&memory);
        let emails = s.read(0, 2, false, false);
        assert!(memory.requests().contains(&"FETCH 5:3".to_string()));
        assert_eq!(emails.len(), 3);
        assert_eq!(emails[2].uid, 105);
        assert!(emails[0].messages.is_empty());
    }

    #[test]
    fn empty_mailbox() {
        let memory = mailbox(0);
        let mut s = session(&memory);
        assert!(s.read(0, 5, true, true).is_empty());
        assert!(!memory.requests().iter().any(|r| r.starts_with("FETCH")));
    }

    #[test]
    fn unreachable_mailbox() {
        let memory = mailbox(3);
        memory.fail_connections(true);
        let mut s = session(&memory);
        s.set_verbose(true);
        assert!(s.read(0, 2, false, false).is_empty());
        assert!(matches!(
            s.try_read(0, 2, false, false),
            Err(Error::Connection(ConnectionError::Imap(_)))
        ));
        assert_eq!(s.take_errors().len(), 2);
        assert!(s.take_errors().is_empty());
    }

    #[test]
    fn sender_and_date() {
        let memory = MemoryConnector::default();
        memory.push(MemoryMessage::new(
            7,
            "\"Per conto di: mario@example.it\" <posta-certificata@pec.example.it>",
            "Consegna",
            date("2024-03-01T08:00:00Z"),
        ));
        let mut s = session(&memory);
        let emails = s.read(0, 1, false, false);
        assert_eq!(emails[0].from, "mario@example.it");
        assert_eq!(emails[0].subject, "Consegna");
        assert_eq!(emails[0].date.hour(), 9);
        assert_eq!(emails[0].date.offset().local_minus_utc(), 3600);

        s.set_timezone(chrono_tz::America::New_York);
        let emails = s.read(0, 1, false, false);
        assert_eq!(emails[0].date.hour(), 3);
        assert_eq!(emails[0].date, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn dates_follow_summer_time() {
        let memory = MemoryConnector::default();
        memory.push(MemoryMessage::new(1, "a@b.c", "winter", date("2024-01-15T08:00:00Z")));
        memory.push(MemoryMessage::new(2, "a@b.c", "summer", date("2024-07-01T08:00:00Z")));
        let mut s = session(&memory);
        assert_eq!(s.timezone(), chrono_tz::Europe::Rome);

        let emails = s.read(0, 1, false, false);
        assert_eq!(emails[0].subject, "winter");
        assert_eq!(emails[0].date.to_rfc3339(), "2024-01-15T09:00:00+01:00");
        assert_eq!(emails[1].subject, "summer");
        assert_eq!(emails[1].date.hour(), 10);
        assert_eq!(emails[1].date.offset().local_minus_utc(), 2 * 3600);
    }

    fn certified() -> MemoryMessage {
        let structure = BodyPart::multipart(
            "MIXED",
            vec![
                BodyPart::new(MediaType::Text, "PLAIN")
                    .with_encoding(TransferEncoding::QuotedPrintable),
                BodyPart::new(MediaType::Application, "XML")
                    .with_param("NAME", "daticert.xml"),
                BodyPart::rfc822(BodyPart::multipart(
                    "MIXED",
                    vec![
                        BodyPart::new(MediaType::Text, "PLAIN"),
                        BodyPart::new(MediaType::Application, "PDF")
                            .with_encoding(TransferEncoding::Base64)
                            .with_disposition_param("FILENAME", "fattura.pdf"),
                    ],
                )),
                BodyPart::new(MediaType::Application, "PKCS7-SIGNATURE")
                    .with_encoding(TransferEncoding::Base64)
                    .with_param("NAME", "smime.p7s"),
            ],
        );
        MemoryMessage::new(42, "pec@example.it", "Posta certificata", date("2024-03-01T08:00:00Z"))
            .with_structure(structure)
            .with_section("1", "Caff=C3=A8 pronto")
            .with_section("3.1", "inner text")
            .with_section("3.2", "JVBERi0=")
    }

    #[test]
    fn details_and_rejects() {
        let memory = MemoryConnector::default();
        memory.push(certified());
        let mut s = session(&memory);
        s.add_rejects(["daticert.xml", "smime.p7s"]);

        let emails = s.read(0, 1, true, false);
        let email = &emails[0];
        let numbers: Vec<_> = email.messages.iter().map(|p| p.number.as_str()).collect();
        assert_eq!(numbers, vec!["1", "3.1"]);
        assert_eq!(email.messages[0].text().unwrap(), "Caffè pronto");
        assert_eq!(email.messages[1].text().unwrap(), "inner text");

        assert_eq!(email.attachments.len(), 1);
        assert_eq!(email.attachments[0].number, "3.2");
        assert_eq!(email.attachments[0].filename, "fattura.pdf");
        assert_eq!(email.attachments[0].data, None);

        let emails = s.read(0, 1, true, true);
        assert_eq!(emails[0].attachments[0].data.as_deref(), Some(&b"%PDF-"[..]));
    }

    #[test]
    fn rejects_management() {
        let memory = MemoryConnector::default();
        memory.push(certified());
        let mut s = session(&memory);
        s.add_rejects(vec!["smime.p7s".to_string()]);
        s.add_rejects(["daticert.xml"]);
        assert_eq!(s.rejects().len(), 2);
        assert!(s.remove_reject("daticert.xml"));
        assert!(!s.remove_reject("daticert.xml"));

        let names: Vec<_> = s.read(0, 1, true, false)[0]
            .attachments
            .iter()
            .map(|p| p.filename.clone())
            .collect();
        assert_eq!(names, vec!["daticert.xml", "fattura.pdf"]);

        s.clear_rejects();
        assert!(s.rejects().is_empty());
        assert_eq!(s.read(0, 1, true, false)[0].attachments.len(), 3);
    }

    #[test]
    fn missing_body_is_left_empty() {
        let memory = MemoryConnector::default();
        memory.push(
            MemoryMessage::new(9, "a@b.c", "s", date("2024-03-01T08:00:00Z"))
                .with_structure(BodyPart::multipart(
                    "MIXED",
                    vec![
                        BodyPart::new(MediaType::Text, "PLAIN"),
                        BodyPart::new(MediaType::Text, "PLAIN"),
                    ],
                ))
                .with_section("2", "second"),
        );
        let mut s = session(&memory);
        let emails = s.read(0, 1, true, false);
        assert_eq!(emails[0].messages[0].data, None);
        assert_eq!(emails[0].messages[1].text().unwrap(), "second");
    }

    #[test]
    fn failed_structure_is_soft() {
        let memory = mailbox(1);
        let mut s = session(&memory);
        let emails = s.read(0, 1, true, true);
        assert_eq!(emails.len(), 1);
        assert!(emails[0].messages.is_empty());
        assert!(emails[0].attachments.is_empty());
    }

    #[test]
    fn total_is_cached() {
        let memory = mailbox(3);
        let mut s = session(&memory);
        assert_eq!(s.total(false), Some(3));
        memory.push(MemoryMessage::new(200, "x@y.z", "new", date("2024-03-02T08:00:00Z")));
        assert_eq!(s.total(false), Some(3));
        assert_eq!(s.total(true), Some(4));

        memory.fail_fetches(true);
        assert_eq!(s.total(true), Some(4));
    }

    #[test]
    fn total_without_server() {
        let memory = mailbox(3);
        memory.fail_connections(true);
        let mut s = session(&memory);
        assert_eq!(s.total(true), None);
    }

    #[test]
    fn open_is_idempotent() {
        let memory = mailbox(1);
        let mut s = session(&memory);
        assert!(!s.is_open());
        s.open().unwrap();
        s.open().unwrap();
        assert!(s.is_open());
        assert_eq!(memory.connections(), 1);

        s.close();
        s.close();
        assert!(!s.is_open());
        s.reopen().unwrap();
        assert_eq!(memory.connections(), 2);
        drop(s);
        assert_eq!(
            memory.requests().iter().filter(|r| *r == "LOGOUT").count(),
            2
        );
    }

    #[test]
    fn missing_host() {
        let memory = mailbox(1);
        let mut s = Session::with_connector(memory.clone(), "u", "p", Locator::new("", 993));
        assert!(matches!(
            s.open(),
            Err(Error::Connection(ConnectionError::MissingLocator))
        ));
        assert_eq!(memory.connections(), 0);
    }

    #[test]
    fn folders_are_prefixed() {
        let memory = mailbox(0);
        memory.add_folder("Archive");
        let mut s = session(&memory);
        assert_eq!(
            s.folders().unwrap(),
            vec![
                "{imap.example.com:993/imap/ssl}INBOX",
                "{imap.example.com:993/imap/ssl}Archive",
            ]
        );
    }

    #[test]
    fn to_existing_folder() {
        let memory = mailbox(0);
        memory.add_folder("Archive");
        let mut s = session(&memory);
        s.to_folder("Archive", b"Subject: hi\r\n\r\nbody").unwrap();
        assert_eq!(
            memory.appended(),
            vec![("Archive".to_string(), b"Subject: hi\r\n\r\nbody".to_vec())]
        );
    }

    #[test]
    fn to_missing_folder() {
        let memory = mailbox(0);
        let mut s = session(&memory);
        match s.to_folder("Nope", b"x") {
            Err(Error::Append(AppendError::FolderNotFound(name))) => assert_eq!(name, "Nope"),
            r => panic!("unexpected result: {:?}", r),
        }
        assert!(memory.appended().is_empty());
        assert!(!memory.requests().iter().any(|r| r.starts_with("APPEND")));
    }

    #[test]
    fn attachment_is_decoded() {
        let memory = MemoryConnector::default();
        memory.push(certified());
        let mut s = session(&memory);

        let d = s.attachment(42, "3.2", 3u8, Some("fattura.pdf")).unwrap();
        assert_eq!(d.filename, "fattura.pdf");
        assert_eq!(d.data, b"%PDF-");

        let d = s
            .attachment(42, "1", TransferEncoding::QuotedPrintable, None)
            .unwrap();
        assert_eq!(d.data, "Caffè pronto".as_bytes());
        assert_eq!(d.filename.len(), 14);

        let d = s.attachment(42, "1", 5u8, Some("raw.txt")).unwrap();
        assert_eq!(d.data, b"Caff=C3=A8 pronto");

        assert!(matches!(
            s.attachment(42, "9", 0u8, None),
            Err(Error::Fetch(FetchError::Missing { .. }))
        ));
    }
}
