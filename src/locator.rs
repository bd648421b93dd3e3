//! Mailbox locators: the `{host:port/flags}MAILBOX` strings that name a remote mailbox.

use std::fmt;
use std::slice::Iter;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ConnectionError;

lazy_static! {
    static ref REMOTE_RE: Regex = Regex::new(
        r"^\{(?P<host>[^:/}\s]+)(?::(?P<port>\d+))?(?P<flags>(?:/[^/}]*)*)\}(?P<mailbox>.*)$"
    )
    .unwrap();
    static ref BARE_RE: Regex =
        Regex::new(r"^(?P<host>[^:/{}\s]+)(?::(?P<port>\d+))?$").unwrap();
}

/// Port used for implicit TLS (`/ssl`) when the locator names none.
pub const IMAPS_PORT: u16 = 993;
/// Port used for everything else when the locator names none.
pub const IMAP_PORT: u16 = 143;

/// A connection flag, written `/name` inside a locator.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Flag {
    /// Log in anonymously.
    Anonymous,
    /// Trace the protocol exchange.
    Debug,
    /// Never send the password over an unencrypted connection.
    Secure,
    /// The remote is a news server rather than a mailbox.
    Nntp,
    /// Do not attempt a pre-authenticated `rsh` session.
    NoRsh,
    /// Use TLS from the first byte.
    Ssl,
    /// Upgrade the connection with `STARTTLS`.
    Tls,
    /// Never upgrade the connection.
    NoTls,
    /// Verify the server certificate.
    ValidateCert,
    /// Accept any server certificate.
    NoValidateCert,
    /// Open the mailbox read-only.
    ReadOnly,
    /// Any other flag, kept verbatim (e.g. `service=imap`).
    Other(String),
}

impl Flag {
    /// The name of this flag as it is written in a locator.
    pub fn as_str(&self) -> &str {
        match *self {
            Flag::Anonymous => "anonymous",
            Flag::Debug => "debug",
            Flag::Secure => "secure",
            Flag::Nntp => "nntp",
            Flag::NoRsh => "norsh",
            Flag::Ssl => "ssl",
            Flag::Tls => "tls",
            Flag::NoTls => "notls",
            Flag::ValidateCert => "validate-cert",
            Flag::NoValidateCert => "novalidate-cert",
            Flag::ReadOnly => "readonly",
            Flag::Other(ref s) => s,
        }
    }

    /// The flag that cannot be set at the same time as this one, if any.
    fn opposite(&self) -> Option<Flag> {
        match *self {
            Flag::Tls => Some(Flag::NoTls),
            Flag::NoTls => Some(Flag::Tls),
            Flag::ValidateCert => Some(Flag::NoValidateCert),
            Flag::NoValidateCert => Some(Flag::ValidateCert),
            _ => None,
        }
    }
}

impl<'a> From<&'a str> for Flag {
    fn from(s: &'a str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "anonymous" => Flag::Anonymous,
            "debug" => Flag::Debug,
            "secure" => Flag::Secure,
            "nntp" => Flag::Nntp,
            "norsh" => Flag::NoRsh,
            "ssl" => Flag::Ssl,
            "tls" => Flag::Tls,
            "notls" => Flag::NoTls,
            "validate-cert" => Flag::ValidateCert,
            "novalidate-cert" => Flag::NoValidateCert,
            "readonly" => Flag::ReadOnly,
            _ => Flag::Other(s.to_string()),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An insertion-ordered set of [`Flag`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Flags(Vec<Flag>);

impl Flags {
    /// Whether `flag` is present.
    pub fn contains(&self, flag: &Flag) -> bool {
        self.0.contains(flag)
    }

    /// Add `flag`, keeping its original position if it was already present.
    pub fn insert(&mut self, flag: Flag) {
        if !self.contains(&flag) {
            self.0.push(flag);
        }
    }

    /// Remove `flag` if present.
    pub fn remove(&mut self, flag: &Flag) {
        self.0.retain(|f| f != flag);
    }

    /// Iterate over the flags in the order they were set.
    pub fn iter(&self) -> Iter<'_, Flag> {
        self.0.iter()
    }

    /// Number of flags set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if no flag is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Flags {
    type Item = &'a Flag;
    type IntoIter = Iter<'a, Flag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The address of a remote mailbox.
///
/// A locator is either composed from a host, a port and a set of [`Flag`]s:
///
/// ```
/// # use imap_courier::Locator;
/// let mut locator = Locator::new("imap.example.com", 993);
/// locator.set_ssl(true).set_validate(false);
/// assert_eq!(locator.prefix(), "{imap.example.com:993/ssl/novalidate-cert}");
/// ```
///
/// or given verbatim, in which case it is kept as written:
///
/// ```
/// # use imap_courier::Locator;
/// let locator = Locator::parse("{imap.example.com:993/service=imap/ssl}").unwrap();
/// assert_eq!(locator.to_string(), "{imap.example.com:993/service=imap/ssl}");
/// assert_eq!(locator.port(), 993);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locator {
    host: String,
    port: Option<u16>,
    flags: Flags,
    mailbox: Option<String>,
    raw: Option<String>,
}

impl Locator {
    /// Make a new `Locator` for the given host and port, with no flags set.
    pub fn new<H: Into<String>>(host: H, port: u16) -> Self {
        Locator {
            host: host.into(),
            port: Some(port),
            flags: Flags::default(),
            mailbox: None,
            raw: None,
        }
    }

    /// Parse a raw locator such as `{imap.example.com:993/imap/ssl}INBOX`.
    ///
    /// A bare `host` or `host:port` is accepted as well. The string is kept so that
    /// [`prefix`](Self::prefix) reproduces it verbatim until a flag is changed.
    pub fn parse(raw: &str) -> Result<Self, ConnectionError> {
        let raw = raw.trim();
        if let Some(caps) = REMOTE_RE.captures(raw) {
            let mut flags = Flags::default();
            if let Some(list) = caps.name("flags") {
                for name in list.as_str().split('/').filter(|s| !s.is_empty()) {
                    flags.insert(Flag::from(name));
                }
            }
            let mailbox = caps
                .name("mailbox")
                .map(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .map(String::from);
            let prefix_len = raw.len() - mailbox.as_ref().map(|m| m.len()).unwrap_or(0);
            return Ok(Locator {
                host: caps["host"].to_string(),
                port: parse_port(caps.name("port").map(|m| m.as_str()), raw)?,
                flags,
                mailbox,
                raw: Some(raw[..prefix_len].to_string()),
            });
        }

        if let Some(caps) = BARE_RE.captures(raw) {
            return Ok(Locator {
                host: caps["host"].to_string(),
                port: parse_port(caps.name("port").map(|m| m.as_str()), raw)?,
                flags: Flags::default(),
                mailbox: None,
                raw: None,
            });
        }

        Err(ConnectionError::InvalidLocator(raw.to_string()))
    }

    /// The host to connect to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port to connect to, falling back to the usual port for the chosen transport.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(if self.flags.contains(&Flag::Ssl) {
            IMAPS_PORT
        } else {
            IMAP_PORT
        })
    }

    /// The mailbox to open; `INBOX` unless the locator names another.
    pub fn mailbox(&self) -> &str {
        self.mailbox.as_deref().unwrap_or("INBOX")
    }

    /// Open `mailbox` instead of `INBOX`.
    pub fn set_mailbox<M: Into<String>>(&mut self, mailbox: M) -> &mut Self {
        self.mailbox = Some(mailbox.into());
        self
    }

    /// The flags currently set.
    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    /// Whether `flag` is set.
    pub fn has(&self, flag: &Flag) -> bool {
        self.flags.contains(flag)
    }

    /// Set or clear a flag.
    ///
    /// `tls`/`notls` and `validate-cert`/`novalidate-cert` are exclusive pairs: turning one
    /// on clears the other, and turning one off sets the other. Every other flag is toggled
    /// on its own.
    pub fn set_flag(&mut self, flag: Flag, on: bool) -> &mut Self {
        self.raw = None;
        match (flag.opposite(), on) {
            (Some(opposite), true) => {
                self.flags.remove(&opposite);
                self.flags.insert(flag);
            }
            (Some(opposite), false) => {
                self.flags.remove(&flag);
                self.flags.insert(opposite);
            }
            (None, true) => self.flags.insert(flag),
            (None, false) => self.flags.remove(&flag),
        }
        self
    }

    /// `validate-cert` when `true`, `novalidate-cert` when `false`.
    pub fn set_validate(&mut self, validate: bool) -> &mut Self {
        self.set_flag(Flag::ValidateCert, validate)
    }

    /// `tls` when `true`, `notls` when `false`.
    pub fn set_tls(&mut self, tls: bool) -> &mut Self {
        self.set_flag(Flag::Tls, tls)
    }

    pub fn set_ssl(&mut self, on: bool) -> &mut Self {
        self.set_flag(Flag::Ssl, on)
    }

    pub fn set_anonymous(&mut self, on: bool) -> &mut Self {
        self.set_flag(Flag::Anonymous, on)
    }

    pub fn set_debug(&mut self, on: bool) -> &mut Self {
        self.set_flag(Flag::Debug, on)
    }

    pub fn set_secure(&mut self, on: bool) -> &mut Self {
        self.set_flag(Flag::Secure, on)
    }

    pub fn set_nntp(&mut self, on: bool) -> &mut Self {
        self.set_flag(Flag::Nntp, on)
    }

    pub fn set_norsh(&mut self, on: bool) -> &mut Self {
        self.set_flag(Flag::NoRsh, on)
    }

    pub fn set_readonly(&mut self, on: bool) -> &mut Self {
        self.set_flag(Flag::ReadOnly, on)
    }

    /// The `{...}` part of the locator, which prefixes every folder name the server lists.
    pub fn prefix(&self) -> String {
        if let Some(ref raw) = self.raw {
            return raw.clone();
        }
        let mut s = format!("{{{}", self.host);
        if let Some(port) = self.port {
            s.push_str(&format!(":{}", port));
        }
        for flag in &self.flags {
            s.push('/');
            s.push_str(flag.as_str());
        }
        s.push('}');
        s
    }

    /// The fully qualified name of `folder` on this server.
    pub fn folder(&self, folder: &str) -> String {
        format!("{}{}", self.prefix(), folder)
    }

    /// Strip this locator's prefix from a fully qualified folder name.
    pub fn strip<'a>(&self, qualified: &'a str) -> &'a str {
        let prefix = self.prefix();
        qualified.strip_prefix(prefix.as_str()).unwrap_or(qualified)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix(), self.mailbox.as_deref().unwrap_or(""))
    }
}

fn parse_port(port: Option<&str>, raw: &str) -> Result<Option<u16>, ConnectionError> {
    port.map(|p| {
        p.parse::<u16>()
            .map_err(|_| ConnectionError::InvalidLocator(raw.to_string()))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_with_port_and_flags() {
        let mut l = Locator::new("imap.example.com", 993);
        l.set_ssl(true).set_validate(false).set_readonly(true);
        assert_eq!(
            l.prefix(),
            "{imap.example.com:993/ssl/novalidate-cert/readonly}"
        );
        assert_eq!(l.mailbox(), "INBOX");
    }

    #[test]
    fn compose_without_flags() {
        let l = Locator::new("localhost", 3143);
        assert_eq!(l.to_string(), "{localhost:3143}");
    }

    #[test]
    fn exclusive_pairs() {
        let mut l = Locator::new("h", 143);
        l.set_tls(true);
        assert!(l.has(&Flag::Tls));
        assert!(!l.has(&Flag::NoTls));
        l.set_tls(false);
        assert!(!l.has(&Flag::Tls));
        assert!(l.has(&Flag::NoTls));

        l.set_validate(true);
        l.set_validate(false);
        assert!(l.has(&Flag::NoValidateCert));
        assert!(!l.has(&Flag::ValidateCert));
        assert_eq!(l.prefix(), "{h:143/notls/novalidate-cert}");
    }

    #[test]
    fn flags_are_independent() {
        let mut l = Locator::new("h", 143);
        l.set_debug(true);
        assert_eq!(l.flags().len(), 1);
        assert!(l.has(&Flag::Debug));
        assert!(!l.has(&Flag::Ssl));
        assert!(!l.has(&Flag::ReadOnly));
        l.set_debug(false);
        assert!(l.flags().is_empty());
    }

    #[test]
    fn insertion_order_is_kept() {
        let mut l = Locator::new("h", 993);
        l.set_readonly(true).set_ssl(true).set_readonly(true);
        assert_eq!(l.prefix(), "{h:993/readonly/ssl}");
    }

    #[test]
    fn parse_raw_keeps_text() {
        let raw = "{mail.example.it:993/service=imap/ssl/novalidate-cert}";
        let l = Locator::parse(raw).unwrap();
        assert_eq!(l.host(), "mail.example.it");
        assert_eq!(l.port(), 993);
        assert!(l.has(&Flag::Ssl));
        assert!(l.has(&Flag::NoValidateCert));
        assert!(l.has(&Flag::Other("service=imap".into())));
        assert_eq!(l.to_string(), raw);
        assert_eq!(l.folder("Sent"), format!("{}Sent", raw));
    }

    #[test]
    fn parse_raw_with_mailbox() {
        let l = Locator::parse("{localhost/notls}Archive").unwrap();
        assert_eq!(l.prefix(), "{localhost/notls}");
        assert_eq!(l.mailbox(), "Archive");
        assert_eq!(l.port(), IMAP_PORT);
        assert_eq!(l.strip("{localhost/notls}Archive/2020"), "Archive/2020");
    }

    #[test]
    fn parse_raw_default_ssl_port() {
        let l = Locator::parse("{imap.example.com/ssl}").unwrap();
        assert_eq!(l.port(), IMAPS_PORT);
    }

    #[test]
    fn mailbox_can_be_changed() {
        let mut l = Locator::parse("{localhost:3143/notls}").unwrap();
        assert_eq!(l.mailbox(), "INBOX");
        l.set_mailbox("Archive");
        assert_eq!(l.mailbox(), "Archive");
        assert_eq!(l.prefix(), "{localhost:3143/notls}");
        assert_eq!(l.to_string(), "{localhost:3143/notls}Archive");
    }

    #[test]
    fn parse_bare_host() {
        let l = Locator::parse("imap.example.com:10143").unwrap();
        assert_eq!(l.host(), "imap.example.com");
        assert_eq!(l.port(), 10143);
    }

    #[test]
    fn parse_garbage() {
        assert!(Locator::parse("{no closing brace").is_err());
        assert!(Locator::parse("{h:99999}").is_err());
    }

    #[test]
    fn changing_a_flag_recomposes() {
        let mut l = Locator::parse("{h:993/service=imap/ssl}").unwrap();
        l.set_validate(false);
        assert_eq!(l.prefix(), "{h:993/service=imap/ssl/novalidate-cert}");
    }
}
