//! Errors that can occur while working with a [`Session`](crate::Session).

use std::error::Error as StdError;
use std::fmt;
use std::result;

use base64::DecodeError;
use imap::Error as ImapError;

/// A convenience wrapper around `Result` for `imap_courier::Error`.
pub type Result<T> = result::Result<T, Error>;

/// A set of errors that can occur while using a mailbox session.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The connection could not be established or released.
    Connection(ConnectionError),
    /// A range, structure or body fetch failed.
    Fetch(FetchError),
    /// A message could not be appended to a folder.
    Append(AppendError),
}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Error {
        Error::Connection(err)
    }
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Error {
        Error::Fetch(err)
    }
}

impl From<AppendError> for Error {
    fn from(err: AppendError) -> Error {
        Error::Append(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Connection(ref e) => fmt::Display::fmt(e, f),
            Error::Fetch(ref e) => fmt::Display::fmt(e, f),
            Error::Append(ref e) => fmt::Display::fmt(e, f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Connection(ref e) => Some(e),
            Error::Fetch(ref e) => Some(e),
            Error::Append(ref e) => Some(e),
        }
    }
}

/// Failure to open (or cleanly close) a connection to the mailbox.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConnectionError {
    /// Neither a host nor a raw locator was configured.
    MissingLocator,
    /// The raw locator string could not be understood.
    InvalidLocator(String),
    /// The locator asks for a service other than IMAP (e.g. `/nntp`).
    UnsupportedService(String),
    /// `/secure` was requested but the connection would not be encrypted.
    Insecure,
    /// The connection is not open.
    NotConnected,
    /// An error reported by the IMAP client library.
    Imap(ImapError),
}

impl From<ImapError> for ConnectionError {
    fn from(err: ImapError) -> ConnectionError {
        ConnectionError::Imap(err)
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConnectionError::MissingLocator => f.write_str("No mailbox locator configured"),
            ConnectionError::InvalidLocator(ref s) => write!(f, "Invalid mailbox locator: {}", s),
            ConnectionError::UnsupportedService(ref s) => {
                write!(f, "Unsupported mailbox service: {}", s)
            }
            ConnectionError::Insecure => {
                f.write_str("Refusing to send credentials over an unencrypted connection")
            }
            ConnectionError::NotConnected => f.write_str("Not connected"),
            ConnectionError::Imap(ref e) => write!(f, "Connection failed: {}", e),
        }
    }
}

impl StdError for ConnectionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            ConnectionError::Imap(ref e) => Some(e),
            _ => None,
        }
    }
}

/// Failure to retrieve data from the open mailbox.
#[derive(Debug)]
#[non_exhaustive]
pub enum FetchError {
    /// The server answered, but the requested data item was absent.
    Missing {
        /// What was asked for, e.g. `BODYSTRUCTURE` or `BODY[2.1]`.
        item: String,
        /// The message the item was asked of.
        uid: u32,
    },
    /// A BASE64 payload could not be decoded.
    Decode(DecodeError),
    /// An error reported by the IMAP client library.
    Imap(ImapError),
}

impl From<ImapError> for FetchError {
    fn from(err: ImapError) -> FetchError {
        FetchError::Imap(err)
    }
}

impl From<DecodeError> for FetchError {
    fn from(err: DecodeError) -> FetchError {
        FetchError::Decode(err)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FetchError::Missing { ref item, uid } => {
                write!(f, "Server did not return {} for UID {}", item, uid)
            }
            FetchError::Decode(ref e) => write!(f, "Unable to decode body part: {}", e),
            FetchError::Imap(ref e) => write!(f, "Fetch failed: {}", e),
        }
    }
}

impl StdError for FetchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            FetchError::Decode(ref e) => Some(e),
            FetchError::Imap(ref e) => Some(e),
            FetchError::Missing { .. } => None,
        }
    }
}

/// Failure to append a message to a folder.
#[derive(Debug)]
#[non_exhaustive]
pub enum AppendError {
    /// The folder is not part of the current folder list.
    FolderNotFound(String),
    /// An error reported by the IMAP client library.
    Imap(ImapError),
}

impl From<ImapError> for AppendError {
    fn from(err: ImapError) -> AppendError {
        AppendError::Imap(err)
    }
}

impl fmt::Display for AppendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            AppendError::FolderNotFound(ref folder) => {
                write!(f, "Could not append mail to {}: no such folder", folder)
            }
            AppendError::Imap(ref e) => write!(f, "Could not append mail to mailbox: {}", e),
        }
    }
}

impl StdError for AppendError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            AppendError::Imap(ref e) => Some(e),
            AppendError::FolderNotFound(_) => None,
        }
    }
}
