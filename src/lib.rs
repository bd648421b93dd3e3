//! Read pages of a mailbox over IMAP, sort each message into plain-text bodies and named
//! attachments, download single body parts, and file messages into folders.
//!
//! # Usage
//!
//! Here is a basic example of using the crate.
//! See the `demos/` directory for a complete command-line reader.
//!
//! ```no_run
//! use imap_courier::{Locator, Session};
//!
//! fn main() -> imap_courier::Result<()> {
//!     // c-client style locator; a Locator can also be built flag by flag
//!     let locator = Locator::parse("{imap.example.com:993/service=imap/ssl/novalidate-cert}")?;
//!     let mut session = Session::new("user@example.com", "password", locator);
//!
//!     // certified-mail receipts carry these on every message
//!     session.add_rejects(["daticert.xml", "smime.p7s"]);
//!
//!     // the second and third newest messages, with bodies but without attachment content
//!     for email in session.try_read(1, 2, true, false)? {
//!         println!("{} <{}> {}", email.date, email.from, email.subject);
//!         for attachment in &email.attachments {
//!             let download = session.attachment(
//!                 email.uid,
//!                 &attachment.number,
//!                 attachment.encoding.clone(),
//!                 Some(&attachment.filename),
//!             )?;
//!             println!("  {} ({} bytes)", download.filename, download.data.len());
//!         }
//!     }
//!
//!     session.close();
//!     Ok(())
//! }
//! ```
//!
//! # Opening a mailbox
//!
//! Nothing is sent to the server until an operation needs it. The [`Locator`] decides how the
//! connection is made; see [`ImapConnector`](store::ImapConnector) for what each flag does.
//!
//! Unless the `debug` flag is set the crate is silent on stderr; it reports what it does
//! through [`tracing`](https://docs.rs/tracing), so install a subscriber to see it.

mod authenticator;
mod utils;

pub mod encoding;
pub mod error;
pub mod locator;
pub mod session;
pub mod store;
pub mod types;
pub mod walk;

pub use crate::encoding::TransferEncoding;
pub use crate::error::{Error, Result};
pub use crate::locator::{Flag, Flags, Locator};
pub use crate::session::Session;
pub use crate::types::{BodyPart, Download, Email, MediaType, Overview, Part, Seq, Uid};

#[cfg(any(test, feature = "test_helpers"))]
pub mod testing;

#[cfg(test)]
mod mock_stream;
