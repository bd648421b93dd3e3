//! This module contains the records a [`Session`](crate::Session) hands back.

/// From section [2.3.1.1 of RFC 3501](https://tools.ietf.org/html/rfc3501#section-2.3.1.1).
///
/// A 32-bit value assigned to each message, which when used with the unique identifier validity
/// value forms a 64-bit value that will not refer to any other message in the mailbox or any
/// subsequent mailbox with the same name forever. The unique identifier of a message will not
/// change during the session.
pub type Uid = u32;

/// From section [2.3.1.2 of RFC 3501](https://tools.ietf.org/html/rfc3501#section-2.3.1.2).
///
/// A relative position from 1 to the number of messages in the mailbox. This position is
/// ordered by ascending unique identifier, and can be reassigned during the session (for
/// example when a message is expunged).
pub type Seq = u32;

mod body;
pub use self::body::{BodyPart, MediaType};

mod email;
pub use self::email::{Email, Overview, Part};

mod download;
pub use self::download::Download;
