use std::borrow::Cow;

use chrono::{DateTime, FixedOffset};

use super::{MediaType, Seq, Uid};
use crate::encoding::TransferEncoding;

/// A summary row as returned by the server for one message of a range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overview {
    /// The ordinal number of this message in its containing mailbox.
    pub message: Seq,
    pub uid: Uid,
    /// The first `From` address, `Display Name <mailbox@host>` when a name is present.
    pub from: String,
    pub subject: String,
    /// When the server received the message.
    pub date: DateTime<FixedOffset>,
}

/// A body part picked out of a message by the MIME walk.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Part {
    /// The dotted body-part address, suitable for `BODY[<number>]`.
    pub number: String,
    pub media_type: MediaType,
    pub subtype: String,
    pub encoding: TransferEncoding,
    /// The part's own file name, or for message bodies the name of the closest enclosing part
    /// that has one. Empty when there is none.
    pub filename: String,
    /// The decoded content, if it was requested and could be fetched.
    pub data: Option<Vec<u8>>,
}

impl Part {
    /// The decoded content as text, replacing invalid UTF-8.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        self.data.as_deref().map(String::from_utf8_lossy)
    }
}

/// One message of a mailbox page.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Email {
    pub uid: Uid,
    /// The bare sender address.
    pub from: String,
    pub subject: String,
    /// When the server received the message, in the session's time zone.
    pub date: DateTime<FixedOffset>,
    /// Plain-text bodies, in structure order. Only filled in when details were requested.
    pub messages: Vec<Part>,
    /// Named parts not on the reject list, in structure order. Only filled in when details were
    /// requested.
    pub attachments: Vec<Part>,
}
