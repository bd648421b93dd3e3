//! Sorting the parts of a MIME tree into message bodies and attachments.
//!
//! Parts are numbered the way IMAP numbers them in `BODY[<section>]` (RFC 3501, section
//! 6.4.5), so that every [`Part::number`] produced here can be fetched as is:
//!
//! ```text
//! multipart/mixed
//!   text/plain                    1
//!   message/rfc822                2
//!     multipart/mixed             (body of the encapsulated message)
//!       multipart/alternative     2.1
//!         text/plain              2.1.1
//!         text/html               2.1.2
//!       application/pdf           2.2
//!   image/png                     3
//! ```

use std::collections::HashSet;

use crate::types::{BodyPart, MediaType, Part};

/// The parts picked out of one message, in structure order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Walk {
    /// `text/plain` parts without a file name.
    pub messages: Vec<Part>,
    /// Parts with a file name that is not rejected.
    pub attachments: Vec<Part>,
}

/// Walk the structure of a whole message.
///
/// A multipart message is numbered from its children; any other message consists of the
/// single part `1`.
pub fn walk_message(root: &BodyPart, rejects: &HashSet<String>) -> Walk {
    if root.media_type == MediaType::Multipart {
        walk(&root.parts, rejects)
    } else {
        walk(std::slice::from_ref(root), rejects)
    }
}

/// Walk a list of sibling parts numbered `1`, `2`, ... at the top level.
///
/// Containers (`multipart/*`, `message/*`) are never returned themselves; their descendants
/// are. A part with a file name in `rejects` is dropped whatever its type.
pub fn walk(parts: &[BodyPart], rejects: &HashSet<String>) -> Walk {
    let mut out = Walk::default();
    Walker {
        rejects,
        out: &mut out,
    }
    .visit(parts, "", "", 1, true);
    out
}

struct Walker<'a> {
    rejects: &'a HashSet<String>,
    out: &'a mut Walk,
}

impl<'a> Walker<'a> {
    /// `parent` is the closest enclosing file name. `full_prefix` is false for the body of an
    /// encapsulated message, whose children share the message's own prefix.
    fn visit(
        &mut self,
        parts: &[BodyPart],
        parent: &str,
        prefix: &str,
        first: u32,
        full_prefix: bool,
    ) {
        let mut index = first;
        for part in parts {
            let filename = part.filename().unwrap_or("");
            let number = format!("{}{}", prefix, index);

            if !part.media_type.is_container() {
                if !filename.is_empty() {
                    if !self.rejects.contains(filename) {
                        self.out.attachments.push(describe(part, number, filename));
                    }
                } else if part.is_plain_text() {
                    self.out.messages.push(describe(part, number, parent));
                }
            }

            if !part.parts.is_empty() {
                let label = if filename.is_empty() { parent } else { filename };
                let nested = format!("{}{}.", prefix, index);
                if part.media_type == MediaType::Message {
                    // a multipart body takes no number of its own; a single-part body is `.1`
                    let first = if part.parts[0].media_type == MediaType::Multipart {
                        0
                    } else {
                        1
                    };
                    self.visit(&part.parts, label, &nested, first, false);
                } else if full_prefix {
                    self.visit(&part.parts, label, &nested, 1, true);
                } else {
                    self.visit(&part.parts, label, prefix, 1, true);
                }
            }

            index += 1;
        }
    }
}

fn describe(part: &BodyPart, number: String, filename: &str) -> Part {
    Part {
        number,
        media_type: part.media_type.clone(),
        subtype: part.subtype.clone(),
        encoding: part.encoding.clone(),
        filename: filename.to_string(),
        data: None,
    }
}
