use std::fmt;

use imap_proto::types::{BodyContentCommon, BodyStructure};

use crate::encoding::TransferEncoding;

/// The major type of a MIME part, as in `text` in `text/plain`.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MediaType {
    Text,
    Multipart,
    Message,
    Application,
    Audio,
    Image,
    Video,
    Model,
    Other(String),
}

impl MediaType {
    /// Containers hold other parts and carry no content of their own.
    pub fn is_container(&self) -> bool {
        matches!(*self, MediaType::Multipart | MediaType::Message)
    }
}

impl<'a> From<&'a str> for MediaType {
    fn from(s: &'a str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "text" => MediaType::Text,
            "multipart" => MediaType::Multipart,
            "message" => MediaType::Message,
            "application" => MediaType::Application,
            "audio" => MediaType::Audio,
            "image" => MediaType::Image,
            "video" => MediaType::Video,
            "model" => MediaType::Model,
            _ => MediaType::Other(s.to_string()),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MediaType::Text => f.write_str("text"),
            MediaType::Multipart => f.write_str("multipart"),
            MediaType::Message => f.write_str("message"),
            MediaType::Application => f.write_str("application"),
            MediaType::Audio => f.write_str("audio"),
            MediaType::Image => f.write_str("image"),
            MediaType::Video => f.write_str("video"),
            MediaType::Model => f.write_str("model"),
            MediaType::Other(ref s) => f.write_str(s),
        }
    }
}

/// One node of a message's MIME structure, as described by the server's `BODYSTRUCTURE`.
///
/// A `multipart/*` node lists its children in `parts`. A `message/rfc822` node has exactly one
/// child: the body of the encapsulated message. Every other node is a leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BodyPart {
    pub media_type: MediaType,
    /// The subtype, as sent by the server (usually upper case).
    pub subtype: String,
    /// `Content-Type` parameters.
    pub params: Vec<(String, String)>,
    /// `Content-Disposition` parameters.
    pub disposition_params: Vec<(String, String)>,
    pub encoding: TransferEncoding,
    pub parts: Vec<BodyPart>,
}

impl BodyPart {
    /// Make a leaf part with no parameters, encoded as 7BIT.
    pub fn new<S: Into<String>>(media_type: MediaType, subtype: S) -> Self {
        BodyPart {
            media_type,
            subtype: subtype.into(),
            params: Vec::new(),
            disposition_params: Vec::new(),
            encoding: TransferEncoding::SevenBit,
            parts: Vec::new(),
        }
    }

    /// Make a `multipart/<subtype>` container.
    pub fn multipart<S: Into<String>>(subtype: S, parts: Vec<BodyPart>) -> Self {
        BodyPart::new(MediaType::Multipart, subtype).with_parts(parts)
    }

    /// Make a `message/rfc822` container around the body of the encapsulated message.
    pub fn rfc822(body: BodyPart) -> Self {
        BodyPart::new(MediaType::Message, "RFC822").with_parts(vec![body])
    }

    pub fn with_encoding(mut self, encoding: TransferEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn with_disposition_param<K: Into<String>, V: Into<String>>(
        mut self,
        key: K,
        value: V,
    ) -> Self {
        self.disposition_params.push((key.into(), value.into()));
        self
    }

    pub fn with_parts(mut self, parts: Vec<BodyPart>) -> Self {
        self.parts = parts;
        self
    }

    /// The file name of this part.
    ///
    /// The `filename` parameter of the `Content-Disposition` wins over the `name` parameter of
    /// the `Content-Type`. Parameter names are matched case-insensitively; an empty value
    /// counts as absent.
    pub fn filename(&self) -> Option<&str> {
        lookup(&self.disposition_params, "filename").or_else(|| lookup(&self.params, "name"))
    }

    /// Whether this is a `text/plain` part.
    pub fn is_plain_text(&self) -> bool {
        self.media_type == MediaType::Text && self.subtype.eq_ignore_ascii_case("plain")
    }

    fn leaf(common: &BodyContentCommon<'_>, encoding: TransferEncoding) -> Self {
        BodyPart {
            media_type: MediaType::from(&*common.ty.ty),
            subtype: common.ty.subtype.to_string(),
            params: owned_params(common.ty.params.as_ref()),
            disposition_params: owned_params(
                common.disposition.as_ref().and_then(|d| d.params.as_ref()),
            ),
            encoding,
            parts: Vec::new(),
        }
    }
}

impl<'a> From<&BodyStructure<'a>> for BodyPart {
    fn from(structure: &BodyStructure<'a>) -> Self {
        match *structure {
            BodyStructure::Basic {
                ref common,
                ref other,
                ..
            }
            | BodyStructure::Text {
                ref common,
                ref other,
                ..
            } => BodyPart::leaf(common, TransferEncoding::from(&other.transfer_encoding)),
            BodyStructure::Message {
                ref common,
                ref other,
                ref body,
                ..
            } => BodyPart::leaf(common, TransferEncoding::from(&other.transfer_encoding))
                .with_parts(vec![BodyPart::from(&**body)]),
            BodyStructure::Multipart {
                ref common,
                ref bodies,
                ..
            } => {
                let mut part = BodyPart::leaf(common, TransferEncoding::SevenBit);
                part.media_type = MediaType::Multipart;
                part.parts = bodies.iter().map(BodyPart::from).collect();
                part
            }
        }
    }
}

// The last matching parameter wins.
fn lookup<'p>(params: &'p [(String, String)], key: &str) -> Option<&'p str> {
    params
        .iter()
        .rev()
        .find(|(k, v)| k.eq_ignore_ascii_case(key) && !v.is_empty())
        .map(|(_, v)| v.as_str())
}

type WireParams<'a> = Vec<(std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>;

fn owned_params(params: Option<&WireParams<'_>>) -> Vec<(String, String)> {
    params
        .map(|ps| {
            ps.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default()
}
