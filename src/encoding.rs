//! Content-transfer-encodings of body parts, and how to undo them.

use std::fmt;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{DecodeError, Engine};

/// Mail bodies wrap their base64 at 76 columns and are not always padded.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The `Content-Transfer-Encoding` of a body part.
///
/// The numeric codes (see [`from_code`](Self::from_code)) are the ones used to
/// describe encodings across the crate's public interface:
/// `0` 7BIT, `1` 8BIT, `2` BINARY, `3` BASE64, `4` QUOTED-PRINTABLE, `5` anything else.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TransferEncoding {
    SevenBit,
    EightBit,
    Binary,
    Base64,
    QuotedPrintable,
    Other(String),
}

impl TransferEncoding {
    /// Look up an encoding by its numeric code. Unknown codes map to `Other`.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => TransferEncoding::SevenBit,
            1 => TransferEncoding::EightBit,
            2 => TransferEncoding::Binary,
            3 => TransferEncoding::Base64,
            4 => TransferEncoding::QuotedPrintable,
            _ => TransferEncoding::Other(String::new()),
        }
    }

    /// The numeric code of this encoding.
    pub fn code(&self) -> u8 {
        match *self {
            TransferEncoding::SevenBit => 0,
            TransferEncoding::EightBit => 1,
            TransferEncoding::Binary => 2,
            TransferEncoding::Base64 => 3,
            TransferEncoding::QuotedPrintable => 4,
            TransferEncoding::Other(_) => 5,
        }
    }

    /// Undo this encoding. Only BASE64 and QUOTED-PRINTABLE transform the data; every other
    /// encoding is returned as is.
    pub fn decode(&self, data: Vec<u8>) -> Result<Vec<u8>, DecodeError> {
        match *self {
            TransferEncoding::Base64 => decode_base64(&data),
            TransferEncoding::QuotedPrintable => Ok(decode_quoted_printable(&data)),
            _ => Ok(data),
        }
    }
}

impl From<u8> for TransferEncoding {
    fn from(code: u8) -> Self {
        TransferEncoding::from_code(code)
    }
}

impl<'a> From<&'a str> for TransferEncoding {
    fn from(s: &'a str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "7BIT" => TransferEncoding::SevenBit,
            "8BIT" => TransferEncoding::EightBit,
            "BINARY" => TransferEncoding::Binary,
            "BASE64" => TransferEncoding::Base64,
            "QUOTED-PRINTABLE" => TransferEncoding::QuotedPrintable,
            _ => TransferEncoding::Other(s.to_string()),
        }
    }
}

impl<'a> From<&imap_proto::types::ContentEncoding<'a>> for TransferEncoding {
    fn from(enc: &imap_proto::types::ContentEncoding<'a>) -> Self {
        use imap_proto::types::ContentEncoding;
        match *enc {
            ContentEncoding::SevenBit => TransferEncoding::SevenBit,
            ContentEncoding::EightBit => TransferEncoding::EightBit,
            ContentEncoding::Binary => TransferEncoding::Binary,
            ContentEncoding::Base64 => TransferEncoding::Base64,
            ContentEncoding::QuotedPrintable => TransferEncoding::QuotedPrintable,
            ContentEncoding::Other(ref s) => TransferEncoding::Other(s.to_string()),
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TransferEncoding::SevenBit => f.write_str("7BIT"),
            TransferEncoding::EightBit => f.write_str("8BIT"),
            TransferEncoding::Binary => f.write_str("BINARY"),
            TransferEncoding::Base64 => f.write_str("BASE64"),
            TransferEncoding::QuotedPrintable => f.write_str("QUOTED-PRINTABLE"),
            TransferEncoding::Other(ref s) if s.is_empty() => f.write_str("OTHER"),
            TransferEncoding::Other(ref s) => f.write_str(s),
        }
    }
}

/// Decode a BASE64 body. Line breaks and other whitespace are ignored, and padding is optional.
pub fn decode_base64(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let compact: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    LENIENT.decode(compact)
}

/// Decode a QUOTED-PRINTABLE body (RFC 2045, section 6.7).
///
/// `=XX` becomes the byte `0xXX` and `=` at the end of a line is a soft line break. Malformed
/// escapes are kept literally rather than rejected.
pub fn decode_quoted_printable(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        if b != b'=' {
            out.push(b);
            i += 1;
            continue;
        }

        match (data.get(i + 1), data.get(i + 2)) {
            (Some(b'\r'), Some(b'\n')) => i += 3,
            (Some(b'\n'), _) => i += 2,
            (Some(&hi), Some(&lo)) => match (hex(hi), hex(lo)) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 3;
                }
                _ => {
                    out.push(b'=');
                    i += 1;
                }
            },
            _ => {
                out.push(b'=');
                i += 1;
            }
        }
    }
    out
}

fn hex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
