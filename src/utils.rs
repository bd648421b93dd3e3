use std::borrow::Cow;

use imap_proto::types::Address;

/// Marker some certified-mail gateways put in front of the original sender.
const ON_BEHALF_OF: &str = "Per conto di: ";

/// Characters that force a display name to be quoted (RFC 5322 `specials`).
const SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];

/// Render an envelope address the way a `From:` header shows it: `Name <mailbox@host>`, or
/// just `mailbox@host` when there is no display name.
pub(crate) fn format_address(address: &Address<'_>) -> String {
    let mailbox = lossy(address.mailbox.as_deref());
    let host = lossy(address.host.as_deref());
    let addr = if host.is_empty() {
        mailbox.into_owned()
    } else {
        format!("{}@{}", mailbox, host)
    };

    match address.name.as_deref().map(|n| String::from_utf8_lossy(n)) {
        Some(ref name) if !name.is_empty() => {
            if name.contains(SPECIALS) {
                format!("\"{}\" <{}>", name.replace('"', "\\\""), addr)
            } else {
                format!("{} <{}>", name, addr)
            }
        }
        _ => addr,
    }
}

/// Reduce a `From` value to the bare sender.
///
/// Quotes and the certified-mail marker are removed, and only the first word is kept, so
/// `"Per conto di: mario@example.it" <posta-certificata@pec.example.it>` becomes
/// `mario@example.it`.
pub(crate) fn sender_address(from: &str) -> String {
    from.replace('"', "")
        .replace(ON_BEHALF_OF, "")
        .split(' ')
        .next()
        .unwrap_or("")
        .to_string()
}

pub(crate) fn lossy(bytes: Option<&[u8]>) -> Cow<'_, str> {
    bytes.map(String::from_utf8_lossy).unwrap_or(Cow::Borrowed(""))
}
