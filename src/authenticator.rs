use imap::Authenticator;

/// SASL `ANONYMOUS` ([RFC 4505](https://tools.ietf.org/html/rfc4505)), used for mailboxes opened
/// with the `/anonymous` flag.
///
/// The only thing sent is the trace string, conventionally the user's e-mail address.
#[derive(Clone, Debug)]
pub struct Anonymous {
    trace: String,
}

impl Anonymous {
    pub fn new<S: Into<String>>(trace: S) -> Self {
        Anonymous {
            trace: trace.into(),
        }
    }
}

impl Authenticator for Anonymous {
    type Response = String;

    fn process(&self, _challenge: &[u8]) -> Self::Response {
        self.trace.clone()
    }
}
