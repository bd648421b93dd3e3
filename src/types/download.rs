use std::io::{self, Write};

/// The decoded content of one body part, ready to be handed to a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub data: Vec<u8>,
}

impl Download {
    /// The HTTP response headers that make a browser save [`data`](Self::data) as
    /// [`filename`](Self::filename) instead of displaying it.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Description", "File Transfer".to_string()),
            ("Content-Type", "application/octet-stream".to_string()),
            (
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename.replace('"', "")),
            ),
            ("Content-Transfer-Encoding", "binary".to_string()),
            ("Content-Length", self.data.len().to_string()),
            ("Expires", "0".to_string()),
            ("Cache-Control", "must-revalidate".to_string()),
            ("Pragma", "public".to_string()),
        ]
    }

    /// Write the headers, a blank line and the content to `w`.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        for (name, value) in self.headers() {
            write!(w, "{}: {}\r\n", name, value)?;
        }
        w.write_all(b"\r\n")?;
        w.write_all(&self.data)?;
        w.flush()
    }
}
