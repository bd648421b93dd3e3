use std::cmp::min;
use std::io::{Error, ErrorKind, Read, Result, Write};
use std::sync::{Arc, Mutex};

/// A scripted connection: reads replay a canned server transcript, writes are recorded.
///
/// The written bytes are shared, so they can still be inspected after the stream has been
/// moved into an `imap::Session`.
pub struct MockStream {
    read_buf: Vec<u8>,
    read_pos: usize,
    written: Arc<Mutex<Vec<u8>>>,
}

impl MockStream {
    pub fn new<B: Into<Vec<u8>>>(read_buf: B) -> MockStream {
        MockStream {
            read_buf: read_buf.into(),
            read_pos: 0,
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle on everything written to the stream.
    pub fn written(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.written)
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.read_pos >= self.read_buf.len() {
            return Err(Error::new(ErrorKind::UnexpectedEof, "EOF"));
        }
        let write_len = min(buf.len(), self.read_buf.len() - self.read_pos);
        let max_pos = self.read_pos + write_len;
        buf[..write_len].copy_from_slice(&self.read_buf[self.read_pos..max_pos]);
        self.read_pos = max_pos;
        Ok(write_len)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.written
            .lock()
            .map_err(|_| Error::new(ErrorKind::Other, "poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
