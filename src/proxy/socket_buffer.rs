//! Bidirectional framing buffer between a socket pair.
//!
//! Bytes enter at `bytes_read`, the parser promotes them past
//! `bytes_parsed` one complete message at a time, and the relay drains the
//! parsed prefix past `bytes_written` to the opposite socket:
//!
//! ```text
//!          bytes_written   bytes_parsed    bytes_read      capacity
//!          |               |               |               |
//! ▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉▉░░░░░░░░░░░░░░░░
//!          [ drained next ][ unparsed     ][ available    ]
//! ```
//!
//! Invariant at all times: `bytes_written <= bytes_parsed <= bytes_read <=
//! capacity`. A message is only marked parsed after its full declared size
//! has arrived, so the relay never forwards a partial message.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Error, Result};

/// Buffer allocation block size in bytes.
const BLOCK_SZ: usize = 2048;

pub struct SocketBuffer {
    buffer: Vec<u8>,
    /// Total bytes read/loaded since the last reset
    bytes_read: usize,
    /// Total bytes marked parsed (relay-ready) since the last reset
    bytes_parsed: usize,
    /// Total bytes written/unloaded since the last reset
    bytes_written: usize,
    /// Capacity remaining before a resize
    bytes_available: usize,
    /// Measured size of the next message once the parser has seen its header
    next_message_sz: Option<usize>,
}

impl Default for SocketBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketBuffer {
    pub fn new() -> Self {
        Self {
            buffer: vec![0; BLOCK_SZ],
            bytes_read: 0,
            bytes_parsed: 0,
            bytes_written: 0,
            bytes_available: BLOCK_SZ,
            next_message_sz: None,
        }
    }

    /// Declare the measured size of the next message. Committing twice
    /// without an intervening [`mark_message_parsed`] is a parser bug.
    ///
    /// [`mark_message_parsed`]: SocketBuffer::mark_message_parsed
    pub fn set_message_size(&mut self, message_sz: usize) -> Result<()> {
        if self.next_message_sz.is_some() {
            return Err(Error::Invariant(
                "message size declared while one is already pending".into(),
            ));
        }
        self.next_message_sz = Some(message_sz);
        Ok(())
    }

    pub fn message_size(&self) -> Option<usize> {
        self.next_message_sz
    }

    /// Promote exactly the declared message past the parsed cursor and
    /// clear the declaration.
    pub fn mark_message_parsed(&mut self) -> Result<()> {
        let message_sz = self
            .next_message_sz
            .ok_or_else(|| Error::Invariant("message marked parsed with no declared size".into()))?;
        if self.bytes_parsed + message_sz > self.bytes_read {
            return Err(Error::Invariant(format!(
                "message of {} bytes marked parsed with only {} unparsed",
                message_sz,
                self.unparsed()
            )));
        }
        self.bytes_parsed += message_sz;
        self.next_message_sz = None;
        Ok(())
    }

    /// Bytes promoted past the parsed cursor and not yet drained.
    pub fn parsed(&self) -> usize {
        self.bytes_parsed - self.bytes_written
    }

    /// Bytes read but not yet promoted by the parser.
    pub fn unparsed(&self) -> usize {
        self.bytes_read - self.bytes_parsed
    }

    /// Bytes read but not yet drained.
    pub fn len(&self) -> usize {
        self.bytes_read - self.bytes_written
    }

    pub fn is_empty(&self) -> bool {
        self.bytes_read == 0
    }

    /// Either no size declared yet, or the declared size has not fully
    /// arrived.
    pub fn incomplete_message(&self) -> bool {
        self.unparsed() > 0
            && match self.next_message_sz {
                None => true,
                Some(sz) => self.unparsed() < sz,
            }
    }

    pub fn read_ready(&self) -> bool {
        self.is_empty() || self.incomplete_message()
    }

    pub fn write_ready(&self) -> bool {
        !self.is_empty() && self.parsed() > 0
    }

    /// The parser's view: everything read but not yet promoted.
    pub fn unparsed_data(&self) -> &[u8] {
        &self.buffer[self.bytes_parsed..self.bytes_read]
    }

    /// The relay's view: everything promoted but not yet drained.
    pub fn parsed_data(&self) -> &[u8] {
        &self.buffer[self.bytes_written..self.bytes_parsed]
    }

    /// Overwrite one byte of the current unparsed message in place, before
    /// it is marked parsed. This is the QueryExtension `present` rewrite
    /// hook; nothing else mutates relayed bytes.
    pub fn patch_unparsed(&mut self, offset: usize, value: u8) -> Result<()> {
        if offset >= self.unparsed() {
            return Err(Error::Invariant(format!(
                "patch at unparsed offset {} with only {} unparsed bytes",
                offset,
                self.unparsed()
            )));
        }
        self.buffer[self.bytes_parsed + offset] = value;
        Ok(())
    }

    fn grow(&mut self) {
        self.buffer.resize(self.buffer.len() + BLOCK_SZ, 0);
        self.bytes_available += BLOCK_SZ;
    }

    /// Read once from `source` into the available region, growing by one
    /// block first when capacity is exhausted. A zero-length read reports
    /// the peer as closed.
    pub async fn fill_from<R>(&mut self, source: &mut R, what: &str) -> Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        if self.bytes_available == 0 {
            self.grow();
        }
        let start = self.bytes_read;
        let end = start + self.bytes_available;
        let n = source
            .read(&mut self.buffer[start..end])
            .await
            .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", what, e))))?;
        if n == 0 {
            return Err(Error::PeerClosed(what.to_string()));
        }
        self.bytes_read += n;
        self.bytes_available -= n;
        Ok(n)
    }

    /// Drain the parsed prefix to `dest`. Partial progress is retained
    /// across calls; once everything read has been drained the buffer
    /// resets (capacity retained).
    pub async fn drain_to<W>(&mut self, dest: &mut W, what: &str) -> Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        let count = self.parsed();
        if count == 0 {
            return Ok(0);
        }
        let start = self.bytes_written;
        dest.write_all(&self.buffer[start..start + count])
            .await
            .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", what, e))))?;
        self.bytes_written += count;
        if self.bytes_written == self.bytes_read {
            self.reset();
        }
        Ok(count)
    }

    /// In-process source equivalent of [`fill_from`], used before sockets
    /// are attached and by tests.
    ///
    /// [`fill_from`]: SocketBuffer::fill_from
    pub fn load(&mut self, input: &[u8]) -> usize {
        while self.bytes_available < input.len() {
            self.grow();
        }
        self.buffer[self.bytes_read..self.bytes_read + input.len()].copy_from_slice(input);
        self.bytes_read += input.len();
        self.bytes_available -= input.len();
        input.len()
    }

    /// In-process sink equivalent of [`drain_to`]: remove up to `count`
    /// parsed bytes and return them.
    ///
    /// [`drain_to`]: SocketBuffer::drain_to
    pub fn unload(&mut self, count: usize) -> Result<Vec<u8>> {
        if count > self.parsed() {
            return Err(Error::Invariant(format!(
                "unload of {} bytes with only {} parsed",
                count,
                self.parsed()
            )));
        }
        let start = self.bytes_written;
        let out = self.buffer[start..start + count].to_vec();
        self.bytes_written += count;
        if self.bytes_written == self.bytes_read {
            self.reset();
        }
        Ok(out)
    }

    /// Reset to empty; storage is kept at its current size.
    pub fn reset(&mut self) {
        self.bytes_read = 0;
        self.bytes_parsed = 0;
        self.bytes_written = 0;
        self.bytes_available = self.buffer.len();
        self.next_message_sz = None;
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[cfg(test)]
    pub fn cursors(&self) -> (usize, usize, usize) {
        (self.bytes_written, self.bytes_parsed, self.bytes_read)
    }
}
