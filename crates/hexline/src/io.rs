//! Reading and writing lines over any `tokio` byte stream.
//!
//! One message is one `\n`-terminated line. A trailing `\r` is stripped
//! on read, so peers that send `\r\n` work too.

use hexline_catalog::GameMessage;
use hexline_protocol::Registry;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};

use crate::HexlineError;

// ---------------------------------------------------------------------------
// LineReader
// ---------------------------------------------------------------------------

/// Reads lines and decodes them through a registry.
pub struct LineReader<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            lines: BufReader::new(inner).lines(),
        }
    }

    /// The next raw line, or `None` at end of stream.
    ///
    /// # Errors
    /// [`HexlineError::Io`] if the stream fails or isn't valid UTF-8.
    pub async fn next_line(&mut self) -> Result<Option<String>, HexlineError> {
        Ok(self.lines.next_line().await?)
    }

    /// The next line that decodes to a known message.
    ///
    /// Malformed lines and unknown types are skipped, as the dispatcher
    /// would. Returns `None` at end of stream.
    ///
    /// # Errors
    /// [`HexlineError::Io`] if the stream fails.
    pub async fn next_message(
        &mut self,
        registry: &Registry<GameMessage>,
    ) -> Result<Option<GameMessage>, HexlineError> {
        while let Some(line) = self.next_line().await? {
            if let Some(msg) = registry.dispatch(&line) {
                return Ok(Some(msg));
            }
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// LineWriter
// ---------------------------------------------------------------------------

/// Writes prepared lines, one per message.
pub struct LineWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Writes `line` plus the terminator and flushes.
    ///
    /// # Errors
    /// [`HexlineError::Io`] if the stream fails.
    pub async fn send_line(&mut self, line: &str) -> Result<(), HexlineError> {
        self.inner.write_all(line.as_bytes()).await?;
        self.inner.write_all(b"\n").await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Gives back the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
