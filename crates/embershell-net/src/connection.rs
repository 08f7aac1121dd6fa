//! TCP connection to the remote game authority.
//!
//! One duplex stream, split in two:
//!
//! - The write half lives behind a mutex inside [`Connection`];
//!   [`Connection::send`] serializes concurrent producers on that lock.
//! - The read half is moved into a background Tokio task that reads
//!   delimited lines until the stream closes, decodes each into a
//!   [`Response`], and pushes it onto a **bounded queue**. Whoever holds
//!   the receiver drains responses strictly in arrival order, so
//!   response N+1 is never reconciled concurrently with response N.
//!   Dropping the receiver suppresses delivery without stopping the
//!   read loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};

use embershell_protocol::{JsonLineCodec, LineCodec, Request, Response};

use crate::ConnectError;

/// Capacity of the response queue between the read loop and the
/// reconciler. A full queue backpressures the read loop rather than
/// dropping responses — snapshots must not be lost.
pub const RESPONSE_QUEUE_CAPACITY: usize = 64;

/// A live connection to the remote game authority.
pub struct Connection {
    writer: Mutex<OwnedWriteHalf>,
    closed: Arc<AtomicBool>,
    codec: JsonLineCodec,
}

impl Connection {
    /// Dials the server and starts the background read loop.
    ///
    /// Returns the connection plus the receiving end of the response
    /// queue.
    ///
    /// # Errors
    /// [`ConnectError::Dial`] if the TCP handshake fails.
    pub async fn connect(
        host: &str,
        port: u16,
    ) -> Result<(Self, mpsc::Receiver<Response>), ConnectError> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(ConnectError::Dial)?;
        tracing::info!(host, port, "connected to game server");

        let (read_half, write_half) = stream.into_split();
        let closed = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel(RESPONSE_QUEUE_CAPACITY);
        tokio::spawn(read_loop(read_half, tx, Arc::clone(&closed)));

        Ok((
            Self {
                writer: Mutex::new(write_half),
                closed,
                codec: JsonLineCodec,
            },
            rx,
        ))
    }

    /// Encodes a request and writes it as one `\r\n`-terminated line.
    ///
    /// # Errors
    /// [`ConnectError::Closed`] after [`close`](Self::close),
    /// [`ConnectError::Write`] if the stream errors, or a
    /// [`ProtocolError`](embershell_protocol::ProtocolError) if the
    /// request cannot be encoded.
    pub async fn send(&self, request: &Request) -> Result<(), ConnectError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ConnectError::Closed);
        }
        let mut line = self.codec.encode(request)?;
        line.push_str("\r\n");

        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(ConnectError::Write)?;
        writer.flush().await.map_err(ConnectError::Write)?;
        Ok(())
    }

    /// Closes the connection. Idempotent.
    ///
    /// Sets the closed flag and shuts down the write half; the read
    /// loop exits on its next read. Subsequent sends fail with
    /// [`ConnectError::Closed`].
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            tracing::debug!(error = %e, "error shutting down write half");
        }
        tracing::info!("server connection closed");
    }

    /// Reports whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Reads delimited lines until the stream closes or the close flag is
/// set. Decode errors drop the single bad frame and the loop continues.
async fn read_loop(
    read_half: OwnedReadHalf,
    tx: mpsc::Sender<Response>,
    closed: Arc<AtomicBool>,
) {
    let codec = JsonLineCodec;
    let mut lines = BufReader::new(read_half).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!("server closed the connection");
                break;
            }
            Err(e) => {
                // Local close surfaces as a read error; that is loop
                // exit, not something to report upward.
                if !closed.load(Ordering::Acquire) {
                    tracing::error!(error = %e, "unable to read from server");
                }
                break;
            }
        };
        if closed.load(Ordering::Acquire) {
            break;
        }
        let response: Response = match codec.decode(&line) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "unable to decode server response");
                continue;
            }
        };
        // A dropped receiver means response delivery is suppressed;
        // keep reading so the stream drains until close.
        if tx.send(response).await.is_err() {
            tracing::debug!("response receiver dropped — suppressing delivery");
        }
    }
    tracing::debug!("server read loop finished");
}
