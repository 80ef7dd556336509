//! Non-blocking client connection with a symmetric latency shim
//!
//! The client runs a single cooperative frame loop, so nothing here may
//! block: the socket is in non-blocking mode, `WouldBlock` is a normal
//! silent outcome, and the artificial latency is expressed as per-message
//! deadlines on both the outgoing and incoming queues.

use log::{debug, warn};
use shared::{encode_message, Message, MessageDecoder};
use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

pub struct Connection {
    stream: TcpStream,
    decoder: MessageDecoder,
    latency: Duration,
    /// Decoded messages waiting for their simulated arrival deadline
    inbox: VecDeque<(Instant, Message)>,
    /// Encoded messages waiting for their simulated departure deadline
    outbox: VecDeque<(Instant, Vec<u8>)>,
    closed: bool,
}

impl Connection {
    /// Connects and switches the stream to non-blocking mode.
    pub fn connect(addr: &str, latency: Duration) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        stream.set_nonblocking(true)?;

        Ok(Self {
            stream,
            decoder: MessageDecoder::new(),
            latency,
            inbox: VecDeque::new(),
            outbox: VecDeque::new(),
            closed: false,
        })
    }

    /// Queues a message for sending once its latency deadline passes.
    ///
    /// Best-effort: a failure later in the write path is logged and the
    /// connection marked closed, never surfaced as an error to the frame
    /// loop.
    pub fn send(&mut self, message: &Message) {
        let data = match encode_message(message) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to encode message: {}", e);
                return;
            }
        };
        self.outbox.push_back((Instant::now() + self.latency, data));
    }

    /// Flushes due writes and drains readable bytes. Call once per frame.
    pub fn pump(&mut self) {
        if self.closed {
            return;
        }
        self.flush_outbox();
        self.read_available();
    }

    /// Messages whose simulated arrival deadline has passed.
    pub fn poll_messages(&mut self) -> Vec<Message> {
        let now = Instant::now();
        let mut messages = Vec::new();
        while matches!(self.inbox.front(), Some((due, _)) if *due <= now) {
            if let Some((_, message)) = self.inbox.pop_front() {
                messages.push(message);
            }
        }
        messages
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn flush_outbox(&mut self) {
        let now = Instant::now();

        while matches!(self.outbox.front(), Some((due, _)) if *due <= now) {
            let Some((due, data)) = self.outbox.pop_front() else {
                break;
            };

            match self.stream.write(&data) {
                Ok(n) if n == data.len() => {}
                Ok(n) => {
                    // Partial write: the remainder stays at the head so
                    // framing is preserved
                    self.outbox.push_front((due, data[n..].to_vec()));
                    break;
                }
                Err(e)
                    if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::Interrupted =>
                {
                    self.outbox.push_front((due, data));
                    break;
                }
                Err(e) => {
                    warn!("Send failed: {}", e);
                    self.closed = true;
                    break;
                }
            }
        }
    }

    fn read_available(&mut self) {
        let mut buf = [0u8; 4096];
        loop {
            match self.stream.read(&mut buf) {
                Ok(0) => {
                    debug!("Server closed the connection");
                    self.closed = true;
                    break;
                }
                Ok(n) => {
                    let due = Instant::now() + self.latency;
                    for message in self.decoder.feed(&buf[..n]) {
                        self.inbox.push_back((due, message));
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break, // nothing available, normal
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Read failed: {}", e);
                    self.closed = true;
                    break;
                }
            }
        }
    }
}
