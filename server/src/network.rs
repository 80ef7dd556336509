//! TCP network layer: accept loop, per-connection tasks, latency shim
//!
//! Each accepted connection gets its own read task and writer task. The
//! read task decodes newline-framed messages and calls into the registry;
//! the writer task drains a per-connection queue of deadline-stamped
//! messages. The simulation loop never waits on either: a slow or dead
//! peer only backs up its own queue.

use crate::registry::Registry;
use log::{debug, info, warn};
use shared::{encode_message, Message, MessageDecoder};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, RwLock};
use tokio::time::{sleep_until, Instant};

/// A message scheduled for delivery once its deadline passes.
#[derive(Debug)]
pub struct Delivery {
    pub due: Instant,
    pub message: Message,
}

/// Outbound queue handle for one connection.
pub type ConnectionTx = mpsc::UnboundedSender<Delivery>;

/// Artificial one-way network delay, expressed as delivery deadlines.
///
/// The shim never sleeps in shared code paths: senders stamp a deadline
/// and only the affected connection's own task waits for it.
#[derive(Debug, Clone, Copy)]
pub struct LatencyShim {
    delay: Duration,
}

impl LatencyShim {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Deadline for a message entering the shim right now.
    pub fn due(&self) -> Instant {
        Instant::now() + self.delay
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Listening socket plus the accept loop feeding per-connection tasks.
pub struct NetworkServer {
    listener: TcpListener,
}

impl NetworkServer {
    /// Binds the listening socket. This is the only fatal startup error.
    pub async fn bind(addr: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", addr);
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, one task per connection.
    pub async fn run(self, registry: Arc<RwLock<Registry>>, shim: LatencyShim) {
        let mut next_conn_id: u64 = 1;

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let conn_id = next_conn_id;
                    next_conn_id += 1;
                    info!("Connection {} accepted from {}", conn_id, peer);

                    let registry = Arc::clone(&registry);
                    tokio::spawn(async move {
                        handle_connection(conn_id, stream, registry, shim).await;
                    });
                }
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Reads and decodes one connection's inbound stream until EOF or error,
/// then tears the player down exactly once.
async fn handle_connection(
    conn_id: u64,
    stream: TcpStream,
    registry: Arc<RwLock<Registry>>,
    shim: LatencyShim,
) {
    let (mut reader, writer) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel();
    let writer_task = tokio::spawn(run_writer(conn_id, writer, rx));

    let mut decoder = MessageDecoder::new();
    let mut buf = [0u8; 4096];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break, // peer closed
            Ok(n) => {
                let received = Instant::now();
                let messages = decoder.feed(&buf[..n]);
                if messages.is_empty() {
                    continue;
                }

                // Inbound half of the latency shim: hold this read batch
                // until its arrival deadline. Only this connection waits.
                sleep_until(received + shim.delay()).await;

                for message in messages {
                    handle_message(conn_id, message, &registry, &tx, shim).await;
                }
            }
            Err(e) => {
                debug!("Read error on connection {}: {}", conn_id, e);
                break;
            }
        }
    }

    registry.write().await.unregister(conn_id);
    drop(tx); // lets the writer drain its queue and exit
    let _ = writer_task.await;
    info!("Connection {} closed", conn_id);
}

async fn handle_message(
    conn_id: u64,
    message: Message,
    registry: &Arc<RwLock<Registry>>,
    tx: &ConnectionTx,
    shim: LatencyShim,
) {
    match message {
        Message::Join { name } => {
            let player_id = registry.write().await.register(conn_id, tx.clone());
            debug!("Join from connection {} as {:?}", conn_id, name);

            let _ = tx.send(Delivery {
                due: shim.due(),
                message: Message::Welcome { id: player_id },
            });
        }
        Message::Input { keys } => {
            registry.write().await.update_input(conn_id, keys);
        }
        other => {
            debug!("Ignoring {:?} from connection {}", other, conn_id);
        }
    }
}

/// Drains one connection's outbound queue, honoring delivery deadlines.
///
/// Deadlines are stamped at enqueue time and the queue is FIFO, so under
/// a constant shim delay each message waits exactly that delay and the
/// queue cannot grow from the shim alone. A write failure ends the task;
/// the read side notices the broken connection on its own.
async fn run_writer(
    conn_id: u64,
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<Delivery>,
) {
    while let Some(delivery) = rx.recv().await {
        sleep_until(delivery.due).await;

        let data = match encode_message(&delivery.message) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to encode outbound message: {}", e);
                continue;
            }
        };

        if let Err(e) = writer.write_all(&data).await {
            debug!("Write failed on connection {}: {}", conn_id, e);
            break;
        }
    }
}
