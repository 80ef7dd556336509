use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8765;
pub const DEFAULT_ADDR: &str = "127.0.0.1:8765";

pub const TICK_RATE: u32 = 20;
pub const LATENCY_MS: u64 = 100;

pub const MAP_WIDTH: f32 = 800.0;
pub const MAP_HEIGHT: f32 = 600.0;
pub const PLAYER_SPEED: f32 = 200.0;
pub const PLAYER_RADIUS: f32 = 20.0;
pub const COIN_RADIUS: f32 = 15.0;
pub const SPAWN_MARGIN: f32 = 100.0;
pub const COIN_MARGIN: f32 = 50.0;

pub const MAX_COINS: usize = 5;
pub const COIN_SPAWN_INTERVAL: Duration = Duration::from_secs(2);

pub const INTERP_WINDOW: f32 = 0.1;
pub const CORRECTION_RATE: f32 = 0.15;
pub const INPUT_SEND_INTERVAL: f32 = 0.1;

/// The four directional input flags reported by a client.
///
/// Every field defaults to `false` so a partial `input` message decodes
/// to a neutral state instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputFlags {
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub down: bool,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
}

impl InputFlags {
    /// Unit movement vector for these flags.
    ///
    /// Opposing flags cancel out; diagonal input is normalized so the
    /// magnitude is 1.0, never sqrt(2). No input yields the zero vector.
    pub fn direction(&self) -> (f32, f32) {
        let mut dx = 0.0f32;
        let mut dy = 0.0f32;
        if self.up {
            dy -= 1.0;
        }
        if self.down {
            dy += 1.0;
        }
        if self.left {
            dx -= 1.0;
        }
        if self.right {
            dx += 1.0;
        }

        let length = (dx * dx + dy * dy).sqrt();
        if length > 0.0 {
            (dx / length, dy / length)
        } else {
            (0.0, 0.0)
        }
    }
}

/// One player as reported in a `state` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub score: u32,
}

/// One coin as reported in a `state` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// A single wire message, one JSON object per line, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Join {
        #[serde(default)]
        name: String,
    },
    Welcome {
        id: u32,
    },
    Input {
        #[serde(default)]
        keys: InputFlags,
    },
    State {
        #[serde(default)]
        players: Vec<PlayerView>,
        #[serde(default)]
        coins: Vec<CoinView>,
    },
}

/// Serializes a message to a single newline-terminated JSON line.
///
/// Compact JSON never contains a raw line break, so the trailing `\n` is
/// the only delimiter byte in the output.
pub fn encode_message(message: &Message) -> serde_json::Result<Vec<u8>> {
    let mut data = serde_json::to_vec(message)?;
    data.push(b'\n');
    Ok(data)
}

/// Incremental decoder for newline-delimited messages.
///
/// Bytes arrive in arbitrary chunk sizes; a line split across reads is
/// buffered until its delimiter shows up. Empty lines are skipped and
/// malformed or unrecognized lines are dropped without aborting the
/// stream.
#[derive(Debug, Default)]
pub struct MessageDecoder {
    buffer: Vec<u8>,
}

impl MessageDecoder {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Appends a chunk of bytes and returns every message completed by it.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Message> {
        self.buffer.extend_from_slice(bytes);

        let mut messages = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = &line[..line.len() - 1];

            if line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }

            match serde_json::from_slice(line) {
                Ok(message) => messages.push(message),
                Err(_) => continue,
            }
        }

        messages
    }

    /// Number of buffered bytes still waiting for a delimiter.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }
}
