//! Connection registry mapping live connections to player entities
//!
//! This module handles the server-side bookkeeping for connected players:
//! - Player entity lifecycle (join, input updates, disconnect)
//! - Monotonic player id assignment (ids are never reused while the
//!   registry lives)
//! - Point-in-time snapshots so the simulation tick can run physics and
//!   collisions without holding the registry lock
//!
//! The registry is the single source of truth for who is in the game;
//! the simulation loop mutates positions and scores only through the
//! snapshot/commit pair below.

use crate::network::ConnectionTx;
use log::info;
use rand::Rng;
use shared::{InputFlags, MAP_HEIGHT, MAP_WIDTH, SPAWN_MARGIN};
use std::collections::HashMap;

/// A player entity owned by the server.
#[derive(Debug, Clone)]
pub struct Player {
    /// Unique id assigned on join, reported to the client in `welcome`
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub score: u32,
    /// Latest input flags received for this player; consumed every tick
    pub input: InputFlags,
}

/// One registry entry as seen by a simulation tick.
///
/// Carries a copy of the player plus the connection's outbound sender so
/// the tick can both integrate movement and disseminate the resulting
/// snapshot without going back to the registry. A send to a connection
/// that disappeared after the snapshot fails harmlessly.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    pub conn: u64,
    pub player: Player,
    pub tx: ConnectionTx,
}

struct Entry {
    player: Player,
    tx: ConnectionTx,
}

/// Tracks every registered connection and its player entity.
///
/// Callers wrap the registry in `Arc<RwLock<...>>`; every operation here
/// is brief so no lock is ever held across physics or I/O.
pub struct Registry {
    entries: HashMap<u64, Entry>,
    next_player_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_player_id: 1,
        }
    }

    /// Registers a connection and creates its player entity.
    ///
    /// The player spawns at a random position inside the map's inset
    /// margin with zero score and neutral input. Returns the assigned
    /// player id. A repeated `join` on the same connection replaces the
    /// old entity under a fresh id.
    pub fn register(&mut self, conn: u64, tx: ConnectionTx) -> u32 {
        let id = self.next_player_id;
        self.next_player_id += 1;

        let mut rng = rand::thread_rng();
        let player = Player {
            id,
            x: rng.gen_range(SPAWN_MARGIN..=MAP_WIDTH - SPAWN_MARGIN),
            y: rng.gen_range(SPAWN_MARGIN..=MAP_HEIGHT - SPAWN_MARGIN),
            score: 0,
            input: InputFlags::default(),
        };

        info!(
            "Player {} joined on connection {} at ({:.0}, {:.0})",
            id, conn, player.x, player.y
        );
        self.entries.insert(conn, Entry { player, tx });

        id
    }

    /// Replaces the pending input for a connection's player.
    ///
    /// Silent no-op if the connection was removed concurrently — input
    /// racing a disconnect is expected, not an error.
    pub fn update_input(&mut self, conn: u64, flags: InputFlags) {
        if let Some(entry) = self.entries.get_mut(&conn) {
            entry.player.input = flags;
        }
    }

    /// Point-in-time copy of every registered player, ordered by player id.
    ///
    /// The ordering is what fixes the coin collision tie-break: the
    /// lowest player id in range wins. The tick operates entirely on
    /// this copy and writes results back via [`commit`](Self::commit).
    pub fn snapshot(&self) -> Vec<PlayerHandle> {
        let mut handles: Vec<PlayerHandle> = self
            .entries
            .iter()
            .map(|(conn, entry)| PlayerHandle {
                conn: *conn,
                player: entry.player.clone(),
                tx: entry.tx.clone(),
            })
            .collect();
        handles.sort_by_key(|handle| handle.player.id);
        handles
    }

    /// Writes post-tick positions and scores back for entries still present.
    ///
    /// Pending input is left untouched: connection tasks may have
    /// replaced it while the tick ran on the snapshot, and those updates
    /// must not be lost. Entries that vanished since the snapshot are
    /// skipped.
    pub fn commit(&mut self, snapshot: &[PlayerHandle]) {
        for handle in snapshot {
            if let Some(entry) = self.entries.get_mut(&handle.conn) {
                entry.player.x = handle.player.x;
                entry.player.y = handle.player.y;
                entry.player.score = handle.player.score;
            }
        }
    }

    /// Removes a connection's player. Idempotent.
    pub fn unregister(&mut self, conn: u64) {
        if let Some(entry) = self.entries.remove(&conn) {
            info!("Player {} disconnected", entry.player.id);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Delivery;
    use shared::{PLAYER_RADIUS, SPAWN_MARGIN};
    use tokio::sync::mpsc;

    fn test_tx() -> ConnectionTx {
        let (tx, _rx) = mpsc::unbounded_channel::<Delivery>();
        tx
    }

    #[test]
    fn test_register_assigns_monotonic_ids() {
        let mut registry = Registry::new();

        let id1 = registry.register(1, test_tx());
        let id2 = registry.register(2, test_tx());

        assert_eq!(id1, 1);
        assert_eq!(id2, 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_ids_never_reused_after_unregister() {
        let mut registry = Registry::new();

        let id1 = registry.register(1, test_tx());
        registry.unregister(1);
        let id2 = registry.register(2, test_tx());

        assert_ne!(id1, id2);
        assert!(id2 > id1);
    }

    #[test]
    fn test_spawn_position_is_inside_margin() {
        let mut registry = Registry::new();

        for conn in 0..50 {
            registry.register(conn, test_tx());
        }

        for handle in registry.snapshot() {
            assert!(handle.player.x >= SPAWN_MARGIN);
            assert!(handle.player.x <= MAP_WIDTH - SPAWN_MARGIN);
            assert!(handle.player.y >= SPAWN_MARGIN);
            assert!(handle.player.y <= MAP_HEIGHT - SPAWN_MARGIN);
            // Inset margin implies the clamp bounds hold from the start
            assert!(handle.player.x >= PLAYER_RADIUS);
            assert!(handle.player.y >= PLAYER_RADIUS);
        }
    }

    #[test]
    fn test_new_player_starts_neutral() {
        let mut registry = Registry::new();
        registry.register(7, test_tx());

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].player.score, 0);
        assert_eq!(snapshot[0].player.input, InputFlags::default());
    }

    #[test]
    fn test_update_input_replaces_flags() {
        let mut registry = Registry::new();
        registry.register(3, test_tx());

        let flags = InputFlags {
            right: true,
            ..Default::default()
        };
        registry.update_input(3, flags);

        assert_eq!(registry.snapshot()[0].player.input, flags);
    }

    #[test]
    fn test_update_input_after_unregister_is_noop() {
        let mut registry = Registry::new();
        registry.register(3, test_tx());
        registry.unregister(3);

        registry.update_input(
            3,
            InputFlags {
                up: true,
                ..Default::default()
            },
        );

        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut registry = Registry::new();
        registry.register(5, test_tx());

        registry.unregister(5);
        registry.unregister(5);
        registry.unregister(999);

        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_ordered_by_player_id() {
        let mut registry = Registry::new();
        // Connection ids deliberately out of order
        registry.register(30, test_tx());
        registry.register(10, test_tx());
        registry.register(20, test_tx());

        let ids: Vec<u32> = registry
            .snapshot()
            .iter()
            .map(|handle| handle.player.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_commit_writes_position_and_score() {
        let mut registry = Registry::new();
        registry.register(1, test_tx());

        let mut snapshot = registry.snapshot();
        snapshot[0].player.x = 123.0;
        snapshot[0].player.y = 456.0;
        snapshot[0].player.score = 2;
        registry.commit(&snapshot);

        let committed = &registry.snapshot()[0].player;
        assert_eq!(committed.x, 123.0);
        assert_eq!(committed.y, 456.0);
        assert_eq!(committed.score, 2);
    }

    #[test]
    fn test_commit_preserves_concurrent_input() {
        let mut registry = Registry::new();
        registry.register(1, test_tx());

        let snapshot = registry.snapshot();

        // Input arrives while the tick runs on the snapshot
        let flags = InputFlags {
            down: true,
            ..Default::default()
        };
        registry.update_input(1, flags);

        registry.commit(&snapshot);
        assert_eq!(registry.snapshot()[0].player.input, flags);
    }

    #[test]
    fn test_commit_skips_departed_connections() {
        let mut registry = Registry::new();
        registry.register(1, test_tx());
        registry.register(2, test_tx());

        let mut snapshot = registry.snapshot();
        for handle in snapshot.iter_mut() {
            handle.player.score = 9;
        }

        registry.unregister(1);
        registry.commit(&snapshot);

        let remaining = registry.snapshot();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].player.id, 2);
        assert_eq!(remaining[0].player.score, 9);
    }
}
