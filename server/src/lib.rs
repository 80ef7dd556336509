//! # Game Server Library
//!
//! Authoritative server for the networked coin-collection game. The
//! server owns the only true copy of world state (player positions,
//! scores, coins), integrates movement on a fixed simulation tick, and
//! broadcasts state snapshots to every connected client.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! All game logic decisions happen here. Clients only ever send input
//! flags; positions and scores exist nowhere else authoritatively, and
//! clients conform to the broadcast snapshots.
//!
//! ### Connection Management
//! The full lifecycle of a client connection:
//! - Join handling and monotonic player id assignment
//! - Per-connection input decoding and registry updates
//! - Teardown on disconnect, exactly once, without touching other
//!   connections
//!
//! ### State Broadcasting
//! Once per tick the simulation builds an immutable snapshot of every
//! player and coin and queues it to each connection, with an artificial
//! latency shim applied per message so network conditions can be
//! emulated deterministically.
//!
//! ## Architecture
//!
//! One tokio task per accepted connection handles reads for that
//! connection only; a dedicated task runs the simulation loop. Both go
//! through the shared [`registry::Registry`] behind an `RwLock`, and the
//! loop holds the lock only for the brief snapshot and commit steps —
//! never across physics, collisions, or sends. Outbound delivery runs on
//! per-connection writer tasks so one slow peer cannot stall the rest.
//!
//! ## Module Organization
//!
//! - [`registry`] — connection-to-player mapping, id assignment,
//!   snapshot/commit used by the tick
//! - [`game`] — world state (coins), movement integration, coin
//!   collision sweep, snapshot message assembly
//! - [`network`] — TCP accept loop, framed decode per connection,
//!   deadline-based latency shim, writer tasks

pub mod game;
pub mod network;
pub mod registry;
