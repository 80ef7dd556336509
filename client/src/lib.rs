//! # Game Client Library
//!
//! Client-side implementation for the networked coin-collection game:
//! input capture policy, non-blocking network communication, and the
//! reconciliation layer that turns discrete server snapshots into smooth
//! on-screen motion. The client is never authoritative — it only sends
//! input flags and conforms to what the server reports.
//!
//! ## Architecture Overview
//!
//! A single cooperative loop runs once per frame: sample the keyboard,
//! decide whether to transmit input, pump the non-blocking socket, apply
//! any complete messages, advance interpolation timers, draw. Nothing in
//! the loop may block; an empty socket is a normal, silent outcome.
//!
//! ### Entity Interpolation
//! Remote players are drawn by linearly blending from their previous to
//! their current reported position over a fixed interpolation window,
//! hiding the gap between server ticks.
//!
//! ### Local Correction
//! The locally-controlled player keeps a persistent visual position that
//! is blended toward the latest authoritative position by a fixed
//! fraction each frame, so server corrections never cause a visible
//! snap.
//!
//! ## Module Organization
//!
//! - [`game`] — per-entity interpolation records and the snapshot
//!   application rules (first sighting, target shifting, departure)
//! - [`input`] — send-on-change / minimum-rate input transmission policy
//! - [`network`] — non-blocking TCP connection, line framing, and the
//!   symmetric artificial-latency queues
//! - [`rendering`] — macroquad drawing of coins, players, and the score
//!   overlay

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
