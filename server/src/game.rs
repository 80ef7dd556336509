use crate::registry::{Player, PlayerHandle};
use log::debug;
use rand::Rng;
use shared::{
    CoinView, Message, PlayerView, COIN_MARGIN, COIN_RADIUS, COIN_SPAWN_INTERVAL, MAP_HEIGHT,
    MAP_WIDTH, MAX_COINS, PLAYER_RADIUS, PLAYER_SPEED,
};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Coin {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// Server-owned world state outside the registry: the live coin set.
#[derive(Debug)]
pub struct World {
    pub coins: Vec<Coin>,
    pub next_coin_id: u32,
    pub last_spawn: Instant,
}

impl World {
    pub fn new() -> Self {
        Self {
            coins: Vec::new(),
            next_coin_id: 1,
            last_spawn: Instant::now(),
        }
    }

    /// Spawns one coin if below capacity and the spawn interval elapsed.
    ///
    /// A full coin set is not an error; the spawn is simply skipped this
    /// tick.
    pub fn maybe_spawn_coin(&mut self, now: Instant) {
        if self.coins.len() >= MAX_COINS {
            return;
        }
        if now.duration_since(self.last_spawn) < COIN_SPAWN_INTERVAL {
            return;
        }

        let mut rng = rand::thread_rng();
        let coin = Coin {
            id: self.next_coin_id,
            x: rng.gen_range(COIN_MARGIN..=MAP_WIDTH - COIN_MARGIN),
            y: rng.gen_range(COIN_MARGIN..=MAP_HEIGHT - COIN_MARGIN),
        };
        self.next_coin_id += 1;

        debug!("Spawned coin {} at ({:.0}, {:.0})", coin.id, coin.x, coin.y);
        self.coins.push(coin);
        self.last_spawn = now;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Integrates one player's movement for a tick and clamps to the map.
///
/// Displacement magnitude is `PLAYER_SPEED * dt` regardless of how many
/// flags are held; zero input leaves the position untouched.
pub fn integrate(player: &mut Player, dt: f32) {
    let (dx, dy) = player.input.direction();
    player.x += dx * PLAYER_SPEED * dt;
    player.y += dy * PLAYER_SPEED * dt;

    player.x = player.x.clamp(PLAYER_RADIUS, MAP_WIDTH - PLAYER_RADIUS);
    player.y = player.y.clamp(PLAYER_RADIUS, MAP_HEIGHT - PLAYER_RADIUS);
}

/// Resolves coin pickups against a tick's player snapshot.
///
/// Players are tested in snapshot order (ascending player id), so the
/// lowest id in range collects a contested coin and later players leave
/// empty-handed that tick. A single player in range of several coins
/// collects all of them. Collected coins are removed only after the full
/// sweep.
pub fn collect_coins(players: &mut [PlayerHandle], coins: &mut Vec<Coin>) {
    let mut collected: Vec<u32> = Vec::new();

    for coin in coins.iter() {
        for handle in players.iter_mut() {
            let player = &mut handle.player;
            let dx = player.x - coin.x;
            let dy = player.y - coin.y;
            let distance = (dx * dx + dy * dy).sqrt();

            if distance < PLAYER_RADIUS + COIN_RADIUS {
                player.score += 1;
                debug!("Player {} collected coin {}", player.id, coin.id);
                collected.push(coin.id);
                break; // coin already collected
            }
        }
    }

    if !collected.is_empty() {
        coins.retain(|coin| !collected.contains(&coin.id));
    }
}

/// Builds the broadcast snapshot for the current tick.
pub fn state_message(players: &[PlayerHandle], coins: &[Coin]) -> Message {
    Message::State {
        players: players
            .iter()
            .map(|handle| PlayerView {
                id: handle.player.id,
                x: handle.player.x,
                y: handle.player.y,
                score: handle.player.score,
            })
            .collect(),
        coins: coins
            .iter()
            .map(|coin| CoinView {
                id: coin.id,
                x: coin.x,
                y: coin.y,
            })
            .collect(),
    }
}
