use shared::{CoinView, PlayerView, CORRECTION_RATE, INTERP_WINDOW};
use std::collections::HashMap;

/// Interpolation record for one observed player id.
///
/// Remote entities are drawn by blending from the previous to the
/// current reported position over the interpolation window. The local
/// entity instead keeps a persistent visual position that is nudged
/// toward the authoritative one every frame, so corrections never snap.
#[derive(Debug, Clone)]
pub struct EntityTracker {
    pub prev_x: f32,
    pub prev_y: f32,
    pub x: f32,
    pub y: f32,
    /// Seconds since the last snapshot that mentioned this id
    pub elapsed: f32,
    pub score: u32,
    visual: Option<(f32, f32)>,
}

impl EntityTracker {
    fn first_sighting(view: &PlayerView) -> Self {
        Self {
            prev_x: view.x,
            prev_y: view.y,
            x: view.x,
            y: view.y,
            elapsed: 0.0,
            score: view.score,
            visual: None,
        }
    }

    /// Linear interpolation between the last two reported positions.
    fn interpolated(&self) -> (f32, f32) {
        let alpha = (self.elapsed / INTERP_WINDOW).min(1.0);
        (
            self.prev_x + (self.x - self.prev_x) * alpha,
            self.prev_y + (self.y - self.prev_y) * alpha,
        )
    }

    /// Blends the persistent visual position toward the authoritative one
    /// and stores it back for the next frame.
    fn correct_toward_target(&mut self) -> (f32, f32) {
        let (mut vx, mut vy) = self.visual.unwrap_or((self.x, self.y));
        vx += (self.x - vx) * CORRECTION_RATE;
        vy += (self.y - vy) * CORRECTION_RATE;
        self.visual = Some((vx, vy));
        (vx, vy)
    }
}

/// Client-side view of the world, fed by server snapshots.
///
/// Never authoritative: it only turns the discrete snapshot stream into
/// continuous positions for rendering.
pub struct ClientGameState {
    pub local_id: Option<u32>,
    pub coins: Vec<CoinView>,
    entities: HashMap<u32, EntityTracker>,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            local_id: None,
            coins: Vec::new(),
            entities: HashMap::new(),
        }
    }

    pub fn set_local_id(&mut self, id: u32) {
        self.local_id = Some(id);
    }

    /// Applies one `state` snapshot.
    ///
    /// Unseen ids start with prev == current so there is no visible
    /// motion on first sight; known ids shift current to prev, take the
    /// new target and reset their clock. Ids missing from the snapshot
    /// are dropped — the player left.
    pub fn apply_snapshot(&mut self, players: Vec<PlayerView>, coins: Vec<CoinView>) {
        self.coins = coins;

        for view in &players {
            match self.entities.get_mut(&view.id) {
                Some(entity) => {
                    entity.prev_x = entity.x;
                    entity.prev_y = entity.y;
                    entity.x = view.x;
                    entity.y = view.y;
                    entity.elapsed = 0.0;
                    entity.score = view.score;
                }
                None => {
                    self.entities
                        .insert(view.id, EntityTracker::first_sighting(view));
                }
            }
        }

        self.entities
            .retain(|id, _| players.iter().any(|view| view.id == *id));
    }

    /// Advances every tracker's clock by one frame.
    pub fn advance(&mut self, dt: f32) {
        for entity in self.entities.values_mut() {
            entity.elapsed += dt;
        }
    }

    /// Position to draw an entity at this frame.
    ///
    /// Mutable because sampling the local entity advances its blended
    /// visual position.
    pub fn render_position(&mut self, id: u32) -> Option<(f32, f32)> {
        let local = self.local_id == Some(id);
        let entity = self.entities.get_mut(&id)?;
        Some(if local {
            entity.correct_toward_target()
        } else {
            entity.interpolated()
        })
    }

    pub fn score_of(&self, id: u32) -> Option<u32> {
        self.entities.get(&id).map(|entity| entity.score)
    }

    /// Tracked player ids in ascending order, for a stable draw order.
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_tracking(&self, id: u32) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}
