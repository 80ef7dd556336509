use crate::game::ClientGameState;
use macroquad::prelude::*;
use shared::COIN_RADIUS;

const PLAYER_DRAW_SIZE: f32 = 30.0;

const BACKGROUND: Color = Color::new(0.12, 0.12, 0.12, 1.0);
const COIN_GOLD: Color = Color::new(1.0, 0.84, 0.0, 1.0);
const LOCAL_GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
const REMOTE_BLUE: Color = Color::new(0.0, 0.5, 1.0, 1.0);

/// Draws the interpolated world state each frame.
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Renderer
    }

    pub fn render(&self, state: &mut ClientGameState) {
        clear_background(BACKGROUND);

        for coin in &state.coins {
            draw_circle(coin.x, coin.y, COIN_RADIUS, COIN_GOLD);
        }

        let mut my_score = 0;
        for id in state.ids() {
            let is_local = state.local_id == Some(id);
            if is_local {
                my_score = state.score_of(id).unwrap_or(0);
            }

            if let Some((x, y)) = state.render_position(id) {
                let color = if is_local { LOCAL_GREEN } else { REMOTE_BLUE };
                draw_rectangle(
                    x - PLAYER_DRAW_SIZE / 2.0,
                    y - PLAYER_DRAW_SIZE / 2.0,
                    PLAYER_DRAW_SIZE,
                    PLAYER_DRAW_SIZE,
                    color,
                );
            }
        }

        let label = match state.local_id {
            Some(id) => format!("Your ID: {}  Score: {}", id, my_score),
            None => "Connecting...".to_string(),
        };
        draw_text(&label, 10.0, 24.0, 24.0, WHITE);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
