//! Entities: the player avatar, floating number tokens, and answer slots
//!
//! Entities are plain data. Token layout happens once per challenge; motion
//! is a gentle bob around each token's home position so the scene never sits
//! perfectly still.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::rng::GameRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// The singular player-controlled avatar
    Player,
    /// A pickable number token; `index` keys into `Challenge.candidates`
    Collectible { index: usize },
    /// An answer slot along the bottom edge; `index` keys into `RoundState.slots`
    Slot { index: usize },
}

/// A game entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Displayed number (0 for the player and empty slots)
    pub value: u32,
    /// Rest position the bob oscillates around
    pub home: Vec2,
    /// Per-entity phase so tokens desynchronize
    pub bob_phase: f32,
    /// Picked up and waiting in a slot (restored on a wrong accumulate attempt)
    pub consumed: bool,
}

impl Entity {
    pub fn player(id: u32) -> Self {
        let spawn = Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT - 80.0);
        Self {
            id,
            kind: EntityKind::Player,
            pos: spawn,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            value: 0,
            home: spawn,
            bob_phase: 0.0,
            consumed: false,
        }
    }

    pub fn collectible(id: u32, index: usize, value: u32, home: Vec2, bob_phase: f32) -> Self {
        Self {
            id,
            kind: EntityKind::Collectible { index },
            pos: home,
            vel: Vec2::ZERO,
            radius: TOKEN_RADIUS,
            value,
            home,
            bob_phase,
            consumed: false,
        }
    }

    pub fn slot(id: u32, index: usize, home: Vec2) -> Self {
        Self {
            id,
            kind: EntityKind::Slot { index },
            pos: home,
            vel: Vec2::ZERO,
            radius: SLOT_SIZE / 2.0,
            value: 0,
            home,
            bob_phase: 0.0,
            consumed: false,
        }
    }

    pub fn is_collectible(&self) -> bool {
        matches!(self.kind, EntityKind::Collectible { .. })
    }

    /// Advance the idle bob animation
    pub fn update_bob(&mut self, time_secs: f32) {
        if self.is_collectible() && !self.consumed {
            let wobble = (time_secs * TOKEN_BOB_SPEED + self.bob_phase).sin();
            self.pos.y = self.home.y + wobble * TOKEN_BOB_AMPLITUDE;
        }
    }
}

/// Home positions for `count` tokens: jittered rows across the upper field
pub fn layout_collectibles(count: usize, rng: &mut GameRng) -> Vec<Vec2> {
    const PER_ROW: usize = 5;
    const ROW_YS: [f32; 3] = [110.0, 195.0, 280.0];

    let mut homes = Vec::with_capacity(count);
    for i in 0..count {
        let row = (i / PER_ROW).min(ROW_YS.len() - 1);
        let col = i % PER_ROW;
        let in_row = (count - row * PER_ROW).min(PER_ROW);
        let spacing = FIELD_WIDTH / (in_row as f32 + 1.0);
        let jitter_x = rng.float_in(-14.0, 14.0);
        let jitter_y = rng.float_in(-10.0, 10.0);
        homes.push(Vec2::new(
            spacing * (col as f32 + 1.0) + jitter_x,
            ROW_YS[row] + jitter_y,
        ));
    }
    homes
}

/// Home positions for `count` answer slots, centered along the bottom
pub fn layout_slots(count: usize) -> Vec<Vec2> {
    let gap = SLOT_SIZE + 16.0;
    let total = gap * count as f32 - 16.0;
    let left = (FIELD_WIDTH - total) / 2.0 + SLOT_SIZE / 2.0;
    (0..count)
        .map(|i| Vec2::new(left + gap * i as f32, FIELD_HEIGHT - 36.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fits_playfield() {
        let mut rng = GameRng::from_seed(3);
        for count in 1..=12 {
            for home in layout_collectibles(count, &mut rng) {
                assert!(home.x > 0.0 && home.x < FIELD_WIDTH);
                assert!(home.y > 0.0 && home.y < FIELD_HEIGHT / 2.0 + 60.0);
            }
        }
        for count in 1..=4 {
            for home in layout_slots(count) {
                assert!(home.x > 0.0 && home.x < FIELD_WIDTH);
            }
        }
    }

    #[test]
    fn test_bob_stays_near_home() {
        let mut token = Entity::collectible(1, 0, 5, Vec2::new(100.0, 200.0), 0.7);
        for step in 0..240 {
            token.update_bob(step as f32 / 60.0);
            assert!((token.pos.y - token.home.y).abs() <= TOKEN_BOB_AMPLITUDE + 0.001);
            assert_eq!(token.pos.x, token.home.x);
        }
    }

    #[test]
    fn test_consumed_token_does_not_bob() {
        let mut token = Entity::collectible(1, 0, 5, Vec2::new(100.0, 200.0), 0.0);
        token.consumed = true;
        token.update_bob(1.3);
        assert_eq!(token.pos, token.home);
    }
}
