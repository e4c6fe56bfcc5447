//! Sum Dash - collect numbers to hit the target
//!
//! Core modules:
//! - `sim`: Deterministic game logic (puzzle generation, movement, scoring)
//! - `input`: Raw event to intent normalization
//! - `audio`: Synthesized sound effects and ambient pad
//! - `rng`: Seeded bounded-random helpers
//! - `status`: Advisory text for screen readers / status lines

pub mod audio;
pub mod input;
pub mod rng;
pub mod sim;
pub mod status;

pub use audio::{AudioSynth, SoundEffect};
pub use sim::{GameSession, Phase, TickIntent, tick};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth movement)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Logical playfield dimensions (all variants render into this space)
    pub const FIELD_WIDTH: f32 = 720.0;
    pub const FIELD_HEIGHT: f32 = 480.0;

    /// Player avatar
    pub const PLAYER_RADIUS: f32 = 18.0;
    pub const PLAYER_SPEED: f32 = 260.0;

    /// Collectible tokens
    pub const TOKEN_RADIUS: f32 = 22.0;
    /// Vertical bob amplitude for floating tokens
    pub const TOKEN_BOB_AMPLITUDE: f32 = 6.0;
    pub const TOKEN_BOB_SPEED: f32 = 2.2;

    /// Answer slots along the bottom edge
    pub const SLOT_SIZE: f32 = 44.0;

    /// Session defaults
    pub const DEFAULT_GOAL: u32 = 10;
    pub const DEFAULT_MISTAKE_LIMIT: u32 = 3;

    /// Bounded retries when rerolling a decoy that collides with the target
    pub const DECOY_RETRY_BUDGET: u32 = 50;
}

/// Clamp a point to a rectangle inset by `margin` on all sides
#[inline]
pub fn clamp_to_field(pos: Vec2, margin: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(margin, consts::FIELD_WIDTH - margin),
        pos.y.clamp(margin, consts::FIELD_HEIGHT - margin),
    )
}

/// Squared distance between two points (avoids the sqrt in hot loops)
#[inline]
pub fn dist_sq(a: Vec2, b: Vec2) -> f32 {
    (a - b).length_squared()
}
