//! Deterministic game logic
//!
//! Everything gameplay-relevant lives here. This module must be pure and
//! deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering, audio, or platform dependencies (feedback leaves through
//!   the `GameEvent` queue)

pub mod challenge;
pub mod collision;
pub mod entity;
pub mod state;
pub mod tick;

pub use challenge::{Candidate, Challenge, generate};
pub use collision::{circle_circle, circle_rect, nearest_overlap};
pub use entity::{Entity, EntityKind};
pub use state::{
    AttemptOutcome, FrameSnapshot, GameEvent, GameSession, InteractionMode, Phase, PickupRule,
    RoundState, Ruleset, WrongPolicy,
};
pub use tick::{TickIntent, tick};
