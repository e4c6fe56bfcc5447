//! Fixed timestep update loop
//!
//! One tick runs the phases in a fixed order: input, motion, interaction
//! resolution, state-machine transition, event emission. Nothing here blocks
//! and nothing here touches the platform.

use glam::Vec2;

use super::collision::nearest_overlap;
use super::state::{
    AttemptOutcome, GameEvent, GameSession, InteractionMode, Phase, PickupRule, WrongPolicy,
};
use crate::consts::*;
use crate::clamp_to_field;

/// Ticks before touch pickups re-arm after a wrong attempt
const PICKUP_COOLDOWN_TICKS: u32 = 30;

/// Normalized input intents for a single tick (deterministic)
///
/// The host maps raw keyboard/pointer/touch events into this; the sim never
/// sees device events. One-shot fields are cleared by the host once consumed.
#[derive(Debug, Clone, Default)]
pub struct TickIntent {
    /// Movement direction (zero when idle; normalized before use)
    pub move_dir: Vec2,
    /// Select a candidate by index (digit keys / tap)
    pub select: Option<usize>,
    /// Confirm: leave the intro, or pick the selected token
    pub confirm: bool,
    /// Restart the session (valid from any phase)
    pub restart: bool,
    /// Mute/unmute; consumed by the host, ignored by the sim
    pub toggle_audio: bool,
    /// Round id the select/confirm was issued against. Intents that resolve
    /// after the round they targeted has been superseded are discarded.
    pub round: u64,
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut GameSession, intent: &TickIntent, dt: f32) {
    // Restart is honored from every phase, terminal ones included
    if intent.restart {
        let seed = session.seed ^ session.time_ticks.rotate_left(17) ^ 0x9e37_79b9;
        session.restart(seed);
        return;
    }

    match session.phase {
        Phase::Intro => {
            // Keep the scene breathing behind the title
            session.time_ticks += 1;
            let time_secs = session.time_ticks as f32 * SIM_DT;
            for e in &mut session.entities {
                e.update_bob(time_secs);
            }
            if intent.confirm {
                session.start_playing();
            }
            return;
        }
        Phase::Won | Phase::Lost => return,
        Phase::Playing => {}
    }

    session.time_ticks += 1;
    if session.pickup_cooldown > 0 {
        session.pickup_cooldown -= 1;
    }

    // 1. Input: velocity from intent, integrate, clamp to the playfield
    session.player.vel = intent.move_dir.normalize_or_zero() * PLAYER_SPEED;
    let next = session.player.pos + session.player.vel * dt;
    session.player.pos = clamp_to_field(next, PLAYER_RADIUS);

    // 2. Token motion
    let time_secs = session.time_ticks as f32 * SIM_DT;
    for e in &mut session.entities {
        e.update_bob(time_secs);
    }

    // 3. Selection (stale-round selections are silently dropped)
    if let Some(index) = intent.select {
        let valid = intent.round == session.round_id
            && session
                .entities
                .iter()
                .any(|e| e.kind == super::entity::EntityKind::Collectible { index } && !e.consumed);
        if valid {
            session.round.selected_index = Some(index);
        }
    }

    // 4. Interaction resolution: at most one pick per tick, nearest wins
    let picked = match session.rules.pickup {
        PickupRule::AutoTouch => {
            if session.pickup_cooldown > 0 {
                None
            } else {
                nearest_overlap(
                    session.player.pos,
                    session.player.radius,
                    session
                        .entities
                        .iter()
                        .enumerate()
                        .filter(|(_, e)| e.is_collectible() && !e.consumed)
                        .map(|(i, e)| (i, e.pos, e.radius)),
                )
            }
        }
        PickupRule::Confirm => {
            if intent.confirm && intent.round == session.round_id {
                session.round.selected_index.and_then(|index| {
                    session.entities.iter().position(|e| {
                        e.kind == super::entity::EntityKind::Collectible { index } && !e.consumed
                    })
                })
            } else {
                None
            }
        }
    };

    if let Some(entity_index) = picked {
        resolve_pick(session, entity_index);
    }
}

/// Handle one picked token: place or judge it, transition, emit events
fn resolve_pick(session: &mut GameSession, entity_index: usize) {
    let (pos, value) = {
        let token = &session.entities[entity_index];
        (token.pos, token.value)
    };
    session.round.selected_index = None;
    session.events.push(GameEvent::Picked { pos });

    match session.rules.mode {
        InteractionMode::SinglePick => match session.resolve_attempt(value) {
            Some(AttemptOutcome::Correct) => {
                session.events.push(GameEvent::Correct { pos });
                if session.phase == Phase::Playing {
                    session.advance_challenge(true);
                }
            }
            Some(AttemptOutcome::Wrong) => {
                session.events.push(GameEvent::Wrong { pos });
                if session.phase == Phase::Playing {
                    match session.rules.wrong_pick {
                        // The untouched puzzle stays; move the token so the
                        // overlap does not re-trigger next tick
                        WrongPolicy::KeepChallenge => session.relocate_token(entity_index),
                        WrongPolicy::Regenerate => session.advance_challenge(false),
                    }
                    session.pickup_cooldown = PICKUP_COOLDOWN_TICKS;
                }
            }
            None => {}
        },
        InteractionMode::Accumulate => {
            let Some(slot) = session.round.first_empty() else {
                return;
            };
            session.entities[entity_index].consumed = true;
            session.round.slots[slot] = Some(value);

            let sum = session.round.filled_sum();
            if sum == session.challenge.target {
                if session.resolve_attempt(sum) == Some(AttemptOutcome::Correct) {
                    session.events.push(GameEvent::Correct { pos });
                    if session.phase == Phase::Playing {
                        session.advance_challenge(true);
                    }
                }
            } else if sum > session.challenge.target || session.round.is_full() {
                // Busted (or out of slots short of the target): a wrong
                // attempt, and the placed values go back to the pool
                if session.resolve_attempt(sum) == Some(AttemptOutcome::Wrong) {
                    session.events.push(GameEvent::Wrong { pos });
                    if session.phase == Phase::Playing {
                        session.return_tokens_to_pool();
                        if session.rules.wrong_pick == WrongPolicy::Regenerate {
                            session.advance_challenge(false);
                        }
                        session.pickup_cooldown = PICKUP_COOLDOWN_TICKS;
                    }
                }
            }
            // Below target with slots to spare: keep accumulating
        }
    }
}
