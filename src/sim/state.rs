//! Session state and the game state machine
//!
//! Everything one play session owns lives in `GameSession`. The phase is only
//! ever changed by `resolve_attempt` and `restart`, and all state is confined
//! to whichever host loop owns the session; nothing here is global.

use glam::Vec2;
use serde::Serialize;

use super::challenge::{self, Challenge};
use super::entity::{self, Entity};
use crate::consts::*;
use crate::rng::GameRng;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Title screen, waiting for the first confirm
    Intro,
    /// Active play
    Playing,
    /// Goal reached; exits only via restart
    Won,
    /// Mistake limit reached; exits only via restart
    Lost,
}

/// How picks are judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InteractionMode {
    /// One token per challenge; its value must equal the target
    SinglePick,
    /// Fill slots until the running sum matches (or busts) the target
    Accumulate,
}

/// How a pick is triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PickupRule {
    /// Walking into a token picks it up
    AutoTouch,
    /// A token must be selected, then confirmed
    Confirm,
}

/// What happens to the challenge after a wrong attempt
///
/// Source variants disagree here, so it is a policy flag rather than a fixed
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WrongPolicy {
    /// Keep the same puzzle and let the player retry
    KeepChallenge,
    /// Throw the puzzle away and generate a fresh one at the same level
    Regenerate,
}

/// Per-variant rules consumed by the update loop
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Ruleset {
    pub mode: InteractionMode,
    pub pickup: PickupRule,
    pub wrong_pick: WrongPolicy,
    /// Correct answers needed to win
    pub goal: u32,
    /// Wrong answers that end the session
    pub mistake_limit: u32,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            mode: InteractionMode::Accumulate,
            pickup: PickupRule::AutoTouch,
            wrong_pick: WrongPolicy::KeepChallenge,
            goal: DEFAULT_GOAL,
            mistake_limit: DEFAULT_MISTAKE_LIMIT,
        }
    }
}

/// Running score and the current slot row
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoundState {
    pub correct_count: u32,
    pub wrong_count: u32,
    /// Token highlighted for the Confirm pickup rule
    pub selected_index: Option<usize>,
    pub slots: Vec<Option<u32>>,
}

impl RoundState {
    /// Sum of the filled slots (the displayed running total)
    pub fn filled_sum(&self) -> u32 {
        self.slots.iter().flatten().sum()
    }

    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_none())
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    pub fn clear_slots(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

/// Outcome of one resolved attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Correct,
    Wrong,
}

/// Notifications for the host: audio feedback and decorative effects
/// subscribe to these; the core never calls back into them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GameEvent {
    /// A token was picked up
    Picked { pos: Vec2 },
    /// An attempt matched the target
    Correct { pos: Vec2 },
    /// An attempt missed the target
    Wrong { pos: Vec2 },
    /// A fresh puzzle was laid out
    ChallengeSpawned { level: u32, target: u32 },
    /// The session reached a terminal phase
    SessionEnded { won: bool },
}

/// Complete state of one play session
#[derive(Debug, Clone)]
pub struct GameSession {
    pub seed: u64,
    pub rules: Ruleset,
    pub phase: Phase,
    pub level: u32,
    pub round: RoundState,
    /// Bumped on every challenge spawn and restart; interactions and audio
    /// feedback issued against an older id are discarded
    pub round_id: u64,
    pub challenge: Challenge,
    pub player: Entity,
    /// Collectibles and slots for the current challenge
    pub entities: Vec<Entity>,
    pub time_ticks: u64,
    /// Ticks until touch pickups re-arm (prevents instant re-picks after a
    /// wrong attempt returns tokens to the pool)
    pub pickup_cooldown: u32,
    /// Queued notifications, drained once per frame by the host
    pub events: Vec<GameEvent>,
    rng: GameRng,
    next_id: u32,
}

impl GameSession {
    pub fn new(seed: u64, rules: Ruleset) -> Self {
        let mut rng = GameRng::from_seed(seed);
        let challenge = challenge::generate(1, rules.mode, &mut rng);
        let mut session = Self {
            seed,
            rules,
            phase: Phase::Intro,
            level: 1,
            round: RoundState::default(),
            round_id: 0,
            challenge,
            player: Entity::player(0),
            entities: Vec::new(),
            time_ticks: 0,
            pickup_cooldown: 0,
            events: Vec::new(),
            rng,
            next_id: 1,
        };
        session.spawn_current_challenge();
        session
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Lay out entities for `self.challenge` and reset the slot row
    fn spawn_current_challenge(&mut self) {
        self.round_id += 1;
        self.round.selected_index = None;
        self.round.slots = vec![None; self.challenge.slot_count];

        self.entities.clear();
        let homes = entity::layout_collectibles(self.challenge.candidates.len(), &mut self.rng);
        for (index, home) in homes.into_iter().enumerate() {
            let id = self.next_entity_id();
            let value = self.challenge.candidates[index].value;
            let phase = self.rng.float_in(0.0, std::f32::consts::TAU);
            self.entities
                .push(Entity::collectible(id, index, value, home, phase));
        }
        for (index, home) in entity::layout_slots(self.challenge.slot_count)
            .into_iter()
            .enumerate()
        {
            let id = self.next_entity_id();
            self.entities.push(Entity::slot(id, index, home));
        }

        self.events.push(GameEvent::ChallengeSpawned {
            level: self.level,
            target: self.challenge.target,
        });
    }

    /// Generate and lay out the next puzzle (same or advanced level)
    pub fn advance_challenge(&mut self, next_level: bool) {
        if next_level {
            self.level += 1;
        }
        self.challenge = challenge::generate(self.level, self.rules.mode, &mut self.rng);
        self.spawn_current_challenge();
    }

    /// Judge one attempt against the current target
    ///
    /// The only place (besides restart and the Intro confirm) that the phase
    /// changes. Returns `None` outside of Playing so attempts that land after
    /// a terminal transition cannot touch the score.
    pub fn resolve_attempt(&mut self, sum: u32) -> Option<AttemptOutcome> {
        if self.phase != Phase::Playing {
            return None;
        }
        if self.challenge.is_solved_by(sum) {
            self.round.correct_count += 1;
            if self.round.correct_count >= self.rules.goal {
                self.phase = Phase::Won;
                self.events.push(GameEvent::SessionEnded { won: true });
            }
            Some(AttemptOutcome::Correct)
        } else {
            self.round.wrong_count += 1;
            if self.round.wrong_count >= self.rules.mistake_limit {
                self.phase = Phase::Lost;
                self.events.push(GameEvent::SessionEnded { won: false });
            }
            Some(AttemptOutcome::Wrong)
        }
    }

    /// Leave the title screen
    pub fn start_playing(&mut self) {
        if self.phase == Phase::Intro {
            self.phase = Phase::Playing;
        }
    }

    /// Reinitialize for a fresh session, valid from any phase
    ///
    /// The round id keeps increasing across restarts so feedback scheduled
    /// against the old session can never apply to the new one.
    pub fn restart(&mut self, seed: u64) {
        let round_id = self.round_id;
        let rules = self.rules;
        *self = GameSession::new(seed, rules);
        self.round_id += round_id;
        self.phase = Phase::Playing;
    }

    /// Move a token to a fresh home in the upper field (wrong single-pick,
    /// keep-challenge variants)
    pub fn relocate_token(&mut self, entity_index: usize) {
        let home = Vec2::new(
            self.rng.float_in(60.0, FIELD_WIDTH - 60.0),
            self.rng.float_in(90.0, FIELD_HEIGHT / 2.0),
        );
        if let Some(token) = self.entities.get_mut(entity_index) {
            token.home = home;
            token.pos = home;
        }
    }

    /// Return every consumed token to the pool and empty the slot row
    pub fn return_tokens_to_pool(&mut self) {
        self.round.clear_slots();
        for token in self.entities.iter_mut().filter(|e| e.is_collectible()) {
            token.consumed = false;
        }
    }

    /// Read-only per-frame view for the render pipeline
    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            phase: self.phase,
            level: self.level,
            round: &self.round,
            challenge: &self.challenge,
            player: &self.player,
            entities: &self.entities,
        }
    }
}

/// What an external renderer gets to see each frame
#[derive(Debug, Serialize)]
pub struct FrameSnapshot<'a> {
    pub phase: Phase,
    pub level: u32,
    pub round: &'a RoundState,
    pub challenge: &'a Challenge,
    pub player: &'a Entity,
    pub entities: &'a [Entity],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        GameSession::new(77, Ruleset::default())
    }

    #[test]
    fn test_new_session_shape() {
        let s = session();
        assert_eq!(s.phase, Phase::Intro);
        assert_eq!(s.level, 1);
        assert_eq!(s.round.correct_count, 0);
        assert_eq!(s.round.wrong_count, 0);
        assert_eq!(s.round.slots.len(), s.challenge.slot_count);
        let tokens = s.entities.iter().filter(|e| e.is_collectible()).count();
        assert_eq!(tokens, s.challenge.candidates.len());
    }

    #[test]
    fn test_correct_attempt_increments_score() {
        let mut s = session();
        s.start_playing();
        let target = s.challenge.target;
        assert_eq!(s.resolve_attempt(target), Some(AttemptOutcome::Correct));
        assert_eq!(s.round.correct_count, 1);
        assert_eq!(s.phase, Phase::Playing);
    }

    #[test]
    fn test_terminal_reachability_won() {
        let mut s = session();
        s.start_playing();
        for i in 1..=s.rules.goal {
            let target = s.challenge.target;
            s.resolve_attempt(target);
            if i < s.rules.goal {
                assert_eq!(s.phase, Phase::Playing);
                s.advance_challenge(true);
            }
        }
        assert_eq!(s.phase, Phase::Won);
        assert!(s.events.contains(&GameEvent::SessionEnded { won: true }));
    }

    #[test]
    fn test_terminal_reachability_lost() {
        let mut s = session();
        s.start_playing();
        for i in 1..=s.rules.mistake_limit {
            let miss = s.challenge.target + 1;
            s.resolve_attempt(miss);
            assert_eq!(s.phase == Phase::Lost, i == s.rules.mistake_limit);
        }
        // A further attempt after Lost must not move the score
        let wrong_before = s.round.wrong_count;
        assert_eq!(s.resolve_attempt(0), None);
        assert_eq!(s.round.wrong_count, wrong_before);
    }

    #[test]
    fn test_restart_is_idempotent_from_any_phase() {
        for setup in [Phase::Intro, Phase::Playing, Phase::Won, Phase::Lost] {
            let mut s = session();
            s.phase = setup;
            s.round.correct_count = 5;
            s.round.wrong_count = 2;
            let old_round_id = s.round_id;
            s.restart(123);
            assert_eq!(s.phase, Phase::Playing);
            assert_eq!(s.round.correct_count, 0);
            assert_eq!(s.round.wrong_count, 0);
            assert_eq!(s.level, 1);
            assert!(s.round_id > old_round_id, "round id must stay monotonic");
            assert_eq!(
                s.challenge.solution_values().iter().sum::<u32>(),
                s.challenge.target
            );
        }
    }

    #[test]
    fn test_return_tokens_restores_pool() {
        let mut s = session();
        s.start_playing();
        if let Some(token) = s.entities.iter_mut().find(|e| e.is_collectible()) {
            token.consumed = true;
        }
        s.round.slots[0] = Some(4);
        s.return_tokens_to_pool();
        assert!(s.entities.iter().all(|e| !e.consumed));
        assert!(s.round.slots.iter().all(|slot| slot.is_none()));
    }
}
