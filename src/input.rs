//! Raw event to intent normalization
//!
//! The host feeds raw key names and pointer/touch coordinates in; the sim
//! only ever sees a `TickIntent`. Keyboard: arrows/WASD move, 1-4 select,
//! Enter/Space confirm, M mutes, R restarts. Pointer/touch: drag to move,
//! tap near a token to select it.

use glam::Vec2;

use crate::consts::TOKEN_RADIUS;
use crate::sim::TickIntent;

/// Pointer drags shorter than this are ignored (finger jitter)
const DRAG_DEADZONE: f32 = 8.0;
/// A tap selects the nearest token within this distance
const TAP_REACH: f32 = TOKEN_RADIUS * 1.6;

/// Tracks held movement keys and accumulates one-shot intents between ticks
#[derive(Debug, Clone, Default)]
pub struct InputController {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    intent: TickIntent,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key-down event. `round` stamps selection intents so they can
    /// be discarded if the round changes before they resolve.
    pub fn key_down(&mut self, key: &str, round: u64) {
        match key {
            "ArrowUp" | "w" | "W" => self.up = true,
            "ArrowDown" | "s" | "S" => self.down = true,
            "ArrowLeft" | "a" | "A" => self.left = true,
            "ArrowRight" | "d" | "D" => self.right = true,
            "1" | "2" | "3" | "4" => {
                // Safe: single ASCII digit
                let n = key.parse::<usize>().unwrap_or(1);
                self.intent.select = Some(n - 1);
                self.intent.round = round;
            }
            " " | "Enter" => {
                self.intent.confirm = true;
                self.intent.round = round;
            }
            "m" | "M" => self.intent.toggle_audio = true,
            "r" | "R" => self.intent.restart = true,
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: &str) {
        match key {
            "ArrowUp" | "w" | "W" => self.up = false,
            "ArrowDown" | "s" | "S" => self.down = false,
            "ArrowLeft" | "a" | "A" => self.left = false,
            "ArrowRight" | "d" | "D" => self.right = false,
            _ => {}
        }
    }

    /// Pointer/touch drag: steer toward the pointer unless it is basically
    /// on top of the player already
    pub fn pointer_drag(&mut self, player_pos: Vec2, pointer: Vec2) {
        let delta = pointer - player_pos;
        self.intent.move_dir = if delta.length() < DRAG_DEADZONE {
            Vec2::ZERO
        } else {
            delta
        };
    }

    pub fn pointer_release(&mut self) {
        self.intent.move_dir = Vec2::ZERO;
    }

    /// Tap/click: select the nearest token within reach, confirm otherwise
    pub fn pointer_tap(&mut self, tap: Vec2, tokens: &[(usize, Vec2)], round: u64) {
        let nearest = tokens
            .iter()
            .map(|(index, pos)| (*index, tap.distance(*pos)))
            .filter(|(_, d)| *d <= TAP_REACH)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        match nearest {
            Some((index, _)) => self.intent.select = Some(index),
            None => self.intent.confirm = true,
        }
        self.intent.round = round;
    }

    /// Current intent for the next tick; key-held movement is folded in here
    pub fn intent(&self) -> TickIntent {
        let mut intent = self.intent.clone();
        let keyboard = Vec2::new(
            (self.right as i32 - self.left as i32) as f32,
            (self.down as i32 - self.up as i32) as f32,
        );
        if keyboard != Vec2::ZERO {
            intent.move_dir = keyboard;
        }
        intent
    }

    /// Clear one-shot intents once a tick has consumed them
    pub fn clear_one_shots(&mut self) {
        self.intent.select = None;
        self.intent.confirm = false;
        self.intent.restart = false;
        self.intent.toggle_audio = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wasd_and_arrows_map_to_directions() {
        let mut input = InputController::new();
        input.key_down("w", 1);
        input.key_down("ArrowRight", 1);
        let dir = input.intent().move_dir;
        assert!(dir.x > 0.0 && dir.y < 0.0);

        input.key_up("w");
        input.key_up("ArrowRight");
        assert_eq!(input.intent().move_dir, Vec2::ZERO);
    }

    #[test]
    fn test_digit_selects_and_stamps_round() {
        let mut input = InputController::new();
        input.key_down("3", 42);
        let intent = input.intent();
        assert_eq!(intent.select, Some(2));
        assert_eq!(intent.round, 42);
    }

    #[test]
    fn test_one_shots_clear_but_held_keys_persist() {
        let mut input = InputController::new();
        input.key_down("a", 0);
        input.key_down("Enter", 0);
        input.key_down("m", 0);
        assert!(input.intent().confirm);
        assert!(input.intent().toggle_audio);

        input.clear_one_shots();
        let intent = input.intent();
        assert!(!intent.confirm);
        assert!(!intent.toggle_audio);
        assert!(intent.move_dir.x < 0.0, "held key still applies");
    }

    #[test]
    fn test_tap_selects_nearest_token_in_reach() {
        let mut input = InputController::new();
        let tokens = vec![
            (0, Vec2::new(100.0, 100.0)),
            (1, Vec2::new(120.0, 100.0)),
            (2, Vec2::new(600.0, 400.0)),
        ];
        input.pointer_tap(Vec2::new(118.0, 102.0), &tokens, 7);
        let intent = input.intent();
        assert_eq!(intent.select, Some(1));
        assert_eq!(intent.round, 7);
    }

    #[test]
    fn test_tap_far_from_tokens_confirms() {
        let mut input = InputController::new();
        let tokens = vec![(0, Vec2::new(100.0, 100.0))];
        input.pointer_tap(Vec2::new(400.0, 300.0), &tokens, 1);
        assert!(input.intent().confirm);
        assert_eq!(input.intent().select, None);
    }

    #[test]
    fn test_drag_deadzone() {
        let mut input = InputController::new();
        let player = Vec2::new(200.0, 200.0);
        input.pointer_drag(player, Vec2::new(203.0, 201.0));
        assert_eq!(input.intent().move_dir, Vec2::ZERO);

        input.pointer_drag(player, Vec2::new(300.0, 200.0));
        assert!(input.intent().move_dir.x > 0.0);

        input.pointer_release();
        assert_eq!(input.intent().move_dir, Vec2::ZERO);
    }
}
