//! Advisory status strings for an external announcer
//!
//! Plain text only; never required for correctness. A screen-reader bridge or
//! status line subscribes to these alongside the HUD.

use crate::sim::{GameEvent, GameSession, Phase};

/// One-line description of the current session state
pub fn session_line(session: &GameSession) -> String {
    match session.phase {
        Phase::Intro => "Press Enter to start.".to_string(),
        Phase::Playing => format!(
            "Level {}. Target {}.",
            session.level, session.challenge.target
        ),
        Phase::Won => format!(
            "You won! Score {}/{}. Press R to play again.",
            session.round.correct_count, session.rules.goal
        ),
        Phase::Lost => format!(
            "Game over after {} mistakes. Press R to try again.",
            session.round.wrong_count
        ),
    }
}

/// Announcement for a drained game event, if the event warrants one
pub fn event_line(session: &GameSession, event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::ChallengeSpawned { level, target } => {
            Some(format!("Level {level}. Target {target}."))
        }
        GameEvent::Correct { .. } => Some(format!(
            "Correct! Score {}/{}.",
            session.round.correct_count, session.rules.goal
        )),
        GameEvent::Wrong { .. } => Some(format!(
            "Not quite. {} of {} mistakes.",
            session.round.wrong_count, session.rules.mistake_limit
        )),
        GameEvent::SessionEnded { won } => Some(if *won {
            "You won!".to_string()
        } else {
            "Game over.".to_string()
        }),
        GameEvent::Picked { .. } => None,
    }
}

/// Shown once when the audio graph could not be brought up
pub fn audio_unavailable_line() -> &'static str {
    "Audio unavailable"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Ruleset;

    #[test]
    fn test_session_line_mentions_level_and_target() {
        let mut s = GameSession::new(3, Ruleset::default());
        s.start_playing();
        let line = session_line(&s);
        assert!(line.contains("Level 1"));
        assert!(line.contains(&format!("Target {}", s.challenge.target)));
    }

    #[test]
    fn test_event_lines() {
        let mut s = GameSession::new(3, Ruleset::default());
        s.start_playing();
        let target = s.challenge.target;
        s.resolve_attempt(target);

        let line = event_line(
            &s,
            &GameEvent::Correct {
                pos: glam::Vec2::ZERO,
            },
        )
        .expect("correct event announces");
        assert!(line.contains("Score 1/10"));

        assert!(event_line(&s, &GameEvent::Picked { pos: glam::Vec2::ZERO }).is_none());
    }
}
