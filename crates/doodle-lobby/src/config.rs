//! Lobby configuration and round state machine.

use std::time::Duration;

use doodle_timer::TimerConfig;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every lobby in a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Length of a round in ticks. Default: 120.
    pub round_secs: u32,

    /// Time between timer ticks. Default: one second.
    pub tick_period: Duration,

    /// Pause between a correct guess and the next round. Default: 7 seconds.
    pub winner_delay: Duration,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            round_secs: 120,
            tick_period: Duration::from_secs(1),
            winner_delay: Duration::from_secs(7),
        }
    }
}

impl LobbyConfig {
    /// Clamp values that would stall or spin the round loop.
    ///
    /// A zero-length round expires the moment it starts and rotates
    /// forever, so `round_secs` is raised to 1.
    pub fn validated(mut self) -> Self {
        if self.round_secs == 0 {
            tracing::warn!("round_secs of 0 would rotate without pause, using 1");
            self.round_secs = 1;
        }
        self
    }

    /// Timer settings for a fresh round.
    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig {
            duration_secs: self.round_secs,
            period: self.tick_period,
        }
    }
}

// ---------------------------------------------------------------------------
// LobbyPhase
// ---------------------------------------------------------------------------

/// Where a lobby is in its round cycle.
///
/// ```text
/// Idle → AwaitingWord → RoundActive → RoundEnding → AwaitingWord → ...
/// ```
///
/// A timeout in `AwaitingWord` or `RoundActive` skips straight to the next
/// turn's `AwaitingWord`. Any next turn that finds the lobby empty lands in
/// `Idle` instead.
///
/// - **Idle**: no round, no drawer, no timer. Fresh lobbies and lobbies
///   whose last player left start here.
/// - **AwaitingWord**: a drawer is set and the timer runs, but no word has
///   been chosen. Guesses are plain chat.
/// - **RoundActive**: the word is set. A matching guess wins.
/// - **RoundEnding**: someone won. The timer is stopped and the next turn
///   is scheduled; further guesses are plain chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LobbyPhase {
    Idle,
    AwaitingWord,
    RoundActive,
    RoundEnding,
}

impl LobbyPhase {
    /// Returns `true` while the round timer is supposed to be running.
    pub fn is_round_live(&self) -> bool {
        matches!(self, Self::AwaitingWord | Self::RoundActive)
    }

    /// Returns `true` if the drawer may (re)choose the word.
    pub fn accepts_word(&self) -> bool {
        self.is_round_live()
    }

    /// Returns `true` if moving to `target` is a legal step.
    ///
    /// Every phase may fall back to `Idle` (the lobby emptied) and every
    /// phase but `Idle` may start a new round.
    pub fn can_transition_to(self, target: Self) -> bool {
        use LobbyPhase::*;
        match (self, target) {
            (_, Idle) => true,
            (_, AwaitingWord) => true,
            (AwaitingWord | RoundActive, RoundActive) => true,
            (RoundActive, RoundEnding) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for LobbyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::AwaitingWord => write!(f, "AwaitingWord"),
            Self::RoundActive => write!(f, "RoundActive"),
            Self::RoundEnding => write!(f, "RoundEnding"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lobby_config_default() {
        let config = LobbyConfig::default();
        assert_eq!(config.round_secs, 120);
        assert_eq!(config.tick_period, Duration::from_secs(1));
        assert_eq!(config.winner_delay, Duration::from_secs(7));
    }

    #[test]
    fn test_validated_raises_zero_round_length() {
        let config = LobbyConfig {
            round_secs: 0,
            ..LobbyConfig::default()
        }
        .validated();
        assert_eq!(config.round_secs, 1);
    }

    #[test]
    fn test_timer_config_mirrors_round_settings() {
        let config = LobbyConfig {
            round_secs: 30,
            tick_period: Duration::from_millis(500),
            ..LobbyConfig::default()
        };
        let timer = config.timer_config();
        assert_eq!(timer.duration_secs, 30);
        assert_eq!(timer.period, Duration::from_millis(500));
    }

    #[test]
    fn test_word_is_only_accepted_while_round_is_live() {
        assert!(!LobbyPhase::Idle.accepts_word());
        assert!(LobbyPhase::AwaitingWord.accepts_word());
        assert!(LobbyPhase::RoundActive.accepts_word());
        assert!(!LobbyPhase::RoundEnding.accepts_word());
    }

    #[test]
    fn test_phase_transitions() {
        use LobbyPhase::*;
        assert!(Idle.can_transition_to(AwaitingWord));
        assert!(AwaitingWord.can_transition_to(RoundActive));
        assert!(RoundActive.can_transition_to(RoundActive));
        assert!(RoundActive.can_transition_to(RoundEnding));
        assert!(RoundEnding.can_transition_to(AwaitingWord));
        assert!(RoundEnding.can_transition_to(Idle));

        assert!(!Idle.can_transition_to(RoundActive));
        assert!(!Idle.can_transition_to(RoundEnding));
        assert!(!AwaitingWord.can_transition_to(RoundEnding));
        assert!(!RoundEnding.can_transition_to(RoundActive));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(LobbyPhase::AwaitingWord.to_string(), "AwaitingWord");
        assert_eq!(LobbyPhase::RoundEnding.to_string(), "RoundEnding");
    }
}
