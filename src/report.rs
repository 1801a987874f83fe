use std::sync::Arc;

use crate::player::{PlaybackPhase, PlaybackSpeed};

/// Events emitted by the player widget as playback progresses
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// A new episode was handed to the audio device
    EpisodeLoaded {
        title: String,
        members: String,
        /// Position of the episode in the list
        episode_index: usize,
        /// Number of episodes in the list
        total_episodes: usize,
        /// Duration in seconds
        duration: u64,
    },

    /// The per-episode playback phase changed
    PhaseChanged { phase: PlaybackPhase },

    /// Whole-second progress changed
    ProgressUpdated { position: u64, duration: u64 },

    /// The user moved the seek slider
    Seeked { position: u64 },

    /// The speed button was pressed
    SpeedChanged { speed: PlaybackSpeed },

    /// The list was cleared and the player shows its empty view
    PlayerCleared,
}

/// Trait for reporting player events.
///
/// Implementations can use this to draw progress bars, log messages,
/// or record what happened in tests.
pub trait PlayerReporter: Send + Sync {
    /// Report a player event
    fn report(&self, event: PlayerEvent);
}

/// A shared reference to a player reporter
pub type SharedPlayerReporter = Arc<dyn PlayerReporter>;

/// A no-op reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl PlayerReporter for NoopReporter {
    fn report(&self, _event: PlayerEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedPlayerReporter {
        Arc::new(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_reporter_handles_all_events() {
        let reporter = NoopReporter;

        reporter.report(PlayerEvent::EpisodeLoaded {
            title: "Episode 1".to_string(),
            members: "Host".to_string(),
            episode_index: 0,
            total_episodes: 2,
            duration: 3600,
        });

        reporter.report(PlayerEvent::PhaseChanged {
            phase: PlaybackPhase::Playing,
        });

        reporter.report(PlayerEvent::ProgressUpdated {
            position: 12,
            duration: 3600,
        });

        reporter.report(PlayerEvent::Seeked { position: 600 });

        reporter.report(PlayerEvent::SpeedChanged {
            speed: PlaybackSpeed::OneAndHalf,
        });

        reporter.report(PlayerEvent::PlayerCleared);
    }

    #[test]
    fn shared_reporter_is_usable_through_arc() {
        let reporter = NoopReporter::shared();
        reporter.report(PlayerEvent::PlayerCleared);
    }
}
