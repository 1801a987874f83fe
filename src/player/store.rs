// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::api::Episode;

use super::speed::PlaybackSpeed;

/// Snapshot of everything the player shows and controls
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerState {
    pub episode_list: Vec<Episode>,
    pub current_episode_index: Option<usize>,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_shuffling: bool,
    pub current_playing_speed: PlaybackSpeed,
}

/// Playback state store
///
/// One store exists per session. All mutation goes through the transport
/// operations below; indexing past either end of the list is a silent no-op.
#[derive(Debug)]
pub struct PlayerStore {
    state: PlayerState,
    rng: StdRng,
}

impl PlayerStore {
    /// Create an empty store with an entropy-seeded shuffle generator
    pub fn new() -> Self {
        Self {
            state: PlayerState::default(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an empty store with a deterministic shuffle generator
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: PlayerState::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// The episode at the current index, if any
    pub fn current_episode(&self) -> Option<&Episode> {
        self.state
            .current_episode_index
            .and_then(|index| self.state.episode_list.get(index))
    }

    /// Play a single episode, replacing the list
    pub fn play(&mut self, episode: Episode) {
        debug!(episode = %episode.id, "play");
        self.state.episode_list = vec![episode];
        self.state.current_episode_index = Some(0);
        self.state.is_playing = true;
    }

    /// Replace the list and start playing at `index`
    pub fn play_list(&mut self, list: Vec<Episode>, index: usize) {
        debug!(len = list.len(), index, "play list");
        self.state.current_episode_index = (index < list.len()).then_some(index);
        self.state.is_playing = self.state.current_episode_index.is_some();
        self.state.episode_list = list;
    }

    pub fn toggle_play(&mut self) {
        self.state.is_playing = !self.state.is_playing;
    }

    pub fn toggle_loop(&mut self) {
        self.state.is_looping = !self.state.is_looping;
    }

    pub fn toggle_shuffle(&mut self) {
        self.state.is_shuffling = !self.state.is_shuffling;
    }

    /// Mirror a play/pause reported by the audio device
    pub fn set_playing_state(&mut self, is_playing: bool) {
        self.state.is_playing = is_playing;
    }

    pub fn toggle_speed(&mut self, speed: PlaybackSpeed) {
        self.state.current_playing_speed = speed;
    }

    pub fn has_next(&self) -> bool {
        match self.state.current_episode_index {
            Some(index) => {
                self.state.is_shuffling
                    || self.state.is_looping
                    || index + 1 < self.state.episode_list.len()
            }
            None => false,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.state.current_episode_index.is_some_and(|index| index > 0)
    }

    /// Advance to the next episode
    ///
    /// Shuffling picks uniformly among the other episodes. Otherwise the
    /// index moves forward by one, wrapping to the start only when looping.
    pub fn play_next(&mut self) {
        let Some(current) = self.state.current_episode_index else {
            return;
        };
        let len = self.state.episode_list.len();

        let next = if self.state.is_shuffling {
            if len <= 1 {
                Some(0)
            } else {
                let pick = self.rng.gen_range(0..len - 1);
                Some(if pick >= current { pick + 1 } else { pick })
            }
        } else if current + 1 < len {
            Some(current + 1)
        } else if self.state.is_looping && len > 0 {
            Some(0)
        } else {
            None
        };

        if let Some(next) = next {
            debug!(from = current, to = next, "play next");
            self.state.current_episode_index = Some(next);
        }
    }

    pub fn play_previous(&mut self) {
        if let Some(index) = self.state.current_episode_index
            && index > 0
        {
            self.state.current_episode_index = Some(index - 1);
        }
    }

    /// Empty the list and forget the current index
    pub fn clear_player_state(&mut self) {
        debug!("clear player state");
        self.state.episode_list.clear();
        self.state.current_episode_index = None;
    }
}

impl Default for PlayerStore {
    fn default() -> Self {
        Self::new()
    }
}
