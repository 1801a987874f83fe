// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use futures::{FutureExt, StreamExt};
use tracing::debug;

use crate::format::duration_to_time_string;
use crate::report::{PlayerEvent, SharedPlayerReporter};

use super::device::{AudioDevice, DeviceEvent, DeviceEventStream, MediaSource};
use super::store::PlayerStore;

const HEADER: &str = "Tocando agora";
const EMPTY_MESSAGE: &str = "Selecione um podcast para ouvir";

/// Playback phase of the episode currently bound to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackPhase::Idle => "idle",
            PlaybackPhase::Loading => "loading",
            PlaybackPhase::Ready => "ready",
            PlaybackPhase::Playing => "playing",
            PlaybackPhase::Paused => "paused",
            PlaybackPhase::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// What the player shows in place of the episode card
#[derive(Debug, Clone, PartialEq)]
pub enum NowPlaying {
    Episode {
        title: String,
        members: String,
        thumbnail: String,
    },
    Empty {
        message: &'static str,
    },
}

/// Seek slider bounds and value, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderView {
    pub max: u64,
    pub value: u64,
}

/// Which transport buttons accept input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonStates {
    pub shuffle: bool,
    pub previous: bool,
    pub play: bool,
    pub next: bool,
    pub repeat: bool,
}

/// Render model of the player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub header: &'static str,
    pub now_playing: NowPlaying,
    pub elapsed: String,
    pub total: String,
    /// `None` renders an empty rail
    pub slider: Option<SliderView>,
    pub speed_label: String,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_shuffling: bool,
    pub buttons: ButtonStates,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BoundEpisode {
    index: usize,
    id: String,
    duration: u64,
}

/// Player widget binding the store to an audio device
///
/// The widget owns the device and its event subscription. Store changes are
/// pushed to the device by [`PlayerWidget::sync`]; device events flow back
/// through [`PlayerWidget::handle_device_event`].
pub struct PlayerWidget<D: AudioDevice> {
    device: D,
    events: DeviceEventStream,
    reporter: SharedPlayerReporter,
    bound: Option<BoundEpisode>,
    needs_reload: bool,
    phase: PlaybackPhase,
    progress: u64,
    tracking_progress: bool,
    device_playing: bool,
    device_looping: Option<bool>,
}

impl<D: AudioDevice> PlayerWidget<D> {
    /// Bind a widget to `device`, subscribing to its events
    pub fn new(mut device: D, reporter: SharedPlayerReporter) -> Self {
        let events = device.subscribe();
        Self {
            device,
            events,
            reporter,
            bound: None,
            needs_reload: false,
            phase: PlaybackPhase::Idle,
            progress: 0,
            tracking_progress: false,
            device_playing: false,
            device_looping: None,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Displayed progress in whole seconds
    pub fn progress(&self) -> u64 {
        self.progress
    }

    fn set_phase(&mut self, phase: PlaybackPhase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "phase change");
            self.phase = phase;
            self.reporter.report(PlayerEvent::PhaseChanged { phase });
        }
    }

    /// Push store state to the device
    ///
    /// Loads the current episode when it changed, then mirrors the loop and
    /// playing flags.
    pub fn sync(&mut self, store: &mut PlayerStore) {
        let wanted = store.current_episode().map(|episode| BoundEpisode {
            index: store.state().current_episode_index.unwrap_or(0),
            id: episode.id.clone(),
            duration: episode.duration,
        });

        if wanted != self.bound || self.needs_reload {
            self.needs_reload = false;
            self.progress = 0;
            self.tracking_progress = false;
            self.device_looping = None;

            match store.current_episode() {
                Some(episode) => {
                    debug!(episode = %episode.id, url = %episode.url, "loading episode");
                    self.device.load(MediaSource {
                        url: episode.url.clone(),
                        duration: Some(episode.duration as f64),
                    });
                    self.device
                        .set_playback_rate(store.state().current_playing_speed.rate());
                    self.reporter.report(PlayerEvent::EpisodeLoaded {
                        title: episode.title.clone(),
                        members: episode.members.clone(),
                        episode_index: store.state().current_episode_index.unwrap_or(0),
                        total_episodes: store.state().episode_list.len(),
                        duration: episode.duration,
                    });
                    self.phase = PlaybackPhase::Idle;
                    self.set_phase(PlaybackPhase::Loading);

                    // A fresh source starts paused and autoplays
                    self.device_playing = false;
                    store.set_playing_state(true);
                }
                None => {
                    self.device.unload();
                    self.device_playing = false;
                    self.set_phase(PlaybackPhase::Idle);
                    self.reporter.report(PlayerEvent::PlayerCleared);
                }
            }

            self.bound = wanted;
        }

        if self.bound.is_none() {
            return;
        }

        let looping = store.state().is_looping;
        if self.device_looping != Some(looping) {
            self.device.set_looping(looping);
            self.device_looping = Some(looping);
        }

        let playing = store.state().is_playing;
        if playing != self.device_playing {
            if playing {
                self.device.play();
            } else {
                self.device.pause();
            }
            self.device_playing = playing;
        }
    }

    /// Apply one device event to widget and store
    pub fn handle_device_event(&mut self, store: &mut PlayerStore, event: DeviceEvent) {
        match event {
            DeviceEvent::LoadedMetadata { .. } => {
                self.device.set_current_time(0.0);
                self.progress = 0;
                self.tracking_progress = true;
                if self.phase == PlaybackPhase::Loading {
                    self.set_phase(PlaybackPhase::Ready);
                    if self.device_playing {
                        self.set_phase(PlaybackPhase::Playing);
                    }
                }
                self.report_progress();
            }

            DeviceEvent::TimeUpdate { current_time } => {
                if !self.tracking_progress {
                    return;
                }
                let position = current_time.max(0.0).floor() as u64;
                if position != self.progress {
                    self.progress = position;
                    self.report_progress();
                }
            }

            DeviceEvent::Play => {
                store.set_playing_state(true);
                self.device_playing = true;
                if matches!(
                    self.phase,
                    PlaybackPhase::Ready | PlaybackPhase::Paused | PlaybackPhase::Ended
                ) {
                    self.set_phase(PlaybackPhase::Playing);
                }
            }

            DeviceEvent::Pause => {
                store.set_playing_state(false);
                self.device_playing = false;
                if self.phase == PlaybackPhase::Playing {
                    self.set_phase(PlaybackPhase::Paused);
                }
            }

            DeviceEvent::Ended => {
                self.set_phase(PlaybackPhase::Ended);
                if store.has_next() {
                    store.play_next();
                } else {
                    store.clear_player_state();
                }
                self.needs_reload = true;
                self.sync(store);
            }
        }
    }

    /// Process every event already queued by the device
    pub fn drain_events(&mut self, store: &mut PlayerStore) -> usize {
        let mut handled = 0;
        loop {
            let Some(Some(event)) = self.events.next().now_or_never() else {
                break;
            };
            self.handle_device_event(store, event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next device event
    pub async fn next_event(&mut self) -> Option<DeviceEvent> {
        self.events.next().await
    }

    /// Move the playhead, updating displayed progress immediately
    pub fn seek(&mut self, amount: u64) {
        let Some(bound) = &self.bound else {
            return;
        };
        let position = amount.min(bound.duration);

        self.device.set_current_time(position as f64);
        self.progress = position;
        self.reporter.report(PlayerEvent::Seeked { position });
    }

    /// Advance to the next speed in both store and device
    pub fn change_speed(&mut self, store: &mut PlayerStore) {
        let speed = store.state().current_playing_speed.next();
        store.toggle_speed(speed);
        self.device.set_playback_rate(speed.rate());
        self.reporter.report(PlayerEvent::SpeedChanged { speed });
    }

    fn report_progress(&self) {
        let duration = self.bound.as_ref().map_or(0, |bound| bound.duration);
        self.reporter.report(PlayerEvent::ProgressUpdated {
            position: self.progress,
            duration,
        });
    }

    /// Build the render model for the current store state
    pub fn render(&self, store: &PlayerStore) -> PlayerView {
        let state = store.state();
        let episode = store.current_episode();

        let now_playing = match episode {
            Some(episode) => NowPlaying::Episode {
                title: episode.title.clone(),
                members: episode.members.clone(),
                thumbnail: episode.thumbnail.clone(),
            },
            None => NowPlaying::Empty {
                message: EMPTY_MESSAGE,
            },
        };

        let has_episode = episode.is_some();
        let duration = episode.map_or(0, |episode| episode.duration);

        PlayerView {
            header: HEADER,
            now_playing,
            elapsed: duration_to_time_string(self.progress),
            total: duration_to_time_string(duration),
            slider: has_episode.then_some(SliderView {
                max: duration,
                value: self.progress,
            }),
            speed_label: state.current_playing_speed.label(),
            is_playing: state.is_playing,
            is_looping: state.is_looping,
            is_shuffling: state.is_shuffling,
            buttons: ButtonStates {
                shuffle: has_episode && state.episode_list.len() != 1,
                previous: has_episode && store.has_previous(),
                play: true,
                next: has_episode && store.has_next(),
                repeat: has_episode,
            },
        }
    }
}
