// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::api::Episode;
use crate::player::{AudioDevice, PlaybackSpeed, PlayerStore, PlayerView, PlayerWidget};
use crate::report::SharedPlayerReporter;

/// Options for a player session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// How often time-driven devices are advanced
    pub tick_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(250),
        }
    }
}

/// Transport commands a front end can send to a session
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play(Box<Episode>),
    PlayList(Vec<Episode>, usize),
    TogglePlay,
    Seek(u64),
    Next,
    Previous,
    ToggleLoop,
    ToggleShuffle,
    ChangeSpeed,
    SetSpeed(PlaybackSpeed),
    Clear,
}

/// One player session: the store, the widget and the device it drives
///
/// The session is the only owner of the store. Commands and device events
/// are applied one at a time.
pub struct Session<D: AudioDevice> {
    store: PlayerStore,
    widget: PlayerWidget<D>,
    options: SessionOptions,
}

impl<D: AudioDevice> Session<D> {
    pub fn new(device: D, reporter: SharedPlayerReporter, options: SessionOptions) -> Self {
        Self::with_store(PlayerStore::new(), device, reporter, options)
    }

    pub fn with_store(
        store: PlayerStore,
        device: D,
        reporter: SharedPlayerReporter,
        options: SessionOptions,
    ) -> Self {
        let widget = PlayerWidget::new(device, reporter);
        Self {
            store,
            widget,
            options,
        }
    }

    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    pub fn widget(&self) -> &PlayerWidget<D> {
        &self.widget
    }

    pub fn view(&self) -> PlayerView {
        self.widget.render(&self.store)
    }

    /// Mutate the store directly, then push the result to the device
    pub fn update(&mut self, f: impl FnOnce(&mut PlayerStore)) {
        f(&mut self.store);
        self.widget.sync(&mut self.store);
        self.widget.drain_events(&mut self.store);
    }

    /// Apply a transport command and push the result to the device
    pub fn dispatch(&mut self, command: Command) {
        debug!(?command, "dispatch");

        match command {
            Command::Play(episode) => self.store.play(*episode),
            Command::PlayList(list, index) => self.store.play_list(list, index),
            Command::TogglePlay => self.store.toggle_play(),
            Command::Seek(amount) => self.widget.seek(amount),
            Command::Next => self.store.play_next(),
            Command::Previous => self.store.play_previous(),
            Command::ToggleLoop => self.store.toggle_loop(),
            Command::ToggleShuffle => self.store.toggle_shuffle(),
            Command::ChangeSpeed => self.widget.change_speed(&mut self.store),
            Command::SetSpeed(speed) => {
                self.store.toggle_speed(speed);
                self.widget.device_mut().set_playback_rate(speed.rate());
            }
            Command::Clear => self.store.clear_player_state(),
        }

        self.widget.sync(&mut self.store);
        self.widget.drain_events(&mut self.store);
    }

    /// Advance the device clock and apply whatever it emitted
    pub fn tick(&mut self, elapsed: Duration) {
        self.widget.device_mut().poll(elapsed);
        self.widget.drain_events(&mut self.store);
    }

    /// Run until the player empties or the command channel closes
    pub async fn run(&mut self, mut commands: mpsc::Receiver<Command>) {
        let mut interval = tokio::time::interval(self.options.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        info!("player session started");

        loop {
            tokio::select! {
                now = interval.tick() => {
                    self.tick(now.saturating_duration_since(last));
                    last = now;
                }
                command = commands.recv() => match command {
                    Some(command) => self.dispatch(command),
                    None => break,
                },
            }

            if self.store.current_episode().is_none() {
                break;
            }
        }

        info!("player session ended");
    }
}
