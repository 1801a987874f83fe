// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use futures::channel::mpsc::{UnboundedSender, unbounded};
use tracing::trace;

/// Notifications emitted by an audio output device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Media metadata is available; `duration` is in seconds
    LoadedMetadata { duration: f64 },
    /// The playhead moved
    TimeUpdate { current_time: f64 },
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Playback reached the end of the media
    Ended,
}

/// A subscription to device events
pub type DeviceEventStream = Pin<Box<dyn Stream<Item = DeviceEvent> + Send>>;

/// Media handed to the device for playback
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    pub url: String,
    /// Expected length in seconds, when the caller knows it
    pub duration: Option<f64>,
}

/// Audio output device consumed by the player widget
pub trait AudioDevice: Send {
    /// Replace the current media; metadata arrives later as an event
    fn load(&mut self, source: MediaSource);

    /// Drop the current media
    fn unload(&mut self);

    fn play(&mut self);

    fn pause(&mut self);

    /// Playhead position in seconds
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    fn set_playback_rate(&mut self, rate: f64);

    /// Restart the media on end instead of emitting `Ended`
    fn set_looping(&mut self, looping: bool);

    /// Register for device events; dropping the stream unsubscribes
    fn subscribe(&mut self) -> DeviceEventStream;

    /// Advance time-driven devices by `elapsed` wall time.
    /// Hardware backends run on their own clock and ignore this.
    fn poll(&mut self, _elapsed: Duration) {}
}

/// A device that plays silence on a virtual clock
///
/// The playhead advances by `elapsed * rate` on each [`AudioDevice::poll`],
/// emitting the same events a media element would.
#[derive(Debug, Default)]
pub struct ClockDevice {
    source: Option<MediaSource>,
    position: f64,
    rate: f64,
    looping: bool,
    playing: bool,
    metadata_pending: bool,
    subscribers: Vec<UnboundedSender<DeviceEvent>>,
}

impl ClockDevice {
    pub fn new() -> Self {
        Self {
            rate: 1.0,
            ..Default::default()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn playback_rate(&self) -> f64 {
        self.rate
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    fn duration(&self) -> f64 {
        self.source
            .as_ref()
            .and_then(|source| source.duration)
            .unwrap_or(0.0)
    }

    fn emit(&mut self, event: DeviceEvent) {
        trace!(?event, "device event");
        self.subscribers
            .retain(|subscriber| subscriber.unbounded_send(event.clone()).is_ok());
    }
}

impl AudioDevice for ClockDevice {
    fn load(&mut self, source: MediaSource) {
        self.source = Some(source);
        self.position = 0.0;
        self.playing = false;
        self.metadata_pending = true;
    }

    fn unload(&mut self) {
        if self.playing {
            self.playing = false;
            self.emit(DeviceEvent::Pause);
        }
        self.source = None;
        self.position = 0.0;
        self.metadata_pending = false;
    }

    fn play(&mut self) {
        if self.source.is_none() || self.playing {
            return;
        }
        if !self.metadata_pending && self.position >= self.duration() {
            self.position = 0.0;
        }
        self.playing = true;
        self.emit(DeviceEvent::Play);
    }

    fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.emit(DeviceEvent::Pause);
        }
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) {
        if self.source.is_none() {
            return;
        }
        let upper = if self.metadata_pending {
            f64::MAX
        } else {
            self.duration()
        };
        self.position = seconds.clamp(0.0, upper);
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn subscribe(&mut self) -> DeviceEventStream {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        Box::pin(rx)
    }

    fn poll(&mut self, elapsed: Duration) {
        if self.source.is_none() {
            return;
        }

        if self.metadata_pending {
            self.metadata_pending = false;
            let duration = self.duration();
            self.emit(DeviceEvent::LoadedMetadata { duration });
            return;
        }

        if !self.playing {
            return;
        }

        let duration = self.duration();
        self.position += elapsed.as_secs_f64() * self.rate;

        if self.position >= duration {
            if self.looping && duration > 0.0 {
                self.position %= duration;
            } else {
                self.position = duration;
                self.playing = false;
                self.emit(DeviceEvent::TimeUpdate {
                    current_time: self.position,
                });
                self.emit(DeviceEvent::Pause);
                self.emit(DeviceEvent::Ended);
                return;
            }
        }

        self.emit(DeviceEvent::TimeUpdate {
            current_time: self.position,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{FutureExt, StreamExt};

    fn drain(stream: &mut DeviceEventStream) -> Vec<DeviceEvent> {
        let mut events = Vec::new();
        while let Some(Some(event)) = stream.next().now_or_never() {
            events.push(event);
        }
        events
    }

    fn source(duration: f64) -> MediaSource {
        MediaSource {
            url: "https://example.com/ep.mp3".to_string(),
            duration: Some(duration),
        }
    }

    #[test]
    fn load_emits_metadata_on_first_poll() {
        let mut device = ClockDevice::new();
        let mut events = device.subscribe();

        device.load(source(30.0));
        assert!(drain(&mut events).is_empty());

        device.poll(Duration::from_millis(250));
        assert_eq!(
            drain(&mut events),
            vec![DeviceEvent::LoadedMetadata { duration: 30.0 }]
        );
    }

    #[test]
    fn playing_advances_by_rate() {
        let mut device = ClockDevice::new();
        let mut events = device.subscribe();
        device.load(source(30.0));
        device.poll(Duration::ZERO);
        device.play();
        device.set_playback_rate(2.0);

        device.poll(Duration::from_secs(3));

        assert_eq!(device.current_time(), 6.0);
        let events = drain(&mut events);
        assert_eq!(events[1], DeviceEvent::Play);
        assert_eq!(events[2], DeviceEvent::TimeUpdate { current_time: 6.0 });
    }

    #[test]
    fn reaching_the_end_emits_pause_and_ended() {
        let mut device = ClockDevice::new();
        let mut events = device.subscribe();
        device.load(source(2.0));
        device.poll(Duration::ZERO);
        device.play();
        drain(&mut events);

        device.poll(Duration::from_secs(5));

        assert!(!device.is_playing());
        assert_eq!(
            drain(&mut events),
            vec![
                DeviceEvent::TimeUpdate { current_time: 2.0 },
                DeviceEvent::Pause,
                DeviceEvent::Ended,
            ]
        );
    }

    #[test]
    fn looping_wraps_without_ending() {
        let mut device = ClockDevice::new();
        let mut events = device.subscribe();
        device.load(source(4.0));
        device.poll(Duration::ZERO);
        device.set_looping(true);
        device.play();
        drain(&mut events);

        device.poll(Duration::from_secs(5));

        assert!(device.is_playing());
        assert_eq!(device.current_time(), 1.0);
        assert_eq!(
            drain(&mut events),
            vec![DeviceEvent::TimeUpdate { current_time: 1.0 }]
        );
    }

    #[test]
    fn paused_device_does_not_advance() {
        let mut device = ClockDevice::new();
        device.load(source(10.0));
        device.poll(Duration::ZERO);

        device.poll(Duration::from_secs(3));
        assert_eq!(device.current_time(), 0.0);
    }

    #[test]
    fn seek_is_clamped_to_duration() {
        let mut device = ClockDevice::new();
        device.load(source(10.0));
        device.poll(Duration::ZERO);

        device.set_current_time(25.0);
        assert_eq!(device.current_time(), 10.0);
        device.set_current_time(-3.0);
        assert_eq!(device.current_time(), 0.0);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut device = ClockDevice::new();
        let events = device.subscribe();
        let mut kept = device.subscribe();
        drop(events);

        device.load(source(10.0));
        device.poll(Duration::ZERO);

        assert_eq!(device.subscribers.len(), 1);
        assert_eq!(drain(&mut kept).len(), 1);
    }

    #[test]
    fn play_without_media_is_ignored() {
        let mut device = ClockDevice::new();
        let mut events = device.subscribe();

        device.play();

        assert!(!device.is_playing());
        assert!(drain(&mut events).is_empty());
    }
}
