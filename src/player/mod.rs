mod device;
mod speed;
mod store;
mod widget;

pub use device::{AudioDevice, ClockDevice, DeviceEvent, DeviceEventStream, MediaSource};
pub use speed::PlaybackSpeed;
pub use store::{PlayerState, PlayerStore};
pub use widget::{ButtonStates, NowPlaying, PlaybackPhase, PlayerView, PlayerWidget, SliderView};
