pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod http;
pub mod player;
pub mod report;
pub mod session;
pub mod view;

// Re-export main types for convenience
pub use api::{Episode, RawEpisode, fetch_episode, fetch_latest_episode_ids};
pub use config::{ApiConfig, DEFAULT_API_URL};
pub use error::{ApiError, ViewError};
pub use format::duration_to_time_string;
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use player::{
    AudioDevice, ClockDevice, DeviceEvent, PlaybackPhase, PlaybackSpeed, PlayerState, PlayerStore,
    PlayerView, PlayerWidget,
};
pub use report::{NoopReporter, PlayerEvent, PlayerReporter, SharedPlayerReporter};
pub use session::{Command, Session, SessionOptions};
pub use view::{EpisodePage, Fallback, PageCache, PageSource, get_static_paths, get_static_props};
