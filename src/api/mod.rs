mod fetch;
mod parse;

pub use fetch::{
    EpisodeQuery, episodes_url, fetch_episode, fetch_episodes, fetch_latest_episode_ids,
    fetch_raw_episode,
};
pub use parse::{Episode, RawEpisode, RawFile, parse_episode, parse_episode_list};
