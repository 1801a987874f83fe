mod cache;
mod episode;

pub use cache::{PageCache, PageSource};
pub use episode::{
    EpisodeDetail, EpisodePage, Fallback, SITE_NAME, StaticPaths, StaticProps, episode_route,
    get_static_paths, get_static_props, html_to_text,
};
