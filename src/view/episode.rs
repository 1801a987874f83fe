// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use tracing::{debug, info};

use crate::api::{Episode, fetch_episode, fetch_latest_episode_ids};
use crate::config::ApiConfig;
use crate::error::{ApiError, ViewError};
use crate::http::HttpClient;
use crate::player::PlayerStore;

/// Site name appended to page titles
pub const SITE_NAME: &str = "Podcastr";

/// How requests for paths that were not generated up front are served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Generate the page on first request and cache it
    Blocking,
    /// Answer unknown paths with not found
    NotFound,
}

/// Episode paths to generate ahead of the first request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPaths {
    pub paths: Vec<String>,
    pub fallback: Fallback,
}

/// Data an episode page is generated from
#[derive(Debug, Clone, PartialEq)]
pub struct StaticProps {
    pub episode: Episode,
    /// Age after which the page should be regenerated
    pub revalidate: Duration,
}

/// Route of the detail page for `slug`
pub fn episode_route(slug: &str) -> String {
    format!("/episodes/{slug}")
}

/// Resolve the slugs of the most recent episodes
pub async fn get_static_paths<C: HttpClient>(
    client: &C,
    config: &ApiConfig,
) -> Result<StaticPaths, ViewError> {
    let paths =
        fetch_latest_episode_ids(client, &config.base_url, config.static_path_limit).await?;
    info!(count = paths.len(), "resolved static episode paths");

    Ok(StaticPaths {
        paths,
        fallback: Fallback::Blocking,
    })
}

/// Fetch the episode behind `slug`
pub async fn get_static_props<C: HttpClient>(
    client: &C,
    config: &ApiConfig,
    slug: &str,
) -> Result<StaticProps, ViewError> {
    debug!(slug, "fetching static props");

    let episode = fetch_episode(client, &config.base_url, slug)
        .await
        .map_err(|e| match e {
            ApiError::HttpStatus { status: 404, .. } => ViewError::NotFound {
                slug: slug.to_string(),
            },
            other => ViewError::Api(other),
        })?;

    Ok(StaticProps {
        episode,
        revalidate: config.revalidate,
    })
}

/// Render model of an episode detail page
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeDetail {
    pub document_title: String,
    pub back_link: &'static str,
    pub thumbnail: String,
    pub title: String,
    pub members: String,
    pub published_at: String,
    pub duration: String,
    /// Description reduced to plain text
    pub description: String,
}

/// A generated episode detail page
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodePage {
    episode: Episode,
}

impl EpisodePage {
    pub fn new(episode: Episode) -> Self {
        Self { episode }
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    pub fn route(&self) -> String {
        episode_route(&self.episode.id)
    }

    pub fn document_title(&self) -> String {
        format!("{} | {SITE_NAME}", self.episode.title)
    }

    pub fn render(&self) -> EpisodeDetail {
        EpisodeDetail {
            document_title: self.document_title(),
            back_link: "/",
            thumbnail: self.episode.thumbnail.clone(),
            title: self.episode.title.clone(),
            members: self.episode.members.clone(),
            published_at: self.episode.published_at.clone(),
            duration: self.episode.duration_as_string.clone(),
            description: html_to_text(&self.episode.description),
        }
    }

    /// The play button: hand this episode to the player
    pub fn play(&self, store: &mut PlayerStore) {
        store.play(self.episode.clone());
    }
}

impl From<StaticProps> for EpisodePage {
    fn from(props: StaticProps) -> Self {
        Self::new(props.episode)
    }
}

/// Reduce an HTML fragment to text, keeping paragraph and line breaks
pub fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        // Only `<` followed by a name, `/` or `!` opens a tag
        let opens_tag = c == '<'
            && chars
                .peek()
                .is_some_and(|&n| n.is_ascii_alphabetic() || n == '/' || n == '!');
        if !opens_tag {
            text.push(c);
            continue;
        }

        let tag: String = chars.by_ref().take_while(|&c| c != '>').collect();
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        match name.as_str() {
            "br" => text.push('\n'),
            "p" | "div" | "li" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" => text.push_str("\n\n"),
            _ => {}
        }
    }

    let decoded = html_escape::decode_html_entities(&text);

    let mut out = String::new();
    let mut blank_run = 0;
    for line in decoded.lines().map(str::trim) {
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 1 { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        blank_run = 0;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::http::HttpResponse;
    use async_trait::async_trait;
    use bytes::Bytes;

    struct MockHttpClient {
        status: u16,
        body: String,
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, _url: &str) -> Result<HttpResponse, reqwest::Error> {
            Ok(HttpResponse {
                status: self.status,
                body: Bytes::from(self.body.clone()),
            })
        }
    }

    const EPISODE_JSON: &str = r#"{
      "id": "ep-1",
      "title": "Faladev #30",
      "members": "Ana, Bia",
      "published_at": "2021-01-22 19:22:25",
      "thumbnail": "https://example.com/1.jpg",
      "description": "<p>Primeiro &amp; melhor</p><p>Segundo<br>parágrafo</p>",
      "file": { "url": "https://example.com/1.mp3", "duration": 3981 }
    }"#;

    fn config() -> ApiConfig {
        ApiConfig::from_url("http://localhost:3333").unwrap()
    }

    #[tokio::test]
    async fn static_paths_use_blocking_fallback() {
        let client = MockHttpClient {
            status: 200,
            body: format!("[{EPISODE_JSON}]"),
        };

        let paths = get_static_paths(&client, &config()).await.unwrap();

        assert_eq!(paths.paths, vec!["ep-1".to_string()]);
        assert_eq!(paths.fallback, Fallback::Blocking);
    }

    #[tokio::test]
    async fn static_props_revalidate_daily() {
        let client = MockHttpClient {
            status: 200,
            body: EPISODE_JSON.to_string(),
        };

        let props = get_static_props(&client, &config(), "ep-1").await.unwrap();

        assert_eq!(props.episode.id, "ep-1");
        assert_eq!(props.revalidate, Duration::from_secs(86400));
    }

    #[tokio::test]
    async fn static_props_map_404_to_not_found() {
        let client = MockHttpClient {
            status: 404,
            body: "{}".to_string(),
        };

        match get_static_props(&client, &config(), "nope").await {
            Err(ViewError::NotFound { slug }) => assert_eq!(slug, "nope"),
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn static_props_surface_server_errors() {
        let client = MockHttpClient {
            status: 500,
            body: String::new(),
        };

        let result = get_static_props(&client, &config(), "ep-1").await;
        assert!(matches!(
            result,
            Err(ViewError::Api(ApiError::HttpStatus { status: 500, .. }))
        ));
    }

    #[tokio::test]
    async fn page_renders_episode_metadata() {
        let client = MockHttpClient {
            status: 200,
            body: EPISODE_JSON.to_string(),
        };
        let page = EpisodePage::from(get_static_props(&client, &config(), "ep-1").await.unwrap());

        let detail = page.render();

        assert_eq!(page.route(), "/episodes/ep-1");
        assert_eq!(detail.document_title, "Faladev #30 | Podcastr");
        assert_eq!(detail.published_at, "22 jan 21");
        assert_eq!(detail.duration, "01:06:21");
        assert_eq!(detail.members, "Ana, Bia");
        assert_eq!(detail.description, "Primeiro & melhor\n\nSegundo\nparágrafo");
    }

    #[tokio::test]
    async fn play_button_hands_episode_to_store() {
        let client = MockHttpClient {
            status: 200,
            body: EPISODE_JSON.to_string(),
        };
        let page = EpisodePage::from(get_static_props(&client, &config(), "ep-1").await.unwrap());
        let mut store = PlayerStore::with_seed(1);

        page.play(&mut store);

        assert_eq!(store.state().episode_list, vec![page.episode().clone()]);
        assert_eq!(store.state().current_episode_index, Some(0));
        assert!(store.state().is_playing);
    }

    #[test]
    fn html_to_text_handles_plain_text() {
        assert_eq!(html_to_text("just words"), "just words");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn html_to_text_drops_inline_tags() {
        assert_eq!(
            html_to_text(r#"<p>Veja <a href="https://x.dev">o site</a> &lt;agora&gt;</p>"#),
            "Veja o site <agora>"
        );
    }

    #[test]
    fn html_to_text_keeps_stray_angle_brackets() {
        assert_eq!(
            html_to_text("<p>se a < b entao b > a e pronto</p>"),
            "se a < b entao b > a e pronto"
        );
        assert_eq!(html_to_text("1 <2 e 3<= 4"), "1 <2 e 3<= 4");
        assert_eq!(html_to_text("<!-- nota --><p>texto</p>"), "texto");
    }

    #[test]
    fn html_to_text_turns_lists_into_lines() {
        assert_eq!(
            html_to_text("<ul><li>um</li><li>dois</li></ul>"),
            "um\n\ndois"
        );
    }
}
