// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bytes::Bytes;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::http::HttpClient;

use super::parse::{Episode, RawEpisode, parse_episode, parse_episode_list};

/// Query for `GET /episodes`
#[derive(Debug, Clone)]
pub struct EpisodeQuery {
    pub limit: usize,
    pub sort: String,
    pub descending: bool,
}

impl EpisodeQuery {
    /// The most recently published episodes, newest first
    pub fn latest(limit: usize) -> Self {
        Self {
            limit,
            sort: "published_at".to_string(),
            descending: true,
        }
    }
}

/// Build `{base}/episodes[/{id}]`, keeping any path prefix of the base URL
pub fn episodes_url(base: &Url, id: Option<&str>) -> Result<Url, ApiError> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
        segments.pop_if_empty().push("episodes");
        if let Some(id) = id {
            segments.push(id);
        }
    }
    Ok(url)
}

/// Fetch raw response bytes, treating HTTP errors as failures
async fn fetch_bytes<C: HttpClient>(client: &C, url: &Url) -> Result<Bytes, ApiError> {
    debug!(%url, "GET");

    let response = client
        .get(url.as_str())
        .await
        .map_err(|e| ApiError::FetchFailed {
            url: url.to_string(),
            source: e,
        })?;

    if response.status >= 400 {
        return Err(ApiError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    Ok(response.body)
}

/// Fetch a page of raw episode records
pub async fn fetch_episodes<C: HttpClient>(
    client: &C,
    base: &Url,
    query: &EpisodeQuery,
) -> Result<Vec<RawEpisode>, ApiError> {
    let mut url = episodes_url(base, None)?;
    url.query_pairs_mut()
        .append_pair("_limit", &query.limit.to_string())
        .append_pair("_sort", &query.sort)
        .append_pair("_order", if query.descending { "desc" } else { "asc" });

    let bytes = fetch_bytes(client, &url).await?;
    parse_episode_list(&bytes).map_err(|e| ApiError::DecodeFailed {
        url: url.to_string(),
        source: e,
    })
}

/// Fetch the ids of the `limit` most recently published episodes
pub async fn fetch_latest_episode_ids<C: HttpClient>(
    client: &C,
    base: &Url,
    limit: usize,
) -> Result<Vec<String>, ApiError> {
    let episodes = fetch_episodes(client, base, &EpisodeQuery::latest(limit)).await?;
    Ok(episodes.into_iter().map(|episode| episode.id).collect())
}

/// Fetch a single raw episode record by id
pub async fn fetch_raw_episode<C: HttpClient>(
    client: &C,
    base: &Url,
    id: &str,
) -> Result<RawEpisode, ApiError> {
    let url = episodes_url(base, Some(id))?;
    let bytes = fetch_bytes(client, &url).await?;
    parse_episode(&bytes).map_err(|e| ApiError::DecodeFailed {
        url: url.to_string(),
        source: e,
    })
}

/// Fetch and normalise a single episode by id
pub async fn fetch_episode<C: HttpClient>(
    client: &C,
    base: &Url,
    id: &str,
) -> Result<Episode, ApiError> {
    let raw = fetch_raw_episode(client, base, id).await?;
    Episode::try_from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::http::HttpResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockHttpClient {
        status: u16,
        body: String,
        requested: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(HttpResponse {
                status: self.status,
                body: Bytes::from(self.body.clone()),
            })
        }
    }

    const EPISODE_JSON: &str = r#"{
      "id": "ep-1",
      "title": "Episode 1",
      "members": "Ana, Bia",
      "published_at": "2021-01-22 19:22:25",
      "thumbnail": "https://example.com/1.jpg",
      "description": "<p>One</p>",
      "file": { "url": "https://example.com/1.mp3", "duration": 90 }
    }"#;

    #[test]
    fn episodes_url_keeps_path_prefix() {
        let base = Url::parse("https://api.example.com/v1/").unwrap();
        assert_eq!(
            episodes_url(&base, Some("abc")).unwrap().as_str(),
            "https://api.example.com/v1/episodes/abc"
        );

        let base = Url::parse("http://localhost:3333").unwrap();
        assert_eq!(
            episodes_url(&base, None).unwrap().as_str(),
            "http://localhost:3333/episodes"
        );
    }

    #[tokio::test]
    async fn fetch_latest_ids_sends_listing_query() {
        let client = MockHttpClient::new(200, &format!("[{EPISODE_JSON}]"));
        let base = Url::parse("http://localhost:3333").unwrap();

        let ids = fetch_latest_episode_ids(&client, &base, 2).await.unwrap();

        assert_eq!(ids, vec!["ep-1".to_string()]);
        let requested = client.requested.lock().unwrap();
        assert_eq!(
            requested[0],
            "http://localhost:3333/episodes?_limit=2&_sort=published_at&_order=desc"
        );
    }

    #[tokio::test]
    async fn fetch_episode_normalises_record() {
        let client = MockHttpClient::new(200, EPISODE_JSON);
        let base = Url::parse("http://localhost:3333").unwrap();

        let episode = fetch_episode(&client, &base, "ep-1").await.unwrap();

        assert_eq!(episode.title, "Episode 1");
        assert_eq!(episode.duration_as_string, "00:01:30");
        assert_eq!(
            client.requested.lock().unwrap()[0],
            "http://localhost:3333/episodes/ep-1"
        );
    }

    #[tokio::test]
    async fn fetch_episode_fails_on_http_error() {
        let client = MockHttpClient::new(404, "{}");
        let base = Url::parse("http://localhost:3333").unwrap();

        match fetch_episode(&client, &base, "missing").await {
            Err(ApiError::HttpStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("Expected HttpStatus error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_episode_fails_on_malformed_json() {
        let client = MockHttpClient::new(200, "not json");
        let base = Url::parse("http://localhost:3333").unwrap();

        let result = fetch_episode(&client, &base, "ep-1").await;
        assert!(matches!(result, Err(ApiError::DecodeFailed { .. })));
    }
}
