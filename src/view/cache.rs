// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::ViewError;
use crate::http::HttpClient;

use super::episode::{EpisodePage, Fallback, get_static_paths, get_static_props};

/// How a page handed out by the cache was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    /// Served from cache, still fresh
    Cached,
    /// Built on first request through the blocking fallback
    Generated,
    /// Rebuilt because the cached copy was older than its revalidate window
    Regenerated,
    /// Rebuild failed; the previous copy was served
    Stale,
}

#[derive(Debug, Clone)]
struct CachedPage {
    page: EpisodePage,
    revalidate: Duration,
    generated_at: Instant,
}

/// Generated episode pages, keyed by slug
///
/// Pages are rebuilt on the first request after their revalidate window has
/// passed. A failed rebuild keeps serving the previous copy.
#[derive(Debug)]
pub struct PageCache {
    config: ApiConfig,
    fallback: Fallback,
    pages: HashMap<String, CachedPage>,
}

impl PageCache {
    /// Create an empty cache
    pub fn new(config: ApiConfig, fallback: Fallback) -> Self {
        Self {
            config,
            fallback,
            pages: HashMap::new(),
        }
    }

    /// Generate the pages for the static paths, one after the other
    pub async fn build<C: HttpClient>(client: &C, config: ApiConfig) -> Result<Self, ViewError> {
        let paths = get_static_paths(client, &config).await?;
        let mut cache = Self::new(config, paths.fallback);

        for slug in paths.paths {
            let props = get_static_props(client, &cache.config, &slug).await?;
            cache.insert(slug, props.revalidate, EpisodePage::from(props), Instant::now());
        }

        info!(pages = cache.len(), "pre-generated episode pages");
        Ok(cache)
    }

    /// Slugs of all generated pages, sorted
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.pages.keys().map(String::as_str).collect();
        slugs.sort_unstable();
        slugs
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn insert(&mut self, slug: String, revalidate: Duration, page: EpisodePage, now: Instant) {
        self.pages.insert(
            slug,
            CachedPage {
                page,
                revalidate,
                generated_at: now,
            },
        );
    }

    /// Serve the page for `slug`
    pub async fn get<C: HttpClient>(
        &mut self,
        client: &C,
        slug: &str,
    ) -> Result<(&EpisodePage, PageSource), ViewError> {
        self.get_at(client, slug, Instant::now()).await
    }

    /// Serve the page for `slug` as of `now`
    pub async fn get_at<C: HttpClient>(
        &mut self,
        client: &C,
        slug: &str,
        now: Instant,
    ) -> Result<(&EpisodePage, PageSource), ViewError> {
        let expired = self
            .pages
            .get(slug)
            .map(|cached| now.saturating_duration_since(cached.generated_at) >= cached.revalidate);

        let source = match expired {
            Some(false) => PageSource::Cached,
            Some(true) => match get_static_props(client, &self.config, slug).await {
                Ok(props) => {
                    self.insert(
                        slug.to_string(),
                        props.revalidate,
                        EpisodePage::from(props),
                        now,
                    );
                    PageSource::Regenerated
                }
                Err(e) => {
                    warn!(slug, error = %e, "regeneration failed, serving stale page");
                    PageSource::Stale
                }
            },
            None => match self.fallback {
                Fallback::NotFound => {
                    return Err(ViewError::NotFound {
                        slug: slug.to_string(),
                    });
                }
                Fallback::Blocking => {
                    let props = get_static_props(client, &self.config, slug).await?;
                    self.insert(
                        slug.to_string(),
                        props.revalidate,
                        EpisodePage::from(props),
                        now,
                    );
                    PageSource::Generated
                }
            },
        };

        self.pages
            .get(slug)
            .map(|cached| (&cached.page, source))
            .ok_or_else(|| ViewError::NotFound {
                slug: slug.to_string(),
            })
    }
}
