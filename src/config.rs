// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use url::Url;

/// API base URL used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3333";

/// Number of recent episodes pre-generated at build time
pub const DEFAULT_STATIC_PATH_LIMIT: usize = 2;

/// How long a generated episode page stays fresh
pub const DEFAULT_REVALIDATE: Duration = Duration::from_secs(60 * 60 * 24);

/// Options for talking to the episodes API and generating pages
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the episodes API
    pub base_url: Url,
    /// Maximum number of episode paths generated up front
    pub static_path_limit: usize,
    /// Age after which a cached page is rebuilt
    pub revalidate: Duration,
}

impl ApiConfig {
    /// Create a config for `base_url` with default generation settings
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            static_path_limit: DEFAULT_STATIC_PATH_LIMIT,
            revalidate: DEFAULT_REVALIDATE,
        }
    }

    /// Parse `base_url` and create a config with default generation settings
    pub fn from_url(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(base_url)?))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_url(DEFAULT_API_URL).expect("DEFAULT_API_URL is a valid URL")
    }
}
