// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors that can occur when talking to the episodes API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to fetch {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    DecodeFailed {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Episode '{id}' has an invalid duration '{value}'")]
    InvalidDuration { id: String, value: String },

    #[error("Failed to parse date '{date_str}'")]
    InvalidDate { date_str: String },
}

/// Errors that can occur while building an episode page
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Episode not found: {slug}")]
    NotFound { slug: String },
}
