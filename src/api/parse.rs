// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::format::{duration_to_time_string, format_published_at, parse_published_at};

/// An episode record as served by the API
#[derive(Debug, Clone, Deserialize)]
pub struct RawEpisode {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub members: String,
    pub published_at: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub description: String,
    pub file: RawFile,
}

/// The audio file attached to a raw episode record
#[derive(Debug, Clone, Deserialize)]
pub struct RawFile {
    pub url: String,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub duration: String,
}

/// A playable episode, normalised for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub members: String,
    pub description: String,
    /// Duration in seconds
    pub duration: u64,
    pub duration_as_string: String,
    pub url: String,
    pub published_at: String,
}

impl TryFrom<RawEpisode> for Episode {
    type Error = ApiError;

    fn try_from(raw: RawEpisode) -> Result<Self, Self::Error> {
        let duration = parse_duration(&raw.file.duration).ok_or_else(|| ApiError::InvalidDuration {
            id: raw.id.clone(),
            value: raw.file.duration.clone(),
        })?;
        let published_at = format_published_at(&parse_published_at(&raw.published_at)?);

        Ok(Episode {
            id: raw.id,
            title: raw.title,
            thumbnail: raw.thumbnail,
            members: raw.members,
            description: raw.description,
            duration,
            duration_as_string: duration_to_time_string(duration),
            url: raw.file.url,
            published_at,
        })
    }
}

/// Parse a single raw episode record from JSON bytes
pub fn parse_episode(json: &[u8]) -> Result<RawEpisode, serde_json::Error> {
    serde_json::from_slice(json)
}

/// Parse a list of raw episode records from JSON bytes
pub fn parse_episode_list(json: &[u8]) -> Result<Vec<RawEpisode>, serde_json::Error> {
    serde_json::from_slice(json)
}

/// Durations arrive as seconds, sometimes fractional, sometimes as strings
fn parse_duration(value: &str) -> Option<u64> {
    let seconds: f64 = value.trim().parse().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(seconds.floor() as u64)
    } else {
        None
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}
