// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Music search and audio resolution.
//!
//! A free-text query is first resolved to a YouTube URL through the popcat
//! search API, then the ytmp3 downloader turns that URL into a direct
//! audio link. Queries that already look like YouTube URLs skip the
//! search step.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use nimbus_core::NimbusError;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_SEARCH_BASE: &str = "https://api.popcat.xyz";
const DEFAULT_RESOLVE_BASE: &str = "https://bk9.fun";

/// A resolved track ready to send as an audio message.
#[derive(Debug, Clone)]
pub struct Track {
    pub title: String,
    pub thumbnail: Option<String>,
    pub audio_url: String,
    pub filesize: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    filesize: Option<String>,
}

/// Client for the music search and download services.
#[derive(Debug, Clone)]
pub struct MusicClient {
    client: reqwest::Client,
    search_base: String,
    resolve_base: String,
}

impl Default for MusicClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MusicClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            search_base: DEFAULT_SEARCH_BASE.to_string(),
            resolve_base: DEFAULT_RESOLVE_BASE.to_string(),
        }
    }

    #[cfg(test)]
    fn with_bases(mut self, search: String, resolve: String) -> Self {
        self.search_base = search;
        self.resolve_base = resolve;
        self
    }

    /// Resolve a query (song name or YouTube URL) to a playable [`Track`].
    pub async fn resolve(&self, query: &str) -> Result<Track, NimbusError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(NimbusError::Validation("Give me a song to search for".into()));
        }

        let youtube_url = if is_youtube_url(query) {
            query.to_string()
        } else {
            self.search(query).await?
        };

        debug!(url = %youtube_url, "resolving audio download");

        let response = self
            .client
            .get(format!("{}/download/ytmp3", self.resolve_base))
            .query(&[("url", youtube_url.as_str()), ("type", "mp3")])
            .timeout(RESOLVE_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error("audio resolution", e, RESOLVE_TIMEOUT))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NimbusError::api(format!(
                "audio service returned {status}"
            )));
        }

        let parsed: ResolveResponse = response.json().await.map_err(|e| NimbusError::Api {
            message: format!("failed to parse audio response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let audio_url = parsed
            .audio_url
            .ok_or_else(|| NimbusError::api("Audio URL not found"))?;

        Ok(Track {
            title: parsed.title.unwrap_or_else(|| "Unknown".to_string()),
            thumbnail: parsed.thumbnail,
            audio_url,
            filesize: parsed.filesize,
        })
    }

    async fn search(&self, query: &str) -> Result<String, NimbusError> {
        debug!(query, "searching for track");

        let response = self
            .client
            .get(format!("{}/search", self.search_base))
            .query(&[("q", query)])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error("music search", e, SEARCH_TIMEOUT))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NimbusError::api(format!(
                "search service returned {status}"
            )));
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| NimbusError::Api {
            message: format!("failed to parse search response: {e}"),
            source: Some(Box::new(e)),
        })?;

        parsed
            .results
            .into_iter()
            .find_map(|r| r.url)
            .ok_or_else(|| NimbusError::api("No YouTube results found"))
    }
}

fn is_youtube_url(query: &str) -> bool {
    query.contains("youtube.com") || query.contains("youtu.be")
}

fn transport_error(operation: &str, error: reqwest::Error, timeout: Duration) -> NimbusError {
    if error.is_timeout() {
        NimbusError::Timeout { duration: timeout }
    } else {
        NimbusError::Api {
            message: format!("{operation} failed: {error}"),
            source: Some(Box::new(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn youtube_urls_are_detected() {
        assert!(is_youtube_url("https://youtube.com/watch?v=abc"));
        assert!(is_youtube_url("https://youtu.be/abc"));
        assert!(!is_youtube_url("drake hotline bling"));
    }

    #[tokio::test]
    async fn free_text_query_searches_then_resolves() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "test song"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{ "title": "Test Song", "url": "https://youtube.com/watch?v=x1" }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/download/ytmp3"))
            .and(query_param("url", "https://youtube.com/watch?v=x1"))
            .and(query_param("type", "mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": "Test Song",
                "thumbnail": "https://cdn.example/t.jpg",
                "audio_url": "https://cdn.example/t.mp3",
                "filesize": "3.2 MB"
            })))
            .mount(&server)
            .await;

        let client = MusicClient::new().with_bases(server.uri(), server.uri());
        let track = client.resolve("test song").await.expect("track");
        assert_eq!(track.title, "Test Song");
        assert_eq!(track.audio_url, "https://cdn.example/t.mp3");
    }

    #[tokio::test]
    async fn direct_url_skips_search() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/download/ytmp3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audio_url": "https://cdn.example/d.mp3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = MusicClient::new().with_bases(server.uri(), server.uri());
        let track = client
            .resolve("https://youtu.be/direct")
            .await
            .expect("track");
        assert_eq!(track.title, "Unknown");
        assert_eq!(track.audio_url, "https://cdn.example/d.mp3");
    }

    #[tokio::test]
    async fn empty_search_results_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })),
            )
            .mount(&server)
            .await;

        let client = MusicClient::new().with_bases(server.uri(), server.uri());
        let err = client.resolve("nothing here").await.unwrap_err();
        assert!(err.to_string().contains("No YouTube results"), "got: {err}");
    }

    #[tokio::test]
    async fn missing_audio_url_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/download/ytmp3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": "No Audio"
            })))
            .mount(&server)
            .await;

        let client = MusicClient::new().with_bases(server.uri(), server.uri());
        let err = client.resolve("https://youtu.be/x").await.unwrap_err();
        assert!(err.to_string().contains("Audio URL not found"), "got: {err}");
    }
}
