// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-logo generation through the davidcyriltech logo API.
//!
//! Styles are a fixed table; lookups are case-insensitive on the style
//! name while the upstream path segment keeps its original casing.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use nimbus_core::NimbusError;

const LOGO_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_BASE_URL: &str = "https://api.davidcyriltech.my.id";

/// Maximum text length the logo renderer accepts.
pub const MAX_LOGO_TEXT: usize = 50;

/// Style name (lowercase key) paired with the upstream path segment.
const LOGO_STYLES: &[(&str, &str)] = &[
    ("blackpink", "blackpink"),
    ("glossysilver", "glossysilver"),
    ("naruto", "Naruto"),
    ("digitalglitch", "digitalglitch"),
    ("pixelglitch", "pixelglitch"),
    ("water", "water"),
    ("bulb", "bulb"),
    ("zodiac", "zodiac"),
    ("water3d", "water3D"),
    ("dragonfire", "dragonfire"),
    ("bokeh", "bokeh"),
    ("queencard", "Queencard"),
    ("birthdaycake", "birthdaycake"),
    ("underwater", "underwater"),
    ("glow", "glow"),
    ("wetglass", "wetglass"),
    ("graffiti", "graffiti"),
    ("halloween", "halloween"),
    ("luxury", "luxury"),
    ("avatar", "avatar"),
    ("blood", "blood"),
    ("hacker", "hacker"),
    ("paint", "paint"),
    ("rotation", "rotation"),
    ("graffiti2", "graffiti2"),
    ("typography", "typography"),
    ("horror", "horror"),
    ("valentine", "valentine"),
    ("team", "team"),
    ("gold", "gold"),
    ("pentakill", "pentakill"),
    ("galaxy", "galaxy"),
    ("birthdayflower", "birthdayflower"),
    ("pubg", "pubg"),
    ("sand3d", "sand3D"),
    ("wall", "wall"),
    ("womensday", "womensday"),
    ("thunder", "thunder"),
    ("snow", "snow"),
    ("textlight", "textlight"),
    ("sand", "sand"),
];

/// Curated style groupings shown by the logo browse menu.
pub fn logo_categories() -> &'static [(&'static str, &'static [&'static str])] {
    &[
        ("popular", &["blackpink", "glow", "naruto", "hacker", "luxury", "avatar"]),
        ("water", &["water", "water3d", "underwater", "wetglass", "bulb"]),
        ("glow", &["glossysilver", "gold", "textlight", "bokeh"]),
        ("creative", &["graffiti", "paint", "typography", "rotation", "digitalglitch"]),
        ("backgrounds", &["galaxy", "blood", "snow", "thunder", "sand", "wall"]),
        ("special", &["birthdaycake", "halloween", "valentine", "pubg", "zodiac", "team"]),
    ]
}

/// All style names in table order.
pub fn logo_styles() -> Vec<&'static str> {
    LOGO_STYLES.iter().map(|(name, _)| *name).collect()
}

/// Number of available styles.
pub fn logo_style_count() -> usize {
    LOGO_STYLES.len()
}

/// Look up the upstream path segment for a style name.
pub fn logo_style_segment(style: &str) -> Option<&'static str> {
    let lower = style.to_lowercase();
    LOGO_STYLES
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, segment)| *segment)
}

/// Error message for an unrecognized style, listing the first ten styles.
pub fn invalid_style_message() -> String {
    let preview: Vec<&str> = logo_styles().into_iter().take(10).collect();
    format!(
        "Invalid logo style!\n\nAvailable: {}...\n\nUse the logo command without arguments to see all.",
        preview.join(", ")
    )
}

#[derive(Debug, Deserialize)]
struct LogoResponse {
    result: Option<LogoResult>,
}

#[derive(Debug, Deserialize)]
struct LogoResult {
    url: Option<String>,
}

/// Client for the logo rendering API.
#[derive(Debug, Clone)]
pub struct LogoClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for LogoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LogoClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Render `text` in `style` and return the image URL.
    pub async fn generate(&self, style: &str, text: &str) -> Result<String, NimbusError> {
        let segment = logo_style_segment(style)
            .ok_or_else(|| NimbusError::Validation(invalid_style_message()))?;

        if text.trim().is_empty() {
            return Err(NimbusError::Validation("Please provide text!".into()));
        }
        if text.len() > MAX_LOGO_TEXT {
            return Err(NimbusError::Validation(format!(
                "Text too long! Maximum {MAX_LOGO_TEXT} characters.\n\nYour text: {} characters",
                text.len()
            )));
        }

        debug!(style, text, "requesting logo render");

        let response = self
            .client
            .get(format!("{}/logo/{segment}", self.base_url))
            .query(&[("text", text)])
            .timeout(LOGO_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NimbusError::Timeout {
                        duration: LOGO_TIMEOUT,
                    }
                } else {
                    NimbusError::Api {
                        message: format!("logo request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NimbusError::api(format!(
                "logo service returned {status}"
            )));
        }

        let parsed: LogoResponse = response.json().await.map_err(|e| NimbusError::Api {
            message: format!("failed to parse logo response: {e}"),
            source: Some(Box::new(e)),
        })?;

        parsed
            .result
            .and_then(|r| r.url)
            .ok_or_else(|| NimbusError::api("logo service returned no image URL"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn table_has_expected_size_and_casing() {
        assert_eq!(logo_style_count(), 41);
        assert_eq!(logo_style_segment("naruto"), Some("Naruto"));
        assert_eq!(logo_style_segment("WATER3D"), Some("water3D"));
        assert_eq!(logo_style_segment("nope"), None);
    }

    #[test]
    fn categories_only_reference_known_styles() {
        for (_, styles) in logo_categories() {
            for style in *styles {
                assert!(logo_style_segment(style).is_some(), "unknown style {style}");
            }
        }
    }

    #[test]
    fn invalid_style_message_lists_ten() {
        let msg = invalid_style_message();
        assert!(msg.contains("blackpink"));
        assert!(msg.contains("dragonfire"));
        assert!(!msg.contains("bokeh"), "only the first ten belong: {msg}");
    }

    #[tokio::test]
    async fn generate_returns_image_url() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/logo/glow"))
            .and(query_param("text", "Nimbus Bot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": { "url": "https://cdn.example/logo.png" }
            })))
            .mount(&server)
            .await;

        let client = LogoClient::new().with_base_url(server.uri());
        let url = client.generate("glow", "Nimbus Bot").await.expect("logo");
        assert_eq!(url, "https://cdn.example/logo.png");
    }

    #[tokio::test]
    async fn generate_rejects_long_text_locally() {
        let client = LogoClient::new().with_base_url("http://unused".into());
        let long = "x".repeat(51);
        let err = client.generate("glow", &long).await.unwrap_err();
        assert!(matches!(err, NimbusError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_result_url_is_an_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/logo/glow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = LogoClient::new().with_base_url(server.uri());
        let err = client.generate("glow", "hi").await.unwrap_err();
        assert!(err.to_string().contains("no image URL"), "got: {err}");
    }
}
