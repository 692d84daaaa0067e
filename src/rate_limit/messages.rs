use axum::http::HeaderMap;
use serde::Deserialize;

/// Languages the site is published in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Italian => "it",
            Language::English => "en",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split('-').next()?.trim();
        if primary.eq_ignore_ascii_case("it") {
            Some(Language::Italian)
        } else if primary.eq_ignore_ascii_case("en") {
            Some(Language::English)
        } else {
            None
        }
    }

    /// First supported language in `Accept-Language` order, else `default`.
    /// Quality weights are not ranked.
    pub fn negotiate(headers: &HeaderMap, default: Language) -> Language {
        headers
            .get("accept-language")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| {
                value
                    .split(',')
                    .filter_map(|entry| entry.split(';').next())
                    .find_map(Language::from_tag)
            })
            .unwrap_or(default)
    }

    /// Body of the 429 response
    pub fn too_many_requests(&self) -> &'static str {
        match self {
            Language::Italian => "Troppe richieste. Riprova tra qualche minuto.",
            Language::English => "Too many requests, try again in a few minutes.",
        }
    }
}
