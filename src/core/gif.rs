//! Tenor GIF search pass-through.
//!
//! A stateless HTTP call with no retry or caching; activating a result just
//! copies the GIF URL, so everything downstream is the ordinary text path.

use std::collections::HashMap;
use std::sync::OnceLock;

use reqwest::Client;
use serde::Deserialize;

use crate::shared::errors::{CommandError, CommandResult};
use crate::shared::types::GifResult;

const TENOR_ENDPOINT: &str = "https://tenor.googleapis.com/v2/search";
const RESULT_LIMIT: usize = 20;

static HTTP: OnceLock<Client> = OnceLock::new();

fn http() -> &'static Client {
    HTTP.get_or_init(Client::new)
}

#[derive(Debug, Deserialize)]
struct TenorResponse {
    #[serde(default)]
    results: Vec<TenorGif>,
}

#[derive(Debug, Deserialize)]
struct TenorGif {
    #[serde(default)]
    content_description: Option<String>,
    #[serde(default)]
    media_formats: HashMap<String, TenorMedia>,
}

#[derive(Debug, Deserialize)]
struct TenorMedia {
    url: String,
}

impl TenorGif {
    fn format_url(&self, format: &str) -> Option<&str> {
        self.media_formats.get(format).map(|media| media.url.as_str())
    }

    fn into_result(self) -> Option<GifResult> {
        let url = self
            .format_url("tinygif")
            .or_else(|| self.format_url("gif"))?
            .to_string();
        let preview_url = self
            .format_url("nanogif")
            .or_else(|| self.format_url("tinygif"))
            .unwrap_or(&url)
            .to_string();
        Some(GifResult {
            url,
            preview_url,
            description: self.content_description,
        })
    }
}

/// Search Tenor for GIFs matching `query`.
pub async fn search_gifs(api_key: &str, query: &str) -> CommandResult<Vec<GifResult>> {
    if api_key.is_empty() {
        return Err(CommandError::FeatureMissing(
            "Set a Tenor API key in preferences to enable GIF search.".to_string(),
        ));
    }
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let url = format!(
        "{}?q={}&key={}&limit={}&media_filter=nanogif,tinygif,gif",
        TENOR_ENDPOINT,
        urlencoding::encode(query),
        api_key,
        RESULT_LIMIT
    );
    let response = http().get(&url).send().await?.error_for_status()?;
    let parsed: TenorResponse = response.json().await?;
    Ok(parsed
        .results
        .into_iter()
        .filter_map(TenorGif::into_result)
        .collect())
}
