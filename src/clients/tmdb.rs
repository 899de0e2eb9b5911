use anyhow::Result;
use reqwest::Client;
use serde_json::Value;

use crate::config::TmdbConfig;

/// Thin client for the third-party movie catalog. Responses are passed
/// through verbatim as JSON; no mapping layer.
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &TmdbConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut query: Vec<(&str, &str)> = vec![("api_key", self.api_key.as_str())];
        query.extend_from_slice(params);

        let response = self.client.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("TMDB API error: {} - {}", status, body));
        }

        Ok(response.json().await?)
    }

    pub async fn search_movies(&self, query: &str, page: u32) -> Result<Value> {
        let page = page.to_string();
        self.get_json("/search/movie", &[("query", query), ("page", page.as_str())])
            .await
    }

    /// Movie details with credits and similar titles appended.
    /// Returns `None` when the catalog does not know the id.
    pub async fn movie_details(&self, movie_id: &str) -> Result<Option<Value>> {
        let url = format!("{}/movie/{}", self.base_url, movie_id);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("append_to_response", "credits,similar"),
            ])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("TMDB API error: {} - {}", status, body));
        }

        Ok(Some(response.json().await?))
    }

    pub async fn popular_movies(&self) -> Result<Value> {
        self.get_json("/movie/popular", &[("page", "1")]).await
    }

    pub async fn trending_this_week(&self) -> Result<Value> {
        self.get_json("/trending/movie/week", &[]).await
    }
}
