use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::PopupError;
use crate::models::{Movie, SimilarMovies};
use crate::tconst::Tconst;

const USER_AGENT: &str = "reelkin/0.1.0";

/// Hosted recommendation service. A local server can be selected with
/// `--base-url http://127.0.0.1:5000`.
pub const DEFAULT_BASE_URL: &str = "https://33sd.ngrok.io";

pub fn build_http() -> reqwest::Result<Client> {
    Client::builder().user_agent(USER_AGENT).build()
}

#[async_trait]
pub trait MetadataFetch {
    async fn fetch_movie(&self, tconst: &Tconst) -> Result<Movie, PopupError>;
}

#[async_trait]
pub trait SimilarityFetch {
    async fn fetch_similar(
        &self,
        tconst: &Tconst,
        limit: u32,
    ) -> Result<SimilarMovies, PopupError>;
}

/// Fetches base movie info from `GET {base}/movie`.
pub struct MetadataClient {
    client: Client,
    base_url: String,
}

impl MetadataClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MetadataFetch for MetadataClient {
    async fn fetch_movie(&self, tconst: &Tconst) -> Result<Movie, PopupError> {
        let url = format!("{}/movie", self.base_url);
        debug!("GET {} tconst={}", url, tconst);

        let body = self
            .client
            .get(&url)
            .query(&[("tconst", tconst.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        serde_json::from_str(&body).map_err(|e| PopupError::MalformedResponse(e.to_string()))
    }
}

/// Fetches the ranked similar-movie lists from `GET {base}/similar`.
pub struct SimilarityClient {
    client: Client,
    base_url: String,
}

impl SimilarityClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SimilarityFetch for SimilarityClient {
    async fn fetch_similar(
        &self,
        tconst: &Tconst,
        limit: u32,
    ) -> Result<SimilarMovies, PopupError> {
        let url = format!("{}/similar", self.base_url);
        debug!("GET {} tconst={} limit={}", url, tconst, limit);

        let limit = limit.to_string();
        let body = self
            .client
            .get(&url)
            .query(&[("tconst", tconst.as_str()), ("limit", limit.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        serde_json::from_str(&body).map_err(|e| PopupError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port, so the connection is refused
    // before any HTTP exchange happens.
    const UNREACHABLE_BASE: &str = "http://127.0.0.1:9";

    #[tokio::test]
    async fn transport_failure_is_a_network_error() {
        let client = MetadataClient::new(build_http().unwrap(), UNREACHABLE_BASE);
        let tconst = Tconst::parse("tt1375666").unwrap();

        let err = client.fetch_movie(&tconst).await.unwrap_err();
        assert!(matches!(err, PopupError::Network(_)));
    }

    #[tokio::test]
    async fn similarity_transport_failure_is_a_network_error() {
        let client = SimilarityClient::new(build_http().unwrap(), UNREACHABLE_BASE);
        let tconst = Tconst::parse("tt1375666").unwrap();

        let err = client.fetch_similar(&tconst, 20).await.unwrap_err();
        assert!(matches!(err, PopupError::Network(_)));
    }
}
