use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

pub mod seed;

#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    /// Classifies a piece of review text, e.g. "positive", "neutral" or "negative".
    async fn analyze(&self, text: &str) -> Result<String>;
}

#[derive(Deserialize)]
struct SentimentResponse {
    sentiment: String,
}

// talks to the sentiment microservice: GET {base_url}analyze/{text}
pub struct HttpSentimentAnalyzer {
    client: Client,
    base_url: Url,
}

impl HttpSentimentAnalyzer {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid analyzer url {}", base_url))?;

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn analyze_url(&self, text: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Analyzer url {} cannot be a base", self.base_url))?
            .pop_if_empty()
            .push("analyze")
            .push(text);
        Ok(url)
    }
}

#[async_trait]
impl SentimentAnalyzer for HttpSentimentAnalyzer {
    async fn analyze(&self, text: &str) -> Result<String> {
        let url = self.analyze_url(text)?;
        let res = self.client.get(url).send().await;

        match res {
            Ok(response) if response.status().is_success() => {
                let body: SentimentResponse = response.json().await?;
                Ok(body.sentiment)
            }
            Ok(response) => {
                anyhow::bail!("Sentiment analyzer rejected request. Status: {}", response.status());
            }
            Err(e) => {
                anyhow::bail!("Failed to connect to sentiment analyzer: {}", e);
            }
        }
    }
}
