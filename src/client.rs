use crate::domain::{CarCatalog, CarListing, Dealership, NewReview, Review};
use crate::services::SentimentAnalyzer;
use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Pseudo state that stands for "every state" in dealer lookups.
pub const ALL_STATES: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedReview {
    #[serde(flatten)]
    pub review: Review,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
}

/// Typed client for the reviews API, for services sitting in front of it.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid backend url {}", base_url))?;

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Backend url {} cannot be a base", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET from {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Network error calling {}", url))?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// `"All"` lists every dealership, anything else is matched against the state field.
    pub async fn fetch_dealers(&self, state: &str) -> Result<Vec<Dealership>> {
        let url = if state == ALL_STATES {
            self.endpoint(&["fetchDealers"])?
        } else {
            self.endpoint(&["fetchDealers", state])?
        };

        self.get_json(url).await
    }

    pub async fn fetch_dealer(&self, id: i64) -> Result<Option<Dealership>> {
        let url = self.endpoint(&["fetchDealer", &id.to_string()])?;
        let dealers: Vec<Dealership> = self.get_json(url).await?;
        Ok(dealers.into_iter().next())
    }

    pub async fn fetch_dealer_reviews(&self, dealer_id: i64) -> Result<Vec<Review>> {
        let url = self.endpoint(&["fetchReviews", "dealer", &dealer_id.to_string()])?;
        self.get_json(url).await
    }

    /// Dealer reviews, each tagged with the analyzer's verdict on its text.
    ///
    /// The analyzer is best effort: a failed classification is logged and the review is
    /// returned without a sentiment.
    pub async fn fetch_dealer_reviews_with_sentiment(
        &self,
        dealer_id: i64,
        analyzer: &dyn SentimentAnalyzer,
    ) -> Result<Vec<AnnotatedReview>> {
        let reviews = self.fetch_dealer_reviews(dealer_id).await?;

        let mut annotated = Vec::with_capacity(reviews.len());
        for review in reviews {
            let sentiment = match analyzer.analyze(&review.review).await {
                Ok(sentiment) => Some(sentiment),
                Err(e) => {
                    warn!("Sentiment analysis failed for review {}: {:#}", review.id, e);
                    None
                }
            };
            annotated.push(AnnotatedReview { review, sentiment });
        }

        Ok(annotated)
    }

    pub async fn fetch_cars(&self) -> Result<Vec<CarListing>> {
        let url = self.endpoint(&["fetchCars"])?;
        let catalog: CarCatalog = self.get_json(url).await?;
        Ok(catalog.car_models)
    }

    pub async fn post_review(&self, review: &NewReview) -> Result<Review> {
        let url = self.endpoint(&["insert_review"])?;
        debug!("POST to {}", url);

        let response = self
            .client
            .post(url.clone())
            .json(review)
            .send()
            .await
            .with_context(|| format!("Network error calling {}", url))?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}
