use crate::config::ReviewsConfig;
use crate::domain::{CarListing, CarMake, CarModel, Dealership, NewReview, Review};
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Arc;

pub mod model;
pub mod mongo;
pub mod sqlite;

// repositories are shared between handlers, so every implementation must be Send + Sync.
// both drivers (mongodb::Client, sqlx::Pool) are cheap to clone and thread safe.
// generic operations live here, backend specifics in "mongo.rs" and "sqlite.rs"
#[async_trait]
pub trait DealershipRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Dealership>>;
    async fn get_by_state(&self, state: &str) -> Result<Vec<Dealership>>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Dealership>>;

    // wipes the collection and bulk inserts the given documents, returns the inserted count
    async fn replace_all(&self, dealerships: &[Dealership]) -> Result<u64>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Review>>;
    async fn get_by_dealership(&self, dealership: i64) -> Result<Vec<Review>>;

    async fn replace_all(&self, reviews: &[Review]) -> Result<u64>;

    /// Persists a review under the next free id.
    ///
    /// Id assignment must be atomic with respect to other inserts: two concurrent callers
    /// never receive the same id.
    async fn insert(&self, review: NewReview) -> Result<Review>;
}

#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Every model joined with its make's name, ordered by model id.
    async fn get_catalog(&self) -> Result<Vec<CarListing>>;
    async fn get_models(&self) -> Result<Vec<CarModel>>;

    // swaps both makes and models, returns the inserted model count
    async fn replace_catalog(&self, makes: &[CarMake], models: &[CarModel]) -> Result<u64>;
}

#[derive(Clone)]
pub struct Repositories {
    pub dealerships: Arc<dyn DealershipRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub cars: Arc<dyn CarRepository>,
}

impl Repositories {
    pub fn new<R>(repo: R) -> Self
    where
        R: DealershipRepository + ReviewRepository + CarRepository + 'static,
    {
        let repo = Arc::new(repo);
        Self {
            dealerships: repo.clone(),
            reviews: repo.clone(),
            cars: repo,
        }
    }
}

/// Opens the store named by `DATABASE_URL`, picking the backend from the url scheme.
pub async fn connect(config: &ReviewsConfig) -> Result<Repositories> {
    let url = config.database_url.as_str();

    if url.starts_with("mongodb://") || url.starts_with("mongodb+srv://") {
        let repo = mongo::MongoRepository::connect(
            url,
            &config.database_name,
            config.max_connections,
        )
        .await?;
        return Ok(Repositories::new(repo));
    }

    if url.starts_with("sqlite:") {
        let repo = sqlite::SqliteRepository::connect(url, config.max_connections).await?;
        return Ok(Repositories::new(repo));
    }

    bail!("Unsupported DATABASE_URL scheme: {}", url)
}
