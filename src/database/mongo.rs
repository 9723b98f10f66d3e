use crate::database::{CarRepository, DealershipRepository, ReviewRepository};
use crate::domain::{CarListing, CarMake, CarModel, Dealership, NewReview, Review};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use std::collections::HashMap;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::{debug, info};

const DEALERSHIPS: &str = "dealerships";
const REVIEWS: &str = "reviews";
const COUNTERS: &str = "counters";
const CAR_MAKES: &str = "car_makes";
const CAR_MODELS: &str = "car_models";

// key of the counter document that hands out review ids
const REVIEW_COUNTER: &str = "reviews";

pub struct MongoRepository {
    db: Database,
}

impl MongoRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn connect(url: &str, database_name: &str, max_connections: u32) -> Result<Self> {
        let mut options = ClientOptions::parse(url)
            .await
            .with_context(|| format!("Invalid mongodb url {}", url))?;
        options.max_pool_size = Some(max_connections);

        let client = Client::with_options(options)
            .with_context(|| format!("Failed to create mongodb client for {}", url))?;
        let db = client.database(database_name);

        info!("Connected to mongodb database {}", database_name);

        Ok(Self::new(db))
    }

    fn dealerships(&self) -> Collection<Dealership> {
        self.db.collection(DEALERSHIPS)
    }

    fn reviews(&self) -> Collection<Review> {
        self.db.collection(REVIEWS)
    }

    fn car_makes(&self) -> Collection<CarMake> {
        self.db.collection(CAR_MAKES)
    }

    fn car_models(&self) -> Collection<CarModel> {
        self.db.collection(CAR_MODELS)
    }

    fn counters(&self) -> Collection<Document> {
        self.db.collection(COUNTERS)
    }

    async fn find_dealerships(&self, filter: Document) -> Result<Vec<Dealership>> {
        let cursor = self
            .dealerships()
            .find(filter)
            .projection(doc! { "_id": 0 })
            .sort(doc! { "id": 1 })
            .await?;

        Ok(cursor.try_collect::<Vec<_>>().await?)
    }

    async fn find_reviews(&self, filter: Document) -> Result<Vec<Review>> {
        let cursor = self
            .reviews()
            .find(filter)
            .projection(doc! { "_id": 0 })
            .sort(doc! { "id": 1 })
            .await?;

        Ok(cursor.try_collect::<Vec<_>>().await?)
    }

    // atomically bumps the review counter and returns the new value
    async fn next_review_id(&self) -> Result<i64> {
        let counter = self
            .counters()
            .find_one_and_update(
                doc! { "_id": REVIEW_COUNTER },
                doc! { "$inc": { "seq": 1_i64 } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .context("Failed to advance review counter")?
            .ok_or_else(|| anyhow!("Review counter missing after upsert"))?;

        match counter.get("seq") {
            Some(Bson::Int64(seq)) => Ok(*seq),
            Some(Bson::Int32(seq)) => Ok(i64::from(*seq)),
            other => Err(anyhow!("Unexpected review counter value: {:?}", other)),
        }
    }

    // the review id must stay unique even if something bypasses the counter.
    // only valid on an emptied collection, left over duplicates would fail the build
    async fn ensure_review_id_index(&self) -> Result<()> {
        self.reviews()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "id": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await
            .context("Failed to create unique index on reviews.id")?;

        Ok(())
    }

    async fn reset_review_counter(&self, seq: i64) -> Result<()> {
        self.counters()
            .update_one(
                doc! { "_id": REVIEW_COUNTER },
                doc! { "$set": { "seq": seq } },
            )
            .upsert(true)
            .await
            .context("Failed to reset review counter")?;

        Ok(())
    }
}

#[async_trait]
impl DealershipRepository for MongoRepository {
    async fn get_all(&self) -> Result<Vec<Dealership>> {
        self.find_dealerships(doc! {}).await
    }

    async fn get_by_state(&self, state: &str) -> Result<Vec<Dealership>> {
        self.find_dealerships(doc! { "state": state }).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Dealership>> {
        Ok(self
            .dealerships()
            .find_one(doc! { "id": id })
            .projection(doc! { "_id": 0 })
            .await?)
    }

    async fn replace_all(&self, dealerships: &[Dealership]) -> Result<u64> {
        self.dealerships()
            .delete_many(doc! {})
            .await
            .context("Failed to clear dealerships")?;

        // insert_many rejects an empty batch
        if dealerships.is_empty() {
            return Ok(0);
        }

        let result = self
            .dealerships()
            .insert_many(dealerships)
            .await
            .context("Failed to insert dealerships")?;

        Ok(result.inserted_ids.len() as u64)
    }
}

#[async_trait]
impl ReviewRepository for MongoRepository {
    async fn get_all(&self) -> Result<Vec<Review>> {
        self.find_reviews(doc! {}).await
    }

    async fn get_by_dealership(&self, dealership: i64) -> Result<Vec<Review>> {
        self.find_reviews(doc! { "dealership": dealership }).await
    }

    async fn replace_all(&self, reviews: &[Review]) -> Result<u64> {
        self.reviews()
            .delete_many(doc! {})
            .await
            .context("Failed to clear reviews")?;

        self.ensure_review_id_index().await?;

        // keep the counter in step with whatever the fixtures start from
        let max_id = reviews.iter().map(|r| r.id).max().unwrap_or(0);
        self.reset_review_counter(max_id).await?;

        if reviews.is_empty() {
            return Ok(0);
        }

        let result = self
            .reviews()
            .insert_many(reviews)
            .await
            .context("Failed to insert reviews")?;

        Ok(result.inserted_ids.len() as u64)
    }

    async fn insert(&self, review: NewReview) -> Result<Review> {
        let id = self.next_review_id().await?;
        let review = review.with_id(id);

        self.reviews()
            .insert_one(&review)
            .await
            .with_context(|| format!("Failed to insert review {}", id))?;

        debug!("Inserted review {} (dealership {})", review.id, review.dealership);

        Ok(review)
    }
}

#[async_trait]
impl CarRepository for MongoRepository {
    async fn get_catalog(&self) -> Result<Vec<CarListing>> {
        let makes: HashMap<i64, String> = self
            .car_makes()
            .find(doc! {})
            .projection(doc! { "_id": 0 })
            .await?
            .try_collect::<Vec<_>>()
            .await?
            .into_iter()
            .map(|make| (make.id, make.name))
            .collect();

        // inner join: a model whose make is gone is left out
        let catalog = self
            .get_models()
            .await?
            .into_iter()
            .filter_map(|model| {
                makes.get(&model.car_make).map(|make| CarListing {
                    car_model: model.name,
                    car_make: make.clone(),
                })
            })
            .collect();

        Ok(catalog)
    }

    async fn get_models(&self) -> Result<Vec<CarModel>> {
        let cursor = self
            .car_models()
            .find(doc! {})
            .projection(doc! { "_id": 0 })
            .sort(doc! { "id": 1 })
            .await?;

        Ok(cursor.try_collect::<Vec<_>>().await?)
    }

    async fn replace_catalog(&self, makes: &[CarMake], models: &[CarModel]) -> Result<u64> {
        self.car_models()
            .delete_many(doc! {})
            .await
            .context("Failed to clear car models")?;
        self.car_makes()
            .delete_many(doc! {})
            .await
            .context("Failed to clear car makes")?;

        if !makes.is_empty() {
            self.car_makes()
                .insert_many(makes)
                .await
                .context("Failed to insert car makes")?;
        }

        if models.is_empty() {
            return Ok(0);
        }

        let result = self
            .car_models()
            .insert_many(models)
            .await
            .context("Failed to insert car models")?;

        Ok(result.inserted_ids.len() as u64)
    }
}
