use crate::database::model::{DbCarModel, DbDealership, DbReview};
use crate::database::{CarRepository, DealershipRepository, ReviewRepository};
use crate::domain::{CarListing, CarMake, CarModel, Dealership, NewReview, Review};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

const REVIEW_COLUMNS: &str =
    "id, name, dealership, review, purchase, purchase_date, car_make, car_model, car_year";

const DEALERSHIP_COLUMNS: &str =
    "id, city, state, st, address, zip, short_name, full_name, extra";

const CAR_MODEL_COLUMNS: &str = "id, car_make, name, type, year";

pub struct SqliteRepository {
    pool: Pool<Sqlite>,
}

impl SqliteRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `url` and brings its schema up to date.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid sqlite url {}", url))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);

        // an in-memory database lives exactly as long as its connection
        if url.contains(":memory:") {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to create pool on {}", url))?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        info!("Connected to sqlite at {}", url);

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl DealershipRepository for SqliteRepository {
    async fn get_all(&self) -> Result<Vec<Dealership>> {
        let rows = sqlx::query_as::<_, DbDealership>(&format!(
            "SELECT {} FROM dealerships ORDER BY id",
            DEALERSHIP_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Dealership::try_from).collect()
    }

    async fn get_by_state(&self, state: &str) -> Result<Vec<Dealership>> {
        // `=` on TEXT is case sensitive under sqlite's default BINARY collation
        let rows = sqlx::query_as::<_, DbDealership>(&format!(
            "SELECT {} FROM dealerships WHERE state = ? ORDER BY id",
            DEALERSHIP_COLUMNS
        ))
        .bind(state)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Dealership::try_from).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Dealership>> {
        let row = sqlx::query_as::<_, DbDealership>(&format!(
            "SELECT {} FROM dealerships WHERE id = ?",
            DEALERSHIP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Dealership::try_from).transpose()
    }

    async fn replace_all(&self, dealerships: &[Dealership]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM dealerships")
            .execute(&mut *tx)
            .await
            .context("Failed to clear dealerships")?;

        for dealership in dealerships {
            let row: DbDealership = dealership.into();
            sqlx::query(&format!(
                "INSERT INTO dealerships ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                DEALERSHIP_COLUMNS
            ))
            .bind(row.id)
            .bind(&row.city)
            .bind(&row.state)
            .bind(&row.st)
            .bind(&row.address)
            .bind(&row.zip)
            .bind(&row.short_name)
            .bind(&row.full_name)
            .bind(&row.extra)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert {}", row))?;
        }

        tx.commit().await?;

        Ok(dealerships.len() as u64)
    }
}

#[async_trait]
impl ReviewRepository for SqliteRepository {
    async fn get_all(&self) -> Result<Vec<Review>> {
        let rows = sqlx::query_as::<_, DbReview>(&format!(
            "SELECT {} FROM reviews ORDER BY id",
            REVIEW_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn get_by_dealership(&self, dealership: i64) -> Result<Vec<Review>> {
        let rows = sqlx::query_as::<_, DbReview>(&format!(
            "SELECT {} FROM reviews WHERE dealership = ? ORDER BY id",
            REVIEW_COLUMNS
        ))
        .bind(dealership)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn replace_all(&self, reviews: &[Review]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM reviews")
            .execute(&mut *tx)
            .await
            .context("Failed to clear reviews")?;

        for review in reviews {
            let row: DbReview = review.into();
            sqlx::query(&format!(
                "INSERT INTO reviews ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                REVIEW_COLUMNS
            ))
            .bind(row.id)
            .bind(&row.name)
            .bind(row.dealership)
            .bind(&row.review)
            .bind(row.purchase)
            .bind(&row.purchase_date)
            .bind(&row.car_make)
            .bind(&row.car_model)
            .bind(row.car_year)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert {}", row))?;
        }

        tx.commit().await?;

        Ok(reviews.len() as u64)
    }

    async fn insert(&self, review: NewReview) -> Result<Review> {
        // the next id is computed inside the INSERT itself. sqlite runs one writer at a time,
        // so no other insert can observe the same MAX(id) in between
        let row = sqlx::query_as::<_, DbReview>(&format!(
            r#"
            INSERT INTO reviews ({columns})
            SELECT COALESCE(MAX(id), 0) + 1, ?, ?, ?, ?, ?, ?, ?, ? FROM reviews
            RETURNING {columns}
            "#,
            columns = REVIEW_COLUMNS
        ))
        .bind(&review.name)
        .bind(review.dealership)
        .bind(&review.review)
        .bind(review.purchase)
        .bind(&review.purchase_date)
        .bind(&review.car_make)
        .bind(&review.car_model)
        .bind(review.car_year)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert review")?;

        debug!("Inserted {}", row);

        Ok(row.into())
    }
}

#[async_trait]
impl CarRepository for SqliteRepository {
    async fn get_catalog(&self) -> Result<Vec<CarListing>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT car_models.name, car_makes.name
            FROM car_models
            JOIN car_makes ON car_makes.id = car_models.car_make
            ORDER BY car_models.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(car_model, car_make)| CarListing {
                car_model,
                car_make,
            })
            .collect())
    }

    async fn get_models(&self) -> Result<Vec<CarModel>> {
        let rows = sqlx::query_as::<_, DbCarModel>(&format!(
            "SELECT {} FROM car_models ORDER BY id",
            CAR_MODEL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CarModel::try_from).collect()
    }

    async fn replace_catalog(&self, makes: &[CarMake], models: &[CarModel]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        // models first, they reference makes
        sqlx::query("DELETE FROM car_models")
            .execute(&mut *tx)
            .await
            .context("Failed to clear car models")?;
        sqlx::query("DELETE FROM car_makes")
            .execute(&mut *tx)
            .await
            .context("Failed to clear car makes")?;

        for make in makes {
            sqlx::query("INSERT INTO car_makes (id, name, description) VALUES (?, ?, ?)")
                .bind(make.id)
                .bind(&make.name)
                .bind(&make.description)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert car make {}", make.id))?;
        }

        for model in models {
            let row: DbCarModel = model.into();
            sqlx::query(&format!(
                "INSERT INTO car_models ({}) VALUES (?, ?, ?, ?, ?)",
                CAR_MODEL_COLUMNS
            ))
            .bind(row.id)
            .bind(row.car_make)
            .bind(&row.name)
            .bind(&row.car_type)
            .bind(row.year)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert {}", row))?;
        }

        tx.commit().await?;

        Ok(models.len() as u64)
    }
}
