use crate::database::Repositories;
use crate::domain::{CarMake, CarModel, Dealership, Review, check_car_catalog};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

pub const REVIEWS_FIXTURE: &str = "reviews.json";
pub const DEALERSHIPS_FIXTURE: &str = "dealerships.json";
pub const CARS_FIXTURE: &str = "cars.json";

#[derive(Deserialize)]
struct ReviewsFile {
    reviews: Vec<Review>,
}

#[derive(Deserialize)]
struct DealershipsFile {
    dealerships: Vec<Dealership>,
}

#[derive(Deserialize)]
struct CarsFile {
    #[serde(default)]
    car_makes: Vec<CarMake>,
    #[serde(default)]
    car_models: Vec<CarModel>,
}

/// Initial collection contents, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    pub reviews: Vec<Review>,
    pub dealerships: Vec<Dealership>,
    pub car_makes: Vec<CarMake>,
    pub car_models: Vec<CarModel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub reviews: u64,
    pub dealerships: u64,
    pub car_models: u64,
}

impl Fixtures {
    /// Reads `reviews.json` and `dealerships.json` from `dir`, plus `cars.json` when present.
    pub fn load(dir: &Path) -> Result<Self> {
        let reviews_path = dir.join(REVIEWS_FIXTURE);
        let reviews_json = std::fs::read_to_string(&reviews_path)
            .with_context(|| format!("Unable to read fixture {}", reviews_path.display()))?;

        let dealerships_path = dir.join(DEALERSHIPS_FIXTURE);
        let dealerships_json = std::fs::read_to_string(&dealerships_path)
            .with_context(|| format!("Unable to read fixture {}", dealerships_path.display()))?;

        let reviews = Self::parse_reviews(&reviews_json)
            .with_context(|| format!("Malformed fixture {}", reviews_path.display()))?;
        let dealerships = Self::parse_dealerships(&dealerships_json)
            .with_context(|| format!("Malformed fixture {}", dealerships_path.display()))?;

        let cars_path = dir.join(CARS_FIXTURE);
        let (car_makes, car_models) = if cars_path.exists() {
            let cars_json = std::fs::read_to_string(&cars_path)
                .with_context(|| format!("Unable to read fixture {}", cars_path.display()))?;
            Self::parse_cars(&cars_json)
                .with_context(|| format!("Malformed fixture {}", cars_path.display()))?
        } else {
            warn!("No {} found, car catalog stays empty", cars_path.display());
            (Vec::new(), Vec::new())
        };

        Ok(Self {
            reviews,
            dealerships,
            car_makes,
            car_models,
        })
    }

    // `{"reviews": [...]}`
    pub fn parse_reviews(json: &str) -> Result<Vec<Review>> {
        let file: ReviewsFile = serde_json::from_str(json)?;
        Ok(file.reviews)
    }

    // `{"dealerships": [...]}`
    pub fn parse_dealerships(json: &str) -> Result<Vec<Dealership>> {
        let file: DealershipsFile = serde_json::from_str(json)?;
        Ok(file.dealerships)
    }

    // `{"car_makes": [...], "car_models": [...]}`, models must reference a listed make
    pub fn parse_cars(json: &str) -> Result<(Vec<CarMake>, Vec<CarModel>)> {
        let file: CarsFile = serde_json::from_str(json)?;
        check_car_catalog(&file.car_makes, &file.car_models)?;
        Ok((file.car_makes, file.car_models))
    }
}

/// Clears every collection and repopulates them from the fixtures.
///
/// Runs as one awaited sequence, the first failure is returned to the caller.
pub async fn seed_database(repos: &Repositories, fixtures: &Fixtures) -> Result<SeedReport> {
    info!("Seeding reviews...");
    let reviews = repos
        .reviews
        .replace_all(&fixtures.reviews)
        .await
        .context("Failed to seed reviews")?;

    info!("Seeding dealerships...");
    let dealerships = repos
        .dealerships
        .replace_all(&fixtures.dealerships)
        .await
        .context("Failed to seed dealerships")?;

    info!("Seeding car catalog...");
    let car_models = repos
        .cars
        .replace_catalog(&fixtures.car_makes, &fixtures.car_models)
        .await
        .context("Failed to seed car catalog")?;

    info!(
        "Seed complete: {} reviews, {} dealerships, {} car models.",
        reviews, dealerships, car_models
    );

    Ok(SeedReport {
        reviews,
        dealerships,
        car_models,
    })
}
