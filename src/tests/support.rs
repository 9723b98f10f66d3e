use crate::AppState;
use crate::config::ReviewsConfig;
use crate::database::Repositories;
use crate::database::sqlite::SqliteRepository;
use crate::domain::NewReview;
use crate::services::seed::{Fixtures, seed_database};
use axum::response::Response;
use std::path::PathBuf;
use std::sync::Arc;

// five reviews (max id 5) over four dealerships. dealership 3 sits in "texas",
// lowercase on purpose, to catch case-insensitive state matching
pub const TEST_REVIEWS: &str = r#"{
  "reviews": [
    {"id": 1, "name": "Berkly Shepley", "dealership": 1, "review": "Total grid-enabled service-desk", "purchase": true, "purchase_date": "07/11/2020", "car_make": "Audi", "car_model": "A6", "car_year": 2010},
    {"id": 2, "name": "Gwenora Zettoi", "dealership": 2, "review": "Future-proofed foreground capability", "purchase": true, "purchase_date": "09/17/2020", "car_make": "Pontiac", "car_model": "Firebird", "car_year": 1995},
    {"id": 3, "name": "Jenny Fretwell", "dealership": 1, "review": "Polished neutral analyzer", "purchase": false, "purchase_date": "", "car_make": "", "car_model": "", "car_year": 0},
    {"id": 4, "name": "Carlyn Bursell", "dealership": 4, "review": "Reduced zero tolerance hierarchy", "purchase": true, "purchase_date": "01/28/2021", "car_make": "Toyota", "car_model": "Corolla", "car_year": 2018},
    {"id": 5, "name": "Hakim Ridde", "dealership": 3, "review": "Great customer service", "purchase": true, "purchase_date": "03/02/2021", "car_make": "Honda", "car_model": "Civic", "car_year": 2019}
  ]
}"#;

pub const TEST_DEALERSHIPS: &str = r#"{
  "dealerships": [
    {"id": 1, "city": "El Paso", "state": "Texas", "st": "TX", "address": "3 Nova Court", "zip": "88563", "lat": 31.6948, "long": -106.3, "short_name": "Holdlamis", "full_name": "Holdlamis Car Dealership"},
    {"id": 2, "city": "Minneapolis", "state": "Minnesota", "st": "MN", "short_name": "Temp", "full_name": "Temp Car Dealership"},
    {"id": 3, "city": "Austin", "state": "texas", "full_name": "Lowercase Motors"},
    {"id": 4, "city": "Dallas", "state": "Texas", "st": "TX", "short_name": "Solarbreeze", "full_name": "Solarbreeze Car Dealership"}
  ]
}"#;

// model 3 leaves type and year out to pick up the defaults
pub const TEST_CARS: &str = r#"{
  "car_makes": [
    {"id": 1, "name": "Audi", "description": "Great cars. German technology"},
    {"id": 2, "name": "Toyota"}
  ],
  "car_models": [
    {"id": 1, "car_make": 1, "name": "A4", "type": "SUV", "year": 2023},
    {"id": 2, "car_make": 2, "name": "Corolla", "type": "SEDAN", "year": 2023},
    {"id": 3, "car_make": 1, "name": "A6"}
  ]
}"#;

pub fn test_fixtures() -> Fixtures {
    let (car_makes, car_models) = Fixtures::parse_cars(TEST_CARS).expect("test cars should parse");

    Fixtures {
        reviews: Fixtures::parse_reviews(TEST_REVIEWS).expect("test reviews should parse"),
        dealerships: Fixtures::parse_dealerships(TEST_DEALERSHIPS)
            .expect("test dealerships should parse"),
        car_makes,
        car_models,
    }
}

pub fn test_config() -> ReviewsConfig {
    ReviewsConfig {
        database_url: "sqlite::memory:".into(),
        database_name: "".into(),
        max_connections: 1,
        port: 0,
        fixtures_dir: PathBuf::from("."),
        frontend_path: None,
    }
}

pub fn new_review(dealership: i64, text: &str) -> NewReview {
    NewReview {
        name: "Test Reviewer".to_string(),
        dealership,
        review: text.to_string(),
        purchase: true,
        purchase_date: "02/16/2021".to_string(),
        car_make: "Mazda".to_string(),
        car_model: "MX-5".to_string(),
        car_year: 2020,
    }
}

// fresh in-memory sqlite store with the schema applied
pub async fn setup_test_repos() -> Repositories {
    let repo = SqliteRepository::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create in-memory database");

    Repositories::new(repo)
}

pub async fn setup_seeded_repos() -> Repositories {
    let repos = setup_test_repos().await;
    seed_database(&repos, &test_fixtures())
        .await
        .expect("Seeding should succeed");
    repos
}

pub async fn setup_test_state() -> AppState {
    setup_test_state_with(test_config()).await
}

pub async fn setup_test_state_with(config: ReviewsConfig) -> AppState {
    AppState {
        repos: setup_seeded_repos().await,
        config: Arc::new(config),
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ids of a JSON array of documents, in response order
pub fn ids(json: &serde_json::Value) -> Vec<i64> {
    json.as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|doc| doc["id"].as_i64().expect("document without an integer id"))
        .collect()
}
