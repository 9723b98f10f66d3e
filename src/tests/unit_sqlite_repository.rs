use crate::database::Repositories;
use crate::database::sqlite::SqliteRepository;
use crate::services::seed::seed_database;
use crate::tests::support::{new_review, setup_seeded_repos, setup_test_repos, test_fixtures};

fn review_ids(reviews: &[crate::domain::Review]) -> Vec<i64> {
    reviews.iter().map(|r| r.id).collect()
}

// test the store's ability to take a whole collection and hand it back
#[tokio::test]
async fn test_sqlite_replace_and_retrieve() {
    let repos = setup_test_repos().await;
    let fixtures = test_fixtures();

    let inserted = repos.reviews.replace_all(&fixtures.reviews).await.unwrap();
    assert_eq!(inserted, 5);
    let inserted = repos
        .dealerships
        .replace_all(&fixtures.dealerships)
        .await
        .unwrap();
    assert_eq!(inserted, 4);

    assert_eq!(repos.reviews.get_all().await.unwrap(), fixtures.reviews);
    assert_eq!(repos.dealerships.get_all().await.unwrap(), fixtures.dealerships);
}

// replacing twice leaves only the second batch behind
#[tokio::test]
async fn test_sqlite_replace_clears_previous_documents() {
    let repos = setup_seeded_repos().await;
    let fixtures = test_fixtures();

    let subset = &fixtures.reviews[..2];
    repos.reviews.replace_all(subset).await.unwrap();

    assert_eq!(review_ids(&repos.reviews.get_all().await.unwrap()), vec![1, 2]);
}

// duplicate ids in a batch fail the whole batch, the previous contents survive
#[tokio::test]
async fn test_sqlite_replace_is_atomic() {
    let repos = setup_seeded_repos().await;
    let mut fixtures = test_fixtures();
    fixtures.reviews[1].id = fixtures.reviews[0].id;

    let result = repos.reviews.replace_all(&fixtures.reviews).await;
    assert!(result.is_err(), "Should fail due to duplicate review id");

    assert_eq!(
        review_ids(&repos.reviews.get_all().await.unwrap()),
        vec![1, 2, 3, 4, 5]
    );
}

#[tokio::test]
async fn test_sqlite_filters() {
    let repos = setup_seeded_repos().await;

    let reviews = repos.reviews.get_by_dealership(1).await.unwrap();
    assert_eq!(review_ids(&reviews), vec![1, 3]);

    let texas = repos.dealerships.get_by_state("Texas").await.unwrap();
    let ids: Vec<i64> = texas.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 4]);

    assert!(repos.dealerships.get_by_state("TEXAS").await.unwrap().is_empty());

    let dealer = repos.dealerships.get_by_id(3).await.unwrap().unwrap();
    assert_eq!(dealer.city, "Austin");
    assert!(repos.dealerships.get_by_id(30).await.unwrap().is_none());
}

#[tokio::test]
async fn test_sqlite_insert_assigns_next_id() {
    let repos = setup_seeded_repos().await;

    let saved = repos.reviews.insert(new_review(2, "Fine")).await.unwrap();
    assert_eq!(saved.id, 6);

    let saved = repos.reviews.insert(new_review(2, "Fine again")).await.unwrap();
    assert_eq!(saved.id, 7);
}

#[tokio::test]
async fn test_sqlite_insert_into_empty_collection() {
    let repos = setup_test_repos().await;

    let saved = repos.reviews.insert(new_review(1, "First!")).await.unwrap();

    assert_eq!(saved.id, 1);
}

// ids follow the largest id, not the row count
#[tokio::test]
async fn test_sqlite_insert_after_sparse_ids() {
    let repos = setup_test_repos().await;
    let mut fixtures = test_fixtures();
    fixtures.reviews[4].id = 40;
    repos.reviews.replace_all(&fixtures.reviews).await.unwrap();

    let saved = repos.reviews.insert(new_review(1, "Next")).await.unwrap();

    assert_eq!(saved.id, 41);
}

async fn insert_pair(repos: &Repositories) -> (i64, i64) {
    let (a, b) = tokio::join!(
        repos.reviews.insert(new_review(1, "first concurrent post")),
        repos.reviews.insert(new_review(1, "second concurrent post")),
    );
    (a.unwrap().id, b.unwrap().id)
}

// two simultaneous posts while the max id is 5 must not both get 6
#[tokio::test]
async fn test_sqlite_concurrent_inserts_get_distinct_ids() {
    let repos = setup_seeded_repos().await;

    let (a, b) = insert_pair(&repos).await;
    let mut ids = vec![a, b];
    ids.sort();

    assert_eq!(ids, vec![6, 7]);
}

#[tokio::test]
async fn test_sqlite_many_concurrent_inserts() {
    let repos = setup_seeded_repos().await;

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20 {
        let repos = repos.clone();
        tasks.spawn(async move {
            repos
                .reviews
                .insert(new_review(2, &format!("post {}", i)))
                .await
                .unwrap()
                .id
        });
    }

    let mut ids = Vec::new();
    while let Some(id) = tasks.join_next().await {
        ids.push(id.unwrap());
    }
    ids.sort();

    assert_eq!(ids, (6..26).collect::<Vec<i64>>());
}

// on-disk database shared by a multi-connection pool: concurrent inserts really race
// here, only the single-statement id assignment keeps them apart
#[tokio::test]
async fn test_sqlite_pooled_concurrent_inserts_get_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("reviews.db").display());
    let repo = SqliteRepository::connect(&url, 15).await.unwrap();
    let repos = Repositories::new(repo);
    seed_database(&repos, &test_fixtures()).await.unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..50 {
        let repos = repos.clone();
        tasks.spawn(async move {
            repos
                .reviews
                .insert(new_review(3, &format!("pooled post {}", i)))
                .await
        });
    }

    let mut ids = Vec::new();
    while let Some(result) = tasks.join_next().await {
        ids.push(result.unwrap().expect("Insert should succeed").id);
    }
    ids.sort();

    assert_eq!(ids, (6..56).collect::<Vec<i64>>());
    assert_eq!(repos.reviews.get_all().await.unwrap().len(), 55);
}

#[tokio::test]
async fn test_sqlite_car_catalog_round_trip() {
    let repos = setup_test_repos().await;
    let fixtures = test_fixtures();

    let inserted = repos
        .cars
        .replace_catalog(&fixtures.car_makes, &fixtures.car_models)
        .await
        .unwrap();
    assert_eq!(inserted, 3);

    assert_eq!(repos.cars.get_models().await.unwrap(), fixtures.car_models);

    let catalog: Vec<(String, String)> = repos
        .cars
        .get_catalog()
        .await
        .unwrap()
        .into_iter()
        .map(|listing| (listing.car_model, listing.car_make))
        .collect();
    assert_eq!(
        catalog,
        vec![
            ("A4".to_string(), "Audi".to_string()),
            ("Corolla".to_string(), "Toyota".to_string()),
            ("A6".to_string(), "Audi".to_string()),
        ]
    );
}

// a model pointing at a missing make fails the whole swap, the old catalog survives
#[tokio::test]
async fn test_sqlite_car_catalog_rejects_dangling_make() {
    let repos = setup_seeded_repos().await;
    let fixtures = test_fixtures();
    let mut orphan = fixtures.car_models[0].clone();
    orphan.car_make = 42;

    let err = repos
        .cars
        .replace_catalog(&fixtures.car_makes, &[orphan])
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("Failed to insert car model 1 (make 42)"));
    assert_eq!(repos.cars.get_catalog().await.unwrap().len(), 3);
}
