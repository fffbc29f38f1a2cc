use jobwatch_core::platform::Platform;
use jobwatch_core::traits::WatermarkStore;
use jobwatch_db::WatermarkRepository;

use crate::integration::common::setup_test_db;

#[tokio::test]
async fn missing_watermark_is_none() {
    let (pool, _container) = setup_test_db().await;
    let repo = WatermarkRepository::new(pool);

    assert!(repo.get(Platform::Guru).await.unwrap().is_none());
}

#[tokio::test]
async fn advance_upserts_one_row_per_platform() {
    let (pool, _container) = setup_test_db().await;
    let repo = WatermarkRepository::new(pool.clone());

    repo.advance(Platform::Guru, "1001").await.unwrap();
    repo.advance(Platform::Guru, "1005").await.unwrap();
    repo.advance(Platform::Freelancer, "77").await.unwrap();

    let guru = repo.get(Platform::Guru).await.unwrap().unwrap();
    assert_eq!(guru.platform, Platform::Guru);
    assert_eq!(guru.last_job_id, "1005");

    let freelancer = repo.get(Platform::Freelancer).await.unwrap().unwrap();
    assert_eq!(freelancer.last_job_id, "77");

    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM last_processed_jobs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 2);
}

#[tokio::test]
async fn clear_only_touches_one_platform() {
    let (pool, _container) = setup_test_db().await;
    let repo = WatermarkRepository::new(pool);

    repo.advance(Platform::Guru, "1001").await.unwrap();
    repo.advance(Platform::Freelancer, "77").await.unwrap();

    WatermarkStore::clear(&repo, Platform::Guru).await.unwrap();

    assert!(repo.get(Platform::Guru).await.unwrap().is_none());
    assert!(repo.get(Platform::Freelancer).await.unwrap().is_some());
}
