use jobwatch_core::error::AppError;
use jobwatch_core::models::NewCategory;
use jobwatch_core::platform::Platform;
use jobwatch_core::traits::FilterStore;
use jobwatch_db::FilterRepository;

use crate::integration::common::setup_test_db;

fn incoming(pairs: &[(&str, &str)]) -> Vec<NewCategory> {
    pairs
        .iter()
        .map(|(name, key)| NewCategory::new(*name, *key))
        .collect()
}

#[tokio::test]
async fn replace_all_keeps_source_order_and_starts_unselected() {
    let (pool, _container) = setup_test_db().await;
    let repo = FilterRepository::new(pool);

    repo.replace_all(
        Platform::Freelancer,
        incoming(&[("Websites", "3"), ("Design", "1"), ("Writing", "2")]),
    )
    .await
    .unwrap();

    let categories = repo.list_categories(Platform::Freelancer).await.unwrap();
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Websites", "Design", "Writing"]);
    assert!(categories.iter().all(|c| !c.selected));
}

#[tokio::test]
async fn flip_selection_toggles_and_reports_misses() {
    let (pool, _container) = setup_test_db().await;
    let repo = FilterRepository::new(pool);
    repo.replace_all(Platform::Guru, incoming(&[("Programming & Development", "programming-development")]))
        .await
        .unwrap();

    let on = repo
        .flip_selection(Platform::Guru, "programming-development")
        .await
        .unwrap();
    assert!(on.selected);

    let off = repo
        .flip_selection(Platform::Guru, "programming-development")
        .await
        .unwrap();
    assert!(!off.selected);

    let missing = repo.flip_selection(Platform::Guru, "nope").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    // Keys are scoped per platform.
    let other = repo
        .flip_selection(Platform::Freelancer, "programming-development")
        .await;
    assert!(matches!(other, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn refresh_preserves_selection_by_name() {
    let (pool, _container) = setup_test_db().await;
    let repo = FilterRepository::new(pool);

    repo.replace_all(
        Platform::Freelancer,
        incoming(&[("Websites", "3"), ("Writing", "2"), ("Legacy", "9")]),
    )
    .await
    .unwrap();
    repo.flip_selection(Platform::Freelancer, "3").await.unwrap();
    repo.flip_selection(Platform::Freelancer, "9").await.unwrap();

    // Websites changed key, Legacy disappeared, Mobile is new.
    repo.replace_all(
        Platform::Freelancer,
        incoming(&[("Websites", "30"), ("Writing", "2"), ("Mobile", "4")]),
    )
    .await
    .unwrap();

    let categories = repo.list_categories(Platform::Freelancer).await.unwrap();
    let state: Vec<(&str, &str, bool)> = categories
        .iter()
        .map(|c| (c.name.as_str(), c.external_key.as_str(), c.selected))
        .collect();
    assert_eq!(
        state,
        vec![("Websites", "30", true), ("Writing", "2", false), ("Mobile", "4", false)]
    );
}

#[tokio::test]
async fn set_keywords_replaces_the_set() {
    let (pool, _container) = setup_test_db().await;
    let repo = FilterRepository::new(pool);

    repo.set_keywords(Platform::Guru, &["rust".into(), " tokio ".into(), "".into()])
        .await
        .unwrap();
    repo.set_keywords(Platform::Freelancer, &["python".into()])
        .await
        .unwrap();

    let values: Vec<String> = repo
        .list_keywords(Platform::Guru)
        .await
        .unwrap()
        .into_iter()
        .map(|k| k.value)
        .collect();
    assert_eq!(values, vec!["rust", "tokio"]);

    repo.set_keywords(Platform::Guru, &["axum".into(), "rust".into(), "axum".into()])
        .await
        .unwrap();
    let values: Vec<String> = repo
        .list_keywords(Platform::Guru)
        .await
        .unwrap()
        .into_iter()
        .map(|k| k.value)
        .collect();
    assert_eq!(values, vec!["axum", "rust"]);

    repo.set_keywords(Platform::Guru, &[]).await.unwrap();
    assert!(repo.list_keywords(Platform::Guru).await.unwrap().is_empty());
    assert_eq!(repo.list_keywords(Platform::Freelancer).await.unwrap().len(), 1);
}

#[tokio::test]
async fn filter_set_keeps_only_selected_categories() {
    let (pool, _container) = setup_test_db().await;
    let repo = FilterRepository::new(pool);

    repo.replace_all(Platform::Freelancer, incoming(&[("Websites", "3"), ("Writing", "2")]))
        .await
        .unwrap();
    repo.flip_selection(Platform::Freelancer, "2").await.unwrap();
    repo.set_keywords(Platform::Freelancer, &["copy".into()])
        .await
        .unwrap();

    let filter = repo.filter_set(Platform::Freelancer).await.unwrap();
    assert!(filter.has_selection());
    assert_eq!(filter.selected_keys(), vec!["2"]);
    assert_eq!(filter.keywords, vec!["copy"]);
}
