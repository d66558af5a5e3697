use cardfeed::{
    ContactOutcome, FailurePolicy, Feed, FeedConfig, HttpSource, IndexOrigin,
    ProfileSource, RefillOrder,
};
use httpmock::prelude::*;
use serde_json::json;
use tempdir::TempDir;
use url::Url;

fn config(server: &MockServer, dir: &TempDir) -> FeedConfig {
    FeedConfig {
        index_url: server.url("/profiles/index.json"),
        detail_url: server.url("/profiles"),
        refill_order: RefillOrder::Sequential,
        identity_path: dir.path().join("identity.json"),
        ..FeedConfig::default()
    }
}

fn index_body() -> serde_json::Value {
    json!([
        {"id": 1, "name": "Laila", "hobby": "reading"},
        {"id": 2, "name": "Nour", "hobby": "photography", "photo": "https://cdn.test/2.jpg"},
        {"id": 3, "name": "Sara", "hobby": "cooking", "age": 22},
        {"id": 4, "name": "Mariam", "hobby": "sports"},
        {"id": 5, "name": "Hana", "hobby": "music"},
        {"id": 6, "name": "Huda", "hobby": "chess"}
    ])
}

#[tokio::test]
async fn index_is_loaded_over_http() {
    cardfeed::initialize();
    let server = MockServer::start_async().await;
    let index = server
        .mock_async(|when, then| {
            when.method(GET).path("/profiles/index.json");
            then.status(200).json_body(index_body());
        })
        .await;
    let dir = TempDir::new("http_feed").unwrap();

    let feed = Feed::connect(config(&server, &dir)).await.unwrap();

    index.assert_async().await;
    assert_eq!(feed.index().origin(), IndexOrigin::Source);
    assert_eq!(feed.visible(), &[1, 2, 3, 4, 5]);
    let profiles = feed.visible_profiles();
    assert_eq!(profiles[1].photo.as_str(), "https://cdn.test/2.jpg");
    assert_eq!(
        profiles[0].photo.as_str(),
        "https://picsum.photos/seed/profile1/400/400"
    );
}

#[tokio::test]
async fn server_error_falls_back_to_builtin_profiles() {
    cardfeed::initialize();
    let server = MockServer::start_async().await;
    let index = server
        .mock_async(|when, then| {
            when.method(GET).path("/profiles/index.json");
            then.status(500);
        })
        .await;
    let dir = TempDir::new("http_feed").unwrap();

    let feed = Feed::connect(config(&server, &dir)).await.unwrap();

    index.assert_async().await;
    assert_eq!(feed.index().origin(), IndexOrigin::Fallback);
    assert_eq!(feed.index().ids(), vec![1, 2, 3, 4, 5]);
    assert_eq!(feed.visible().len(), 5);
}

#[tokio::test]
async fn malformed_index_falls_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/profiles/index.json");
            then.status(200)
                .header("content-type", "application/json")
                .body("{\"profiles\": oops");
        })
        .await;
    let dir = TempDir::new("http_feed").unwrap();

    let feed = Feed::connect(config(&server, &dir)).await.unwrap();
    assert_eq!(feed.index().origin(), IndexOrigin::Fallback);
}

#[tokio::test]
async fn detail_is_requested_once_per_profile() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/profiles/index.json");
            then.status(200).json_body(index_body());
        })
        .await;
    let detail = server
        .mock_async(|when, then| {
            when.method(GET).path("/profiles/2");
            then.status(200).json_body(json!({
                "id": 2,
                "name": "Nour",
                "age": 25,
                "city": "Cairo",
                "height_cm": "160",
                "weight_kg": 52,
                "hobby": "photography"
            }));
        })
        .await;
    let dir = TempDir::new("http_feed").unwrap();
    let feed = Feed::connect(config(&server, &dir)).await.unwrap();

    let first = feed.detail(2).await.unwrap();
    let second = feed.detail(2).await.unwrap();

    detail.assert_async().await;
    assert_eq!(first, second);
    assert_eq!(first.city, "Cairo");
    assert_eq!(first.height_cm, 160);
    assert_eq!(
        first.photo.as_str(),
        "https://picsum.photos/seed/profile2/400/400"
    );
}

#[tokio::test]
async fn failed_detail_becomes_placeholder() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/profiles/index.json");
            then.status(200).json_body(index_body());
        })
        .await;
    let detail = server
        .mock_async(|when, then| {
            when.method(GET).path("/profiles/3");
            then.status(503);
        })
        .await;
    let dir = TempDir::new("http_feed").unwrap();
    let feed = Feed::connect(FeedConfig {
        failure_policy: FailurePolicy::Permanent,
        ..config(&server, &dir)
    })
    .await
    .unwrap();

    let placeholder = feed.detail(3).await.unwrap();
    feed.detail(3).await.unwrap();

    detail.assert_async().await;
    assert_eq!(placeholder.name, "Sara");
    assert_eq!(placeholder.hobby, "cooking");
    assert_eq!(placeholder.age, 0);
    assert_eq!(placeholder.city, "");
    assert_eq!(placeholder.height_cm, 0);
    assert_eq!(placeholder.weight_kg, 0);
    assert_eq!(feed.cache().is_placeholder(3), Some(true));
}

#[tokio::test]
async fn http_source_reports_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/profiles/9");
            then.status(404);
        })
        .await;
    let source = HttpSource::new(
        Url::parse(&server.url("/profiles/index.json")).unwrap(),
        Url::parse(&server.url("/profiles/")).unwrap(),
    )
    .unwrap();

    let result = source.fetch_detail(9).await;
    assert!(matches!(result, Err(cardfeed::FeedError::Status(404))));
}

#[tokio::test]
async fn contact_round_trip() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/profiles/index.json");
            then.status(200).json_body(index_body());
        })
        .await;
    let dir = TempDir::new("http_feed").unwrap();
    let mut feed = Feed::connect(config(&server, &dir)).await.unwrap();

    assert_eq!(feed.contact(4).unwrap(), ContactOutcome::IdentityRequired);
    let link = feed
        .sign_in("Omar", "omar@mail.test")
        .unwrap()
        .expect("pending contact resumes");

    assert_eq!(link.path(), "mariam4@example.com");
    assert_eq!(feed.visible(), &[1, 2, 3, 6, 5]);
    assert!(dir.path().join("identity.json").exists());
}
