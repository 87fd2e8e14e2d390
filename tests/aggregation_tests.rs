/// Integration tests for the aggregation engine with mocked backend services
/// Tests the scatter-gather read path without hitting real backends
use listings_gateway::aggregation::AggregationService;
use listings_gateway::config::Config;
use listings_gateway::models::ListingsQuery;
use listings_gateway::router::ServiceRouter;
use listings_gateway::upstream::UpstreamClient;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create test config
fn create_test_config(listing_url: String, user_url: String) -> Config {
    Config {
        port: 8080,
        listing_service_url: listing_url,
        user_service_url: user_url,
    }
}

fn aggregation(config: &Config) -> AggregationService {
    let router = ServiceRouter::from_config(config).unwrap();
    let upstream = UpstreamClient::new().unwrap();
    AggregationService::new(&router, &upstream)
}

fn user_body(id: i64, name: &str) -> serde_json::Value {
    json!({
        "result": true,
        "user": {"id": id, "name": name, "created_at": 1000, "updated_at": 1000}
    })
}

#[tokio::test]
async fn test_page_enriched_with_owners() {
    let listing_server = MockServer::start().await;
    let user_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "listings": [
                {"id": 1, "user_id": 10, "title": "Bike"},
                {"id": 2, "user_id": 20, "title": "Lamp"},
            ]
        })))
        .mount(&listing_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(10, "Ada")))
        .mount(&user_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(20, "Grace")))
        .mount(&user_server)
        .await;

    let config = create_test_config(listing_server.uri(), user_server.uri());
    let service = aggregation(&config);

    let listings = service.get_listings(&ListingsQuery::default()).await.unwrap();

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].user.as_ref().unwrap().name, "Ada");
    assert_eq!(listings[1].user.as_ref().unwrap().name, "Grace");
    assert_eq!(listings[0].extra.get("title"), Some(&json!("Bike")));
}

#[tokio::test]
async fn test_default_pagination_applied() {
    let listing_server = MockServer::start().await;
    let user_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param("page_num", "1"))
        .and(query_param("page_size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"listings": []})))
        .expect(1)
        .mount(&listing_server)
        .await;

    let config = create_test_config(listing_server.uri(), user_server.uri());
    let service = aggregation(&config);

    let listings = service.get_listings(&ListingsQuery::default()).await.unwrap();
    assert!(listings.is_empty());
}

#[tokio::test]
async fn test_explicit_pagination_forwarded_verbatim() {
    let listing_server = MockServer::start().await;
    let user_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param("page_num", "3"))
        .and(query_param("page_size", "25"))
        .and(query_param("user_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"listings": []})))
        .expect(1)
        .mount(&listing_server)
        .await;

    let config = create_test_config(listing_server.uri(), user_server.uri());
    let service = aggregation(&config);

    let query = ListingsQuery {
        page_num: Some("3".to_string()),
        page_size: Some("25".to_string()),
        user_id: Some("7".to_string()),
    };
    let listings = service.get_listings(&query).await.unwrap();
    assert!(listings.is_empty());
}

#[tokio::test]
async fn test_empty_page_issues_no_lookups() {
    let listing_server = MockServer::start().await;
    let user_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"listings": []})))
        .mount(&listing_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/users/\d+$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&user_server)
        .await;

    let config = create_test_config(listing_server.uri(), user_server.uri());
    let service = aggregation(&config);

    let listings = service.get_listings(&ListingsQuery::default()).await.unwrap();
    assert!(listings.is_empty());
}

#[tokio::test]
async fn test_lookup_rejection_absorbed() {
    let listing_server = MockServer::start().await;
    let user_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "listings": [
                {"id": 1, "user_id": 10},
                {"id": 2, "user_id": 20},
            ]
        })))
        .mount(&listing_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(10, "Ada")))
        .mount(&user_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/20"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&user_server)
        .await;

    let config = create_test_config(listing_server.uri(), user_server.uri());
    let service = aggregation(&config);

    let listings = service.get_listings(&ListingsQuery::default()).await.unwrap();

    assert_eq!(listings.len(), 2);
    assert!(listings[0].user.is_some());
    assert!(listings[1].user.is_none());
}

#[tokio::test]
async fn test_malformed_user_payload_absorbed() {
    let listing_server = MockServer::start().await;
    let user_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "listings": [{"id": 1, "user_id": 10}]
        })))
        .mount(&listing_server)
        .await;
    // 2xx reply without a user record in it
    Mock::given(method("GET"))
        .and(path("/users/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
        .mount(&user_server)
        .await;

    let config = create_test_config(listing_server.uri(), user_server.uri());
    let service = aggregation(&config);

    let listings = service.get_listings(&ListingsQuery::default()).await.unwrap();

    assert_eq!(listings.len(), 1);
    assert!(listings[0].user.is_none());
}

#[tokio::test]
async fn test_unreachable_user_service_absorbed() {
    let listing_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "listings": [{"id": 1, "user_id": 10}, {"id": 2, "user_id": 20}]
        })))
        .mount(&listing_server)
        .await;

    let config =
        create_test_config(listing_server.uri(), "http://127.0.0.1:9".to_string());
    let service = aggregation(&config);

    let listings = service.get_listings(&ListingsQuery::default()).await.unwrap();

    assert_eq!(listings.len(), 2);
    assert!(listings.iter().all(|l| l.user.is_none()));
}

#[tokio::test]
async fn test_primary_fetch_failure_escalates() {
    let listing_server = MockServer::start().await;
    let user_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&listing_server)
        .await;

    let config = create_test_config(listing_server.uri(), user_server.uri());
    let service = aggregation(&config);

    let result = service.get_listings(&ListingsQuery::default()).await;
    assert!(result.is_err());
}
