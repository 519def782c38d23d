//! HTTP-level tests for the Emby client against a mock server.

use mediatree_providers::emby::{EmbyClient, EmbyError, ItemsQuery};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> EmbyClient {
    EmbyClient::with_credentials(server.uri(), "secret-token", "u1").unwrap()
}

#[tokio::test]
async fn test_login_stores_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emby/Users/authenticatebyname"))
        .and(body_json(json!({ "Username": "alice", "Pw": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AccessToken": "tok",
            "User": { "Id": "u1", "Name": "alice" },
            "ServerId": "srv"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = EmbyClient::new(server.uri()).unwrap();
    let (token, user_id) = client.login("alice", "pw").await.unwrap();

    assert_eq!(token, "tok");
    assert_eq!(user_id, "u1");
    assert!(client.has_credentials());
}

#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emby/Users/authenticatebyname"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut client = EmbyClient::new(server.uri()).unwrap();
    let err = client.login("alice", "wrong").await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_views_send_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/emby/Users/u1/Views"))
        .and(header("X-Emby-Token", "secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Items": [
                { "Id": "1", "Name": "Movies", "Type": "CollectionFolder", "CollectionType": "movies" },
                { "Id": "2", "Name": "Shows", "Type": "CollectionFolder", "CollectionType": "tvshows" }
            ],
            "TotalRecordCount": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let views = client_for(&server).get_views().await.unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].collection_type.as_deref(), Some("movies"));
    assert_eq!(views[1].name, "Shows");
}

#[tokio::test]
async fn test_recursive_children_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/emby/Users/u1/Items"))
        .and(query_param("ParentId", "1"))
        .and(query_param("Recursive", "true"))
        .and(query_param("IncludeItemTypes", "Movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Items": [{ "Id": "2", "Name": "Foo", "Type": "Movie" }],
            "TotalRecordCount": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = ItemsQuery {
        parent_id: Some("1".to_string()),
        recursive: true,
        include_item_types: vec!["Movie".to_string()],
        ..ItemsQuery::default()
    };
    let items = client_for(&server).get_items(&query).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item_type, "Movie");
}

#[tokio::test]
async fn test_get_item_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/emby/Users/u1/Items/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server).get_item("missing").await.unwrap_err();
    assert!(matches!(err, EmbyError::NotFound(id) if id == "missing"));
}

#[tokio::test]
async fn test_get_item_bad_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/emby/Users/u1/Items/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_item("3").await.unwrap_err();
    assert!(matches!(err, EmbyError::Parse(_)));
}

#[tokio::test]
async fn test_update_playback_position() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emby/Users/u1/Items/9/UserData"))
        .and(body_json(json!({ "PlaybackPositionTicks": 600_000_000_i64 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .update_playback_position("9", 600_000_000)
        .await
        .unwrap();
}
