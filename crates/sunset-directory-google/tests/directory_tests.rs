//! Integration tests for the Google directory against a mock Admin SDK.

mod common;

use common::*;
use sunset_core::{GroupId, PrincipalId, PrincipalKey};
use sunset_directory::{DirectoryClient, Lookup, ProviderError, Removal};
use sunset_directory_google::{GoogleConfig, GoogleDirectory, GoogleError};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const BOB_ID: &str = "104857600000000000001";
const ENGINEERING: &str = "engineering@example.com";

#[tokio::test]
async fn test_resolve_principal_found() {
    let mock = MockAdminServer::new().await;
    mock.mock_user("bob@example.com", BOB_ID).await;

    let result = mock
        .directory()
        .resolve_principal(&PrincipalKey::new("bob@example.com"))
        .await
        .unwrap();

    assert_eq!(result, Lookup::Found(PrincipalId::new(BOB_ID)));
}

#[tokio::test]
async fn test_resolve_principal_404_is_not_found() {
    let mock = MockAdminServer::new().await;
    mock.mock_error(
        "GET",
        "/admin/directory/v1/users/ghost%40example.com",
        404,
        "notFound",
    )
    .await;

    let result = mock
        .directory()
        .resolve_principal(&PrincipalKey::new("ghost@example.com"))
        .await
        .unwrap();

    assert_eq!(result, Lookup::NotFound);
}

#[tokio::test]
async fn test_token_request_uses_jwt_bearer_grant() {
    let mock = MockAdminServer::new().await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/admin/directory/v1/groups/engineering%40example.com/members/{BOB_ID}"
        )))
        .and(header("Authorization", "Bearer mock-access-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": BOB_ID, "role": "MEMBER", "type": "USER" })),
        )
        .expect(2)
        .mount(&mock.server)
        .await;

    let directory = mock.directory();
    for _ in 0..2 {
        let result = directory
            .is_member(&GroupId::new(ENGINEERING), &PrincipalId::new(BOB_ID))
            .await
            .unwrap();
        assert_eq!(result, Lookup::Found(true));
    }

    let token_requests: Vec<_> = mock
        .server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/token")
        .collect();
    assert_eq!(token_requests.len(), 1, "token must be cached between calls");

    let body = String::from_utf8(token_requests[0].body.clone()).unwrap();
    assert!(body.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"));
    assert!(body.contains("assertion="));
}

#[tokio::test]
async fn test_is_member_false_when_not_direct_member() {
    let mock = MockAdminServer::new().await;
    mock.mock_member(ENGINEERING, BOB_ID, false).await;

    let result = mock
        .directory()
        .is_member(&GroupId::new(ENGINEERING), &PrincipalId::new(BOB_ID))
        .await
        .unwrap();

    assert_eq!(result, Lookup::Found(false));
}

#[tokio::test]
async fn test_nested_member_is_not_reported() {
    let mock = MockAdminServer::new().await;
    // Transitive check would say yes; it must never be consulted.
    Mock::given(method("GET"))
        .and(path(format!(
            "/admin/directory/v1/groups/engineering%40example.com/hasMember/{BOB_ID}"
        )))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "isMember": true })),
        )
        .expect(0)
        .mount(&mock.server)
        .await;
    mock.mock_member(ENGINEERING, BOB_ID, false).await;

    let result = mock
        .directory()
        .is_member(&GroupId::new(ENGINEERING), &PrincipalId::new(BOB_ID))
        .await
        .unwrap();

    assert_eq!(result, Lookup::Found(false));
}

#[tokio::test]
async fn test_remove_member() {
    let mock = MockAdminServer::new().await;
    Mock::given(method("DELETE"))
        .and(path(format!(
            "/admin/directory/v1/groups/engineering%40example.com/members/{BOB_ID}"
        )))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock.server)
        .await;

    let result = mock
        .directory()
        .remove_member(&GroupId::new(ENGINEERING), &PrincipalId::new(BOB_ID))
        .await
        .unwrap();

    assert_eq!(result, Removal::Removed);
}

#[tokio::test]
async fn test_remove_member_already_gone() {
    let mock = MockAdminServer::new().await;
    mock.mock_error(
        "DELETE",
        &format!("/admin/directory/v1/groups/engineering%40example.com/members/{BOB_ID}"),
        404,
        "notFound",
    )
    .await;

    let result = mock
        .directory()
        .remove_member(&GroupId::new(ENGINEERING), &PrincipalId::new(BOB_ID))
        .await
        .unwrap();

    assert_eq!(result, Removal::NotFound);
}

#[tokio::test]
async fn test_forbidden_maps_to_permission_denied() {
    let mock = MockAdminServer::new().await;
    mock.mock_error(
        "DELETE",
        &format!("/admin/directory/v1/groups/engineering%40example.com/members/{BOB_ID}"),
        403,
        "forbidden",
    )
    .await;

    let err: ProviderError = mock
        .directory()
        .remove_member(&GroupId::new(ENGINEERING), &PrincipalId::new(BOB_ID))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::PermissionDenied { .. }));
}

#[tokio::test]
async fn test_rate_limited_is_not_retried() {
    let mock = MockAdminServer::new().await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/admin/directory/v1/groups/engineering%40example.com/members/{BOB_ID}"
        )))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .expect(1)
        .mount(&mock.server)
        .await;

    let err = mock
        .directory()
        .is_member(&GroupId::new(ENGINEERING), &PrincipalId::new(BOB_ID))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ProviderError::RateLimited {
            retry_after_secs: Some(30)
        }
    );
}

#[tokio::test]
async fn test_token_failure_is_authentication_error() {
    let server = wiremock::MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "unauthorized_client",
            "error_description": "Client is unauthorized to retrieve access tokens using this method."
        })))
        .mount(&server)
        .await;

    let mock = MockAdminServer { server };
    let err = mock
        .directory()
        .resolve_principal(&PrincipalKey::new("bob@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Authentication { .. }));
}

#[test]
fn test_invalid_private_key_fails_at_construction() {
    let key = sunset_directory_google::ServiceAccountKey::from_json(
        r#"{"client_email": "x@example.iam.gserviceaccount.com", "private_key": "not a pem"}"#,
    )
    .unwrap();
    let config = GoogleConfig::builder(key).build().unwrap();

    let err = GoogleDirectory::new(config).unwrap_err();
    assert!(matches!(err, GoogleError::ServiceAccountKey(_)));
}
